use crate::api::daily::types::{ClaimedReward, DailyRewardInfo, MonthlyReward};
use crate::api::decode;
use crate::api::record::RecordClient;
use crate::core::classify::ApiFamily;
use crate::core::dispatcher::{ApiDispatcher, ApiRequest};
use crate::core::errors::ServiceError;
use crate::core::kernel::transport::{ReqwestTransport, Transport};
use crate::core::types::{Credential, GameServer, Region};
use std::sync::Arc;
use tracing::instrument;

// The check-in event lives on its own hosts, with a per-region activity id.
const OS_EVENT_URL: &str = "https://sg-hk4e-api.hoyolab.com/event/sol/";
const OS_ACT_ID: &str = "e202102251931481";
const CN_EVENT_URL: &str = "https://api-takumi.mihoyo.com/event/bbs_sign_reward/";
const CN_ACT_ID: &str = "e202009291139501";

const CLAIMED_PAGE_SIZE: usize = 10;

/// Client for the daily check-in rewards.
///
/// Same cookie authentication and error table as the game-record family;
/// the endpoints are absolute URLs carrying an `act_id`.
#[derive(Clone)]
pub struct DailyClient<T: Transport = ReqwestTransport> {
    dispatcher: Arc<ApiDispatcher<T>>,
    record: RecordClient<T>,
}

impl<T: Transport> DailyClient<T> {
    pub fn new(dispatcher: Arc<ApiDispatcher<T>>) -> Self {
        let record = RecordClient::new(Arc::clone(&dispatcher));
        Self { dispatcher, record }
    }

    fn event_request(region: Region, endpoint: &str) -> ApiRequest {
        let (base, act_id) = match region {
            Region::Overseas => (OS_EVENT_URL, OS_ACT_ID),
            Region::Mainland => (CN_EVENT_URL, CN_ACT_ID),
        };
        ApiRequest::get(ApiFamily::GameRecord, region, format!("{}{}", base, endpoint))
            .query("act_id", act_id)
    }

    /// Daily reward info for the authenticated user.
    #[instrument(skip(self, credential))]
    pub async fn get_reward_info(
        &self,
        region: Region,
        credential: Option<&Credential>,
    ) -> Result<DailyRewardInfo, ServiceError> {
        let request = Self::event_request(region, "info");
        let data = self.dispatcher.dispatch_as(&request, credential).await?;
        decode(data, "daily reward info")
    }

    /// The rewards available in the current month's calendar.
    #[instrument(skip(self, credential))]
    pub async fn get_monthly_rewards(
        &self,
        region: Region,
        lang: Option<&str>,
        credential: Option<&Credential>,
    ) -> Result<Vec<MonthlyReward>, ServiceError> {
        let lang = lang.unwrap_or(&self.dispatcher.config().language);
        let request = Self::event_request(region, "home").query("lang", lang);
        let data = self.dispatcher.dispatch_as(&request, credential).await?;
        decode(data["awards"].clone(), "monthly rewards")
    }

    /// All rewards the user claimed so far, newest first.
    #[instrument(skip(self, credential))]
    pub async fn get_claimed_rewards(
        &self,
        region: Region,
        credential: Option<&Credential>,
    ) -> Result<Vec<ClaimedReward>, ServiceError> {
        let mut rewards = Vec::new();
        let mut current_page = 1u32;
        loop {
            let request =
                Self::event_request(region, "award").query("current_page", current_page);
            let data = self.dispatcher.dispatch_as(&request, credential).await?;
            let page: Vec<ClaimedReward> = decode(data["list"].clone(), "claimed rewards")?;
            let page_len = page.len();
            rewards.extend(page);
            if page_len < CLAIMED_PAGE_SIZE {
                break;
            }
            current_page += 1;
        }
        Ok(rewards)
    }

    /// Sign in and claim today's reward.
    ///
    /// Returns the claimed reward, or `None` when today's reward was already
    /// claimed. Mainland claims must name the game account; with no uid the
    /// first account bound to the cookies is used.
    #[instrument(skip(self, credential))]
    pub async fn claim_daily_reward(
        &self,
        uid: Option<u64>,
        region: Region,
        lang: Option<&str>,
        credential: Option<&Credential>,
    ) -> Result<Option<MonthlyReward>, ServiceError> {
        let info = self.get_reward_info(region, credential).await?;
        if info.signed_in {
            return Ok(None);
        }

        let lang = lang
            .map(str::to_string)
            .unwrap_or_else(|| self.dispatcher.config().language.clone());
        let mut request = ApiRequest {
            method: reqwest::Method::POST,
            ..Self::event_request(region, "sign")
        }
        .query("lang", &lang);

        if region == Region::Mainland {
            let (game_uid, server_code) = match uid {
                Some(uid) => (uid, GameServer::from_uid(uid)?.code().to_string()),
                None => {
                    let accounts = self.record.get_game_accounts(region, credential).await?;
                    let account = accounts.first().ok_or_else(|| {
                        ServiceError::AccountNotFound(
                            "no game accounts are bound to these cookies".to_string(),
                        )
                    })?;
                    (account.uid, account.region.clone())
                }
            };
            request = request
                .query("game_uid", game_uid)
                .query("region", server_code);
        }

        self.dispatcher.dispatch_as(&request, credential).await?;

        let rewards = self
            .get_monthly_rewards(region, Some(&lang), credential)
            .await?;
        rewards
            .get(info.claimed_rewards as usize)
            .cloned()
            .map(Some)
            .ok_or_else(|| {
                ServiceError::MalformedResponse(format!(
                    "monthly calendar has no reward at index {}",
                    info.claimed_rewards
                ))
            })
    }
}
