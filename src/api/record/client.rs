use crate::api::decode;
use crate::api::record::converters;
use crate::api::record::types::{
    Character, DailyNotes, GameAccount, SpiralAbyss, TcgStats, UserStats,
};
use crate::core::classify::ApiFamily;
use crate::core::dispatcher::{ApiDispatcher, ApiRequest};
use crate::core::errors::ServiceError;
use crate::core::kernel::transport::{ReqwestTransport, Transport};
use crate::core::types::{Credential, GameServer, Region};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::instrument;

/// Typed wrapper over the game-record endpoints.
///
/// Every method names a path, forwards to the dispatcher and reshapes the
/// payload; rotation, signing and retries all happen below. Passing a
/// credential forces a single attempt with that account and leaves the
/// shared pool untouched.
#[derive(Clone)]
pub struct RecordClient<T: Transport = ReqwestTransport> {
    dispatcher: Arc<ApiDispatcher<T>>,
}

impl<T: Transport> RecordClient<T> {
    pub fn new(dispatcher: Arc<ApiDispatcher<T>>) -> Self {
        Self { dispatcher }
    }

    fn request_for_uid(uid: u64, endpoint: &str) -> ApiRequest {
        let region = Region::from_uid(uid);
        let url = format!("{}{}", region.game_record_url(), endpoint);
        ApiRequest::get(ApiFamily::GameRecord, region, url)
    }

    fn with_lang(request: ApiRequest, lang: Option<&str>) -> ApiRequest {
        match lang {
            Some(lang) => request.header("x-rpc-language", lang),
            None => request,
        }
    }

    /// Basic user information, stats and world progress.
    #[instrument(skip(self, credential))]
    pub async fn get_user_stats(
        &self,
        uid: u64,
        lang: Option<&str>,
        credential: Option<&Credential>,
    ) -> Result<UserStats, ServiceError> {
        let server = GameServer::from_uid(uid)?;
        let request = Self::request_for_uid(uid, "genshin/api/index")
            .query("server", server.code())
            .query("role_id", uid);
        let data = self
            .dispatcher
            .dispatch_as(&Self::with_lang(request, lang), credential)
            .await?;
        converters::convert_stats(data)
    }

    /// Characters of a user, with weapon, artifacts and constellations.
    ///
    /// With no explicit ids, the ids are looked up from the user's stats
    /// first.
    #[instrument(skip(self, character_ids, credential))]
    pub async fn get_characters(
        &self,
        uid: u64,
        character_ids: Option<Vec<u64>>,
        lang: Option<&str>,
        credential: Option<&Credential>,
    ) -> Result<Vec<Character>, ServiceError> {
        let character_ids = match character_ids {
            Some(ids) => ids,
            None => self
                .get_user_stats(uid, lang, credential)
                .await?
                .characters
                .iter()
                .map(|character| character.id)
                .collect(),
        };

        let server = GameServer::from_uid(uid)?;
        let region = Region::from_uid(uid);
        let url = format!("{}genshin/api/character", region.game_record_url());
        let request = ApiRequest::post(ApiFamily::GameRecord, region, url).body(json!({
            "character_ids": character_ids,
            "role_id": uid,
            "server": server.code(),
        }));
        let data = self
            .dispatcher
            .dispatch_as(&Self::with_lang(request, lang), credential)
            .await?;
        converters::convert_characters(data)
    }

    /// Spiral abyss runs. Stats refresh every season; `previous` selects the
    /// season before the current one.
    #[instrument(skip(self, credential))]
    pub async fn get_spiral_abyss(
        &self,
        uid: u64,
        previous: bool,
        credential: Option<&Credential>,
    ) -> Result<SpiralAbyss, ServiceError> {
        let server = GameServer::from_uid(uid)?;
        let schedule_type = if previous { 2 } else { 1 };
        let request = Self::request_for_uid(uid, "genshin/api/spiralAbyss")
            .query("server", server.code())
            .query("role_id", uid)
            .query("schedule_type", schedule_type);
        let data = self.dispatcher.dispatch_as(&request, credential).await?;
        converters::convert_abyss(data)
    }

    /// Real-time notes: current resin, expeditions, daily commissions.
    #[instrument(skip(self, credential))]
    pub async fn get_notes(
        &self,
        uid: u64,
        lang: Option<&str>,
        credential: Option<&Credential>,
    ) -> Result<DailyNotes, ServiceError> {
        let server = GameServer::from_uid(uid)?;
        let request = Self::request_for_uid(uid, "genshin/api/dailyNote")
            .query("server", server.code())
            .query("role_id", uid);
        let data = self
            .dispatcher
            .dispatch_as(&Self::with_lang(request, lang), credential)
            .await?;
        converters::convert_notes(data)
    }

    /// Event activity records. The schema shifts with every event, so the
    /// payload is returned as-is.
    #[instrument(skip(self, credential))]
    pub async fn get_activities(
        &self,
        uid: u64,
        lang: Option<&str>,
        credential: Option<&Credential>,
    ) -> Result<Value, ServiceError> {
        let server = GameServer::from_uid(uid)?;
        let request = Self::request_for_uid(uid, "genshin/api/activities")
            .query("server", server.code())
            .query("role_id", uid);
        self.dispatcher
            .dispatch_as(&Self::with_lang(request, lang), credential)
            .await
    }

    /// Basic card-game stats.
    #[instrument(skip(self, credential))]
    pub async fn get_tcg_basic(
        &self,
        uid: u64,
        lang: Option<&str>,
        credential: Option<&Credential>,
    ) -> Result<TcgStats, ServiceError> {
        let server = GameServer::from_uid(uid)?;
        let request = Self::request_for_uid(uid, "genshin/api/gcg/basicInfo")
            .query("server", server.code())
            .query("role_id", uid);
        let data = self
            .dispatcher
            .dispatch_as(&Self::with_lang(request, lang), credential)
            .await?;
        converters::convert_tcg_stats(data)
    }

    /// Game accounts bound to the authenticated cookies.
    #[instrument(skip(self, credential))]
    pub async fn get_game_accounts(
        &self,
        region: Region,
        credential: Option<&Credential>,
    ) -> Result<Vec<GameAccount>, ServiceError> {
        let request = ApiRequest::get(
            ApiFamily::GameRecord,
            region,
            "binding/api/getUserGameRolesByCookie",
        );
        let data = self.dispatcher.dispatch_as(&request, credential).await?;
        decode(data["list"].clone(), "game accounts")
    }
}
