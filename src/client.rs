use crate::api::daily::DailyClient;
use crate::api::record::RecordClient;
use crate::api::wishes::GachaClient;
use crate::core::config::ClientConfig;
use crate::core::dispatcher::ApiDispatcher;
use crate::core::errors::ServiceError;
use crate::core::kernel::transport::{ReqwestTransport, Transport};
use crate::core::pool::CredentialPool;
use crate::core::types::Credential;
use std::sync::Arc;

/// Entry point tying the API surfaces to one shared dispatcher and
/// credential pool.
///
/// ```rust,no_run
/// use hoyostats::{ClientConfig, Credential, HoyolabClient};
///
/// # async fn example() -> Result<(), hoyostats::ServiceError> {
/// let client = HoyolabClient::new(ClientConfig::new())?;
/// client.set_cookies(vec![
///     Credential::from_login_tokens("119480035", "cnF7TiZqHAAvYqgCBoSPx5EjwezOh1ZHoqSHf7dT"),
///     Credential::parse("ltuid=9160516; ltoken=v5ZHg4TAKH1UEyFT1CzBmLyegJ4bwhn07X8noCcO")?,
/// ]);
///
/// let stats = client.record().get_user_stats(710785423, None, None).await?;
/// println!("{} has {} achievements", stats.info.nick, stats.stats.achievements);
/// # Ok(())
/// # }
/// ```
pub struct HoyolabClient<T: Transport = ReqwestTransport> {
    dispatcher: Arc<ApiDispatcher<T>>,
    record: RecordClient<T>,
    wishes: GachaClient<T>,
    daily: DailyClient<T>,
}

impl HoyolabClient<ReqwestTransport> {
    /// Client with the production transport and an empty credential pool.
    pub fn new(config: ClientConfig) -> Result<Self, ServiceError> {
        Ok(Self::from_dispatcher(Arc::new(ApiDispatcher::new(config)?)))
    }
}

impl<T: Transport> HoyolabClient<T> {
    /// Build the API surfaces around an existing dispatcher.
    pub fn from_dispatcher(dispatcher: Arc<ApiDispatcher<T>>) -> Self {
        Self {
            record: RecordClient::new(Arc::clone(&dispatcher)),
            wishes: GachaClient::new(Arc::clone(&dispatcher)),
            daily: DailyClient::new(Arc::clone(&dispatcher)),
            dispatcher,
        }
    }

    /// Replace the credential pool contents. Multiple credentials are so far
    /// the only way around the per-account daily quota.
    pub fn set_cookies(&self, credentials: impl IntoIterator<Item = Credential>) {
        self.pool().reset(credentials);
    }

    /// Add one credential to the back of the pool.
    pub fn add_cookie(&self, credential: Credential) {
        self.pool().append(credential);
    }

    #[must_use]
    pub fn pool(&self) -> &CredentialPool {
        self.dispatcher.pool()
    }

    #[must_use]
    pub fn dispatcher(&self) -> &ApiDispatcher<T> {
        &self.dispatcher
    }

    /// Game-record endpoints: stats, characters, abyss, notes.
    #[must_use]
    pub fn record(&self) -> &RecordClient<T> {
        &self.record
    }

    /// Wish-history endpoints, authenticated by authkey.
    #[must_use]
    pub fn wishes(&self) -> &GachaClient<T> {
        &self.wishes
    }

    /// Daily check-in reward endpoints.
    #[must_use]
    pub fn daily(&self) -> &DailyClient<T> {
        &self.daily
    }
}
