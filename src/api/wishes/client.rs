use crate::api::wishes::converters;
use crate::api::wishes::types::{BannerDetails, BannerType, GachaItem, Wish};
use crate::core::classify::ApiFamily;
use crate::core::dispatcher::{ApiDispatcher, ApiRequest};
use crate::core::errors::ServiceError;
use crate::core::kernel::transport::{HttpRequest, ReqwestTransport, Transport};
use crate::core::types::Region;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::NaiveDateTime;
use regex::Regex;
use reqwest::Method;
use secrecy::{ExposeSecret, Secret};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock, PoisonError, RwLock};
use tracing::instrument;
use url::Url;

/// Static gacha resources live on a separate host with no response envelope.
const WEBSTATIC_URL: &str = "https://webstatic-sea.hoyoverse.com/hk4e/gacha_info/os_asia/";

const PAGE_SIZE: usize = 20;

/// Banners checked when looking up the owner of an authkey, ordered from
/// most to least pulled on.
const UID_LOOKUP_BANNERS: [u32; 4] = [301, 200, 302, 100];

fn authkey_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"https://.+?authkey=([^&#]+)").expect("static regex"))
}

/// Pull an authkey out of a pasted share URL or any text containing one.
/// Returns the last one found, percent-decoded.
#[must_use]
pub fn extract_authkey(text: &str) -> Option<String> {
    let captures: Vec<_> = authkey_regex().captures_iter(text).collect();
    let raw = captures.last()?.get(1)?.as_str();
    match urlencoding::decode(raw) {
        Ok(decoded) => Some(decoded.into_owned()),
        Err(_) => None,
    }
}

/// Client for the wish-history endpoints.
///
/// These authenticate with a signed capability token (the authkey) carried
/// in the query string instead of cookies; there is a single credential, so
/// every call is a single-attempt dispatch with no rotation.
pub struct GachaClient<T: Transport = ReqwestTransport> {
    dispatcher: Arc<ApiDispatcher<T>>,
    region: Region,
    authkey: RwLock<Option<Secret<String>>>,
    banner_types: Mutex<HashMap<String, Vec<BannerType>>>,
}

impl<T: Transport> GachaClient<T> {
    pub fn new(dispatcher: Arc<ApiDispatcher<T>>) -> Self {
        Self {
            dispatcher,
            region: Region::Overseas,
            authkey: RwLock::new(None),
            banner_types: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn with_region(mut self, region: Region) -> Self {
        self.region = region;
        self
    }

    /// Set the capability token used when no per-call override is given.
    pub fn set_authkey(&self, authkey: impl Into<String>) {
        let mut slot = self
            .authkey
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *slot = Some(Secret::new(authkey.into()));
    }

    /// Set the capability token from a share URL or text containing one.
    pub fn set_authkey_from_url(&self, text: &str) -> Result<(), ServiceError> {
        let authkey = extract_authkey(text).ok_or_else(|| {
            ServiceError::MissingAuthKey("no authkey found in the given text".to_string())
        })?;
        self.set_authkey(authkey);
        Ok(())
    }

    fn current_authkey(&self, authkey: Option<&str>) -> Result<String, ServiceError> {
        if let Some(key) = authkey {
            return Ok(key.to_string());
        }
        let slot = self.authkey.read().unwrap_or_else(PoisonError::into_inner);
        slot.as_ref()
            .map(|secret| secret.expose_secret().clone())
            .ok_or_else(|| {
                ServiceError::MissingAuthKey(
                    "set one with set_authkey or pass one per call".to_string(),
                )
            })
    }

    fn short_lang_code(&self, lang: Option<&str>) -> String {
        let lang = lang.unwrap_or(&self.dispatcher.config().language);
        if lang.contains("zh") {
            lang.to_string()
        } else {
            lang.split('-').next().unwrap_or(lang).to_string()
        }
    }

    async fn fetch(
        &self,
        endpoint: &str,
        authkey: Option<&str>,
        params: Vec<(String, String)>,
    ) -> Result<Value, ServiceError> {
        let key = self.current_authkey(authkey)?;
        let mut request = ApiRequest::get(ApiFamily::GachaLog, self.region, endpoint)
            .query("authkey_ver", "1")
            .query("sign_type", "2")
            .query("authkey", key);
        for (name, value) in params {
            request = request.query(name, value);
        }
        self.dispatcher.dispatch(&request).await
    }

    /// Ids and names of all current banners.
    #[instrument(skip(self, authkey))]
    pub async fn get_banner_types(
        &self,
        authkey: Option<&str>,
        lang: Option<&str>,
    ) -> Result<Vec<BannerType>, ServiceError> {
        let lang = self.short_lang_code(lang);
        {
            let cache = self
                .banner_types
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if let Some(banners) = cache.get(&lang) {
                return Ok(banners.clone());
            }
        }

        let data = self
            .fetch(
                "getConfigList",
                authkey,
                vec![("lang".to_string(), lang.clone())],
            )
            .await?;
        let banners = converters::convert_banner_types(data)?;

        let mut cache = self
            .banner_types
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        cache.insert(lang, banners.clone());
        Ok(banners)
    }

    /// Wish history, newest first.
    ///
    /// With a banner type, returns pulls from that banner only; otherwise
    /// pulls from all banners merged by pull time. `size` bounds the total
    /// returned amount; `end_id` starts the history right after a known pull
    /// id instead of the most recent one.
    #[instrument(skip(self, authkey))]
    pub async fn get_wish_history(
        &self,
        banner_type: Option<u32>,
        size: Option<usize>,
        end_id: u64,
        authkey: Option<&str>,
        lang: Option<&str>,
    ) -> Result<Vec<Wish>, ServiceError> {
        if size == Some(0) {
            return Ok(Vec::new());
        }

        let banners = self.get_banner_types(authkey, lang).await?;
        let short_lang = self.short_lang_code(lang);

        let selected: Vec<&BannerType> = match banner_type {
            Some(wanted) => {
                let banner = banners
                    .iter()
                    .find(|banner| banner.banner_type == wanted)
                    .ok_or_else(|| {
                        ServiceError::InvalidParameters(format!(
                            "unknown banner type {}",
                            wanted
                        ))
                    })?;
                vec![banner]
            }
            None => banners.iter().collect(),
        };

        let mut pulls = Vec::new();
        for banner in selected {
            pulls.extend(
                self.banner_history(banner, size, end_id, authkey, &short_lang)
                    .await?,
            );
        }

        if banner_type.is_none() {
            // Histories of individual banners are each newest-first already;
            // merge them by pull time.
            pulls.sort_by(|a, b| parse_pull_time(&b.time).cmp(&parse_pull_time(&a.time)));
        }
        if let Some(size) = size {
            pulls.truncate(size);
        }
        Ok(pulls)
    }

    async fn banner_history(
        &self,
        banner: &BannerType,
        size: Option<usize>,
        mut end_id: u64,
        authkey: Option<&str>,
        lang: &str,
    ) -> Result<Vec<Wish>, ServiceError> {
        let mut remaining = size.unwrap_or(usize::MAX);
        let mut pulls = Vec::new();

        loop {
            let request_size = remaining.min(PAGE_SIZE);
            let data = self
                .fetch(
                    "getGachaLog",
                    authkey,
                    vec![
                        ("gacha_type".to_string(), banner.banner_type.to_string()),
                        ("size".to_string(), request_size.to_string()),
                        ("end_id".to_string(), end_id.to_string()),
                        ("lang".to_string(), lang.to_string()),
                    ],
                )
                .await?;
            let page = converters::convert_wishes(data["list"].clone(), Some(&banner.name))?;
            let page_len = page.len();
            if let Some(last) = page.last() {
                end_id = last.id;
            }
            pulls.extend(page);

            remaining = remaining.saturating_sub(PAGE_SIZE);
            if page_len < request_size || remaining == 0 {
                break;
            }
        }
        Ok(pulls)
    }

    /// Uid of the authkey's owner, read off their most recent pull.
    #[instrument(skip(self, authkey))]
    pub async fn get_uid_from_authkey(
        &self,
        authkey: Option<&str>,
    ) -> Result<u64, ServiceError> {
        for banner_type in UID_LOOKUP_BANNERS {
            let pulls = self
                .get_wish_history(Some(banner_type), Some(1), 0, authkey, None)
                .await?;
            if let Some(pull) = pulls.first() {
                return Ok(pull.uid);
            }
        }
        Err(ServiceError::AccountNotFound(
            "this user has never made a wish".to_string(),
        ))
    }

    /// Check whether an authkey is well-formed and accepted by the service.
    ///
    /// With a previous authkey, also checks that the new one belongs to the
    /// same account (the key prefix encodes the owner).
    #[instrument(skip(self, authkey, previous_authkey))]
    pub async fn validate_authkey(
        &self,
        authkey: &str,
        previous_authkey: Option<&str>,
    ) -> Result<bool, ServiceError> {
        if authkey.len() != 1024 || BASE64.decode(authkey).is_err() {
            return Ok(false);
        }
        if let Some(previous) = previous_authkey {
            // The first 682 characters encode the owner.
            match (authkey.get(..682), previous.get(..682)) {
                (Some(a), Some(b)) if a == b => {}
                _ => return Ok(false),
            }
        }

        match self.fetch("getConfigList", Some(authkey), Vec::new()).await {
            Ok(_) => Ok(true),
            Err(ServiceError::AuthInvalid(_) | ServiceError::AuthExpired) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn fetch_static(&self, path: &str) -> Result<Value, ServiceError> {
        let url = Url::parse(&format!("{}{}", WEBSTATIC_URL, path)).map_err(|e| {
            ServiceError::InvalidParameters(format!("invalid static resource path: {}", e))
        })?;
        let request = HttpRequest::new(Method::GET, url);
        Ok(self.dispatcher.transport().send(&request).await?)
    }

    /// The characters and weapons obtainable from the gacha.
    #[instrument(skip(self))]
    pub async fn get_gacha_items(
        &self,
        lang: Option<&str>,
    ) -> Result<Vec<GachaItem>, ServiceError> {
        let lang = lang.unwrap_or(&self.dispatcher.config().language);
        let data = self.fetch_static(&format!("items/{}.json", lang)).await?;
        converters::convert_gacha_items(data)
    }

    /// Details of a specific banner rotation, by banner id.
    #[instrument(skip(self))]
    pub async fn get_banner_details(
        &self,
        banner_id: &str,
        lang: Option<&str>,
    ) -> Result<BannerDetails, ServiceError> {
        let lang = lang.unwrap_or(&self.dispatcher.config().language);
        let data = self
            .fetch_static(&format!("{}/{}.json", banner_id, lang))
            .await?;
        converters::convert_banner_details(data)
    }
}

fn parse_pull_time(time: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(time, "%Y-%m-%d %H:%M:%S").ok()
}

impl<T: Transport> std::fmt::Debug for GachaClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GachaClient")
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}
