use crate::core::errors::ServiceError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which of the two parallel backend deployments a call targets.
///
/// The region decides the base URL, the signing scheme and salt, and the
/// required `x-rpc-*` headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Overseas,
    Mainland,
}

impl Region {
    /// Recognize the region from a game uid.
    ///
    /// Mainland uids start with 1, 2 or 5; everything else is overseas.
    #[must_use]
    pub fn from_uid(uid: u64) -> Self {
        match uid.to_string().as_bytes()[0] {
            b'1' | b'2' | b'5' => Self::Mainland,
            _ => Self::Overseas,
        }
    }

    /// Base URL of the cookie-authenticated API for this region.
    #[must_use]
    pub const fn takumi_url(self) -> &'static str {
        match self {
            Self::Overseas => "https://api-os-takumi.mihoyo.com/",
            Self::Mainland => "https://api-takumi.mihoyo.com/",
        }
    }

    /// Base URL of the game-record endpoints for this region.
    #[must_use]
    pub const fn game_record_url(self) -> &'static str {
        match self {
            Self::Overseas => "https://bbs-api-os.hoyoverse.com/game_record/",
            Self::Mainland => "https://api-takumi.mihoyo.com/game_record/app/",
        }
    }

    /// Base URL of the wish-history endpoints for this region.
    #[must_use]
    pub const fn gacha_info_url(self) -> &'static str {
        match self {
            Self::Overseas => "https://hk4e-api-os.hoyoverse.com/event/gacha_info/api/",
            Self::Mainland => "https://hk4e-api.mihoyo.com/event/gacha_info/api/",
        }
    }
}

/// A game server shard, recognizable from the leading digit of a uid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameServer {
    CnGf01,
    CnQd01,
    OsUsa,
    OsEuro,
    OsAsia,
    OsCht,
}

impl GameServer {
    /// Recognize which server a uid belongs to.
    pub fn from_uid(uid: u64) -> Result<Self, ServiceError> {
        let server = match uid.to_string().as_bytes()[0] {
            b'1' | b'2' => Self::CnGf01,
            b'5' => Self::CnQd01,
            b'6' => Self::OsUsa,
            b'7' => Self::OsEuro,
            b'8' => Self::OsAsia,
            b'9' => Self::OsCht,
            _ => {
                return Err(ServiceError::AccountNotFound(format!(
                    "uid {} isn't associated with any server",
                    uid
                )))
            }
        };
        Ok(server)
    }

    /// The server code the API expects in query parameters.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::CnGf01 => "cn_gf01",
            Self::CnQd01 => "cn_qd01",
            Self::OsUsa => "os_usa",
            Self::OsEuro => "os_euro",
            Self::OsAsia => "os_asia",
            Self::OsCht => "os_cht",
        }
    }
}

impl fmt::Display for GameServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One account's session cookies: an ordered set of named string pairs.
///
/// Immutable once created; the pool replaces entries wholesale rather than
/// mutating them. Identity is the full set of pairs.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pairs: Vec<(String, String)>,
}

impl Credential {
    #[must_use]
    pub fn new(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }

    /// Session-token login, the usual pair found in browser cookies.
    #[must_use]
    pub fn from_login_tokens(ltuid: impl Into<String>, ltoken: impl Into<String>) -> Self {
        Self::new(vec![
            ("ltuid".to_string(), ltuid.into()),
            ("ltoken".to_string(), ltoken.into()),
        ])
    }

    /// Parse a browser-style cookie header like `"ltuid=...; ltoken=..."`.
    pub fn parse(cookie: &str) -> Result<Self, ServiceError> {
        let mut pairs = Vec::new();
        for item in cookie.split(';') {
            let item = item.trim();
            if item.is_empty() {
                continue;
            }
            let (name, value) = item.split_once('=').ok_or_else(|| {
                ServiceError::InvalidParameters(format!(
                    "cookie item {:?} is not a name=value pair",
                    item
                ))
            })?;
            pairs.push((name.trim().to_string(), value.trim().to_string()));
        }
        if pairs.is_empty() {
            return Err(ServiceError::InvalidParameters(
                "cookie string contains no pairs".to_string(),
            ));
        }
        Ok(Self::new(pairs))
    }

    #[must_use]
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Serialize into a `Cookie` header value.
    #[must_use]
    pub fn cookie_header(&self) -> String {
        self.pairs
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

// Cookie values are session secrets; keep them out of logs.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.pairs.iter().map(|(name, _)| name.as_str()).collect();
        f.debug_struct("Credential").field("names", &names).finish()
    }
}
