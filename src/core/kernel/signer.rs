use crate::core::types::Region;
use md5::{Digest, Md5};
use rand::Rng;
use std::time::{SystemTime, UNIX_EPOCH};

// Protocol-compatibility constants. The digest algorithm and the salts are
// dictated by the remote service and must be reproduced byte-for-byte; none
// of this is an integrity mechanism.
const OS_DS_SALT: &str = "6cqshh5dhw73bzxn20oexa9k516chk7s";
const CN_DS_SALT: &str = "xV8v4Qu54lUKrEYFZkJhB8cuOh9Asafs";

const OS_APP_VERSION: &str = "1.5.0";
const OS_CLIENT_TYPE: &str = "4";
const CN_APP_VERSION: &str = "2.11.1";
const CN_CLIENT_TYPE: &str = "5";

/// Which signing scheme a request uses, selected by target region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignScheme {
    Overseas,
    Mainland,
}

impl From<Region> for SignScheme {
    fn from(region: Region) -> Self {
        match region {
            Region::Overseas => Self::Overseas,
            Region::Mainland => Self::Mainland,
        }
    }
}

/// Generates the `ds` authentication header and the `x-rpc-*` headers that
/// accompany it. Pure given time and nonce; consumes the system clock and
/// the thread RNG.
#[derive(Debug, Clone, Copy)]
pub struct DsSigner {
    scheme: SignScheme,
}

impl DsSigner {
    #[must_use]
    pub const fn new(scheme: SignScheme) -> Self {
        Self { scheme }
    }

    #[must_use]
    pub fn for_region(region: Region) -> Self {
        Self::new(region.into())
    }

    /// Produce the headers for one attempt. Called once per attempt: the
    /// signature embeds the time and a fresh nonce and must never be reused
    /// across a retry.
    #[must_use]
    pub fn headers(
        &self,
        body: Option<&str>,
        query: &[(String, String)],
    ) -> Vec<(String, String)> {
        let (ds, app_version, client_type) = match self.scheme {
            SignScheme::Overseas => (
                overseas_ds_at(OS_DS_SALT, unix_time(), &letter_nonce()),
                OS_APP_VERSION,
                OS_CLIENT_TYPE,
            ),
            SignScheme::Mainland => (
                mainland_ds_at(
                    CN_DS_SALT,
                    unix_time(),
                    rand::thread_rng().gen_range(100_001..=200_000),
                    body,
                    query,
                ),
                CN_APP_VERSION,
                CN_CLIENT_TYPE,
            ),
        };

        vec![
            ("ds".to_string(), ds),
            ("x-rpc-app_version".to_string(), app_version.to_string()),
            ("x-rpc-client_type".to_string(), client_type.to_string()),
        ]
    }
}

/// Overseas scheme: `hash(salt={salt}&t={t}&r={r})` with a 6-letter nonce,
/// rendered as `"{t},{r},{hash}"`.
pub fn overseas_ds_at(salt: &str, t: u64, r: &str) -> String {
    let hash = md5_hex(&format!("salt={}&t={}&r={}", salt, t, r));
    format!("{},{},{}", t, r, hash)
}

/// Mainland scheme: the hashed string additionally carries the serialized
/// body and the canonical query string.
pub fn mainland_ds_at(
    salt: &str,
    t: u64,
    r: u32,
    body: Option<&str>,
    query: &[(String, String)],
) -> String {
    let b = body.unwrap_or("");
    let q = canonical_query(query);
    let hash = md5_hex(&format!("salt={}&t={}&r={}&b={}&q={}", salt, t, r, b, q));
    format!("{},{},{}", t, r, hash)
}

/// Query parameters as `key=value` joined by `&`, sorted ascending by key.
pub fn canonical_query(query: &[(String, String)]) -> String {
    let mut pairs: Vec<&(String, String)> = query.iter().collect();
    pairs.sort_by(|a, b| a.0.cmp(&b.0));
    pairs
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&")
}

fn md5_hex(payload: &str) -> String {
    hex::encode(Md5::digest(payload.as_bytes()))
}

fn unix_time() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Six random ASCII letters.
fn letter_nonce() -> String {
    const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
    let mut rng = rand::thread_rng();
    (0..6)
        .map(|_| char::from(LETTERS[rng.gen_range(0..LETTERS.len())]))
        .collect()
}
