pub mod daily;
pub mod record;
pub mod wishes;

use crate::core::errors::ServiceError;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Decode part of a payload into a typed shape, mapping failures to
/// `MalformedResponse` with a hint about which payload broke.
pub(crate) fn decode<T: DeserializeOwned>(value: Value, what: &str) -> Result<T, ServiceError> {
    serde_json::from_value(value)
        .map_err(|e| ServiceError::MalformedResponse(format!("unexpected {} payload: {}", what, e)))
}

pub(crate) mod de {
    //! Deserialize helpers for fields the service sends as strings.

    use serde::{Deserialize, Deserializer};
    use std::fmt::Display;
    use std::str::FromStr;

    pub fn from_string<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: FromStr,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}
