use crate::core::kernel::transport::TransportError;
use thiserror::Error;

/// Errors surfaced by the client.
///
/// Business-classification outcomes propagate to the caller verbatim; only
/// transient transport faults are absorbed below the dispatcher, and only
/// `RateLimited` is ever recovered by credential rotation.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("login credentials have not been provided")]
    NotAuthenticated,

    #[error("authentication was rejected: {0}")]
    AuthInvalid(String),

    #[error("the capability token has timed out and must be refreshed")]
    AuthExpired,

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("{}", quota_exhausted_message(.accounts))]
    AllCredentialsRateLimited { accounts: usize },

    #[error("data is not public for this user")]
    DataNotPublic,

    #[error("account not found: {0}")]
    AccountNotFound(String),

    #[error("no capability token is set: {0}")]
    MissingAuthKey(String),

    #[error("service error {code}: {message}")]
    Api { code: i32, message: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("transport fault: {0}")]
    Transport(TransportError),

    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("configuration error: {0}")]
    Config(#[from] crate::core::config::ConfigError),
}

impl From<TransportError> for ServiceError {
    fn from(fault: TransportError) -> Self {
        match fault {
            // A body that fails to decode indicates a protocol mismatch, not
            // a transient condition.
            TransportError::Decode(message) => Self::MalformedResponse(message),
            other => Self::Transport(other),
        }
    }
}

fn quota_exhausted_message(accounts: &usize) -> String {
    if *accounts == 1 {
        "cannot get data for more than 30 accounts per day with a single credential".to_string()
    } else {
        format!(
            "all {} credentials have hit their request limit of 30 accounts per day",
            accounts
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exhaustion_message_distinguishes_pool_sizes() {
        let single = ServiceError::AllCredentialsRateLimited { accounts: 1 };
        let multi = ServiceError::AllCredentialsRateLimited { accounts: 3 };
        assert!(single.to_string().contains("single credential"));
        assert!(multi.to_string().contains("all 3 credentials"));
        assert_ne!(single.to_string(), multi.to_string());
    }

    #[test]
    fn test_decode_fault_becomes_malformed_response() {
        let err: ServiceError = TransportError::Decode("bad json".to_string()).into();
        assert!(matches!(err, ServiceError::MalformedResponse(_)));
    }
}
