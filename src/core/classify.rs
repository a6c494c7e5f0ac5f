use crate::core::errors::ServiceError;
use crate::core::kernel::transport::Envelope;
use serde_json::Value;

/// Which error table a response is classified against.
///
/// The service reuses status codes across its API families with different
/// meanings, so classification is parameterized rather than shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiFamily {
    /// Cookie-authenticated game-record and event endpoints. Subject to a
    /// per-account daily quota, recovered by credential rotation.
    GameRecord,
    /// Authkey-authenticated wish-history endpoints. Single-credential, no
    /// rotation.
    GachaLog,
}

/// Outcome of classifying a decoded response envelope.
#[derive(Debug, Clone)]
pub enum Classification {
    Success(Value),
    AuthInvalid(String),
    AuthExpired,
    RateLimited(String),
    DataNotPublic,
    AccountNotFound(String),
    ServiceFault { code: i32, message: String },
}

// Exact (code, message) pairs; codes alone are ambiguous between families.
const RECORD_RATE_LIMITED: (i32, &str) = (10101, "Cannot get data for more than 30 accounts per day.");
const RECORD_NOT_LOGGED_IN: (i32, &str) = (10001, "Please login");
const RECORD_NOT_PUBLIC: (i32, &str) = (10102, "Data is not public for the user");
const RECORD_ACCOUNT_MISSING_CODE: i32 = 1009;
const GACHA_AUTHKEY_INVALID: (i32, &str) = (-100, "authkey error");
const GACHA_AUTHKEY_TIMEOUT: (i32, &str) = (-101, "authkey timeout");

impl ApiFamily {
    /// Map a decoded envelope to its outcome kind.
    #[must_use]
    pub fn classify(self, envelope: Envelope) -> Classification {
        if envelope.retcode == 0 {
            return Classification::Success(envelope.data.unwrap_or(Value::Null));
        }

        match self {
            Self::GameRecord => match (envelope.retcode, envelope.message.as_str()) {
                RECORD_RATE_LIMITED => Classification::RateLimited(envelope.message.clone()),
                RECORD_NOT_LOGGED_IN => Classification::AuthInvalid(envelope.message.clone()),
                RECORD_NOT_PUBLIC => Classification::DataNotPublic,
                // The account-missing message is localized, so match the code alone.
                (RECORD_ACCOUNT_MISSING_CODE, _) => {
                    Classification::AccountNotFound(envelope.message.clone())
                }
                _ => Classification::ServiceFault {
                    code: envelope.retcode,
                    message: envelope.message.clone(),
                },
            },
            Self::GachaLog => match (envelope.retcode, envelope.message.as_str()) {
                GACHA_AUTHKEY_INVALID => Classification::AuthInvalid(envelope.message.clone()),
                GACHA_AUTHKEY_TIMEOUT => Classification::AuthExpired,
                _ => Classification::ServiceFault {
                    code: envelope.retcode,
                    message: envelope.message.clone(),
                },
            },
        }
    }
}

impl Classification {
    /// Resolve into the caller-facing result: the payload on success, the
    /// matching terminal error otherwise.
    pub fn into_outcome(self) -> Result<Value, ServiceError> {
        match self {
            Self::Success(data) => Ok(data),
            Self::AuthInvalid(message) => Err(ServiceError::AuthInvalid(message)),
            Self::AuthExpired => Err(ServiceError::AuthExpired),
            Self::RateLimited(message) => Err(ServiceError::RateLimited(message)),
            Self::DataNotPublic => Err(ServiceError::DataNotPublic),
            Self::AccountNotFound(message) => Err(ServiceError::AccountNotFound(message)),
            Self::ServiceFault { code, message } => Err(ServiceError::Api { code, message }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(retcode: i32, message: &str) -> Envelope {
        Envelope {
            retcode,
            message: message.to_string(),
            data: None,
        }
    }

    #[test]
    fn test_success_with_payload() {
        let env = Envelope {
            retcode: 0,
            message: "OK".to_string(),
            data: Some(serde_json::json!({"list": []})),
        };
        match ApiFamily::GameRecord.classify(env) {
            Classification::Success(data) => assert_eq!(data["list"], serde_json::json!([])),
            other => panic!("expected success, got {:?}", other),
        }
    }

    #[test]
    fn test_record_rate_limit_pair() {
        let env = envelope(10101, "Cannot get data for more than 30 accounts per day.");
        assert!(matches!(
            ApiFamily::GameRecord.classify(env),
            Classification::RateLimited(_)
        ));
    }

    #[test]
    fn test_rate_limit_code_with_wrong_message_is_generic() {
        // Codes are reused by the service; the full pair must match.
        let env = envelope(10101, "something else entirely");
        assert!(matches!(
            ApiFamily::GameRecord.classify(env),
            Classification::ServiceFault { code: 10101, .. }
        ));
    }

    #[test]
    fn test_gacha_authkey_errors() {
        assert!(matches!(
            ApiFamily::GachaLog.classify(envelope(-100, "authkey error")),
            Classification::AuthInvalid(_)
        ));
        assert!(matches!(
            ApiFamily::GachaLog.classify(envelope(-101, "authkey timeout")),
            Classification::AuthExpired
        ));
    }

    #[test]
    fn test_families_do_not_share_tables() {
        // The gacha pair means nothing to the record family.
        let env = envelope(-100, "authkey error");
        assert!(matches!(
            ApiFamily::GameRecord.classify(env),
            Classification::ServiceFault { code: -100, .. }
        ));
    }

    #[test]
    fn test_unknown_code_is_service_fault() {
        let env = envelope(-502, "internal error");
        match ApiFamily::GameRecord.classify(env) {
            Classification::ServiceFault { code, message } => {
                assert_eq!(code, -502);
                assert_eq!(message, "internal error");
            }
            other => panic!("expected service fault, got {:?}", other),
        }
    }

    #[test]
    fn test_data_not_public() {
        let env = envelope(10102, "Data is not public for the user");
        assert!(matches!(
            ApiFamily::GameRecord.classify(env),
            Classification::DataNotPublic
        ));
    }
}
