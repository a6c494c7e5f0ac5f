pub mod api;
pub mod client;
pub mod core;

pub use crate::core::classify::{ApiFamily, Classification};
pub use crate::core::config::{ClientConfig, ConfigError};
pub use crate::core::dispatcher::{ApiDispatcher, ApiRequest};
pub use crate::core::errors::ServiceError;
pub use crate::core::kernel::transport::{Envelope, HttpRequest, Transport, TransportError};
pub use crate::core::pool::CredentialPool;
pub use crate::core::types::{Credential, GameServer, Region};
pub use client::HoyolabClient;
