/// Transport layer shared by every API surface.
///
/// The kernel contains only transport logic and generic interfaces: an HTTP
/// transport behind the [`Transport`] trait, the `ds` signature generator,
/// and the bounded retrier for connection-level faults. Business
/// classification and credential rotation live above it in the dispatcher.
///
/// # Architecture
///
/// - `transport`: [`Transport`] trait, the reqwest-backed production
///   implementation, and the decoded response [`Envelope`].
/// - `signer`: time- and nonce-based `ds` header generation for both
///   signing schemes.
/// - `retry`: [`with_retry`], a bounded re-invoke for transient faults only.
///
/// Everything is trait-based and injectable so the dispatcher can be tested
/// against a scripted transport.
pub mod retry;
pub mod signer;
pub mod transport;

pub use retry::with_retry;
pub use signer::{DsSigner, SignScheme};
pub use transport::{Envelope, HttpRequest, ReqwestTransport, Transport, TransportError};
