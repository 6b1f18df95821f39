//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the application core and external
//! systems. Each port is a trait that can be implemented by adapters in the
//! infrastructure layer, or by mocks in tests.

mod expiry;
mod session_store;
mod sleeper;
mod transport;

pub use expiry::{ExpiryObserver, NoopExpiryObserver};
pub use session_store::{SessionStore, SessionStoreError};
pub use sleeper::Sleeper;
pub use transport::{HttpTransport, TransportError};
