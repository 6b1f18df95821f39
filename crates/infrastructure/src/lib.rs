//! Taskdeck Infrastructure - Concrete adapters
//!
//! Implementations of the application-layer ports: a reqwest-backed HTTP
//! transport, a tokio sleeper, the auth-service session store, and the
//! login-redirect expiry observer.

pub mod adapters;
pub mod auth;
pub mod navigation;

pub use adapters::reqwest_transport::ReqwestTransport;
pub use adapters::tokio_sleeper::TokioSleeper;
pub use auth::session_store::AuthServiceSessionStore;
pub use navigation::{LoginRedirect, login_redirect_url};
