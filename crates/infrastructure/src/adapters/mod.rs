//! Adapter implementations of the application ports.

pub mod reqwest_transport;
pub mod tokio_sleeper;
