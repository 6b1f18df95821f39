//! Auth-service adapters.

pub mod session_store;
