pub mod auth;
pub mod config;
pub mod constants;
pub mod domain;
pub mod error;
pub mod idempotency;
pub mod logging;
pub mod mock;
pub mod requester;
pub mod retry;
pub mod services;
pub mod storage;
pub mod transport;
pub mod types;
