// src/lib.rs

//! tripkit: trip records, admin analytics and live activity listings

pub mod analytics;
pub mod error;
pub mod models;
#[cfg(feature = "server")]
pub mod server;
pub mod services;
pub mod storage;
pub mod utils;
