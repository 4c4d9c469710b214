// Core types and lookups for the BCRP statistics service

pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod matching;
pub mod period;
pub mod types;

pub use catalog::Catalog;
pub use client::BcrpClient;
pub use config::{BcrpConfig, MatchMode};
pub use error::{BcrpError, BcrpResult};
pub use types::*;
