pub mod analyzers;
pub mod config;
pub mod credentials;
pub mod error;
pub mod fetch;
pub mod infra;
pub mod output;
pub mod parser;
pub mod reading;
pub mod services;
pub mod store;
pub mod transfer;
