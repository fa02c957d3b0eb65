pub mod aggregate;
pub mod config;
pub mod demo;
pub mod error;
pub mod feed;
pub mod fetch;
pub mod http_client;
pub mod persist;
pub mod record_store;
pub mod schema;
pub mod state;
