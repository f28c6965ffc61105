pub mod app;
pub mod citation;
pub mod config;
pub mod domain;
pub mod enricher;
pub mod error;
pub mod output;
pub mod reconcile;
pub mod server;
pub mod store;
pub mod uploader;
