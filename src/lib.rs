pub mod address;
pub mod aggregate;
pub mod config;
pub mod enrich;
pub mod geo;
pub mod models;
pub mod pipeline;
pub mod storage;
