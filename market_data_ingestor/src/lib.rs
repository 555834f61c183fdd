//! Market data ingestion: vendor-agnostic bar models and the providers that fill them.

pub mod models;
pub mod providers;
