pub mod aggregator;
pub mod classify_service;
pub mod cleanup;
pub mod dispatcher;
pub mod error;
pub mod models;
pub mod selector;
