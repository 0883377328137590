// Common library for the Tweetmill order engine

pub mod config;
pub mod conflict;
pub mod errors;
pub mod models;
pub mod normalize;
pub mod quota;
pub mod service;
pub mod store;
pub mod telemetry;
pub mod twitter;
