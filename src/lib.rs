pub mod config;
pub mod cost;
pub mod data;
pub mod error;
pub mod factory;
pub mod helpers;
pub mod initializer;
pub mod logger;
pub mod optimizer;
pub mod param;
