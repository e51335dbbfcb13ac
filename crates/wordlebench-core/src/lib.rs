pub mod config;
pub mod engine;
pub mod errors;
pub mod evaluator;
pub mod model;
pub mod providers;
pub mod report;
pub mod storage;
