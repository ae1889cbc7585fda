pub mod alert;
pub mod config;
pub mod db;
pub mod engine;
pub mod history;
pub mod sinks;
pub mod source;
pub mod stats;

pub mod error;
pub mod failure;
pub mod time;
