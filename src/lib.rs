pub mod config;
pub mod constants;
pub mod error;
pub mod feed;
pub mod logging;
pub mod pipeline;
pub mod publish;
pub mod types;
