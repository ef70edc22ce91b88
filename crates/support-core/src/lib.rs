pub mod chat;
pub mod config;
pub mod llm;
pub mod logs;
pub mod models;
pub mod store_data;

mod config_env;
