pub mod config;
pub mod error;
pub mod normalize;
pub mod queue;
pub mod schedule;
pub mod services;
pub mod utils;
pub mod web;

use std::{env, sync::Arc};
use schedule::TaskManager;
use once_cell::sync::Lazy;

pub struct AppContext {
    pub task_manager: Arc<TaskManager>,
    pub worker_id: String,
}

/// Build revision, injected by build.rs.
pub const VERSION: &str = env!("GIT_HASH");

const DEFAULT_LOG_DIR: &str = "./logs";

pub static LOG_DIR: Lazy<String> = Lazy::new(|| {
    match env::var("LOG_DIR") {
        Ok(path) => path,
        Err(_) => {
            dotenv::var("LOG_DIR").unwrap_or_else(|_| DEFAULT_LOG_DIR.to_string())
        }
    }
});

pub fn init_env() {
    dotenv::dotenv().ok();

    // make sure the log directory exists
    std::fs::create_dir_all(LOG_DIR.as_str()).unwrap_or_else(|e| {
        eprintln!("Failed to create log directory: {}", e);
    });
}
