//! Studyhall Server - authoritative store for user-orderable collections
//!
//! # Module layout
//!
//! ```text
//! studyhall-server/src/
//! ├── core/          # config, state, server, startup errors
//! ├── auth/          # JWT validation, CurrentUser extractor
//! ├── storage/       # redb-backed scopes and items
//! ├── services/      # scope ownership, reorder reconciliation
//! ├── api/           # HTTP routes and handlers
//! └── utils/         # logging
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod services;
pub mod storage;
pub mod utils;

pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use services::{ScopeService, ServerReconciler};
pub use storage::{ItemStorage, StorageError};

// Re-export unified error types from shared
pub use shared::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

pub use utils::logger::init_logger_with_file;

// Security logging macro - supports tracing format specifiers
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// Load `.env`, create the working directories and install the logger
pub fn setup_environment(config: &Config) -> std::io::Result<()> {
    std::fs::create_dir_all(&config.work_dir)?;
    let log_dir = config.log_dir();
    std::fs::create_dir_all(&log_dir)?;

    init_logger_with_file(Some(&config.log_level), config.log_json, Some(&log_dir));
    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
   _____ __            __      __          ____
  / ___// /___  ______/ /_  __/ /_  ____ _/ / /
  \__ \/ __/ / / / __  / / / / __ \/ __ `/ / /
 ___/ / /_/ /_/ / /_/ / /_/ / / / / /_/ / / /
/____/\__/\__,_/\__,_/\__, /_/ /_/\__,_/_/_/
                     /____/
    "#
    );
}
