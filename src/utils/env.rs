// src/utils/env.rs

use log::debug;

/// Loads environment variables from a .env file if one is present. The file
/// is optional; already-set variables are never overridden.
pub fn load_env() {
    match dotenv::dotenv() {
        Ok(path) => debug!("Loaded environment from {}", path.display()),
        Err(_) => debug!("No .env file found; using process environment"),
    }
}
