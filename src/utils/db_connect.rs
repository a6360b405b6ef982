// src/utils/db_connect.rs - Scoped PostgreSQL store acquisition
//
// The store is opened per logical operation and released when the client
// drops, on every exit path. There is no process-wide pool or ambient
// connection state.

use std::time::Duration;

use anyhow::{Context, Result};
use log::{info, warn};
use tokio_postgres::{Client, Config, NoTls};

/// Connection settings for the match store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    config: Config,
}

impl StoreConfig {
    /// Reads PostgreSQL settings from environment variables, with the usual
    /// local-development defaults.
    pub fn from_env() -> Self {
        let host = std::env::var("POSTGRES_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = std::env::var("POSTGRES_PORT")
            .unwrap_or_else(|_| "5432".to_string())
            .parse::<u16>()
            .unwrap_or(5432);
        let dbname = std::env::var("POSTGRES_DB").unwrap_or_else(|_| "gazette".to_string());
        let user = std::env::var("POSTGRES_USER").unwrap_or_else(|_| "postgres".to_string());
        let password = std::env::var("POSTGRES_PASSWORD").unwrap_or_default();

        info!(
            "Store config: Host={}, Port={}, DB={}, User={}",
            host, port, dbname, user
        );

        let mut config = Config::new();
        config
            .host(&host)
            .port(port)
            .dbname(&dbname)
            .user(&user)
            .password(&password);
        config.application_name("gazette_recon");
        config.connect_timeout(Duration::from_secs(10));
        Self { config }
    }

    pub fn pg_config(&self) -> &Config {
        &self.config
    }
}

/// Opens a store handle for one logical operation. The connection driver is
/// detached onto the runtime and winds down when the returned client drops.
/// Failure here is the StoreUnavailable case: fatal for the call, surfaced
/// to the caller.
pub async fn connect_store(config: &StoreConfig) -> Result<Client> {
    let (client, connection) = config
        .pg_config()
        .connect(NoTls)
        .await
        .context("Store unavailable: failed to connect to PostgreSQL")?;

    tokio::spawn(async move {
        if let Err(e) = connection.await {
            warn!("Store connection task ended with error: {}", e);
        }
    });

    Ok(client)
}
