//! Database connection pool using the lifecycle pattern.

use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};
use sqlx::MySqlPool;

use crate::lifecycle::{BoxError, Connector, Lifecycle};
use crate::settings::{ConfigurationError, DatabaseSettings, SettingsSource};

const MAX_CONNECTIONS: u32 = 5;

/// The lifecycle-managed MySQL pool.
pub type Database = Lifecycle<MySqlConnector>;

/// Build the database singleton. Nothing connects until first use.
pub fn connection_pool(source: SettingsSource) -> Database {
    Lifecycle::new(MySqlConnector::new(source))
}

/// Opens and closes [`MySqlPool`]s.
#[derive(Debug, Clone)]
pub struct MySqlConnector {
    source: SettingsSource,
}

impl MySqlConnector {
    pub fn new(source: SettingsSource) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Connector for MySqlConnector {
    type Config = DatabaseSettings;
    type Resource = MySqlPool;

    fn name(&self) -> &'static str {
        "database connection pool"
    }

    fn configure(&self) -> Result<DatabaseSettings, ConfigurationError> {
        self.source.snapshot()?.database()
    }

    async fn connect(&self, config: DatabaseSettings) -> Result<MySqlPool, BoxError> {
        let options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.database);

        let pool = MySqlPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_with(options)
            .await?;

        Ok(pool)
    }

    async fn release(&self, pool: &MySqlPool) -> Result<(), BoxError> {
        pool.close().await;
        Ok(())
    }
}
