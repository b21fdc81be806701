use std::sync::Arc;

use tracing::{info, warn};

use crate::auth::memory_repo::MemoryUserStore;
use crate::auth::password::{self, PasswordHasher};
use crate::auth::repo::{PgUserStore, UserStore};
use crate::config::AppConfig;
use crate::db;

/// Handles shared by every request. Built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn UserStore>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let config = Arc::new(config);

        let store = match &config.database_url {
            Some(url) => {
                let pool = db::connect(url, config.database_max_connections).await?;
                db::migrate(&pool).await?;
                info!("using postgres user store");
                Arc::new(PgUserStore::new(pool)) as Arc<dyn UserStore>
            }
            None => {
                warn!("DATABASE_URL not set; users are kept in memory and lost on restart");
                Arc::new(MemoryUserStore::new()) as Arc<dyn UserStore>
            }
        };

        let hasher = password::from_config(&config.hash);
        info!(algorithm = ?config.hash.algorithm, cost = config.hash.cost, "password hasher ready");

        Ok(Self::from_parts(store, hasher, config))
    }

    pub fn from_parts(
        store: Arc<dyn UserStore>,
        hasher: Arc<dyn PasswordHasher>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            store,
            hasher,
            config,
        }
    }

    /// In-memory state with a cheap bcrypt cost, for tests.
    #[cfg(test)]
    pub fn fake() -> Self {
        Self::fake_with_store(Arc::new(MemoryUserStore::new()))
    }

    #[cfg(test)]
    pub fn fake_with_store(store: Arc<dyn UserStore>) -> Self {
        use crate::auth::password::BcryptHasher;
        use crate::config::{HashAlgorithm, HashConfig};

        let config = Arc::new(AppConfig {
            host: "127.0.0.1".into(),
            port: 0,
            database_url: None,
            database_max_connections: 1,
            hash: HashConfig {
                algorithm: HashAlgorithm::Bcrypt,
                cost: 4,
            },
        });
        Self::from_parts(store, Arc::new(BcryptHasher { cost: 4 }), config)
    }
}
