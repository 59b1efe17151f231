use crate::config::AppConfig;
use crate::users::memory::MemoryUserStore;
use crate::users::repo::{PgUserStore, UserStore};
use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn UserStore>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let store = match &config.database_url {
            Some(url) => {
                let db = PgPoolOptions::new()
                    .max_connections(config.max_connections)
                    .connect(url)
                    .await
                    .context("connect to database")?;
                sqlx::migrate!("./migrations")
                    .run(&db)
                    .await
                    .context("run migrations")?;
                info!("using postgres user store");
                Arc::new(PgUserStore::new(db)) as Arc<dyn UserStore>
            }
            None => {
                warn!("DATABASE_URL not set; users are kept in memory");
                Arc::new(MemoryUserStore::new()) as Arc<dyn UserStore>
            }
        };

        Ok(Self { store, config })
    }

    pub fn from_parts(store: Arc<dyn UserStore>, config: Arc<AppConfig>) -> Self {
        Self { store, config }
    }

    pub fn fake() -> Self {
        Self::from_parts(
            Arc::new(MemoryUserStore::new()),
            Arc::new(AppConfig::default()),
        )
    }
}
