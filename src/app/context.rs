use std::path::PathBuf;
use std::sync::Arc;

use crate::api::{HttpApi, SocialApi};
use crate::app::error::{EbbError, Result};
use crate::config::Config;
use crate::store::sqlite::SqliteStore;

/// Everything a run needs, built once and passed explicitly to each job.
pub struct AppContext {
    pub store: Arc<SqliteStore>,
    pub config: Config,
    api: Option<Arc<dyn SocialApi>>,
}

impl AppContext {
    pub fn new(config: Config, db_path: Option<PathBuf>) -> Result<Self> {
        let db_path = match db_path.or_else(|| config.database.clone()) {
            Some(p) => p,
            None => Self::default_db_path()?,
        };

        let store = Arc::new(SqliteStore::new(&db_path)?);
        let api = Self::build_api(&config)?;

        Ok(Self { store, config, api })
    }

    pub fn in_memory(config: Config) -> Result<Self> {
        let store = Arc::new(SqliteStore::in_memory()?);
        let api = Self::build_api(&config)?;

        Ok(Self { store, config, api })
    }

    /// Swap in another API implementation.
    pub fn with_api(mut self, api: Arc<dyn SocialApi>) -> Self {
        self.api = Some(api);
        self
    }

    /// The remote API client; fails when no access token is configured.
    pub fn api(&self) -> Result<&dyn SocialApi> {
        self.api.as_deref().ok_or_else(|| {
            EbbError::Config("api.bearer_token is not set in the configuration file".into())
        })
    }

    fn build_api(config: &Config) -> Result<Option<Arc<dyn SocialApi>>> {
        match config.api.bearer_token.as_deref() {
            Some(token) if !token.trim().is_empty() => {
                let api: Arc<dyn SocialApi> = Arc::new(HttpApi::new(&config.api, token.trim())?);
                Ok(Some(api))
            }
            _ => Ok(None),
        }
    }

    fn default_db_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| EbbError::Config("Could not find data directory".into()))?;
        let ebb_dir = data_dir.join("ebb");
        std::fs::create_dir_all(&ebb_dir)?;
        Ok(ebb_dir.join("ebb.db"))
    }
}
