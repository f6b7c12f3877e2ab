use std::sync::Arc;

use crate::auth::repo::{InMemoryUsers, UserStore};
use crate::config::AppConfig;
use crate::providers::repo::ProviderDirectory;

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub providers: Arc<ProviderDirectory>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        Ok(Self::from_parts(
            Arc::new(InMemoryUsers::default()),
            Arc::new(ProviderDirectory::default()),
            config,
        ))
    }

    pub fn from_parts(
        users: Arc<dyn UserStore>,
        providers: Arc<ProviderDirectory>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            users,
            providers,
            config,
        }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::config::{Environment, JwtConfig};

        let config = Arc::new(AppConfig {
            environment: Environment::Development,
            jwt: JwtConfig {
                secret: "test-secret".into(),
                issuer: "test".into(),
                audience: "test".into(),
                ttl_days: 7,
            },
        });
        Self::from_parts(
            Arc::new(InMemoryUsers::default()),
            Arc::new(ProviderDirectory::default()),
            config,
        )
    }
}
