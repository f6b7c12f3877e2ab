use serde::Deserialize;

// Fallback secret for local development only. Startup refuses to fall back
// to it when APP_ENV=production.
const DEV_SECRET: &str = "localease-dev-secret-change-me";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_days: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub jwt: JwtConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let environment = match std::env::var("APP_ENV").as_deref() {
            Ok("production") => Environment::Production,
            _ => Environment::Development,
        };

        let secret = match std::env::var("JWT_SECRET") {
            Ok(s) if !s.trim().is_empty() => s,
            _ if environment == Environment::Production => {
                anyhow::bail!("JWT_SECRET must be set when APP_ENV=production")
            }
            _ => {
                tracing::warn!("JWT_SECRET not set, using built-in development secret");
                DEV_SECRET.to_string()
            }
        };

        let jwt = JwtConfig {
            secret,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "localease".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "localease-users".into()),
            ttl_days: std::env::var("JWT_TTL_DAYS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(7),
        };
        Ok(Self { environment, jwt })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn development_falls_back_to_dev_secret() {
        // Runs in-process, so only touch vars the other tests don't read.
        std::env::remove_var("JWT_SECRET");
        std::env::remove_var("APP_ENV");
        let config = AppConfig::from_env().expect("config should load");
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.jwt.secret, DEV_SECRET);
        assert_eq!(config.jwt.ttl_days, 7);
    }
}
