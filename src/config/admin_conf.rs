use std::env;

use crate::config::ConfigError;

/// Shared-secret configuration for the admin endpoints.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    pub password: String,
}

impl AdminConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let password = env::var("ADMIN_PASSWORD")
            .map_err(|_| ConfigError::EnvVarNotFound("ADMIN_PASSWORD".to_string()))?;
        let config = AdminConfig { password };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.password.is_empty() {
            return Err(ConfigError::ValidationError(
                "Admin password cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}
