//! Service settings
//!
//! Built once at start-up from defaults overridden by `APP__`-prefixed
//! environment variables, e.g. `APP__SERVER__PORT=8080` or
//! `APP__API__PREFIX=/v2`.

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

/// Top-level settings
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub api: ApiSettings,
    pub project: ProjectSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Comma separated list of allowed origins, `*` for any
    pub cors_origins: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiSettings {
    /// Path every resource router is nested under
    pub prefix: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectSettings {
    pub name: String,
    pub version: String,
    pub description: String,
}

impl Settings {
    /// Load settings from defaults and the environment
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .set_default("server.cors_origins", "*")?
            .set_default("api.prefix", "/api/v1")?
            .set_default("project.name", "Driving School API")?
            .set_default("project.version", env!("CARGO_PKG_VERSION"))?
            .set_default(
                "project.description",
                "Backend for managing a driving school",
            )?
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Address the listener binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Allowed CORS origins, empty when any origin is accepted
    pub fn cors_origins(&self) -> Vec<String> {
        self.server
            .cors_origins
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty() && s != "*")
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 4] = [
        "APP__SERVER__PORT",
        "APP__SERVER__CORS_ORIGINS",
        "APP__API__PREFIX",
        "APP__PROJECT__NAME",
    ];

    fn clear_env() {
        for var in VARS {
            unsafe {
                std::env::remove_var(var);
            }
        }
    }

    #[test]
    #[serial]
    fn test_settings_defaults() {
        clear_env();

        let settings = Settings::load().unwrap();
        assert_eq!(settings.server.port, 8000);
        assert_eq!(settings.api.prefix, "/api/v1");
        assert_eq!(settings.bind_address(), "0.0.0.0:8000");
        assert!(settings.cors_origins().is_empty());
    }

    #[test]
    #[serial]
    fn test_settings_from_env() {
        clear_env();
        unsafe {
            std::env::set_var("APP__SERVER__PORT", "9090");
            std::env::set_var(
                "APP__SERVER__CORS_ORIGINS",
                "http://localhost:3000, https://school.example",
            );
            std::env::set_var("APP__API__PREFIX", "/v2");
            std::env::set_var("APP__PROJECT__NAME", "Test School");
        }

        let settings = Settings::load().unwrap();
        assert_eq!(settings.server.port, 9090);
        assert_eq!(settings.api.prefix, "/v2");
        assert_eq!(settings.project.name, "Test School");
        assert_eq!(
            settings.cors_origins(),
            vec![
                "http://localhost:3000".to_string(),
                "https://school.example".to_string()
            ]
        );

        clear_env();
    }
}
