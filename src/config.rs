use std::env;
use anyhow::{bail, Context, Result};

/// Connection settings for the Spanner backend
#[derive(Debug, Clone, PartialEq)]
pub struct SpannerConfig {
    pub emulator_host: Option<String>,
    pub project: String,
    pub instance: String,
    pub database: String,
}

impl SpannerConfig {
    pub fn database_path(&self) -> String {
        format!(
            "projects/{}/instances/{}/databases/{}",
            self.project, self.instance, self.database
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StoreBackend {
    Memory,
    Spanner(SpannerConfig),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub store_backend: StoreBackend,
    pub seed_file: Option<String>,
    pub service_port: u16,
    pub service_host: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let store_backend = match env::var("STORE_BACKEND")
            .unwrap_or_else(|_| "memory".to_string())
            .as_str()
        {
            "memory" => StoreBackend::Memory,
            "spanner" => StoreBackend::Spanner(spanner_from_env()?),
            other => bail!(
                "STORE_BACKEND must be one of: memory, spanner, got '{}'",
                other
            ),
        };

        let seed_file = env::var("SEED_FILE").ok().filter(|path| !path.is_empty());

        let service_port = env::var("SERVICE_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .context("SERVICE_PORT must be a valid port number (0-65535)")?;

        let service_host = env::var("SERVICE_HOST")
            .unwrap_or_else(|_| "0.0.0.0".to_string());

        Ok(Config {
            store_backend,
            seed_file,
            service_port,
            service_host,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.service_host, self.service_port)
    }

    pub fn log_startup(&self) {
        tracing::info!("Configuration loaded:");
        match &self.store_backend {
            StoreBackend::Memory => tracing::info!("  Store backend: memory"),
            StoreBackend::Spanner(spanner) => {
                tracing::info!("  Store backend: spanner");
                tracing::info!("  Spanner emulator: {}",
                    spanner.emulator_host.as_deref().unwrap_or("disabled (using production)"));
                tracing::info!("  Spanner project: {}", spanner.project);
                tracing::info!("  Spanner instance: {}", spanner.instance);
                tracing::info!("  Spanner database: {}", spanner.database);
            }
        }
        tracing::info!("  Seed file: {}", self.seed_file.as_deref().unwrap_or("none"));
        tracing::info!("  Service listening on: {}", self.bind_address());
    }
}

fn spanner_from_env() -> Result<SpannerConfig> {
    let emulator_host = env::var("SPANNER_EMULATOR_HOST").ok();

    let project = env::var("SPANNER_PROJECT")
        .context("SPANNER_PROJECT environment variable is required")?;

    let instance = env::var("SPANNER_INSTANCE")
        .context("SPANNER_INSTANCE environment variable is required")?;

    let database = env::var("SPANNER_DATABASE")
        .context("SPANNER_DATABASE environment variable is required")?;

    Ok(SpannerConfig {
        emulator_host,
        project,
        instance,
        database,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::env_lock;
    use std::env;
    use std::sync::MutexGuard;

    fn lock_env() -> MutexGuard<'static, ()> {
        let guard = env_lock();
        unsafe {
            env::remove_var("STORE_BACKEND");
            env::remove_var("SEED_FILE");
            env::remove_var("SPANNER_EMULATOR_HOST");
            env::remove_var("SPANNER_PROJECT");
            env::remove_var("SPANNER_INSTANCE");
            env::remove_var("SPANNER_DATABASE");
            env::remove_var("SERVICE_PORT");
            env::remove_var("SERVICE_HOST");
        }
        guard
    }

    fn set_spanner_vars() {
        unsafe {
            env::set_var("STORE_BACKEND", "spanner");
            env::set_var("SPANNER_PROJECT", "test-project");
            env::set_var("SPANNER_INSTANCE", "test-instance");
            env::set_var("SPANNER_DATABASE", "test-database");
        }
    }

    #[test]
    fn test_config_with_defaults() {
        let _guard = lock_env();

        let config = Config::from_env().unwrap();

        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert_eq!(config.seed_file, None);
        assert_eq!(config.service_port, 3000);
        assert_eq!(config.service_host, "0.0.0.0");
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
    }

    #[test]
    fn test_config_with_spanner_backend() {
        let _guard = lock_env();
        set_spanner_vars();
        unsafe {
            env::set_var("SPANNER_EMULATOR_HOST", "localhost:9010");
            env::set_var("SERVICE_PORT", "8080");
            env::set_var("SERVICE_HOST", "127.0.0.1");
            env::set_var("SEED_FILE", "data/seeds.json");
        }

        let config = Config::from_env().unwrap();

        let expected = SpannerConfig {
            emulator_host: Some("localhost:9010".to_string()),
            project: "test-project".to_string(),
            instance: "test-instance".to_string(),
            database: "test-database".to_string(),
        };
        assert_eq!(config.store_backend, StoreBackend::Spanner(expected.clone()));
        assert_eq!(
            expected.database_path(),
            "projects/test-project/instances/test-instance/databases/test-database"
        );
        assert_eq!(config.seed_file.as_deref(), Some("data/seeds.json"));
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_spanner_vars_ignored_for_memory_backend() {
        let _guard = lock_env();
        unsafe {
            env::set_var("SPANNER_PROJECT", "test-project");
        }

        let config = Config::from_env().unwrap();
        assert_eq!(config.store_backend, StoreBackend::Memory);
    }

    #[test]
    fn test_missing_spanner_var() {
        let _guard = lock_env();
        set_spanner_vars();
        unsafe {
            env::remove_var("SPANNER_DATABASE");
        }

        let result = Config::from_env();
        assert!(result.is_err());
        let error = result.unwrap_err();
        assert!(error.to_string().contains("SPANNER_DATABASE"));
    }

    #[test]
    fn test_unknown_backend() {
        let _guard = lock_env();
        unsafe {
            env::set_var("STORE_BACKEND", "postgres");
        }

        let error = Config::from_env().unwrap_err();
        assert!(error.to_string().contains("STORE_BACKEND"));
        assert!(error.to_string().contains("postgres"));
    }

    #[test]
    fn test_empty_seed_file_is_none() {
        let _guard = lock_env();
        unsafe {
            env::set_var("SEED_FILE", "");
        }

        let config = Config::from_env().unwrap();
        assert_eq!(config.seed_file, None);
    }

    #[test]
    fn test_invalid_port() {
        let _guard = lock_env();
        unsafe {
            env::set_var("SERVICE_PORT", "not-a-number");
        }

        let result = Config::from_env();
        assert!(result.is_err());
        let error = result.unwrap_err();
        assert!(error.to_string().contains("SERVICE_PORT"));
    }

    #[test]
    fn test_port_out_of_range() {
        let _guard = lock_env();
        unsafe {
            env::set_var("SERVICE_PORT", "99999");
        }

        let result = Config::from_env();
        assert!(result.is_err());
    }
}
