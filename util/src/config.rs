//! Global application configuration manager.
//!
//! `AppConfig` is a lazily initialized, globally accessible singleton containing
//! runtime configuration values loaded from environment variables. It provides
//! thread-safe access and mutation for testing or overrides in runtime environments.

use std::env;
use std::sync::{OnceLock, RwLock};

/// Represents the complete application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub project_name: String,
    pub log_level: String,
    pub log_file: String,
    pub log_to_stdout: bool,
    pub database_path: String,
    pub workspace_root: String,
    pub host: String,
    pub port: u16,
    pub openai_api_key: String,
    pub openai_model: String,
    pub openai_base_url: String,
    pub scoring_timeout_seconds: u64,
}

/// Lazily-initialized, thread-safe singleton instance of `AppConfig`.
static CONFIG_INSTANCE: OnceLock<RwLock<AppConfig>> = OnceLock::new();

impl AppConfig {
    /// Loads the configuration from `.env` and environment variables.
    ///
    /// This method is used internally to populate the singleton. It panics
    /// if required variables are missing or improperly formatted.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            env: env::var("APP_ENV").unwrap_or_else(|_| "development".into()),
            project_name: env::var("PROJECT_NAME").unwrap_or_else(|_| "review-pilot".into()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "api=info".into()),
            log_file: env::var("LOG_FILE").unwrap_or_else(|_| "api.log".into()),
            log_to_stdout: env::var("LOG_TO_STDOUT").unwrap_or_else(|_| "false".into()) == "true",
            database_path: env::var("DATABASE_PATH").expect("DATABASE_PATH is required"),
            workspace_root: env::var("WORKSPACE_ROOT").expect("WORKSPACE_ROOT is required"),
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".into())
                .parse()
                .unwrap(),
            openai_api_key: env::var("OPENAI_API_KEY").unwrap_or_default(),
            openai_model: env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into()),
            openai_base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".into()),
            scoring_timeout_seconds: env::var("SCORING_TIMEOUT_SECONDS")
                .unwrap_or("120".into())
                .parse()
                .unwrap(),
        }
    }

    /// Returns a shared reference to the global configuration.
    ///
    /// # Panics
    /// Panics if the lock cannot be acquired.
    pub fn global() -> std::sync::RwLockReadGuard<'static, AppConfig> {
        CONFIG_INSTANCE
            .get_or_init(|| RwLock::new(AppConfig::from_env()))
            .read()
            .expect("Failed to acquire AppConfig read lock")
    }

    /// Resets the configuration by reloading from environment variables.
    ///
    /// Useful in tests to clear overrides.
    pub fn reset() {
        if let Some(lock) = CONFIG_INSTANCE.get() {
            let mut guard = lock.write().unwrap();
            *guard = AppConfig::from_env();
        }
    }

    /// Generic internal setter for any field in the config.
    ///
    /// Used by public per-field setter methods.
    fn set_field<F>(setter: F)
    where
        F: FnOnce(&mut AppConfig),
    {
        let lock = CONFIG_INSTANCE.get_or_init(|| RwLock::new(AppConfig::from_env()));
        let mut guard = lock
            .write()
            .expect("Failed to acquire AppConfig write lock");
        setter(&mut guard);
    }

    // --- Per-field setters below ---

    /// Override `env` value.
    pub fn set_env(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.env = value.into());
    }

    pub fn set_project_name(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.project_name = value.into());
    }

    pub fn set_log_level(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.log_level = value.into());
    }

    pub fn set_log_file(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.log_file = value.into());
    }

    pub fn set_log_to_stdout(value: bool) {
        AppConfig::set_field(|cfg| cfg.log_to_stdout = value);
    }

    pub fn set_database_path(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.database_path = value.into());
    }

    pub fn set_workspace_root(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.workspace_root = value.into());
    }

    pub fn set_host(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.host = value.into());
    }

    pub fn set_port(value: u16) {
        AppConfig::set_field(|cfg| cfg.port = value);
    }

    pub fn set_openai_api_key(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.openai_api_key = value.into());
    }

    pub fn set_openai_model(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.openai_model = value.into());
    }

    pub fn set_openai_base_url(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.openai_base_url = value.into());
    }

    pub fn set_scoring_timeout_seconds(value: u64) {
        AppConfig::set_field(|cfg| cfg.scoring_timeout_seconds = value);
    }
}

// --- Free accessor functions ---
//
// Call sites read single values as `config::database_path()` rather than
// holding the read guard across awaits.

pub fn env() -> String {
    AppConfig::global().env.clone()
}

pub fn project_name() -> String {
    AppConfig::global().project_name.clone()
}

pub fn log_level() -> String {
    AppConfig::global().log_level.clone()
}

pub fn log_file() -> String {
    AppConfig::global().log_file.clone()
}

pub fn log_to_stdout() -> bool {
    AppConfig::global().log_to_stdout
}

pub fn database_path() -> String {
    AppConfig::global().database_path.clone()
}

pub fn workspace_root() -> String {
    AppConfig::global().workspace_root.clone()
}

pub fn host() -> String {
    AppConfig::global().host.clone()
}

pub fn port() -> u16 {
    AppConfig::global().port
}

pub fn openai_api_key() -> String {
    AppConfig::global().openai_api_key.clone()
}

pub fn openai_model() -> String {
    AppConfig::global().openai_model.clone()
}

pub fn openai_base_url() -> String {
    AppConfig::global().openai_base_url.clone()
}

pub fn scoring_timeout_seconds() -> u64 {
    AppConfig::global().scoring_timeout_seconds
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn init_required_vars() {
        // SAFETY: tests are serialized and only mutate process-local env vars.
        unsafe {
            std::env::set_var("DATABASE_PATH", "data/test.db");
            std::env::set_var("WORKSPACE_ROOT", "tmp/workspaces");
        }
    }

    #[test]
    #[serial]
    fn setters_override_accessors() {
        init_required_vars();

        AppConfig::set_workspace_root("/tmp/override");
        assert_eq!(workspace_root(), "/tmp/override");

        AppConfig::set_scoring_timeout_seconds(7);
        assert_eq!(scoring_timeout_seconds(), 7);

        AppConfig::set_openai_model("gpt-test");
        assert_eq!(openai_model(), "gpt-test");
    }

    #[test]
    #[serial]
    fn reset_reloads_from_env() {
        init_required_vars();

        AppConfig::set_host("10.0.0.1");
        assert_eq!(host(), "10.0.0.1");

        AppConfig::reset();
        assert_eq!(host(), "127.0.0.1");
    }
}
