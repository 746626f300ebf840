use sprintdeck_common::error::{SprintdeckError, SprintdeckResult};
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub app_env: String,
    pub board_mappings_path: String,
}

impl AppConfig {
    /// Load configuration from environment variables.
    /// Loads `.env` file if present, then reads vars.
    pub fn from_env() -> SprintdeckResult<Self> {
        // Best-effort .env load; ignore if missing
        let _ = dotenvy::dotenv();

        Ok(Self {
            host: get_var_or("HOST", "0.0.0.0"),
            port: get_var_or("PORT", "8080")
                .parse()
                .map_err(|e| SprintdeckError::Config(format!("invalid PORT: {e}")))?,
            log_level: get_var_or("LOG_LEVEL", "info"),
            app_env: get_var_or("APP_ENV", "production"),
            board_mappings_path: get_var_or("BOARD_MAPPINGS_PATH", "board-mappings.json"),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn is_development(&self) -> bool {
        self.app_env == "development"
    }
}

pub fn get_var(key: &str) -> SprintdeckResult<String> {
    env::var(key).map_err(|_| SprintdeckError::Config(format!("{key} is required but not set")))
}

pub fn get_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn config_defaults_apply() {
        let _guard = ENV_LOCK.lock().expect("env lock poisoned");

        env::remove_var("HOST");
        env::remove_var("PORT");
        env::remove_var("LOG_LEVEL");
        env::remove_var("APP_ENV");
        env::remove_var("BOARD_MAPPINGS_PATH");

        let cfg = AppConfig::from_env().expect("should parse config");
        assert_eq!(cfg.host, "0.0.0.0");
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.app_env, "production");
        assert_eq!(cfg.board_mappings_path, "board-mappings.json");
        assert!(!cfg.is_development());
    }

    #[test]
    fn config_fails_on_bad_port() {
        let _guard = ENV_LOCK.lock().expect("env lock poisoned");

        env::set_var("PORT", "not-a-port");
        let result = AppConfig::from_env();
        assert!(result.is_err());
        env::remove_var("PORT");
    }

    #[test]
    fn development_mode_detected() {
        let _guard = ENV_LOCK.lock().expect("env lock poisoned");

        env::set_var("APP_ENV", "development");
        let cfg = AppConfig::from_env().expect("should parse config");
        assert!(cfg.is_development());
        env::remove_var("APP_ENV");
    }

    #[test]
    fn bind_addr_formats_correctly() {
        let cfg = AppConfig {
            host: "127.0.0.1".to_owned(),
            port: 3000,
            log_level: "debug".to_owned(),
            app_env: "production".to_owned(),
            board_mappings_path: "board-mappings.json".to_owned(),
        };
        assert_eq!(cfg.bind_addr(), "127.0.0.1:3000");
    }
}
