// ABOUTME: Server configuration from environment variables
// ABOUTME: Every value has a development-friendly default except the Stripe key

use std::env;
use std::num::{ParseFloatError, ParseIntError};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid port number: {0}")]
    InvalidPort(#[from] ParseIntError),
    #[error("Port {0} is out of valid range (1-65535)")]
    PortOutOfRange(u16),
    #[error("Invalid number: {0}")]
    InvalidNumber(#[from] ParseFloatError),
    #[error("CONFIRMATION_PERCENTAGE must be between 1 and 100, got {0}")]
    QuorumOutOfRange(u8),
    #[error("STRIPE_SECRET_KEY is required")]
    MissingStripeKey,
}

#[derive(Debug)]
pub struct Config {
    pub port: u16,
    pub cors_origin: String,
    pub database_path: PathBuf,
    pub stripe_secret_key: String,
    /// Percentage of distinct bidders whose confirmation settles a request.
    pub confirmation_percentage: u8,
    pub similar_request_threshold: f64,
    pub similar_request_max_results: usize,
    pub notification_debounce_minutes: i64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| "4010".to_string())
            .parse::<u16>()?;
        if port == 0 {
            return Err(ConfigError::PortOutOfRange(port));
        }

        let cors_origin =
            env::var("CORS_ORIGIN").unwrap_or_else(|_| "http://localhost:5173".to_string());

        let database_path = env::var("DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data/bountyboard.db"));

        let stripe_secret_key =
            env::var("STRIPE_SECRET_KEY").map_err(|_| ConfigError::MissingStripeKey)?;

        let confirmation_percentage = env::var("CONFIRMATION_PERCENTAGE")
            .unwrap_or_else(|_| "80".to_string())
            .parse::<u16>()? as u8;
        if confirmation_percentage == 0 || confirmation_percentage > 100 {
            return Err(ConfigError::QuorumOutOfRange(confirmation_percentage));
        }

        let similar_request_threshold = env::var("SIMILAR_REQUEST_THRESHOLD")
            .unwrap_or_else(|_| "0.6".to_string())
            .parse::<f64>()?;

        let similar_request_max_results = env::var("SIMILAR_REQUEST_MAX_RESULTS")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<u16>()? as usize;

        let notification_debounce_minutes = env::var("NOTIFICATION_DEBOUNCE_MINUTES")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<u16>()? as i64;

        Ok(Config {
            port,
            cors_origin,
            database_path,
            stripe_secret_key,
            confirmation_percentage,
            similar_request_threshold,
            similar_request_max_results,
            notification_debounce_minutes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_apply() {
        // Only the Stripe key is required.
        std::env::set_var("STRIPE_SECRET_KEY", "sk_test_123");
        std::env::remove_var("PORT");
        std::env::remove_var("CONFIRMATION_PERCENTAGE");

        let config = Config::from_env().unwrap();
        assert_eq!(config.port, 4010);
        assert_eq!(config.confirmation_percentage, 80);
        assert_eq!(config.notification_debounce_minutes, 30);
    }
}
