//! Configuration management for the NutriWeb backend
//!
//! Configuration is loaded hierarchically:
//! 1. Default values (in code)
//! 2. TOML config files (config/development.toml or config/production.toml)
//! 3. Environment variables (prefix: NW__)

use anyhow::Result;
use nutriweb_shared::{BmiGranularity, BmrEquation, CalculationOptions};
use serde::{Deserialize, Serialize};
use std::env;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
}

/// Default formula variants, overridable per request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub bmi_granularity: BmiGranularity,
    pub bmr_equation: BmrEquation,
    pub compute_energy: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let options = CalculationOptions::default();
        Self {
            bmi_granularity: options.bmi_granularity,
            bmr_equation: options.bmr_equation,
            compute_energy: options.compute_energy,
        }
    }
}

impl EngineConfig {
    pub fn options(&self) -> CalculationOptions {
        CalculationOptions {
            bmi_granularity: self.bmi_granularity,
            bmr_equation: self.bmr_equation,
            compute_energy: self.compute_energy,
        }
    }
}

/// Report rendering
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Decimal places for numbers in exported reports
    pub decimals: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self { decimals: 2 }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                request_timeout_secs: 30,
            },
            engine: EngineConfig::default(),
            report: ReportConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    ///
    /// Loading order (later sources override earlier):
    /// 1. Default values
    /// 2. Config file based on RUST_ENV (development.toml or production.toml)
    /// 3. Environment variables with NW__ prefix
    pub fn load() -> Result<Self> {
        let env = env::var("RUST_ENV").unwrap_or_else(|_| "development".to_string());
        let config_file = format!("config/{}.toml", env);

        let config = config::Config::builder()
            // Start with defaults
            .add_source(config::Config::try_from(&AppConfig::default())?)
            // Load from environment-specific config file
            .add_source(config::File::with_name(&config_file).required(false))
            // Override with environment variables (NW__ prefix)
            // e.g., NW__ENGINE__BMR_EQUATION=mifflin_st_jeor sets engine.bmr_equation
            .add_source(config::Environment::with_prefix("NW").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Check if running in production mode
    pub fn is_production() -> bool {
        env::var("RUST_ENV").map(|v| v == "production").unwrap_or(false)
    }
}
