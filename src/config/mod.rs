pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::domain::ports::ConfigProvider;
#[cfg(feature = "cli")]
use crate::utils::error::{FeedError, Result};
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "parish-feed")]
#[command(about = "Build a personalized church events feed")]
pub struct CliConfig {
    #[arg(long, default_value = "http://localhost:3000/api")]
    pub api_endpoint: String,

    #[arg(long, default_value = "./parish-data")]
    pub storage_path: String,

    #[arg(long, help = "Bearer token for the favorites endpoints")]
    pub token: Option<String>,

    #[arg(
        long,
        help = "Set the location before building, e.g. \"Atlanta, GA\" or \"30309\""
    )]
    pub location: Option<String>,

    #[arg(
        long,
        help = "Set the location from device coordinates, e.g. \"33.749,-84.388\""
    )]
    pub gps: Option<String>,

    #[arg(long, help = "TOML file overriding the scoring weights")]
    pub weights_file: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log process cpu/memory after each stage")]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn api_endpoint(&self) -> &str {
        &self.api_endpoint
    }

    fn storage_path(&self) -> &str {
        &self.storage_path
    }

    fn auth_token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("api_endpoint", &self.api_endpoint)?;
        validation::validate_path("storage_path", &self.storage_path)?;

        if let Some(token) = &self.token {
            validation::validate_non_empty_string("token", token)?;
        }

        if self.location.is_some() && self.gps.is_some() {
            return Err(FeedError::InvalidConfigValueError {
                field: "location".to_string(),
                value: self.location.clone().unwrap_or_default(),
                reason: "--location and --gps are mutually exclusive".to_string(),
            });
        }

        Ok(())
    }
}
