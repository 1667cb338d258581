//! Collaborator credentials.
//!
//! Read once at startup and passed explicitly into the client constructors;
//! nothing downstream touches the process environment.

use anyhow::{Context, Result};
use std::env;

const DEFAULT_INFLUXDB_URL: &str = "https://europe-west1-1.gcp.cloud2.influxdata.com";

#[derive(Debug, Clone)]
pub struct Credentials {
    pub notion_api_key: String,
    pub notion_database_id: String,
    pub influxdb_api_key: String,
    pub influxdb_org: String,
    pub influxdb_url: String,
}

impl Credentials {
    /// Load from the environment, with a `.env` file in the working
    /// directory taken into account when present. A missing secret is fatal.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            notion_api_key: require("NOTION_API_KEY")?,
            notion_database_id: require("NOTION_DATABASE_ID")?,
            influxdb_api_key: require("INFLUXDB_API_KEY")?,
            influxdb_org: require("INFLUXDB_ORG")?,
            influxdb_url: env::var("INFLUXDB_URL")
                .unwrap_or_else(|_| DEFAULT_INFLUXDB_URL.to_string()),
        })
    }
}

fn require(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("secret {key} could not be loaded from the environment or a .env file"))
}
