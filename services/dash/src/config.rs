use std::net::SocketAddr;
use std::path::Path;

use config::{ConfigError, Environment, File};
use primavera_data::Band;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Config {
    /// Address the HTTP server binds to.
    #[serde(default = "default_address")]
    pub address: SocketAddr,
    /// Base URL of the time-series store's HTTP endpoint.
    #[serde(default = "default_store_url")]
    pub store_url: String,
    #[serde(default)]
    pub bands: Bands,
}

/// Alarm bands for the monitored plant.
#[derive(Serialize, Deserialize, Clone, Copy, Debug)]
pub struct Bands {
    pub temperature: Band,
    pub humidity: Band,
    pub light: Band,
}

impl Default for Bands {
    fn default() -> Self {
        Bands {
            temperature: Band::new(16.0, 24.0),
            humidity: Band::new(50.0, 76.0),
            light: Band::new(1000.0, 1200.0),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            address: default_address(),
            store_url: default_store_url(),
            bands: Bands::default(),
        }
    }
}

fn default_address() -> SocketAddr {
    "0.0.0.0:8050".parse().expect("static address")
}

fn default_store_url() -> String {
    "http://127.0.0.1:4200".to_string()
}

impl Config {
    /// Layered load: optional `./primavera.toml`, an explicit file if given,
    /// then `PRIMAVERA_*` environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder =
            config::Config::builder().add_source(File::with_name("./primavera.toml").required(false));
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        builder
            .add_source(Environment::with_prefix("PRIMAVERA").separator("__"))
            .build()?
            .try_deserialize()
    }
}
