//! Runtime configuration: upstream base URLs and the coordinate data path.
//!
//! Plain value struct, constructed once at startup and passed down
//! explicitly. Defaults match the local development layout; `from_env`
//! applies environment overrides.

use std::env;

pub const DEFAULT_BUSINESS_URL: &str = "http://localhost:3333";
pub const DEFAULT_NOTIFICATIONS_URL: &str = "http://localhost:5000";
pub const DEFAULT_COORDINATES_PATH: &str = "data/coordenadas.csv";

#[derive(Debug, Clone)]
pub struct MapsConfig {
    pub business_url: String,
    pub notifications_url: String,
    pub coordinates_path: String,
}

impl Default for MapsConfig {
    fn default() -> Self {
        Self {
            business_url: DEFAULT_BUSINESS_URL.to_string(),
            notifications_url: DEFAULT_NOTIFICATIONS_URL.to_string(),
            coordinates_path: DEFAULT_COORDINATES_PATH.to_string(),
        }
    }
}

impl MapsConfig {
    /// Defaults overridden by `MAPS_BUSINESS_URL`, `MAPS_NOTIFICATIONS_URL`,
    /// and `MAPS_COORDINATES_PATH` where set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = env::var("MAPS_BUSINESS_URL") {
            config.business_url = url;
        }
        if let Ok(url) = env::var("MAPS_NOTIFICATIONS_URL") {
            config.notifications_url = url;
        }
        if let Ok(path) = env::var("MAPS_COORDINATES_PATH") {
            config.coordinates_path = path;
        }
        config
    }

    pub fn with_business_url(mut self, url: impl Into<String>) -> Self {
        self.business_url = url.into();
        self
    }

    pub fn with_notifications_url(mut self, url: impl Into<String>) -> Self {
        self.notifications_url = url.into();
        self
    }

    pub fn with_coordinates_path(mut self, path: impl Into<String>) -> Self {
        self.coordinates_path = path.into();
        self
    }
}
