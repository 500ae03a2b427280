//! Configuration management
//!
//! Configuration is built once at startup: an optional TOML file
//! (`$MOTEL_MAP_CONFIG`, or ~/.config/motel-map/config.toml) layered under
//! environment overrides. Nothing is ever written back.

pub mod defaults;

use crate::client::PrivateIpPolicy;
use crate::constants::{api, env};
use crate::error::{Error, Result};
use crate::format::MapRenderer;
use crate::geo::GeoProviderKind;
use crate::places::{PlacesProviderKind, Selection};
use defaults::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Outbound HTTP settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Client address handling
    #[serde(default)]
    pub client: ClientConfig,

    /// IP geolocation providers
    #[serde(default)]
    pub geolocation: GeolocationConfig,

    /// Nearby places search
    #[serde(default)]
    pub places: PlacesConfig,

    /// Map rendering
    #[serde(default)]
    pub map: MapConfig,

    /// External map link settings
    #[serde(default)]
    pub url: UrlConfig,

    /// Provider base URLs
    #[serde(default)]
    pub endpoints: EndpointsConfig,

    /// API keys for various services
    #[serde(default)]
    pub api_keys: ApiKeysConfig,
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Outbound HTTP settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Timeout applied to every provider call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Honor HTTP(S)_PROXY from the environment
    #[serde(default = "default_system_proxy")]
    pub system_proxy: bool,
}

/// Client address handling
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    /// What HTML endpoints do with a private or loopback client address
    #[serde(default)]
    pub private_ip_policy: PrivateIpPolicy,
}

/// IP geolocation providers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeolocationConfig {
    /// Primary provider
    #[serde(default)]
    pub provider: GeoProviderKind,

    /// Provider tried once when the primary fails; `"none"` disables it
    #[serde(
        default = "default_geo_fallback",
        deserialize_with = "deserialize_fallback",
        serialize_with = "serialize_fallback"
    )]
    pub fallback: Option<GeoProviderKind>,
}

/// Nearby places search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacesConfig {
    /// Places provider
    #[serde(default)]
    pub provider: PlacesProviderKind,

    /// Search radius in meters
    #[serde(default = "default_radius_m")]
    pub radius_m: u32,

    /// Keyword passed to keyword-search providers
    #[serde(default = "default_keyword")]
    pub keyword: String,

    /// `key=value` tag used by the Overpass provider
    #[serde(default = "default_osm_tag")]
    pub osm_tag: String,

    /// Which candidates the map page reports
    #[serde(default)]
    pub selection: Selection,

    /// Upper bound for the "all" selection
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

/// Map rendering
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    /// Client-side map library
    #[serde(default)]
    pub renderer: MapRenderer,

    /// Zoom for the main map page
    #[serde(default = "default_zoom")]
    pub zoom: u8,

    /// Zoom for the nearby-lodging fragment
    #[serde(default = "default_nearby_zoom")]
    pub nearby_zoom: u8,
}

/// External map link settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlConfig {
    /// Provider used for the "open in" link on the map page
    #[serde(default = "default_url_provider")]
    pub default: String,

    /// URL provider templates
    #[serde(default = "default_url_providers")]
    pub providers: HashMap<String, String>,
}

/// Provider base URLs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointsConfig {
    #[serde(default = "default_ipapi_url")]
    pub ipapi: String,
    #[serde(default = "default_ipinfo_url")]
    pub ipinfo: String,
    #[serde(default = "default_ipgeolocation_url")]
    pub ipgeolocation: String,
    #[serde(default = "default_google_places_url")]
    pub google_places: String,
    #[serde(default = "default_overpass_url")]
    pub overpass: String,
}

/// API keys for external services
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiKeysConfig {
    /// Google Places API key
    #[serde(default)]
    pub google_places: String,

    /// Google Maps JavaScript API key
    #[serde(default)]
    pub google_maps: String,

    /// ipinfo.io token (optional)
    #[serde(default)]
    pub ipinfo: String,

    /// ipgeolocation.io API key
    #[serde(default)]
    pub ipgeolocation: String,
}

// Default value functions for serde
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
fn default_system_proxy() -> bool {
    true
}
fn default_geo_fallback() -> Option<GeoProviderKind> {
    Some(GeoProviderKind::IpInfo)
}
fn deserialize_fallback<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<GeoProviderKind>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let name = String::deserialize(deserializer)?;
    if name.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    name.parse().map(Some).map_err(serde::de::Error::custom)
}
fn serialize_fallback<S>(
    fallback: &Option<GeoProviderKind>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match fallback {
        Some(kind) => serializer.serialize_str(&kind.to_string()),
        None => serializer.serialize_str("none"),
    }
}
fn default_radius_m() -> u32 {
    DEFAULT_RADIUS_M
}
fn default_keyword() -> String {
    DEFAULT_KEYWORD.to_string()
}
fn default_osm_tag() -> String {
    DEFAULT_OSM_TAG.to_string()
}
fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}
fn default_zoom() -> u8 {
    DEFAULT_ZOOM
}
fn default_nearby_zoom() -> u8 {
    DEFAULT_NEARBY_ZOOM
}
fn default_url_provider() -> String {
    DEFAULT_URL_PROVIDER.to_string()
}
fn default_url_providers() -> HashMap<String, String> {
    let mut providers = HashMap::new();
    providers.insert(
        "google".to_string(),
        "https://www.google.com/maps/@{lat},{lng},15z".to_string(),
    );
    providers.insert(
        "openstreetmap".to_string(),
        "https://www.openstreetmap.org/#map=18/{lat}/{lng}".to_string(),
    );
    providers.insert(
        "apple".to_string(),
        "https://maps.apple.com/?ll={lat},{lng}".to_string(),
    );
    providers
}
fn default_ipapi_url() -> String {
    api::IPAPI_URL.to_string()
}
fn default_ipinfo_url() -> String {
    api::IPINFO_URL.to_string()
}
fn default_ipgeolocation_url() -> String {
    api::IPGEOLOCATION_URL.to_string()
}
fn default_google_places_url() -> String {
    api::GOOGLE_PLACES_URL.to_string()
}
fn default_overpass_url() -> String {
    api::OVERPASS_URL.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            system_proxy: default_system_proxy(),
        }
    }
}

impl Default for GeolocationConfig {
    fn default() -> Self {
        Self {
            provider: GeoProviderKind::default(),
            fallback: default_geo_fallback(),
        }
    }
}

impl Default for PlacesConfig {
    fn default() -> Self {
        Self {
            provider: PlacesProviderKind::default(),
            radius_m: default_radius_m(),
            keyword: default_keyword(),
            osm_tag: default_osm_tag(),
            selection: Selection::default(),
            max_results: default_max_results(),
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            renderer: MapRenderer::default(),
            zoom: default_zoom(),
            nearby_zoom: default_nearby_zoom(),
        }
    }
}

impl Default for UrlConfig {
    fn default() -> Self {
        Self {
            default: default_url_provider(),
            providers: default_url_providers(),
        }
    }
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            ipapi: default_ipapi_url(),
            ipinfo: default_ipinfo_url(),
            ipgeolocation: default_ipgeolocation_url(),
            google_places: default_google_places_url(),
            overpass: default_overpass_url(),
        }
    }
}

impl Config {
    /// Get the config file path
    ///
    /// `$MOTEL_MAP_CONFIG` wins over the XDG location.
    pub fn config_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(env::CONFIG_PATH) {
            if !path.is_empty() {
                return Ok(PathBuf::from(path));
            }
        }
        dirs::config_dir()
            .map(|p| p.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Load configuration from the default path and the process environment
    ///
    /// A missing config file is not an error; defaults are used instead.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        let mut config = if path.exists() {
            Self::load_from(&path)?
        } else {
            Config::default()
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load configuration from a specific TOML file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config file: {}", e)))
    }

    /// Apply environment overrides
    ///
    /// `lookup` is the environment; empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(host) = get(env::HOST) {
            self.server.host = host;
        }
        if let Some(port) = get(env::PORT).or_else(|| get(env::PLATFORM_PORT)) {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("Invalid port value: {}", port)))?;
        }
        if let Some(provider) = get(env::GEO_PROVIDER) {
            self.geolocation.provider = provider.parse().map_err(Error::Config)?;
        }
        if let Some(provider) = get(env::PLACES_PROVIDER) {
            self.places.provider = provider.parse().map_err(Error::Config)?;
        }
        if let Some(renderer) = get(env::RENDERER) {
            self.map.renderer = renderer.parse().map_err(Error::Config)?;
        }
        if let Some(key) = get(env::GOOGLE_PLACES_API_KEY) {
            self.api_keys.google_places = key;
        }
        if let Some(key) = get(env::GOOGLE_MAPS_API_KEY) {
            self.api_keys.google_maps = key;
        }
        if let Some(token) = get(env::IPINFO_TOKEN) {
            self.api_keys.ipinfo = token;
        }
        if let Some(key) = get(env::IPGEOLOCATION_API_KEY) {
            self.api_keys.ipgeolocation = key;
        }

        Ok(())
    }

    /// Get a configuration value by key path
    ///
    /// Key format: "section.key". API keys are masked.
    pub fn get(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["server", "host"] => Some(self.server.host.clone()),
            ["server", "port"] => Some(self.server.port.to_string()),

            ["http", "timeout_secs"] => Some(self.http.timeout_secs.to_string()),

            ["client", "private_ip_policy"] => Some(self.client.private_ip_policy.to_string()),

            ["geolocation", "provider"] => Some(self.geolocation.provider.to_string()),
            ["geolocation", "fallback"] => Some(
                self.geolocation
                    .fallback
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| "none".to_string()),
            ),

            ["places", "provider"] => Some(self.places.provider.to_string()),
            ["places", "radius_m"] => Some(self.places.radius_m.to_string()),
            ["places", "keyword"] => Some(self.places.keyword.clone()),
            ["places", "osm_tag"] => Some(self.places.osm_tag.clone()),
            ["places", "selection"] => Some(self.places.selection.to_string()),
            ["places", "max_results"] => Some(self.places.max_results.to_string()),

            ["map", "renderer"] => Some(self.map.renderer.to_string()),
            ["map", "zoom"] => Some(self.map.zoom.to_string()),
            ["map", "nearby_zoom"] => Some(self.map.nearby_zoom.to_string()),

            ["url", "default"] => Some(self.url.default.clone()),

            ["endpoints", "ipapi"] => Some(self.endpoints.ipapi.clone()),
            ["endpoints", "ipinfo"] => Some(self.endpoints.ipinfo.clone()),
            ["endpoints", "ipgeolocation"] => Some(self.endpoints.ipgeolocation.clone()),
            ["endpoints", "google_places"] => Some(self.endpoints.google_places.clone()),
            ["endpoints", "overpass"] => Some(self.endpoints.overpass.clone()),

            ["api_keys", "google_places"] => Some(mask(&self.api_keys.google_places)),
            ["api_keys", "google_maps"] => Some(mask(&self.api_keys.google_maps)),
            ["api_keys", "ipinfo"] => Some(mask(&self.api_keys.ipinfo)),
            ["api_keys", "ipgeolocation"] => Some(mask(&self.api_keys.ipgeolocation)),

            _ => None,
        }
    }

    /// List all available config keys
    pub fn available_keys() -> Vec<&'static str> {
        vec![
            "server.host",
            "server.port",
            "http.timeout_secs",
            "client.private_ip_policy",
            "geolocation.provider",
            "geolocation.fallback",
            "places.provider",
            "places.radius_m",
            "places.keyword",
            "places.osm_tag",
            "places.selection",
            "places.max_results",
            "map.renderer",
            "map.zoom",
            "map.nearby_zoom",
            "url.default",
            "endpoints.ipapi",
            "endpoints.ipinfo",
            "endpoints.ipgeolocation",
            "endpoints.google_places",
            "endpoints.overpass",
            "api_keys.google_places",
            "api_keys.google_maps",
            "api_keys.ipinfo",
            "api_keys.ipgeolocation",
        ]
    }

    /// Format a URL using the specified provider
    ///
    /// Replaces {lat} and {lng} placeholders with actual values
    pub fn format_url(&self, provider: Option<&str>, lat: f64, lng: f64) -> Result<String> {
        let provider_name = provider.unwrap_or(&self.url.default);

        let template = self.url.providers.get(provider_name).ok_or_else(|| {
            Error::Config(format!("Unknown URL provider: {}", provider_name))
        })?;

        Ok(template
            .replace("{lat}", &lat.to_string())
            .replace("{lng}", &lng.to_string()))
    }

    /// Get server address as "host:port"
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn mask(secret: &str) -> String {
    if secret.is_empty() {
        "(unset)".to_string()
    } else {
        "********".to_string()
    }
}
