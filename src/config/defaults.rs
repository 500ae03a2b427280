//! Default configuration values
//!
//! Named constants for all tunable parameters

/// Default server host
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port
pub const DEFAULT_PORT: u16 = 5000;

/// Timeout for every outbound provider call, in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Default places search radius in meters
pub const DEFAULT_RADIUS_M: u32 = 50_000;

/// Default places keyword
pub const DEFAULT_KEYWORD: &str = "motel";

/// Default OSM tag filter for the Overpass provider
pub const DEFAULT_OSM_TAG: &str = "tourism=motel";

/// Maximum number of candidates kept by the "all" selection policy
pub const DEFAULT_MAX_RESULTS: usize = 10;

/// Zoom level for the main map page
pub const DEFAULT_ZOOM: u8 = 15;

/// Zoom level for the nearby-lodging fragment
pub const DEFAULT_NEARBY_ZOOM: u8 = 12;

/// Default external map link provider
pub const DEFAULT_URL_PROVIDER: &str = "openstreetmap";

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory name (for XDG paths)
pub const APP_DIR_NAME: &str = "motel-map";
