//! Centralized constants for the motel-map crate
//!
//! This module consolidates constants that are used across multiple modules
//! to avoid duplication and ensure consistency.

/// Geographic constants
pub mod geo {
    /// Mean Earth radius in kilometers
    pub const EARTH_RADIUS_KM: f64 = 6_371.0;

    /// Fallback latitude (Copacabana, Rio de Janeiro)
    pub const FALLBACK_LAT: f64 = -22.970722;

    /// Fallback longitude (Copacabana, Rio de Janeiro)
    pub const FALLBACK_LNG: f64 = -43.182365;

    /// Label shown when the fallback coordinate is in use
    pub const FALLBACK_LABEL: &str = "Default location (Copacabana)";
}

/// External API endpoints
pub mod api {
    /// ipapi.co, `/{ip}/json/` is appended
    pub const IPAPI_URL: &str = "https://ipapi.co";

    /// ipinfo.io, `/{ip}/json` is appended
    pub const IPINFO_URL: &str = "https://ipinfo.io";

    /// ipgeolocation.io lookup endpoint
    pub const IPGEOLOCATION_URL: &str = "https://api.ipgeolocation.io/ipgeo";

    /// Google Places Nearby Search
    pub const GOOGLE_PLACES_URL: &str =
        "https://maps.googleapis.com/maps/api/place/nearbysearch/json";

    /// OpenStreetMap Overpass interpreter
    pub const OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";
}

/// Client-side map assets
pub mod assets {
    pub const LEAFLET_CSS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css";
    pub const LEAFLET_JS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js";
    pub const OSM_TILES: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
    pub const GOOGLE_MAPS_JS: &str = "https://maps.googleapis.com/maps/api/js";
}

/// Environment variables read at startup
pub mod env {
    pub const CONFIG_PATH: &str = "MOTEL_MAP_CONFIG";
    pub const HOST: &str = "MOTEL_MAP_HOST";
    pub const PORT: &str = "MOTEL_MAP_PORT";
    /// Generic port variable set by most hosting platforms
    pub const PLATFORM_PORT: &str = "PORT";
    pub const GEO_PROVIDER: &str = "MOTEL_MAP_GEO_PROVIDER";
    pub const PLACES_PROVIDER: &str = "MOTEL_MAP_PLACES_PROVIDER";
    pub const RENDERER: &str = "MOTEL_MAP_RENDERER";
    pub const GOOGLE_PLACES_API_KEY: &str = "GOOGLE_PLACES_API_KEY";
    pub const GOOGLE_MAPS_API_KEY: &str = "GOOGLE_MAPS_API_KEY";
    pub const IPINFO_TOKEN: &str = "IPINFO_TOKEN";
    pub const IPGEOLOCATION_API_KEY: &str = "IPGEOLOCATION_API_KEY";
}
