//! motel-map: IP geolocation with a map of nearby lodging
//!
//! A small web service and CLI that works out where a request came from,
//! looks for nearby lodging, and renders the result as a map page or JSON.
//!
//! ## Features
//!
//! - Client address from `X-Forwarded-For`, `X-Real-IP` or the peer socket
//! - Geolocation via ipapi.co, ipinfo.io or ipgeolocation.io with one fallback
//! - Nearby places via Google Places or OpenStreetMap Overpass
//! - Leaflet or Google Maps pages with contextual escaping
//! - HTTP API + CLI interface
//!
//! ## Quick Start
//!
//! ```rust
//! use motel_map::coord::{haversine_km, Coordinates};
//! use motel_map::client::is_private;
//!
//! let sao_paulo = Coordinates::new(-23.5505, -46.6333);
//! let rio = Coordinates::new(-22.9068, -43.1729);
//! assert!((haversine_km(sao_paulo, rio) - 360.0).abs() < 10.0);
//!
//! assert!(is_private("192.168.1.5"));
//! assert!(!is_private("8.8.8.8"));
//! ```

pub mod cli;
pub mod client;
pub mod config;
pub mod constants;
pub mod coord;
pub mod error;
pub mod format;
pub mod geo;
pub mod http;
pub mod pipeline;
pub mod places;
pub mod server;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use client::ClientIdentity;
pub use config::Config;
pub use coord::Coordinates;
pub use error::{Error, ProviderError, Result};
pub use pipeline::MapPipeline;
