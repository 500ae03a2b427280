//! IP-based geolocation with a single fallback provider
//!
//! `IpLocator` owns the configured primary provider and, optionally, one
//! secondary provider that is tried exactly once when the primary fails.

use crate::config::Config;
use crate::constants::geo::FALLBACK_LABEL;
use crate::coord::Coordinates;
use crate::error::ProviderError;
use crate::geo::ipapi::IpApiBackend;
use crate::geo::ipgeolocation::IpGeolocationBackend;
use crate::geo::ipinfo::IpInfoBackend;
use crate::geo::{GeoBackend, GeoPosition, GeoProviderKind};
use serde::Serialize;
use tracing::{debug, info, warn};

/// A configured geolocation provider
#[derive(Debug, Clone)]
pub enum GeoProvider {
    IpApi(IpApiBackend),
    IpInfo(IpInfoBackend),
    IpGeolocation(IpGeolocationBackend),
}

impl GeoProvider {
    /// Build the provider for `kind` from configured endpoints and keys
    pub fn new(kind: GeoProviderKind, client: &reqwest::Client, config: &Config) -> Self {
        match kind {
            GeoProviderKind::IpApi => {
                Self::IpApi(IpApiBackend::new(client.clone(), &config.endpoints.ipapi))
            }
            GeoProviderKind::IpInfo => Self::IpInfo(IpInfoBackend::new(
                client.clone(),
                &config.endpoints.ipinfo,
                &config.api_keys.ipinfo,
            )),
            GeoProviderKind::IpGeolocation => Self::IpGeolocation(IpGeolocationBackend::new(
                client.clone(),
                &config.endpoints.ipgeolocation,
                &config.api_keys.ipgeolocation,
            )),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::IpApi(b) => b.name(),
            Self::IpInfo(b) => b.name(),
            Self::IpGeolocation(b) => b.name(),
        }
    }

    pub async fn lookup(&self, ip: &str) -> Result<GeoPosition, ProviderError> {
        match self {
            Self::IpApi(b) => b.lookup(ip).await,
            Self::IpInfo(b) => b.lookup(ip).await,
            Self::IpGeolocation(b) => b.lookup(ip).await,
        }
    }
}

/// Result of the geolocation stage
///
/// Always carries a usable position: the resolved one, or the fixed default.
#[derive(Debug, Clone, Serialize)]
pub struct LocationOutcome {
    pub position: GeoPosition,
    /// True when `position` came from a provider or the caller
    pub resolved: bool,
    /// Human-readable summary for the rendered page
    pub status: String,
    #[serde(skip)]
    pub error: Option<ProviderError>,
}

impl LocationOutcome {
    /// A provider resolved the address
    pub fn resolved(position: GeoPosition) -> Self {
        let status = format!("Your location: {}", position.describe());
        Self {
            position,
            resolved: true,
            status,
            error: None,
        }
    }

    /// Every provider failed; use the default position
    pub fn failed(error: ProviderError) -> Self {
        Self {
            position: GeoPosition::fallback(),
            resolved: false,
            status: format!("Could not determine location: {}", error),
            error: Some(error),
        }
    }

    /// Lookup was not attempted (private address)
    pub fn skipped() -> Self {
        Self {
            position: GeoPosition::fallback(),
            resolved: false,
            status: FALLBACK_LABEL.to_string(),
            error: None,
        }
    }

    /// The caller supplied coordinates directly
    pub fn provided(coords: Coordinates) -> Self {
        Self {
            position: GeoPosition::at(coords, "query"),
            resolved: true,
            status: format!("Using provided coordinates ({}, {})", coords.lat, coords.lng),
            error: None,
        }
    }
}

/// IP location service with an optional fallback provider
#[derive(Debug, Clone)]
pub struct IpLocator {
    primary: GeoProvider,
    fallback: Option<GeoProvider>,
}

impl IpLocator {
    /// Create a locator from explicit providers
    pub fn new(primary: GeoProvider, fallback: Option<GeoProvider>) -> Self {
        Self { primary, fallback }
    }

    /// Create the configured locator
    ///
    /// A fallback identical to the primary is dropped.
    pub fn from_config(config: &Config, client: &reqwest::Client) -> Self {
        let primary_kind = config.geolocation.provider;
        let fallback = config
            .geolocation
            .fallback
            .filter(|kind| *kind != primary_kind)
            .map(|kind| GeoProvider::new(kind, client, config));

        Self::new(GeoProvider::new(primary_kind, client, config), fallback)
    }

    /// Fail early when the primary provider cannot run at all
    pub fn check_configured(config: &Config) -> Result<(), ProviderError> {
        if config.geolocation.provider == GeoProviderKind::IpGeolocation
            && config.api_keys.ipgeolocation.is_empty()
        {
            return Err(ProviderError::MissingKey("ipgeolocation"));
        }
        Ok(())
    }

    /// Look up an address, trying the fallback provider once on failure
    ///
    /// When both fail, the primary's error is returned.
    pub async fn lookup(&self, ip: &str) -> Result<GeoPosition, ProviderError> {
        let primary_err = match self.primary.lookup(ip).await {
            Ok(position) => return Ok(position),
            Err(e) => e,
        };

        warn!(
            provider = self.primary.name(),
            kind = primary_err.kind(),
            "Geolocation failed for {}: {}",
            ip,
            primary_err
        );

        let Some(fallback) = self.fallback.as_ref() else {
            return Err(primary_err);
        };
        if !primary_err.is_fallback_eligible() {
            return Err(primary_err);
        }

        debug!(provider = fallback.name(), "Trying fallback geolocation provider");
        match fallback.lookup(ip).await {
            Ok(position) => Ok(position),
            Err(e) => {
                warn!(
                    provider = fallback.name(),
                    kind = e.kind(),
                    "Fallback geolocation failed for {}: {}",
                    ip,
                    e
                );
                Err(primary_err)
            }
        }
    }

    /// Look up an address, absorbing any failure into the default position
    pub async fn locate(&self, ip: &str) -> LocationOutcome {
        match self.lookup(ip).await {
            Ok(position) => {
                info!(source = %position.source, "Located {} at {}", ip, position.describe());
                LocationOutcome::resolved(position)
            }
            Err(e) => LocationOutcome::failed(e),
        }
    }
}
