//! Request pipeline
//!
//! Runs the stages for one request in order: client identity, geolocation,
//! nearby places, then the report handed to a formatter. Shared by the HTTP
//! handlers and the `locate` command.

use crate::client::{ClientIdentity, PrivateIpPolicy};
use crate::config::Config;
use crate::coord::Coordinates;
use crate::error::{Error, Result};
use crate::format::html;
use crate::format::json::LocationResponse;
use crate::format::MapReport;
use crate::geo::{IpLocator, LocationOutcome};
use crate::http::build_client;
use crate::places::{PlaceFinder, Selection};
use tracing::{debug, info};

/// Configured providers plus the config they were built from
#[derive(Debug, Clone)]
pub struct MapPipeline {
    config: Config,
    locator: IpLocator,
    finder: PlaceFinder,
}

impl MapPipeline {
    /// Build the HTTP client and providers for `config`
    pub fn new(config: Config) -> Result<Self> {
        let client = build_client(&config.http)?;
        let locator = IpLocator::from_config(&config, &client);
        let finder = PlaceFinder::from_config(&config, &client);
        Ok(Self {
            config,
            locator,
            finder,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Report for the map page
    ///
    /// With `coords`, geolocation is skipped. A private client address either
    /// gets the default location or, under the `reject` policy, an
    /// `UnresolvableIdentity` error.
    pub async fn map_page(
        &self,
        identity: ClientIdentity,
        coords: Option<Coordinates>,
    ) -> Result<MapReport> {
        PlaceFinder::check_configured(&self.config)?;
        html::check_configured(&self.config)?;

        let location = match coords {
            Some(coords) => LocationOutcome::provided(coords),
            None => self.locate_identity(&identity).await?,
        };

        let selection = self.config.places.selection;
        let places = if location.resolved {
            Some(self.finder.find(location.position.coords, selection).await)
        } else {
            debug!("Location unresolved, skipping places search");
            None
        };

        // A single selected place becomes the map center
        let center = match (&places, selection) {
            (Some(search), Selection::First | Selection::Second) => search
                .candidates
                .first()
                .map(|c| c.coords)
                .unwrap_or(location.position.coords),
            _ => location.position.coords,
        };

        Ok(MapReport {
            identity,
            location,
            places,
            selection,
            center,
            zoom: self.config.map.zoom,
            radius_m: None,
        })
    }

    /// Report for the nearby-lodging fragment
    ///
    /// Missing or out-of-range coordinates fall back to the default location.
    pub async fn nearby(
        &self,
        identity: ClientIdentity,
        coords: Option<Coordinates>,
    ) -> Result<MapReport> {
        PlaceFinder::check_configured(&self.config)?;
        html::check_configured(&self.config)?;

        let location = match coords.filter(|c| c.validate().is_ok()) {
            Some(coords) => LocationOutcome::provided(coords),
            None => {
                debug!("No usable coordinates given, using default location");
                LocationOutcome::skipped()
            }
        };

        let center = location.position.coords;
        let places = self.finder.find(center, Selection::All).await;

        Ok(MapReport {
            identity,
            location,
            places: Some(places),
            selection: Selection::All,
            center,
            zoom: self.config.map.nearby_zoom,
            radius_m: Some(self.finder.radius_m()),
        })
    }

    /// Strict lookup for the JSON endpoints
    ///
    /// Private or unparseable addresses and provider failures are errors
    /// here rather than a default location.
    pub async fn location(&self, identity: &ClientIdentity) -> Result<LocationResponse> {
        IpLocator::check_configured(&self.config)?;

        if identity.is_private {
            return Err(Error::UnresolvableIdentity(identity.ip_address.clone()));
        }

        let position = self.locator.lookup(&identity.ip_address).await?;
        info!(source = %position.source, "Located {}", identity.ip_address);
        Ok(LocationResponse::new(&identity.ip_address, &position))
    }

    /// Report for one address outside of any request, used by the CLI
    pub async fn locate(&self, ip: &str, nearby: bool) -> Result<MapReport> {
        let identity = ClientIdentity::new(ip);
        if !nearby {
            IpLocator::check_configured(&self.config)?;
            let location = self.locate_identity(&identity).await?;
            let center = location.position.coords;
            return Ok(MapReport {
                identity,
                location,
                places: None,
                selection: self.config.places.selection,
                center,
                zoom: self.config.map.zoom,
                radius_m: None,
            });
        }
        self.map_page(identity, None).await
    }

    async fn locate_identity(&self, identity: &ClientIdentity) -> Result<LocationOutcome> {
        if identity.is_private {
            return match self.config.client.private_ip_policy {
                PrivateIpPolicy::Reject => {
                    info!("Rejecting private client address {}", identity.ip_address);
                    Err(Error::UnresolvableIdentity(identity.ip_address.clone()))
                }
                PrivateIpPolicy::SkipLookup => {
                    debug!("Private client address {}, using default", identity.ip_address);
                    Ok(LocationOutcome::skipped())
                }
            };
        }

        IpLocator::check_configured(&self.config)?;
        Ok(self.locator.locate(&identity.ip_address).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use crate::geo::GeoProviderKind;
    use crate::places::PlacesProviderKind;
    use crate::testing::{offline_config, spawn_upstream};
    use axum::{
        routing::{get, post},
        Json, Router,
    };
    use serde_json::json;

    async fn mocked_config() -> Config {
        let ipapi = Router::new().route(
            "/:ip/json/",
            get(|| async {
                Json(json!({
                    "latitude": -23.5505,
                    "longitude": -46.6333,
                    "city": "São Paulo",
                    "country_name": "Brazil"
                }))
            }),
        );
        let overpass = Router::new().route(
            "/",
            post(|| async {
                Json(json!({"elements": [
                    {"lat": -23.5510, "lon": -46.6333, "tags": {"name": "Motel Alpha"}},
                    {"lat": -23.5600, "lon": -46.6333, "tags": {"name": "Motel Beta"}}
                ]}))
            }),
        );

        let mut config = offline_config();
        config.endpoints.ipapi = spawn_upstream(ipapi).await;
        config.endpoints.overpass = spawn_upstream(overpass).await;
        config
    }

    #[tokio::test]
    async fn test_map_page_centers_on_second_closest() {
        let pipeline = MapPipeline::new(mocked_config().await).unwrap();
        let report = pipeline
            .map_page(ClientIdentity::new("203.0.113.5"), None)
            .await
            .unwrap();

        assert!(report.location.resolved);
        let places = report.places.unwrap();
        assert_eq!(places.candidates.len(), 1);
        assert_eq!(places.candidates[0].name, "Motel Beta");
        assert_eq!(report.center, Coordinates::new(-23.56, -46.6333));
        assert_eq!(report.zoom, 15);
    }

    #[tokio::test]
    async fn test_map_page_private_address_skips_lookup() {
        // Unreachable endpoints: any outbound call would fail the places stage
        let pipeline = MapPipeline::new(offline_config()).unwrap();
        let report = pipeline
            .map_page(ClientIdentity::new("192.168.1.5"), None)
            .await
            .unwrap();

        assert!(!report.location.resolved);
        assert!(report.location.error.is_none());
        assert_eq!(report.location.position.coords, Coordinates::fallback());
        assert!(report.places.is_none());
        assert_eq!(report.center, Coordinates::fallback());
    }

    #[tokio::test]
    async fn test_map_page_private_address_rejected() {
        let mut config = offline_config();
        config.client.private_ip_policy = PrivateIpPolicy::Reject;
        let pipeline = MapPipeline::new(config).unwrap();

        let result = pipeline.map_page(ClientIdentity::new("10.0.0.7"), None).await;
        assert!(matches!(result, Err(Error::UnresolvableIdentity(ip)) if ip == "10.0.0.7"));
    }

    #[tokio::test]
    async fn test_map_page_geolocation_failure_uses_default() {
        let pipeline = MapPipeline::new(offline_config()).unwrap();
        let report = pipeline
            .map_page(ClientIdentity::new("203.0.113.5"), None)
            .await
            .unwrap();

        assert!(!report.location.resolved);
        assert!(report.location.error.is_some());
        assert_eq!(report.center, Coordinates::fallback());
        assert!(report.places.is_none());
    }

    #[tokio::test]
    async fn test_map_page_missing_places_key() {
        let mut config = offline_config();
        config.places.provider = PlacesProviderKind::Google;
        let pipeline = MapPipeline::new(config).unwrap();

        let result = pipeline.map_page(ClientIdentity::new("203.0.113.5"), None).await;
        assert!(matches!(
            result,
            Err(Error::Provider(ProviderError::MissingKey("google_places")))
        ));
    }

    #[tokio::test]
    async fn test_map_page_with_provided_coordinates() {
        let pipeline = MapPipeline::new(mocked_config().await).unwrap();
        let coords = Coordinates::new(-23.5505, -46.6333);
        let report = pipeline
            .map_page(ClientIdentity::new("192.168.1.5"), Some(coords))
            .await
            .unwrap();

        assert!(report.location.resolved);
        assert_eq!(report.location.position.source, "query");
        assert!(report.places.is_some());
    }

    #[tokio::test]
    async fn test_nearby_lists_all_with_radius() {
        let pipeline = MapPipeline::new(mocked_config().await).unwrap();
        let coords = Coordinates::new(-23.5505, -46.6333);
        let report = pipeline
            .nearby(ClientIdentity::new("203.0.113.5"), Some(coords))
            .await
            .unwrap();

        assert_eq!(report.center, coords);
        assert_eq!(report.zoom, 12);
        assert_eq!(report.radius_m, Some(50_000));
        let names: Vec<_> = report
            .places
            .unwrap()
            .candidates
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Motel Alpha", "Motel Beta"]);
    }

    #[tokio::test]
    async fn test_nearby_out_of_range_uses_default() {
        let pipeline = MapPipeline::new(mocked_config().await).unwrap();
        let report = pipeline
            .nearby(ClientIdentity::new("203.0.113.5"), Some(Coordinates::new(95.0, 10.0)))
            .await
            .unwrap();
        assert_eq!(report.center, Coordinates::fallback());
    }

    #[tokio::test]
    async fn test_location_strict_errors() {
        let pipeline = MapPipeline::new(offline_config()).unwrap();

        let private = pipeline.location(&ClientIdentity::new("127.0.0.1")).await;
        assert!(matches!(private, Err(Error::UnresolvableIdentity(_))));

        let garbage = pipeline.location(&ClientIdentity::new("not-an-ip")).await;
        assert!(matches!(garbage, Err(Error::UnresolvableIdentity(_))));

        let unreachable = pipeline.location(&ClientIdentity::new("203.0.113.5")).await;
        assert!(matches!(
            unreachable,
            Err(Error::Provider(ProviderError::Transport(_)))
        ));
    }

    #[tokio::test]
    async fn test_location_missing_key_before_lookup() {
        let mut config = offline_config();
        config.geolocation.provider = GeoProviderKind::IpGeolocation;
        let pipeline = MapPipeline::new(config).unwrap();

        // Checked before the address is even classified
        let result = pipeline.location(&ClientIdentity::new("127.0.0.1")).await;
        assert!(matches!(
            result,
            Err(Error::Provider(ProviderError::MissingKey("ipgeolocation")))
        ));
    }

    #[tokio::test]
    async fn test_locate_without_places() {
        let pipeline = MapPipeline::new(mocked_config().await).unwrap();
        let report = pipeline.locate("203.0.113.5", false).await.unwrap();
        assert!(report.places.is_none());
        assert_eq!(report.location.position.city.as_deref(), Some("São Paulo"));
    }
}
