use crate::config::ScraperConfig;
use crate::models::PropertyRecord;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

/// Address components resolved from a coordinate pair. Missing sub-fields
/// come back as empty strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAddress {
    pub address: String,
    pub city: String,
    pub neighborhood: String,
}

/// Capability to turn (lat, lon) into address components.
#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    async fn reverse(&self, latitude: f64, longitude: f64) -> Result<ResolvedAddress>;
}

/// Reverse geocoder backed by the Nominatim public endpoint.
pub struct NominatimClient {
    client: Client,
    endpoint: String,
    zoom: u8,
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    address: ReverseAddress,
}

#[derive(Debug, Default, Deserialize)]
struct ReverseAddress {
    road: Option<String>,
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    suburb: Option<String>,
    neighbourhood: Option<String>,
}

impl NominatimClient {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.http_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .context("Failed to create geocoding client")?;
        Ok(Self {
            client,
            endpoint: config.geocode_url.clone(),
            zoom: config.geocode_zoom,
        })
    }
}

#[async_trait]
impl ReverseGeocoder for NominatimClient {
    async fn reverse(&self, latitude: f64, longitude: f64) -> Result<ResolvedAddress> {
        debug!("Reverse geocoding ({latitude}, {longitude})");

        let response: ReverseResponse = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("format", "json".to_string()),
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
                ("zoom", self.zoom.to_string()),
                ("addressdetails", "1".to_string()),
            ])
            .send()
            .await
            .context("Reverse geocoding request failed")?
            .error_for_status()
            .context("Reverse geocoding returned an error status")?
            .json()
            .await
            .context("Failed to parse reverse geocoding response")?;

        let addr = response.address;
        Ok(ResolvedAddress {
            address: addr.road.unwrap_or_default(),
            city: addr
                .city
                .or(addr.town)
                .or(addr.village)
                .unwrap_or_default(),
            neighborhood: addr.suburb.or(addr.neighbourhood).unwrap_or_default(),
        })
    }
}

/// Fill in the geocoded fields of a record whose coordinates were found.
/// A lookup failure is logged and leaves all three fields absent; it never
/// fails the property extraction.
pub async fn enrich(geocoder: &dyn ReverseGeocoder, record: &mut PropertyRecord) {
    let (Some(latitude), Some(longitude)) = (record.latitude, record.longitude) else {
        return;
    };

    match geocoder.reverse(latitude, longitude).await {
        Ok(resolved) => {
            record.address = Some(resolved.address);
            record.city = Some(resolved.city);
            record.neighborhood = Some(resolved.neighborhood);
        }
        Err(e) => {
            warn!("Reverse geocoding of ({latitude}, {longitude}) failed: {e:#}");
        }
    }
}
