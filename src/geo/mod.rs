use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

const EARTH_RADIUS_KM: f64 = 6_371.0;

#[derive(Debug, Clone, Copy)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lon = (b.lon - a.lon).to_radians();

    let sin_lat = (delta_lat / 2.0).sin();
    let sin_lon = (delta_lon / 2.0).sin();

    let haversine = sin_lat * sin_lat + lat1.cos() * lat2.cos() * sin_lon * sin_lon;
    let central_angle = 2.0 * haversine.sqrt().asin();

    EARTH_RADIUS_KM * central_angle
}

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("address '{0}' could not be resolved")]
    UnknownAddress(String),

    #[error("geocoder request failed: {0}")]
    Request(String),
}

/// Converts two free-text addresses into a travel distance in kilometers.
/// A failure is terminal for the current request; there is no retry policy.
#[async_trait]
pub trait DistanceLookup: Send + Sync {
    async fn distance_km(&self, from: &str, to: &str) -> Result<u32, GeocodeError>;
}

/// Nominatim-backed lookup: geocode both addresses, take the first hit each,
/// then the great-circle distance rounded to the nearest kilometer.
pub struct NominatimLookup {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct NominatimHit {
    lat: String,
    lon: String,
}

impl NominatimLookup {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("delivery-hub/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self { client, base_url })
    }

    async fn geocode(&self, address: &str) -> Result<GeoPoint, GeocodeError> {
        let url = format!("{}/search", self.base_url.trim_end_matches('/'));
        let hits: Vec<NominatimHit> = self
            .client
            .get(&url)
            .query(&[("q", address), ("format", "json")])
            .send()
            .await
            .map_err(|err| GeocodeError::Request(err.to_string()))?
            .error_for_status()
            .map_err(|err| GeocodeError::Request(err.to_string()))?
            .json()
            .await
            .map_err(|err| GeocodeError::Request(err.to_string()))?;

        let hit = hits
            .first()
            .ok_or_else(|| GeocodeError::UnknownAddress(address.to_string()))?;

        let lat = hit
            .lat
            .parse::<f64>()
            .map_err(|_| GeocodeError::UnknownAddress(address.to_string()))?;
        let lon = hit
            .lon
            .parse::<f64>()
            .map_err(|_| GeocodeError::UnknownAddress(address.to_string()))?;

        Ok(GeoPoint { lat, lon })
    }
}

#[async_trait]
impl DistanceLookup for NominatimLookup {
    async fn distance_km(&self, from: &str, to: &str) -> Result<u32, GeocodeError> {
        let a = self.geocode(from).await?;
        let b = self.geocode(to).await?;

        Ok(haversine_km(a, b).round() as u32)
    }
}

/// Lookup double returning the same distance for every address pair.
pub struct FixedDistance(pub u32);

#[async_trait]
impl DistanceLookup for FixedDistance {
    async fn distance_km(&self, _from: &str, _to: &str) -> Result<u32, GeocodeError> {
        Ok(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::{haversine_km, GeoPoint};

    #[test]
    fn zero_distance_for_same_point() {
        let p = GeoPoint {
            lat: 55.7558,
            lon: 37.6173,
        };
        let distance = haversine_km(p, p);
        assert!(distance < 1e-9);
    }

    #[test]
    fn moscow_to_paris_is_around_2487_km() {
        let moscow = GeoPoint {
            lat: 55.7558,
            lon: 37.6173,
        };
        let paris = GeoPoint {
            lat: 48.8566,
            lon: 2.3522,
        };
        let distance = haversine_km(moscow, paris);
        assert!((distance - 2487.0).abs() < 10.0);
    }
}
