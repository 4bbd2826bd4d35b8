//! Geographic primitives: the monitored bounding box, containment tests and
//! distance math.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Mean length of one degree of latitude, in kilometers.
const KM_PER_DEGREE: f64 = 111.0;

/// Earth radius used for great-circle distances, in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// An area definition that fails validation.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum InvalidArea {
    /// A latitude lies outside [-90, 90].
    #[error("latitude {0} is outside the valid range [-90, 90]")]
    LatitudeOutOfRange(f64),

    /// A longitude lies outside [-180, 180].
    #[error("longitude {0} is outside the valid range [-180, 180]")]
    LongitudeOutOfRange(f64),

    /// The northern edge does not lie strictly north of the southern edge.
    #[error("north latitude must be greater than south latitude")]
    InvertedLatitudes,

    /// The western edge does not lie strictly west of the eastern edge.
    #[error("west longitude must be less than east longitude")]
    InvertedLongitudes,
}

/// An axis-aligned bounding box in latitude/longitude degrees.
///
/// Boxes cannot cross the ±180° meridian; `west_lon < east_lon` is required.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Northern edge, degrees latitude.
    pub north_lat: f64,
    /// Southern edge, degrees latitude.
    pub south_lat: f64,
    /// Eastern edge, degrees longitude.
    pub east_lon: f64,
    /// Western edge, degrees longitude.
    pub west_lon: f64,
}

/// Approximate physical dimensions of a bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoxDimensions {
    /// East-west extent in kilometers.
    pub width_km: f64,
    /// North-south extent in kilometers.
    pub height_km: f64,
    /// Surface area in square kilometers.
    pub area_km2: f64,
}

impl BoundingBox {
    /// Creates a validated bounding box.
    pub fn new(
        north_lat: f64,
        south_lat: f64,
        east_lon: f64,
        west_lon: f64,
    ) -> Result<Self, InvalidArea> {
        let bounds = Self { north_lat, south_lat, east_lon, west_lon };
        bounds.validate()?;
        Ok(bounds)
    }

    /// Checks the box invariants: latitudes in [-90, 90], longitudes in
    /// [-180, 180], north > south and west < east.
    pub fn validate(&self) -> Result<(), InvalidArea> {
        for lat in [self.north_lat, self.south_lat] {
            if !(-90.0..=90.0).contains(&lat) {
                return Err(InvalidArea::LatitudeOutOfRange(lat));
            }
        }
        for lon in [self.east_lon, self.west_lon] {
            if !(-180.0..=180.0).contains(&lon) {
                return Err(InvalidArea::LongitudeOutOfRange(lon));
            }
        }
        if self.north_lat <= self.south_lat {
            return Err(InvalidArea::InvertedLatitudes);
        }
        if self.west_lon >= self.east_lon {
            return Err(InvalidArea::InvertedLongitudes);
        }
        Ok(())
    }

    /// Tests whether a position falls inside the box, boundaries inclusive.
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        self.south_lat <= latitude
            && latitude <= self.north_lat
            && self.west_lon <= longitude
            && longitude <= self.east_lon
    }

    /// Midpoint of the box.
    pub fn center(&self) -> (f64, f64) {
        ((self.north_lat + self.south_lat) / 2.0, (self.east_lon + self.west_lon) / 2.0)
    }

    /// Estimates the box dimensions with a flat-earth approximation scaled by
    /// the cosine of the mean latitude. Good enough for small-to-regional
    /// boxes; no ellipsoidal correction.
    pub fn dimensions(&self) -> BoxDimensions {
        let mean_lat = (self.north_lat + self.south_lat) / 2.0;
        let height_km = (self.north_lat - self.south_lat) * KM_PER_DEGREE;
        let width_km = (self.east_lon - self.west_lon) * KM_PER_DEGREE * mean_lat.to_radians().cos();
        BoxDimensions {
            width_km: width_km.abs(),
            height_km: height_km.abs(),
            area_km2: (height_km * width_km).abs(),
        }
    }
}

/// Great-circle distance between two positions, in kilometers.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}
