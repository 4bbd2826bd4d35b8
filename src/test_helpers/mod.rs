//! Builders and fixtures shared by unit and integration tests.

use chrono::Utc;
use serde_json::{Value, json};

use crate::{
    geo::BoundingBox,
    models::{AircraftStateVector, MonitoringArea},
};

/// Builds `MonitoringArea` fixtures. Defaults to an active area over the
/// Jaipur test box (26.95, 26.87, 75.82, 75.74).
pub struct AreaBuilder {
    area: MonitoringArea,
}

impl AreaBuilder {
    /// Starts a builder for the given subscriber.
    pub fn new(subscriber_id: &str) -> Self {
        let bounds = BoundingBox { north_lat: 26.95, south_lat: 26.87, east_lon: 75.82, west_lon: 75.74 };
        Self {
            area: MonitoringArea {
                subscriber_id: subscriber_id.to_string(),
                bounds,
                active: true,
                created_at: Utc::now(),
            },
        }
    }

    /// Overrides the bounding box.
    pub fn bounds(mut self, north: f64, south: f64, east: f64, west: f64) -> Self {
        self.area.bounds =
            BoundingBox { north_lat: north, south_lat: south, east_lon: east, west_lon: west };
        self
    }

    /// Overrides the stored active flag.
    pub fn active(mut self, active: bool) -> Self {
        self.area.active = active;
        self
    }

    /// Finishes the build.
    pub fn build(self) -> MonitoringArea {
        self.area
    }
}

/// Builds `AircraftStateVector` fixtures. Defaults to an airborne aircraft
/// with no position and all kinematic fields unknown.
pub struct StateVectorBuilder {
    state: AircraftStateVector,
}

impl StateVectorBuilder {
    /// Starts a builder for the given ICAO24 address.
    pub fn new(aircraft_id: &str) -> Self {
        Self {
            state: AircraftStateVector {
                aircraft_id: aircraft_id.to_string(),
                callsign: None,
                origin_country: None,
                longitude: None,
                latitude: None,
                baro_altitude: None,
                on_ground: false,
                velocity: None,
                true_track: None,
                vertical_rate: None,
            },
        }
    }

    /// Sets the callsign.
    pub fn callsign(mut self, callsign: &str) -> Self {
        self.state.callsign = Some(callsign.to_string());
        self
    }

    /// Sets the origin country.
    pub fn origin_country(mut self, country: &str) -> Self {
        self.state.origin_country = Some(country.to_string());
        self
    }

    /// Sets the reported position.
    pub fn position(mut self, latitude: f64, longitude: f64) -> Self {
        self.state.latitude = Some(latitude);
        self.state.longitude = Some(longitude);
        self
    }

    /// Sets the ground flag.
    pub fn on_ground(mut self, on_ground: bool) -> Self {
        self.state.on_ground = on_ground;
        self
    }

    /// Sets the barometric altitude in meters.
    pub fn baro_altitude(mut self, meters: f64) -> Self {
        self.state.baro_altitude = Some(meters);
        self
    }

    /// Sets the ground speed in meters per second.
    pub fn velocity(mut self, mps: f64) -> Self {
        self.state.velocity = Some(mps);
        self
    }

    /// Sets the track over ground in degrees.
    pub fn true_track(mut self, degrees: f64) -> Self {
        self.state.true_track = Some(degrees);
        self
    }

    /// Sets the vertical rate in meters per second.
    pub fn vertical_rate(mut self, mps: f64) -> Self {
        self.state.vertical_rate = Some(mps);
        self
    }

    /// Finishes the build.
    pub fn build(self) -> AircraftStateVector {
        self.state
    }
}

/// Builds a full 17-element positional feed row as the OpenSky-style feed
/// reports it.
pub fn feed_row(
    aircraft_id: &str,
    callsign: &str,
    longitude: f64,
    latitude: f64,
    on_ground: bool,
) -> Value {
    json!([
        aircraft_id,
        callsign,
        "India",
        1_699_999_999,
        1_699_999_999,
        longitude,
        latitude,
        11277.6,
        on_ground,
        236.1,
        274.5,
        5.2,
        null,
        11582.4,
        null,
        false,
        0
    ])
}
