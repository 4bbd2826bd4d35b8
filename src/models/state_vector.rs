//! The `AircraftStateVector` model: one aircraft's reported state from the
//! flight feed, valid for a single poll cycle.

use serde_json::Value;

/// A single aircraft state as reported by the feed.
///
/// The feed encodes states as heterogeneous positional arrays; every field
/// except the aircraft id and the ground flag may be absent. Absent values
/// are kept as `None` rather than sentinel zeros so that "unknown" and
/// "zero" stay distinguishable downstream.
#[derive(Debug, Clone, PartialEq)]
pub struct AircraftStateVector {
    /// ICAO24-style transponder address.
    pub aircraft_id: String,
    /// Flight callsign, trimmed; `None` when blank.
    pub callsign: Option<String>,
    /// Country the aircraft is registered in.
    pub origin_country: Option<String>,
    /// WGS-84 longitude in degrees.
    pub longitude: Option<f64>,
    /// WGS-84 latitude in degrees.
    pub latitude: Option<f64>,
    /// Barometric altitude in meters.
    pub baro_altitude: Option<f64>,
    /// Whether the aircraft is reported on the ground.
    pub on_ground: bool,
    /// Ground speed in meters per second.
    pub velocity: Option<f64>,
    /// Track over ground in degrees clockwise from north.
    pub true_track: Option<f64>,
    /// Vertical rate in meters per second; positive is climbing.
    pub vertical_rate: Option<f64>,
}

impl AircraftStateVector {
    /// Parses one positional feed row.
    ///
    /// Consumed indices: [0]=icao24, [1]=callsign, [2]=origin_country,
    /// [5]=longitude, [6]=latitude, [7]=baro_altitude, [8]=on_ground,
    /// [9]=velocity, [10]=true_track, [11]=vertical_rate.
    ///
    /// Returns `None` for rows that are unusable: shorter than nine elements
    /// (no position/ground-status slots), missing the aircraft id, or with a
    /// non-boolean ground flag. A present-but-null position is still usable;
    /// the scheduler skips such flights at the containment check instead.
    pub fn from_feed_row(row: &[Value]) -> Option<Self> {
        if row.len() < 9 {
            return None;
        }

        let aircraft_id = row.first()?.as_str()?.trim();
        if aircraft_id.is_empty() {
            return None;
        }
        let on_ground = row.get(8)?.as_bool()?;

        Some(Self {
            aircraft_id: aircraft_id.to_string(),
            callsign: string_field(row, 1),
            origin_country: string_field(row, 2),
            longitude: float_field(row, 5),
            latitude: float_field(row, 6),
            baro_altitude: float_field(row, 7),
            on_ground,
            velocity: float_field(row, 9),
            true_track: float_field(row, 10),
            vertical_rate: float_field(row, 11),
        })
    }

    /// The reported position, when both coordinates are known.
    pub fn position(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }
}

fn string_field(row: &[Value], index: usize) -> Option<String> {
    let s = row.get(index)?.as_str()?.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

fn float_field(row: &[Value], index: usize) -> Option<f64> {
    row.get(index)?.as_f64()
}
