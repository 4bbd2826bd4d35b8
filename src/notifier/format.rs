//! Renders the flight alert text sent to subscribers.

use chrono::{DateTime, Utc};

use crate::{
    geo::{BoundingBox, haversine_km},
    models::AircraftStateVector,
};

const METERS_TO_FEET: f64 = 3.28084;
const MPS_TO_KMH: f64 = 3.6;

/// Formats one flight alert.
///
/// Absent feed fields render as "unknown" so that a missing altitude never
/// reads as an altitude of zero.
pub fn format_flight_alert(
    bounds: &BoundingBox,
    state: &AircraftStateVector,
    now: DateTime<Utc>,
) -> String {
    let callsign = state.callsign.as_deref().unwrap_or("unknown");
    let origin = state.origin_country.as_deref().unwrap_or("unknown");

    let (position, distance) = match state.position() {
        Some((lat, lon)) => {
            let (center_lat, center_lon) = bounds.center();
            (
                format!("{:.4}, {:.4}", lat, lon),
                format!("{:.1} km", haversine_km(center_lat, center_lon, lat, lon)),
            )
        }
        None => ("unknown".to_string(), "unknown".to_string()),
    };

    let altitude = state
        .baro_altitude
        .map(|meters| format!("{} ft", (meters * METERS_TO_FEET).round() as i64))
        .unwrap_or_else(|| "unknown".to_string());
    let speed = state
        .velocity
        .map(|mps| format!("{} km/h", (mps * MPS_TO_KMH).round() as i64))
        .unwrap_or_else(|| "unknown".to_string());
    let heading = state
        .true_track
        .map(|deg| format!("{}°", deg.round() as i64))
        .unwrap_or_else(|| "unknown".to_string());
    let trend = match state.vertical_rate {
        Some(rate) if rate > 1.0 => "climbing",
        Some(rate) if rate < -1.0 => "descending",
        Some(_) => "level flight",
        None => "unknown",
    };

    format!(
        "Flight alert: {callsign} ({aircraft_id}) is over your monitored area\n\
         Origin country: {origin}\n\
         Position: {position}\n\
         Altitude: {altitude} | Speed: {speed} | Heading: {heading} | {trend}\n\
         Distance from area center: {distance}\n\
         Seen at {time} UTC",
        aircraft_id = state.aircraft_id,
        time = now.format("%H:%M:%S"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::StateVectorBuilder;

    fn jaipur_box() -> BoundingBox {
        BoundingBox::new(26.95, 26.87, 75.82, 75.74).unwrap()
    }

    #[test]
    fn renders_all_known_fields() {
        let state = StateVectorBuilder::new("800c42")
            .callsign("AIC442")
            .origin_country("India")
            .position(26.90, 75.78)
            .baro_altitude(11277.6)
            .velocity(236.1)
            .true_track(274.5)
            .vertical_rate(5.2)
            .build();

        let text = format_flight_alert(&jaipur_box(), &state, Utc::now());

        assert!(text.contains("AIC442 (800c42)"));
        assert!(text.contains("Origin country: India"));
        assert!(text.contains("Position: 26.9000, 75.7800"));
        assert!(text.contains("Altitude: 37000 ft"));
        assert!(text.contains("Speed: 850 km/h"));
        assert!(text.contains("Heading: 275°"));
        assert!(text.contains("climbing"));
        assert!(text.contains("Distance from area center:"));
    }

    #[test]
    fn absent_fields_render_as_unknown() {
        let state = StateVectorBuilder::new("800c42").position(26.90, 75.78).build();

        let text = format_flight_alert(&jaipur_box(), &state, Utc::now());

        assert!(text.contains("unknown (800c42)"));
        assert!(text.contains("Origin country: unknown"));
        assert!(text.contains("Altitude: unknown"));
        assert!(text.contains("Speed: unknown"));
        assert!(text.contains("Heading: unknown"));
        // No vertical rate: the trend is unknown, not "level flight".
        assert!(text.contains("| unknown"));
    }

    #[test]
    fn vertical_rate_maps_to_trend() {
        let descending = StateVectorBuilder::new("800c42")
            .position(26.90, 75.78)
            .vertical_rate(-4.0)
            .build();
        let text = format_flight_alert(&jaipur_box(), &descending, Utc::now());
        assert!(text.contains("descending"));

        let level =
            StateVectorBuilder::new("800c42").position(26.90, 75.78).vertical_rate(0.3).build();
        let text = format_flight_alert(&jaipur_box(), &level, Utc::now());
        assert!(text.contains("level flight"));
    }
}
