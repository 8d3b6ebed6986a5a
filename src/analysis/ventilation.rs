//! "Should I open the windows?" advice, gated on outdoor air quality.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ventilation {
    pub should: bool,
    pub reason: &'static str,
}

/// Above this index the windows stay shut regardless of temperature.
pub const MAX_VENTILATION_AQI: f64 = 100.0;

pub fn should_air_out(
    indoor_temp_c: Option<f64>,
    outdoor_temp_c: Option<f64>,
    aqi: Option<f64>,
) -> Ventilation {
    let (Some(indoor), Some(outdoor), Some(aqi)) = (indoor_temp_c, outdoor_temp_c, aqi) else {
        return Ventilation {
            should: false,
            reason: "Insufficient data to recommend",
        };
    };

    if aqi > MAX_VENTILATION_AQI {
        return Ventilation {
            should: false,
            reason: "Air quality outside is poor. Better to keep windows closed.",
        };
    }

    if outdoor < indoor - 10.0 {
        return Ventilation {
            should: false,
            reason: "It's much colder outside—you'll lose too much heat.",
        };
    }

    if aqi < 50.0 && outdoor > 5.0 && outdoor < 25.0 {
        return Ventilation {
            should: true,
            reason: "Perfect conditions! Good air quality and comfortable temperature. Open those windows!",
        };
    }

    Ventilation {
        should: true,
        reason: "Conditions are decent for airing out the house for a short while.",
    }
}
