//! Pure fee rule engine.
//!
//! `quote_fee` is referentially transparent: same base fee, vehicle, and
//! observation always produce the same result, and nothing here touches
//! storage or the clock. Forbidden checks run before any fee math.

use kuller_weather::Observation;

use crate::phenomenon;
use crate::vehicle::VehicleClass;

/// Wind speed above which bikes are barred (m/s).
pub const MAX_BIKE_WIND_SPEED: f64 = 20.0;

/// Why a vehicle is barred under the current conditions.
#[derive(Debug, Clone, PartialEq)]
pub enum ForbiddenReason {
    /// Wind speed rule for bikes
    WindSpeed { wind_speed: f64 },
    /// Hazardous phenomenon rule for bikes and scooters
    Phenomenon { phenomenon: String },
}

impl std::fmt::Display for ForbiddenReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WindSpeed { wind_speed } => write!(
                f,
                "wind speed {:.1} m/s is above the {:.1} m/s limit",
                wind_speed, MAX_BIKE_WIND_SPEED
            ),
            Self::Phenomenon { phenomenon } => {
                write!(f, "hazardous weather phenomenon: {}", phenomenon)
            }
        }
    }
}

/// Quote a delivery fee from a base fee, vehicle class, and observation.
///
/// The caller is responsible for having resolved `base_fee` from a valid
/// (city, vehicle) pair. A forbidden outcome short-circuits fee
/// computation entirely.
pub fn quote_fee(
    base_fee: f64,
    vehicle: VehicleClass,
    observation: &Observation,
) -> Result<f64, ForbiddenReason> {
    if let Some(reason) = forbidden_reason(vehicle, observation) {
        return Err(reason);
    }

    let fee = base_fee
        + temperature_surcharge(vehicle, observation.air_temperature)
        + wind_surcharge(vehicle, observation.wind_speed)
        + phenomenon_surcharge(vehicle, &observation.phenomenon);

    Ok(fee)
}

fn forbidden_reason(vehicle: VehicleClass, observation: &Observation) -> Option<ForbiddenReason> {
    if vehicle == VehicleClass::Bike && observation.wind_speed > MAX_BIKE_WIND_SPEED {
        return Some(ForbiddenReason::WindSpeed {
            wind_speed: observation.wind_speed,
        });
    }

    if vehicle.is_weather_sensitive() && phenomenon::is_forbidden(&observation.phenomenon) {
        return Some(ForbiddenReason::Phenomenon {
            phenomenon: observation.phenomenon.clone(),
        });
    }

    None
}

fn temperature_surcharge(vehicle: VehicleClass, temperature: f64) -> f64 {
    if !vehicle.is_weather_sensitive() {
        return 0.0;
    }
    if temperature < -10.0 {
        1.0
    } else if temperature < 0.0 {
        0.5
    } else {
        0.0
    }
}

fn wind_surcharge(vehicle: VehicleClass, wind_speed: f64) -> f64 {
    if vehicle == VehicleClass::Bike && (10.0..=20.0).contains(&wind_speed) {
        0.5
    } else {
        0.0
    }
}

fn phenomenon_surcharge(vehicle: VehicleClass, phenomenon: &str) -> f64 {
    if !vehicle.is_weather_sensitive() {
        return 0.0;
    }
    phenomenon::surcharge(phenomenon)
        .map(|s| s.amount())
        .unwrap_or(0.0)
}
