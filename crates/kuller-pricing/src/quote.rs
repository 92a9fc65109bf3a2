//! Quote service: input validation, latest-observation lookup, engine call.

use std::sync::Arc;

use thiserror::Error;

use kuller_weather::{ObservationStore, StoreError};

use crate::engine::{self, ForbiddenReason};
use crate::fees::BaseFeeTable;
use crate::vehicle::VehicleClass;

/// Errors from a fee quote request.
///
/// The variants are the tagged alternatives of one operation: invalid input
/// and missing data are failures, while `Forbidden` is a valid computation
/// that hit a hard safety rule — callers must be able to tell them apart.
#[derive(Debug, Error)]
pub enum QuoteError {
    #[error("Invalid city: {0}. Valid cities are: Tallinn, Tartu, Pärnu")]
    InvalidCity(String),

    #[error("Invalid vehicle type: {0}. Valid vehicle types are: Car, Scooter, Bike")]
    InvalidVehicle(String),

    #[error("No weather data available for city: {0}")]
    NoObservation(String),

    #[error("Usage of selected vehicle type is forbidden: {0}")]
    Forbidden(ForbiddenReason),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl QuoteError {
    /// Boundary-ready message for whatever transport sits above the core.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidCity(_) | Self::InvalidVehicle(_) => self.to_string(),
            Self::NoObservation(city) => {
                format!("Weather data for {city} is not available yet. Try again shortly.")
            }
            Self::Forbidden(_) => "Usage of selected vehicle type is forbidden".to_string(),
            Self::Store(_) => "A data operation failed. Please try again.".to_string(),
        }
    }
}

/// Quotes delivery fees against the latest stored observations.
pub struct QuoteService {
    store: Arc<ObservationStore>,
    fees: BaseFeeTable,
}

impl QuoteService {
    pub fn new(store: Arc<ObservationStore>) -> Self {
        Self {
            store,
            fees: BaseFeeTable::standard(),
        }
    }

    /// Quote the delivery fee for a city and vehicle type.
    pub fn quote_fee(&self, city: &str, vehicle: &str) -> Result<f64, QuoteError> {
        tracing::info!("Quoting delivery fee for city: {city}, vehicle type: {vehicle}");

        if !self.fees.is_known_city(city) {
            return Err(QuoteError::InvalidCity(city.to_string()));
        }

        let vehicle_class = VehicleClass::from_name(vehicle)
            .ok_or_else(|| QuoteError::InvalidVehicle(vehicle.to_string()))?;

        let base_fee = self
            .fees
            .base_fee(city, vehicle_class)
            .ok_or_else(|| QuoteError::InvalidCity(city.to_string()))?;

        let observation = self
            .store
            .latest_for_city(city)?
            .ok_or_else(|| QuoteError::NoObservation(city.to_string()))?;

        tracing::info!(
            "Latest observation for {city}: {:.1}°C, wind {:.1} m/s, phenomenon: {:?}",
            observation.air_temperature,
            observation.wind_speed,
            observation.phenomenon
        );

        let fee = engine::quote_fee(base_fee, vehicle_class, &observation).map_err(|reason| {
            tracing::warn!("Usage of {vehicle_class} in {city} is forbidden: {reason}");
            QuoteError::Forbidden(reason)
        })?;

        tracing::info!("Total delivery fee for {city}/{vehicle_class}: {fee:.2} €");
        Ok(fee)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use kuller_weather::Observation;

    fn service_with(observations: &[Observation]) -> QuoteService {
        let store = Arc::new(ObservationStore::in_memory().unwrap());
        store.append(observations).unwrap();
        QuoteService::new(store)
    }

    fn observation(city: &str, temperature: f64, wind_speed: f64, phenomenon: &str) -> Observation {
        Observation {
            station: city.to_string(),
            wmo_code: String::new(),
            air_temperature: temperature,
            wind_speed,
            phenomenon: phenomenon.to_string(),
            timestamp: Utc::now(),
            city: city.to_string(),
        }
    }

    #[test]
    fn test_quote_valid_request() {
        let service = service_with(&[observation("Tartu", -2.1, 4.7, "Light snow shower")]);
        assert_eq!(service.quote_fee("Tartu", "Bike").unwrap(), 4.0);
    }

    #[test]
    fn test_quote_unknown_city() {
        let service = service_with(&[]);
        let result = service.quote_fee("Narva", "Car");
        assert!(matches!(result, Err(QuoteError::InvalidCity(_))));
    }

    #[test]
    fn test_quote_unknown_vehicle() {
        let service = service_with(&[observation("Tallinn", 5.0, 3.0, "Clear")]);
        let result = service.quote_fee("Tallinn", "Tractor");
        assert!(matches!(result, Err(QuoteError::InvalidVehicle(_))));
    }

    #[test]
    fn test_city_validated_before_vehicle() {
        let service = service_with(&[]);
        let result = service.quote_fee("Narva", "Tractor");
        assert!(matches!(result, Err(QuoteError::InvalidCity(_))));
    }

    #[test]
    fn test_quote_before_first_fetch_cycle() {
        let service = service_with(&[]);
        let result = service.quote_fee("Tallinn", "Car");
        assert!(matches!(result, Err(QuoteError::NoObservation(_))));
    }

    #[test]
    fn test_forbidden_is_distinct_from_invalid_input() {
        let service = service_with(&[observation("Tallinn", 5.0, 21.0, "Clear")]);
        let result = service.quote_fee("Tallinn", "Bike");
        assert!(matches!(result, Err(QuoteError::Forbidden(_))));
    }

    #[test]
    fn test_quote_uses_latest_observation() {
        let store = Arc::new(ObservationStore::in_memory().unwrap());
        let mut old = observation("Tartu", 5.0, 3.0, "Clear");
        old.timestamp = Utc::now() - chrono::Duration::hours(2);
        store.append(&[old]).unwrap();
        store
            .append(&[observation("Tartu", -2.1, 4.7, "Light snow shower")])
            .unwrap();

        let service = QuoteService::new(store);
        // Only the newer, snowy observation yields 4.0
        assert_eq!(service.quote_fee("Tartu", "Bike").unwrap(), 4.0);
    }

    #[test]
    fn test_user_messages() {
        let err = QuoteError::InvalidCity("Narva".to_string());
        assert!(err.user_message().contains("Narva"));

        let err = QuoteError::Forbidden(ForbiddenReason::WindSpeed { wind_speed: 21.0 });
        assert!(err.user_message().contains("forbidden"));

        let err = QuoteError::NoObservation("Tartu".to_string());
        assert!(err.user_message().contains("Tartu"));
    }
}
