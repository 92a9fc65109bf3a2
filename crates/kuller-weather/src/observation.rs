use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A monitored delivery city and the weather station that covers it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct City {
    pub name: &'static str,
    pub station: &'static str,
}

/// Cities the service quotes fees for. Reference data, fixed at startup.
pub const MONITORED_CITIES: [City; 3] = [
    City {
        name: "Tallinn",
        station: "Tallinn-Harku",
    },
    City {
        name: "Tartu",
        station: "Tartu-Tõravere",
    },
    City {
        name: "Pärnu",
        station: "Pärnu",
    },
];

/// Look up the monitored city covered by a station, if any.
pub fn city_for_station(station: &str) -> Option<&'static City> {
    MONITORED_CITIES.iter().find(|c| c.station == station)
}

/// Look up a monitored city by its name (exact match).
pub fn city_by_name(name: &str) -> Option<&'static City> {
    MONITORED_CITIES.iter().find(|c| c.name == name)
}

/// One weather reading for a monitored city.
///
/// Immutable once stored; the store only ever appends new readings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Name of the weather station
    pub station: String,
    /// WMO code of the station (may be empty)
    pub wmo_code: String,
    /// Air temperature in degrees Celsius
    pub air_temperature: f64,
    /// Wind speed in meters per second
    pub wind_speed: f64,
    /// Free-text weather phenomenon description (may be empty)
    pub phenomenon: String,
    /// Timestamp of the observation batch
    pub timestamp: DateTime<Utc>,
    /// Monitored city this station covers
    pub city: String,
}
