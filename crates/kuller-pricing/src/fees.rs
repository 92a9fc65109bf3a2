//! Regional base fees.
//!
//! Static reference data built once at startup; every (city, vehicle) pair
//! has exactly one non-negative entry.

use std::collections::HashMap;

use crate::vehicle::VehicleClass;

/// Standard fees per city as (city, car, scooter, bike).
const STANDARD_FEES: [(&str, f64, f64, f64); 3] = [
    ("Tallinn", 4.0, 3.5, 3.0),
    ("Tartu", 3.5, 3.0, 2.5),
    ("Pärnu", 3.0, 2.5, 2.0),
];

/// Immutable (city, vehicle) -> base fee lookup.
#[derive(Debug, Clone)]
pub struct BaseFeeTable {
    fees: HashMap<(String, VehicleClass), f64>,
}

impl BaseFeeTable {
    /// The standard regional fee table.
    pub fn standard() -> Self {
        let mut fees = HashMap::new();
        for (city, car, scooter, bike) in STANDARD_FEES {
            fees.insert((city.to_string(), VehicleClass::Car), car);
            fees.insert((city.to_string(), VehicleClass::Scooter), scooter);
            fees.insert((city.to_string(), VehicleClass::Bike), bike);
        }
        Self { fees }
    }

    /// Base fee for a (city, vehicle) pair.
    pub fn base_fee(&self, city: &str, vehicle: VehicleClass) -> Option<f64> {
        self.fees.get(&(city.to_string(), vehicle)).copied()
    }

    /// Whether the city appears in the table (exact name match).
    pub fn is_known_city(&self, city: &str) -> bool {
        VehicleClass::ALL
            .iter()
            .any(|v| self.fees.contains_key(&(city.to_string(), *v)))
    }

}

impl Default for BaseFeeTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kuller_weather::MONITORED_CITIES;

    #[test]
    fn test_every_pair_has_exactly_one_entry() {
        let table = BaseFeeTable::standard();
        for city in &MONITORED_CITIES {
            for vehicle in VehicleClass::ALL {
                let fee = table.base_fee(city.name, vehicle);
                assert!(
                    fee.is_some(),
                    "missing base fee for {}/{}",
                    city.name,
                    vehicle
                );
            }
        }
    }

    #[test]
    fn test_fees_are_non_negative() {
        let table = BaseFeeTable::standard();
        for ((city, vehicle), fee) in &table.fees {
            assert!(*fee >= 0.0, "negative fee for {city}/{vehicle}");
        }
    }

    #[test]
    fn test_standard_amounts() {
        let table = BaseFeeTable::standard();
        assert_eq!(table.base_fee("Tallinn", VehicleClass::Car), Some(4.0));
        assert_eq!(table.base_fee("Tartu", VehicleClass::Bike), Some(2.5));
        assert_eq!(table.base_fee("Pärnu", VehicleClass::Scooter), Some(2.5));
    }

    #[test]
    fn test_unknown_city() {
        let table = BaseFeeTable::standard();
        assert!(!table.is_known_city("Narva"));
        assert!(!table.is_known_city("tallinn"));
        assert_eq!(table.base_fee("Narva", VehicleClass::Car), None);
    }
}
