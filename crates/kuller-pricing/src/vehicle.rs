use serde::{Deserialize, Serialize};

/// Delivery vehicle classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VehicleClass {
    Car,
    Scooter,
    Bike,
}

impl VehicleClass {
    pub const ALL: [VehicleClass; 3] = [Self::Car, Self::Scooter, Self::Bike];

    /// Parse from a request string. Names match exactly; there is no case
    /// folding at this boundary.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Car" => Some(Self::Car),
            "Scooter" => Some(Self::Scooter),
            "Bike" => Some(Self::Bike),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Car => "Car",
            Self::Scooter => "Scooter",
            Self::Bike => "Bike",
        }
    }

    /// Whether weather surcharges and restrictions apply at all.
    /// Cars ride through anything at the base fee.
    pub fn is_weather_sensitive(&self) -> bool {
        matches!(self, Self::Scooter | Self::Bike)
    }
}

impl std::fmt::Display for VehicleClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
