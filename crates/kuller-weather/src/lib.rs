//! Weather ingestion for the Kuller delivery-fee service
//!
//! Fetches observations from the Estonian Environment Agency XML feed,
//! persists the readings per monitored city, and runs the periodic
//! fetch-and-store cycle.

pub mod feed;
pub mod observation;
pub mod scheduler;
pub mod store;

pub use feed::{FeedClient, FeedError};
pub use observation::{city_by_name, city_for_station, City, Observation, MONITORED_CITIES};
pub use scheduler::IngestScheduler;
pub use store::{ObservationStore, StoreError};
