//! Delivery-fee pricing for the Kuller service
//!
//! A pure rule engine (regional base fee plus weather surcharges, with hard
//! forbidden-condition checks) and the quote service that feeds it the
//! latest stored observation.

pub mod engine;
pub mod fees;
pub mod phenomenon;
pub mod quote;
pub mod vehicle;

pub use engine::{quote_fee, ForbiddenReason};
pub use fees::BaseFeeTable;
pub use quote::{QuoteError, QuoteService};
pub use vehicle::VehicleClass;
