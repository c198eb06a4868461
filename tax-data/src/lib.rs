//! Bracket schedules loaded from CSV.

mod loader;

pub use loader::{RateScheduleLoader, RateScheduleLoaderError, RateScheduleRecord};
