pub mod account;
pub mod calendar;
pub mod error;
pub mod plan;
pub mod profile;
pub mod progress;
pub mod tracking;

pub use error::{FitpalError, Result};
