//! Domain models for the clinic.

mod appointment;
mod catalog;
mod chart;
mod doctor;
mod patient;

pub use appointment::*;
pub use catalog::*;
pub use chart::*;
pub use doctor::*;
pub use patient::*;
