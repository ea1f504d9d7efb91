pub mod catalog;
pub mod hko;
pub mod orientation;
pub mod scheduled;
pub mod suitability;
pub mod visibility;
