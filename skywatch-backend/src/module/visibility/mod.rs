//! Directional sky visibility

mod oracle;
pub use oracle::{CoordinateOracle, great_circle_distance_deg};

mod filter;
pub use filter::VisibilityFilter;

#[cfg(test)]
pub(crate) use filter::tests::FlatSkyOracle;
