//! Compass heading unwrapping
//!
//! Turns throttled, wrap-around heading samples into a continuous heading
//! suitable for animation, and exposes snapshots of it to analysis requests.

mod state;
pub use state::{HeadingSample, OrientationState};

mod tracker;
pub use tracker::{OrientationTracker, spawn_heading_listener};
