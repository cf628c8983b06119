//! TourForge Core - geometry and tour primitives
//!
//! This crate provides the fundamental building blocks shared by every
//! TourForge crate:
//! - [`Point`] values and Euclidean distance
//! - Cyclic tour distance and permutation helpers ([`tour`])
//! - TSPLIB-style point file parsing ([`tsplib`])
//! - The error taxonomy used across the workspace ([`error`])

pub mod error;
pub mod point;
pub mod tour;
pub mod tsplib;

pub use error::{Result, TourForgeError};
pub use point::Point;
pub use tour::{
    distance, identity, is_permutation, rotate, to_points, total_distance,
    total_distance_by_indices,
};
