//! Approximate tour builders.
//!
//! Both builders start from a minimum spanning tree and never fail on a
//! validated matrix: they always return a closed permutation of the vertices.

pub mod christofides;
pub mod twice_around;

pub use christofides::{christofides_tsp, Christofides};
pub use twice_around::{twice_around_the_tree, TwiceAroundTheTree};

use crate::instance::TspInstance;
use crate::solution::Solution;

/// Trait for tour builders that produce a complete tour in one pass
pub trait TourConstruction {
    /// Build a tour for the instance
    fn construct(&self, instance: &TspInstance) -> Solution;

    /// Name of the builder, used in reports
    fn name(&self) -> &str;
}
