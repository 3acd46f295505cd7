//! Package name and version matching against the catalog.
//!
//! - [`resolver`]: raw package name to a catalog product, with a confidence tier.
//! - [`cycle`]: raw version string to one of the product's release cycles.
//! - [`normalize`] / [`similarity`]: the string helpers both build on.

pub mod cycle;
pub mod normalize;
pub mod resolver;
pub mod similarity;
