//! CSV inventory input.
//!
//! - [`columns`]: header synonym lookup table mapping varied export headers to
//!   the package-name and version fields.
//! - [`reader`]: delimiter sniffing and row extraction into [`PackageRecord`](crate::models::PackageRecord)s.

pub mod columns;
pub mod reader;
