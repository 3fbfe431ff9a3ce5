//! City detection subsystem.
//!
//! The address field accepts arbitrary free text; this module maps it onto
//! the fixed catalog the CITY encoder was fitted on. [`resolver`] holds the
//! two-pass matching logic, [`similarity`] the sequence-ratio scoring used
//! by its fuzzy fallback.

pub mod resolver;
pub mod similarity;

pub use resolver::{CityResolver, MatchMethod, ResolvedCity, FUZZY_CUTOFF};
pub use similarity::sequence_ratio;
