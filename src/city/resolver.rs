//! City detection from free-text addresses.
//!
//! Resolution runs two passes over the fixed catalog (the classes learned
//! by the CITY label encoder, in encoder order):
//!
//! 1. **Whole-word pass** — the first catalog entry whose folded name
//!    occurs in the folded address as a whole word wins outright.
//! 2. **Fuzzy pass** — otherwise every entry is scored against the full
//!    address with [`sequence_ratio`]; the best score at or above
//!    [`FUZZY_CUTOFF`] wins, ties going to the earlier catalog entry.
//!
//! An address that matches neither way resolves to `None`. That is a
//! normal outcome, not an error: the caller decides how to surface it.

use std::fmt;

use regex::Regex;
use serde::Serialize;

use super::similarity::sequence_ratio;

/// Minimum similarity ratio for the fuzzy fallback to accept a candidate.
pub const FUZZY_CUTOFF: f64 = 0.70;

/// How an address was matched to a catalog city.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    /// The city name occurs in the address as a whole word.
    WholeWord,
    /// Closest catalog entry by sequence similarity, at or above the cutoff.
    Fuzzy,
}

impl fmt::Display for MatchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchMethod::WholeWord => write!(f, "whole-word"),
            MatchMethod::Fuzzy => write!(f, "fuzzy"),
        }
    }
}

/// A successful city detection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedCity {
    /// Catalog entry in its original casing.
    pub name: String,
    pub method: MatchMethod,
    /// 1.0 for whole-word matches, the similarity ratio for fuzzy ones.
    pub score: f64,
}

struct CatalogEntry {
    /// Original casing, as supplied by the encoder.
    name: String,
    /// Trimmed and lowercased, the form all matching runs against.
    folded: String,
    /// `\b<folded>\b`, compiled once at construction.
    word: Regex,
}

/// Matches free-text addresses against a fixed city catalog.
///
/// Construction compiles one word-boundary pattern per entry; resolution
/// itself allocates nothing beyond the folded address and cannot fail.
pub struct CityResolver {
    entries: Vec<CatalogEntry>,
}

impl CityResolver {
    /// Build a resolver over `catalog`, preserving its order.
    ///
    /// Order matters twice: the whole-word pass returns the first hit, and
    /// fuzzy ties break toward the earlier entry.
    pub fn new(catalog: &[String]) -> Result<Self, regex::Error> {
        let mut entries = Vec::with_capacity(catalog.len());
        for name in catalog {
            let folded = name.trim().to_lowercase();
            let word = Regex::new(&format!(r"\b{}\b", regex::escape(&folded)))?;
            entries.push(CatalogEntry {
                name: name.clone(),
                folded,
                word,
            });
        }
        Ok(Self { entries })
    }

    /// Resolve an address to a catalog city, or `None` if nothing matches.
    ///
    /// The address is trimmed and lowercased before matching; an empty or
    /// all-whitespace address never resolves.
    pub fn resolve(&self, address: &str) -> Option<ResolvedCity> {
        let addr = address.trim().to_lowercase();
        if addr.is_empty() {
            return None;
        }

        for entry in &self.entries {
            if entry.word.is_match(&addr) {
                return Some(ResolvedCity {
                    name: entry.name.clone(),
                    method: MatchMethod::WholeWord,
                    score: 1.0,
                });
            }
        }

        // Strictly-greater comparison keeps the earliest entry on ties.
        let mut best: Option<(&CatalogEntry, f64)> = None;
        for entry in &self.entries {
            let ratio = sequence_ratio(&addr, &entry.folded);
            if ratio >= FUZZY_CUTOFF && best.map_or(true, |(_, top)| ratio > top) {
                best = Some((entry, ratio));
            }
        }

        best.map(|(entry, score)| ResolvedCity {
            name: entry.name.clone(),
            method: MatchMethod::Fuzzy,
            score,
        })
    }

    /// Catalog entries in their original casing and order.
    pub fn catalog(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }
}
