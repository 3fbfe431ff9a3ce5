//! Gharmol — house price estimation for Indian metros.
//!
//! Loads pre-fit preprocessing artifacts and a gradient-boosted model,
//! detects the city from free-text addresses, and scores listings either
//! through a single-form web app or as one-shot CLI predictions.

pub mod artifacts;
pub mod city;
pub mod features;
pub mod model;
pub mod pipeline;
pub mod predictor;
pub mod server;
