//! Titanic feature pipeline: cached per-feature columns, assembly into
//! model-ready tables and a cross-validated logistic-regression baseline.

pub mod config;
pub mod data;
pub mod error;
pub mod feature;
pub mod logging;
pub mod model;
pub mod tracking;

pub use error::{Error, Result};
