//! Data model for the IRVE static registry.
//!
//! [`Statique`] is the flat, one-row-per-charge-point record exchanged with
//! data producers. The [`entity`] module holds the normalized graph it is
//! stored as: a charge point belongs to a station, and a station references
//! its amenageur, operateur, enseigne, localisation and operational unit.

mod consts;
pub mod entity;
pub mod error;
mod flatten;
pub mod models;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use crate::flatten::flatten;
pub use crate::models::Statique;
