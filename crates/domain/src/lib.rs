//! # pothub-domain
//!
//! Pure domain model for the pothub plant-care system.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Pots** (plant containers with geometry and a care schedule)
//! - Define **History entries** (append-only watering / moisture records)
//! - Contain all invariant enforcement: shape-conditional dimension
//!   validation, and the latest-moisture selection rule
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod history;
pub mod id;
pub mod pot;
pub mod time;
