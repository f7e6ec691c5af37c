//! # shadowhome-domain
//!
//! Pure domain model for the shadowhome controller.
//!
//! ## Responsibilities
//! - Define **Attributes** (the eight mirrored device channels) and their value domains
//! - Define the **Shadow** (last commanded/observed value per attribute)
//! - Define the **wire documents** (reported state, desired delta, card check, verdict)
//! - Define **State changes** (records of shadow mutations)
//! - Foundational types: error conventions, timestamps, topic names
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod time;

pub mod attribute;
pub mod credential;
pub mod document;
pub mod event;
pub mod shadow;
pub mod topics;
