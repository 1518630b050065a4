//! Domain core for the gym training-package backend.
//!
//! Holds the scheduling state machine, the reporting computations, and the
//! traits for external collaborators. Has zero internal workspace deps so the
//! db, cloud, and api crates can all build on it.

pub mod error;
pub mod payment;
pub mod reporting;
pub mod roles;
pub mod scheduling;
pub mod storage;
pub mod types;
