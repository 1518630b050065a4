//! Service layer between handlers and repositories.
//!
//! Holds the multi-step scheduling operations (row-locked session
//! transitions, signature-aware create and delete) so handlers stay thin.

pub mod scheduling;
