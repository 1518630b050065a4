//! HTTP clients for the hosted collaborators.
//!
//! [`cloudinary::CloudinaryStorage`] implements
//! [`gym_core::storage::ObjectStorage`] and [`stripe::StripeGateway`]
//! implements [`gym_core::payment::PaymentGateway`]. Each client has its own
//! error enum that is folded into the matching upstream `CoreError` kind at
//! the trait boundary.

pub mod cloudinary;
pub mod stripe;
