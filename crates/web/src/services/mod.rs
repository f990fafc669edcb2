//! Upstream provider clients and local side effects.
//!
//! # Services
//!
//! - `image_gen` - Image generation provider (age transformation)
//! - `payments` - Payments provider (checkout sessions)
//! - `identity` - Identity provider (OAuth with PKCE, user lookup, sign out)
//! - `uploads` - Writes decoded data URLs to the public uploads directory
//!
//! Every client makes exactly one outbound request per call. Nothing here
//! retries, caches or deduplicates.

pub mod identity;
pub mod image_gen;
pub mod payments;
pub mod uploads;

pub use identity::{IdentityClient, IdentityError};
pub use image_gen::{ImageGenClient, ImageGenError};
pub use payments::{PaymentsClient, PaymentsError};
pub use uploads::UploadStore;
