//! Core types for RightHair.
//!
//! This module provides type-safe wrappers for the values that cross the
//! relay boundary.

pub mod age;
pub mod id;
pub mod image;
pub mod plan;

pub use age::{TargetAge, TargetAgeError};
pub use id::*;
pub use image::{DataUrl, ImageExtension, ImageRef, ImageRefError};
pub use plan::{BillingCycle, PlanTier};
