//! RightHair Core - Shared types library.
//!
//! This crate provides the domain types used by the RightHair web front end:
//! - `web` - Public site and the JSON relays behind it
//! - `integration-tests` - End-to-end tests against mocked providers
//!
//! # Architecture
//!
//! The core crate contains only types and parsing - no I/O, no HTTP clients,
//! no filesystem access. Everything the relays validate before talking to an
//! upstream provider lives here so it can be tested in isolation.
//!
//! # Modules
//!
//! - [`types`] - Image references, target ages, string IDs and pricing plans

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
