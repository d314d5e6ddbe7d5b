#![no_std]

//! A decoder turning Garmin's Flexible and Interoperable Data Transfer
//! protocol into activity summaries.
//!
//! Cassette reads a complete FIT document and returns the sessions, laps,
//! track points and events it contains, with field values named by a message
//! catalog, positions converted to degrees, and timestamps converted to
//! calendar time.
//!
//! Most users should begin with [`parse`], or [`parse_with`] to supply a
//! custom [`profile::Catalog`] or [`avec::Options`]. The primitives these are
//! built from (checksums, header validation, definition tables, and field
//! decoding) are exposed in the [`sans`] module.
//!
//! ## Cargo Features
//!
//! The following crate feature flags are available:
//!
//! - `derive`: enable derive macros (default).
//! - `std`: enable reader-based decoder (default).
//! - `serde`: implement `Serialize` for decoded activities.
//! - `tracing`: emit diagnostic events through `tracing`.

extern crate alloc;
#[cfg(any(feature = "std", test))]
extern crate std;

#[macro_use]
mod trace;

pub mod avec;
pub mod profile;
pub mod sans;

pub use avec::{Activity, Category, Message, Options, Summary, parse, parse_with};
pub use sans::data::Value;
