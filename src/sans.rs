//! Decoding primitives, free of any input or output handling.
//!
//! This module is intended for applications that need fine control over how
//! a document is walked. See [`crate::avec`] for the record loop built from
//! these pieces.
//!
//! # Architecture
//!
//! A FIT document is a header, a stream of records, and a trailing checksum.
//! Decoding proceeds in three layers:
//!
//! - [`header`] validates the document header and both checksums, yielding
//! the byte window holding the record stream. It also classifies the single
//! byte opening every record.
//!
//! - [`definition`] decodes definition records into a
//! [`MessageDefinition`](definition::MessageDefinition) and stores them in a
//! [`DefinitionTable`](definition::DefinitionTable), keyed by their 4-bit
//! local message type.
//!
//! - [`data`] decodes the field bytes of a data record into a [`Value`](data::Value),
//! according to the base type chosen once when its definition was decoded.
//!
//! The following are not handled here and must be carefully written by
//! callers:
//!
//! - Keeping every record inside the window returned by the header.
//!
//! - Ensuring the cursor advances past each record.

pub mod check;
pub mod data;
pub mod definition;
pub mod header;
