//! Reader-based decoder implementation.
//!
//! _Requires Cargo feature `std`._

use std::{io::Read, vec::Vec};

use thiserror::Error;

use crate::profile::Catalog;

use super::{Activity, Options, slice};

/// Errors occurring while decoding from a reader.
#[derive(Debug, Error)]
pub enum Error {
    /// An error from the supplied reader.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// An error decoding the document.
    #[error(transparent)]
    Decode(#[from] slice::Error),
}

/// Decode a document from a reader.
///
/// The reader is consumed to its end before decoding begins.
///
/// This method is also re-exported as `cassette::avec::decode_reader`.
///
/// _Requires Cargo feature `std`._
pub fn decode(
    r: &mut impl Read,
    catalog: &(impl Catalog + ?Sized),
    options: Options,
) -> Result<Activity, Error> {
    let mut document = Vec::new();
    r.read_to_end(&mut document)?;

    Ok(slice::decode(&document, catalog, options)?)
}
