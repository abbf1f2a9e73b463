// This file was taken from subxt (Parity Technologies (UK))
// https://github.com/paritytech/subxt/
// And was adapted by Supercomputing Systems AG.
//
// Copyright 2019-2022 Parity Technologies (UK) Ltd, Supercomputing Systems AG.
// This file is licensed as Apache-2.0
// see LICENSE for license details.

//! General node-api Error implementation.

use alloc::string::String;
use core::fmt;
use derive_more::From;

// Re-expose the errors we use from other crates here:
pub use crate::metadata::{InvalidMetadataError, MetadataError};

mod dispatch_error;
pub use dispatch_error::*;

#[derive(Debug, From)]
pub enum Error {
	/// Codec error.
	Codec(codec::Error),
	/// Serde serialization error
	Serialization(serde_json::error::Error),
	/// Hex string could not be decoded.
	Hex(hex::FromHexError),
	/// Lookup in the module error table failed.
	Metadata(MetadataError),
	/// Runtime metadata could not be turned into a module error table.
	InvalidMetadata(InvalidMetadataError),
	/// Other error.
	Other(String),
}

impl From<&str> for Error {
	fn from(error: &str) -> Self {
		Error::Other(error.into())
	}
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Error::Codec(e) => write!(f, "codec error: {e}"),
			Error::Serialization(e) => write!(f, "serialization error: {e}"),
			Error::Hex(e) => write!(f, "invalid hex: {e}"),
			Error::Metadata(e) => write!(f, "metadata lookup failed: {e:?}"),
			Error::InvalidMetadata(e) => write!(f, "invalid metadata: {e:?}"),
			Error::Other(e) => f.write_str(e),
		}
	}
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
