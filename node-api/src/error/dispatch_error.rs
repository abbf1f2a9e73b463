// This file was taken from subxt (Parity Technologies (UK))
// https://github.com/paritytech/subxt/
// And was adapted by Supercomputing Systems AG.
//
// Copyright 2019-2022 Parity Technologies (UK) Ltd, Supercomputing Systems AG.
// This file is licensed as Apache-2.0
// see LICENSE for license details.

//! Substrate Dispatch Error representation.

use super::Error;
use crate::metadata::ModuleErrorTable;
use alloc::{
	format,
	string::String,
	vec::Vec,
};
use codec::{Decode, Encode};
use core::fmt;
use log::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An error dispatching a transaction, as carried by the `System.ExtrinsicFailed` event.
///
/// Module errors are still raw indices here; see [`DispatchError::from_raw`] to resolve them.
//https://github.com/paritytech/substrate/blob/890451221db37176e13cb1a306246f02de80590a/primitives/runtime/src/lib.rs#L524
#[derive(Clone, Debug, Eq, PartialEq, Encode, Decode, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RawDispatchError {
	Other,
	CannotLookup,
	BadOrigin,
	Module(RawModuleError),
	ConsumerRemaining,
	NoProviders,
	TooManyConsumers,
	Token(TokenError),
	Arithmetic(ArithmeticError),
	Transactional(TransactionalError),
	Exhausted,
	Corruption,
	Unavailable,
}

impl RawDispatchError {
	/// Read the dispatch error out of an event payload value.
	///
	/// Accepts the polkadot-js JSON form (`{"module":{"index":3,"error":"0x02000000"}}`,
	/// `{"badOrigin":null}`, `"badOrigin"`) as well as the SCALE encoding as a `0x` string.
	pub fn from_json(value: Value) -> Result<Self, Error> {
		match value {
			Value::String(s) if s.starts_with("0x") =>
				Self::from_scale_bytes(&hex::decode(&s[2..])?),
			value => Ok(serde_json::from_value(value)?),
		}
	}

	/// Decode the SCALE encoded dispatch error, including the 2 byte module
	/// errors of older runtimes.
	pub fn from_scale_bytes(bytes: &[u8]) -> Result<Self, Error> {
		match bytes {
			[Self::MODULE_VARIANT, module_bytes @ ..] =>
				Ok(Self::Module(RawModuleError::try_from(module_bytes)?)),
			mut bytes => Ok(Self::decode(&mut bytes)?),
		}
	}

	const MODULE_VARIANT: u8 = 3;
}

/// An error dispatching a transaction. See Substrate DispatchError
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DispatchError {
	/// Some error occurred.
	Other,
	/// Failed to lookup some data.
	CannotLookup,
	/// A bad origin.
	BadOrigin,
	/// A custom error in a module.
	Module(ModuleError),
	/// A module error whose pallet or error index is unknown to the module error table.
	UnresolvedModule(RawModuleError),
	/// At least one consumer is remaining so the account cannot be destroyed.
	ConsumerRemaining,
	/// There are no providers so the account cannot be created.
	NoProviders,
	/// There are too many consumers so the account cannot be created.
	TooManyConsumers,
	/// An error to do with tokens.
	Token(TokenError),
	/// An arithmetic error.
	Arithmetic(ArithmeticError),
	/// The number of transactional layers has been reached, or we are not in a transactional layer.
	Transactional(TransactionalError),
	/// Resources exhausted, e.g. attempt to read/write data which is too large to manipulate.
	Exhausted,
	/// The state is corrupt; this is generally not going to fix itself.
	Corruption,
	/// Some resource (e.g. a preimage) is unavailable right now. This might fix itself later.
	Unavailable,
}

impl DispatchError {
	/// Resolve a raw dispatch error with the help of the module error table.
	///
	/// Never fails: a module error the table does not know is kept as
	/// [`DispatchError::UnresolvedModule`].
	pub fn from_raw(raw: RawDispatchError, module_errors: &ModuleErrorTable) -> Self {
		match raw {
			RawDispatchError::Other => DispatchError::Other,
			RawDispatchError::CannotLookup => DispatchError::CannotLookup,
			RawDispatchError::BadOrigin => DispatchError::BadOrigin,
			RawDispatchError::ConsumerRemaining => DispatchError::ConsumerRemaining,
			RawDispatchError::NoProviders => DispatchError::NoProviders,
			RawDispatchError::TooManyConsumers => DispatchError::TooManyConsumers,
			RawDispatchError::Token(val) => DispatchError::Token(val),
			RawDispatchError::Arithmetic(val) => DispatchError::Arithmetic(val),
			RawDispatchError::Transactional(val) => DispatchError::Transactional(val),
			RawDispatchError::Exhausted => DispatchError::Exhausted,
			RawDispatchError::Corruption => DispatchError::Corruption,
			RawDispatchError::Unavailable => DispatchError::Unavailable,
			RawDispatchError::Module(raw) => match module_errors.lookup(&raw) {
				Ok(module_error) => DispatchError::Module(module_error),
				Err(e) => {
					warn!("Could not resolve module error {:?}: {:?}", raw, e);
					DispatchError::UnresolvedModule(raw)
				},
			},
		}
	}

	/// The resolved module error, if this is one.
	pub fn module_error(&self) -> Option<&ModuleError> {
		match self {
			DispatchError::Module(module_error) => Some(module_error),
			_ => None,
		}
	}
}

impl From<ModuleError> for DispatchError {
	fn from(module_error: ModuleError) -> Self {
		DispatchError::Module(module_error)
	}
}

impl fmt::Display for DispatchError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			DispatchError::Module(module_error) => write!(f, "{module_error}"),
			DispatchError::UnresolvedModule(raw) =>
				write!(f, "Module(index: {}, error: {})", raw.pallet_index, raw.error_index()),
			DispatchError::Token(e) => write!(f, "Token({e:?})"),
			DispatchError::Arithmetic(e) => write!(f, "Arithmetic({e:?})"),
			DispatchError::Transactional(e) => write!(f, "Transactional({e:?})"),
			other => write!(f, "{other:?}"),
		}
	}
}

/// An error relating to tokens when dispatching a transaction.
//https://github.com/paritytech/substrate/blob/890451221db37176e13cb1a306246f02de80590a/primitives/runtime/src/lib.rs#L607
#[derive(Clone, Debug, Eq, PartialEq, Encode, Decode, Serialize, Deserialize)]
pub enum TokenError {
	/// Funds are unavailable.
	FundsUnavailable,
	/// Some part of the balance gives the only provider reference to the account and thus cannot be (re)moved.
	OnlyProvider,
	/// Account cannot exist with the funds that would be given.
	BelowMinimum,
	/// Account cannot be created.
	CannotCreate,
	/// The asset in question is unknown.
	UnknownAsset,
	/// Funds exist but are frozen.
	Frozen,
	/// Operation is not supported by the asset.
	Unsupported,
	/// Account cannot be created for a held balance.
	CannotCreateHold,
	/// Withdrawal would cause unwanted loss of account.
	NotExpendable,
}

/// An error relating to arithmetic when dispatching a transaction.
// https://github.com/paritytech/substrate/blob/890451221db37176e13cb1a306246f02de80590a/primitives/arithmetic/src/lib.rs#L59
#[derive(Clone, Debug, Eq, PartialEq, Encode, Decode, Serialize, Deserialize)]
pub enum ArithmeticError {
	/// Underflow.
	Underflow,
	/// Overflow.
	Overflow,
	/// Division by zero.
	DivisionByZero,
}

/// An error relating to the transactional layers when dispatching a transaction.
// https://github.com/paritytech/substrate/blob/890451221db37176e13cb1a306246f02de80590a/primitives/runtime/src/lib.rs#L496
#[derive(Clone, Debug, Eq, PartialEq, Encode, Decode, Serialize, Deserialize)]
pub enum TransactionalError {
	/// Too many transactional layers have been spawned.
	LimitReached,
	/// A transactional layer was expected, but does not exist.
	NoLayer,
}

/// Details about a module error that has occurred.
#[derive(Clone, Debug)]
pub struct ModuleError {
	/// The name of the pallet that the error came from.
	pub pallet: String,
	/// The name of the error.
	pub error: String,
	/// A description of the error.
	pub description: Vec<String>,
	/// A byte representation of the error.
	pub raw: RawModuleError,
}

impl PartialEq for ModuleError {
	fn eq(&self, other: &Self) -> bool {
		// A module error is the same if the raw underlying details are the same.
		self.raw == other.raw
	}
}

impl Eq for ModuleError {}

impl fmt::Display for ModuleError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}.{}", self.pallet, self.error)
	}
}

/// The error details about a module error that has occurred.
///
/// **Note**: Structure used to obtain the underlying bytes of a ModuleError.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
#[serde(try_from = "ModuleErrorJson", into = "ModuleErrorJson")]
pub struct RawModuleError {
	/// Index of the pallet that the error came from.
	pub pallet_index: u8,
	/// Raw error bytes.
	pub error: [u8; 4],
}

impl RawModuleError {
	pub fn new(pallet_index: u8, error_index: u8) -> Self {
		Self { pallet_index, error: [error_index, 0, 0, 0] }
	}

	/// Obtain the error index from the underlying byte data.
	pub fn error_index(&self) -> u8 {
		// Error index is utilized as the first byte from the error array.
		self.error[0]
	}
}

impl TryFrom<&[u8]> for RawModuleError {
	type Error = Error;

	/// The old version is 2 bytes; a pallet and error index.
	/// The new version is 5 bytes; a pallet and error index and then 3 extra bytes.
	fn try_from(module_bytes: &[u8]) -> Result<Self, Self::Error> {
		match *module_bytes {
			[pallet_index, error] => Ok(RawModuleError { pallet_index, error: [error, 0, 0, 0] }),
			[pallet_index, e0, e1, e2, e3] =>
				Ok(RawModuleError { pallet_index, error: [e0, e1, e2, e3] }),
			_ => {
				warn!("Can't decode module error: bytes do not match known shapes");
				Err(Error::Other(format!(
					"module error must be 2 or 5 bytes long, got {}",
					module_bytes.len()
				)))
			},
		}
	}
}

/// JSON shape of a module error: `{"index": 3, "error": 2}` or `{"index": 3, "error": "0x02000000"}`.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct ModuleErrorJson {
	index: u8,
	error: ErrorCode,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum ErrorCode {
	Index(u8),
	Bytes(String),
}

impl TryFrom<ModuleErrorJson> for RawModuleError {
	type Error = String;

	fn try_from(json: ModuleErrorJson) -> Result<Self, Self::Error> {
		match json.error {
			ErrorCode::Index(error_index) => Ok(RawModuleError::new(json.index, error_index)),
			ErrorCode::Bytes(hex_str) => {
				let bytes = hex::decode(hex_str.trim_start_matches("0x"))
					.map_err(|e| format!("invalid module error bytes {hex_str}: {e}"))?;
				if bytes.is_empty() || bytes.len() > 4 {
					return Err(format!("module error must be 1 to 4 bytes, got {}", bytes.len()))
				}
				let mut error = [0u8; 4];
				error[..bytes.len()].copy_from_slice(&bytes);
				Ok(RawModuleError { pallet_index: json.index, error })
			},
		}
	}
}

impl From<RawModuleError> for ModuleErrorJson {
	fn from(raw: RawModuleError) -> Self {
		ModuleErrorJson {
			index: raw.pallet_index,
			error: ErrorCode::Bytes(format!("0x{}", hex::encode(raw.error))),
		}
	}
}
