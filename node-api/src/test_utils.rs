// This file was taken from subxt (Parity Technologies (UK))
// https://github.com/paritytech/subxt/
// And was adapted by Supercomputing Systems AG and Integritee AG.
//
// Copyright 2019-2022 Parity Technologies (UK) Ltd, Supercomputing Systems AG and Integritee AG.
// This file is licensed as Apache-2.0
// see LICENSE for license details.

//! Module error table and event related test utilities used outside this module.

use crate::{
	EventDetails, EventRecord, ModuleErrorTable, Phase, RawDispatchError, RawModuleError,
	RuntimeEvent,
};
use alloc::{collections::BTreeMap, string::ToString, vec, vec::Vec};
use codec::{Decode, Encode};
use frame_metadata::{
	v14::{
		ExtrinsicMetadata as ExtrinsicMetadataV14, PalletErrorMetadata as PalletErrorMetadataV14,
		PalletMetadata as PalletMetadataV14, RuntimeMetadataV14,
	},
	v15::{
		CustomMetadata, ExtrinsicMetadata as ExtrinsicMetadataV15, OuterEnums,
		PalletErrorMetadata as PalletErrorMetadataV15, PalletMetadata as PalletMetadataV15,
		RuntimeMetadataV15,
	},
	RuntimeMetadataPrefixed,
};
use scale_info::{meta_type, MetaType, TypeInfo};
use serde_json::Value;

/// Errors of the `System` pallet, index 0.
#[allow(clippy::enum_variant_names)]
#[derive(Encode, Decode, TypeInfo, Clone, Debug, PartialEq, Eq)]
pub enum SystemError {
	/// The name of specification does not match between the current runtime
	/// and the new runtime.
	InvalidSpecName,
	/// The specification version is not allowed to decrease between the current runtime
	/// and the new runtime.
	SpecVersionNeedsToIncrease,
	/// Failed to extract the runtime version from the new runtime.
	FailedToExtractRuntimeVersion,
	/// Suicide called when the account has non-default composite data.
	NonDefaultComposite,
	/// There is a non-zero reference count preventing the account from being purged.
	NonZeroRefCount,
	/// The origin filter prevent the call to be dispatched.
	CallFiltered,
}

/// Errors of the `Balances` pallet, index 3.
#[derive(Encode, Decode, TypeInfo, Clone, Debug, PartialEq, Eq)]
pub enum BalancesError {
	/// Got an overflow after adding.
	Overflow,
	/// Got an underflow after subtracting.
	Underflow,
	/// Balance too low to send value.
	InsufficientBalance,
}

/// Build fake metadata consisting of a single pallet that knows
/// about the error type provided.
pub fn metadata_v14<E: TypeInfo + 'static>(index: u8, name: &'static str) -> RuntimeMetadataPrefixed {
	metadata_with_pallets(vec![(index, name, Some(meta_type::<E>()))])
}

/// Build fake metadata of a runtime with `System` (0), `Timestamp` (2, without errors)
/// and `Balances` (3).
pub fn runtime_metadata() -> RuntimeMetadataPrefixed {
	metadata_with_pallets(vec![
		(0, "System", Some(meta_type::<SystemError>())),
		(2, "Timestamp", None),
		(3, "Balances", Some(meta_type::<BalancesError>())),
	])
}

fn metadata_with_pallets(pallets: Vec<(u8, &'static str, Option<MetaType>)>) -> RuntimeMetadataPrefixed {
	let pallets = pallets
		.into_iter()
		.map(|(index, name, error)| PalletMetadataV14 {
			name,
			storage: None,
			calls: None,
			event: None,
			constants: vec![],
			error: error.map(|ty| PalletErrorMetadataV14 { ty }),
			index,
		})
		.collect();

	let extrinsic =
		ExtrinsicMetadataV14 { ty: meta_type::<()>(), version: 0, signed_extensions: vec![] };
	RuntimeMetadataV14::new(pallets, extrinsic, meta_type::<()>()).into()
}

/// Same runtime as [`runtime_metadata`], in the V15 metadata format.
pub fn runtime_metadata_v15() -> RuntimeMetadataPrefixed {
	let pallets = vec![
		(0, "System", Some(meta_type::<SystemError>())),
		(2, "Timestamp", None),
		(3, "Balances", Some(meta_type::<BalancesError>())),
	]
	.into_iter()
	.map(|(index, name, error)| PalletMetadataV15 {
		name,
		storage: None,
		calls: None,
		event: None,
		constants: vec![],
		error: error.map(|ty| PalletErrorMetadataV15 { ty }),
		index,
		docs: vec![],
	})
	.collect();

	let extrinsic = ExtrinsicMetadataV15 {
		version: 4,
		address_ty: meta_type::<()>(),
		call_ty: meta_type::<()>(),
		signature_ty: meta_type::<()>(),
		extra_ty: meta_type::<()>(),
		signed_extensions: vec![],
	};
	let outer_enums = OuterEnums {
		call_enum_ty: meta_type::<()>(),
		event_enum_ty: meta_type::<()>(),
		error_enum_ty: meta_type::<()>(),
	};
	RuntimeMetadataV15::new(
		pallets,
		extrinsic,
		meta_type::<()>(),
		vec![],
		outer_enums,
		CustomMetadata { map: BTreeMap::new() },
	)
	.into()
}

/// The module error table of [`runtime_metadata`].
pub fn module_error_table() -> ModuleErrorTable {
	ModuleErrorTable::try_from(runtime_metadata()).unwrap()
}

pub fn extrinsic_success(extrinsic_index: u32) -> EventRecord {
	EventRecord::new(Phase::ApplyExtrinsic(extrinsic_index), RuntimeEvent::ExtrinsicSuccess)
}

pub fn extrinsic_failed(extrinsic_index: u32, dispatch_error: RawDispatchError) -> EventRecord {
	EventRecord::new(
		Phase::ApplyExtrinsic(extrinsic_index),
		RuntimeEvent::ExtrinsicFailed(dispatch_error),
	)
}

pub fn module_error_failed(extrinsic_index: u32, pallet_index: u8, error_index: u8) -> EventRecord {
	extrinsic_failed(
		extrinsic_index,
		RawDispatchError::Module(RawModuleError::new(pallet_index, error_index)),
	)
}

pub fn other_event(extrinsic_index: u32, pallet: &str, variant: &str, data: Vec<Value>) -> EventRecord {
	EventRecord::new(
		Phase::ApplyExtrinsic(extrinsic_index),
		RuntimeEvent::Other(EventDetails {
			pallet: pallet.to_string(),
			pallet_index: None,
			variant: variant.to_string(),
			data,
		}),
	)
}
