/*
	Copyright 2021 Supercomputing Systems AG
	Licensed under the Apache License, Version 2.0 (the "License");
	you may not use this file except in compliance with the License.
	You may obtain a copy of the License at
		http://www.apache.org/licenses/LICENSE-2.0
	Unless required by applicable law or agreed to in writing, software
	distributed under the License is distributed on an "AS IS" BASIS,
	WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
	See the License for the specific language governing permissions and
	limitations under the License.
*/

//! Module error table: pallet index and error index to human readable names.
//!
//! The table is built once per session, from the runtime metadata of the node
//! or from a JSON description, and is read-only afterwards.

use crate::error::{Error, ModuleError, RawModuleError};
use alloc::{collections::BTreeMap, format, string::String, vec::Vec};
use codec::Decode;
use frame_metadata::{RuntimeMetadata, RuntimeMetadataPrefixed, META_RESERVED};
use log::*;
use scale_info::{form::PortableForm, PortableRegistry, TypeDef};
use serde::{Deserialize, Serialize};

pub use error::*;

mod error;
#[cfg(feature = "std")]
mod print_metadata;

/// Error names of all pallets, indexed by pallet index.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<PalletErrors>", into = "Vec<PalletErrors>")]
pub struct ModuleErrorTable {
	pallets: BTreeMap<u8, PalletErrors>,
}

impl ModuleErrorTable {
	pub fn new(pallets: impl IntoIterator<Item = PalletErrors>) -> Self {
		Self { pallets: pallets.into_iter().map(|p| (p.index, p)).collect() }
	}

	/// Decode the table from the SCALE encoded runtime metadata, as returned
	/// by the `state_getMetadata` rpc call.
	pub fn decode_metadata(mut encoded_metadata: &[u8]) -> Result<Self, Error> {
		let metadata = RuntimeMetadataPrefixed::decode(&mut encoded_metadata)?;
		Ok(Self::try_from(metadata)?)
	}

	pub fn pallets(&self) -> impl Iterator<Item = &PalletErrors> {
		self.pallets.values()
	}

	pub fn len(&self) -> usize {
		self.pallets.len()
	}

	pub fn is_empty(&self) -> bool {
		self.pallets.is_empty()
	}

	pub fn pallet_by_index(&self, pallet_index: u8) -> Option<&PalletErrors> {
		self.pallets.get(&pallet_index)
	}

	pub fn pallet_by_name(&self, pallet_name: &str) -> Option<&PalletErrors> {
		self.pallets.values().find(|p| p.name == pallet_name)
	}

	pub fn pallet_by_index_err(&self, pallet_index: u8) -> Result<&PalletErrors, MetadataError> {
		self.pallet_by_index(pallet_index)
			.ok_or(MetadataError::PalletIndexNotFound(pallet_index))
	}

	pub fn pallet_by_name_err(&self, pallet_name: &str) -> Result<&PalletErrors, MetadataError> {
		self.pallet_by_name(pallet_name)
			.ok_or_else(|| MetadataError::PalletNotFound(pallet_name.into()))
	}

	/// Resolve the names of a raw module error.
	pub fn lookup(&self, raw: &RawModuleError) -> Result<ModuleError, MetadataError> {
		let pallet = self.pallet_by_index_err(raw.pallet_index)?;
		let error_details = pallet
			.error_variant_by_index(raw.error_index())
			.ok_or(MetadataError::ErrorNotFound(raw.pallet_index, raw.error_index()))?;

		Ok(ModuleError {
			pallet: pallet.name.clone(),
			error: error_details.name.clone(),
			description: error_details.docs.clone(),
			raw: *raw,
		})
	}
}

impl From<Vec<PalletErrors>> for ModuleErrorTable {
	fn from(pallets: Vec<PalletErrors>) -> Self {
		Self::new(pallets)
	}
}

impl From<ModuleErrorTable> for Vec<PalletErrors> {
	fn from(table: ModuleErrorTable) -> Self {
		table.pallets.into_values().collect()
	}
}

// Based on https://github.com/paritytech/subxt/blob/8413c4d2dd625335b9200dc2289670accdf3391a/metadata/src/from_into/v15.rs
impl TryFrom<RuntimeMetadataPrefixed> for ModuleErrorTable {
	type Error = InvalidMetadataError;

	fn try_from(m: RuntimeMetadataPrefixed) -> Result<Self, Self::Error> {
		if m.0 != META_RESERVED {
			return Err(InvalidMetadataError::InvalidPrefix)
		}

		let pallets = match &m.1 {
			RuntimeMetadata::V14(meta) => collect_pallet_errors(
				meta.pallets.iter().map(|p| (p.index, &p.name, p.error.as_ref().map(|e| e.ty.id))),
				&meta.types,
			)?,
			RuntimeMetadata::V15(meta) => collect_pallet_errors(
				meta.pallets.iter().map(|p| (p.index, &p.name, p.error.as_ref().map(|e| e.ty.id))),
				&meta.types,
			)?,
			_ => return Err(InvalidMetadataError::InvalidVersion),
		};

		debug!("Built module error table with {} pallets", pallets.len());
		Ok(Self::new(pallets))
	}
}

fn collect_pallet_errors<'a>(
	pallets: impl Iterator<Item = (u8, &'a String, Option<u32>)>,
	types: &PortableRegistry,
) -> Result<Vec<PalletErrors>, InvalidMetadataError> {
	let mut collected = Vec::new();
	for (index, name, error_ty) in pallets {
		let errors = match error_ty {
			Some(type_id) => error_variants(type_id, types)?,
			None => Vec::new(),
		};
		collected.push(PalletErrors { index, name: name.clone(), errors });
	}
	Ok(collected)
}

fn error_variants(
	type_id: u32,
	types: &PortableRegistry,
) -> Result<Vec<ErrorVariant>, InvalidMetadataError> {
	let ty = types.resolve(type_id).ok_or(InvalidMetadataError::MissingType(type_id))?;
	let TypeDef::<PortableForm>::Variant(variant_def) = &ty.type_def else {
		return Err(InvalidMetadataError::TypeDefNotVariant(type_id))
	};
	Ok(variant_def
		.variants
		.iter()
		.map(|v| ErrorVariant { index: v.index, name: v.name.clone(), docs: v.docs.clone() })
		.collect())
}

/// The errors a single pallet can dispatch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PalletErrorsJson")]
pub struct PalletErrors {
	/// Index of the pallet in the runtime.
	pub index: u8,
	pub name: String,
	pub errors: Vec<ErrorVariant>,
}

impl PalletErrors {
	pub fn error_variant_by_index(&self, error_index: u8) -> Option<&ErrorVariant> {
		self.errors.iter().find(|e| e.index == error_index)
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorVariant {
	/// Encoded index of the error variant, the error code.
	pub index: u8,
	pub name: String,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub docs: Vec<String>,
}

/// JSON description of a pallet; errors without an explicit index get their position.
#[derive(Deserialize)]
struct PalletErrorsJson {
	index: u8,
	name: String,
	#[serde(default)]
	errors: Vec<ErrorVariantJson>,
}

#[derive(Deserialize)]
struct ErrorVariantJson {
	index: Option<u8>,
	name: String,
	#[serde(default)]
	docs: Vec<String>,
}

impl TryFrom<PalletErrorsJson> for PalletErrors {
	type Error = String;

	fn try_from(json: PalletErrorsJson) -> Result<Self, Self::Error> {
		let errors = json
			.errors
			.into_iter()
			.enumerate()
			.map(|(position, e)| {
				let index = match e.index {
					Some(index) => index,
					None => u8::try_from(position).map_err(|_| {
						format!("pallet {} has more than 256 errors", json.name)
					})?,
				};
				Ok(ErrorVariant { index, name: e.name, docs: e.docs })
			})
			.collect::<Result<Vec<_>, String>>()?;
		Ok(PalletErrors { index: json.index, name: json.name, errors })
	}
}
