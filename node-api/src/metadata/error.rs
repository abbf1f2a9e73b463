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

use alloc::string::String;
use codec::{Decode, Encode};

/// Lookup error originated from inspecting the module error table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataError {
	/// Module is not in metadata.
	PalletNotFound(String),
	/// Pallet is not in metadata.
	PalletIndexNotFound(u8),
	/// Error is not in metadata.
	ErrorNotFound(u8, u8),
}

#[derive(Clone, Debug, PartialEq, Eq, Ord, PartialOrd, Encode, Decode)]
pub enum InvalidMetadataError {
	InvalidPrefix,
	InvalidVersion,
	/// Type is missing from type registry.
	MissingType(u32),
	/// Type was not variant/enum type.
	TypeDefNotVariant(u32),
}
