/*
	Copyright 2021 Integritee AG and Supercomputing Systems AG
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

//! Node types the nftmart-client needs to make sense of a submitted extrinsic:
//! the module error table, dispatch errors and the events of the including block.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub use error::{DispatchError, Error, ModuleError, RawDispatchError, RawModuleError};
pub use events::*;
pub use metadata::{ErrorVariant, ModuleErrorTable, PalletErrors};

pub mod error;
pub mod events;
pub mod metadata;

#[cfg(any(feature = "mocks", test))]
pub mod test_utils;
