/*
   Copyright 2019 Supercomputing Systems AG

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

//! Submit extrinsics to an NFTMart node and wait for their confirmation.
//!
//! A [`Session`] owns the node connection and the module error table of the
//! runtime. Every submitted extrinsic gets its own waiter, which turns the
//! status updates of the node into a single [`ExtrinsicReport`].

extern crate alloc;

pub use api::*; // Re-export everything
pub use nc_node_api;
pub use nc_primitives;

pub mod api;
pub mod rpc;

/// Hash type of the NFTMart runtime, used for extrinsic and block hashes.
pub type Hash = sp_core::H256;
