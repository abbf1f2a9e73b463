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

//! Status of a submitted extrinsic as reported by the node's transaction pool.

use alloc::{string::String, vec::Vec};
use core::{fmt, str::FromStr};
use serde::{Deserialize, Serialize};

/// Simplified TransactionStatus to allow the user to choose until when to watch
/// an extrinsic.
// Indexes must match the TransactionStatus::as_u8 from below.
#[derive(Debug, Default, PartialEq, Eq, Copy, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum XtStatus {
	Ready = 1,
	Broadcast = 2,
	#[default]
	InBlock = 3,
	Finalized = 6,
}

impl XtStatus {
	pub fn as_u8(&self) -> u8 {
		*self as u8
	}
}

impl fmt::Display for XtStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			XtStatus::Ready => "ready",
			XtStatus::Broadcast => "broadcast",
			XtStatus::InBlock => "in-block",
			XtStatus::Finalized => "finalized",
		};
		f.write_str(name)
	}
}

impl FromStr for XtStatus {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().replace('_', "-").as_str() {
			"ready" => Ok(XtStatus::Ready),
			"broadcast" => Ok(XtStatus::Broadcast),
			"in-block" | "inblock" => Ok(XtStatus::InBlock),
			"finalized" => Ok(XtStatus::Finalized),
			other => Err(alloc::format!("unknown confirmation depth: {other}")),
		}
	}
}

/// Possible transaction status events.
// Copied from `sc-transaction-pool`
// (https://github.com/paritytech/substrate/blob/dddfed3d9260cf03244f15ba3db4edf9af7467e9/client/transaction-pool/api/src/lib.rs)
// as the library is not no-std compatible
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransactionStatus<Hash, BlockHash> {
	/// Transaction is part of the future queue.
	Future,
	/// Transaction is part of the ready queue.
	Ready,
	/// The transaction has been broadcast to the given peers.
	Broadcast(Vec<String>),
	/// Transaction has been included in block with given hash.
	InBlock(BlockHash),
	/// The block this transaction was included in has been retracted.
	Retracted(BlockHash),
	/// Maximum number of finality watchers has been reached,
	/// old watchers are being removed.
	FinalityTimeout(BlockHash),
	/// Transaction has been finalized by a finality-gadget, e.g GRANDPA
	Finalized(BlockHash),
	/// Transaction has been replaced in the pool, by another transaction
	/// that provides the same tags. (e.g. same (sender, nonce)).
	Usurped(Hash),
	/// Transaction has been dropped from the pool because of the limit.
	Dropped,
	/// Transaction is no longer valid in the current state.
	Invalid,
}

impl<Hash, BlockHash> TransactionStatus<Hash, BlockHash> {
	pub fn as_u8(&self) -> u8 {
		match self {
			TransactionStatus::Future => 0,
			TransactionStatus::Ready => 1,
			TransactionStatus::Broadcast(_) => 2,
			TransactionStatus::InBlock(_) => 3,
			TransactionStatus::Retracted(_) => 4,
			TransactionStatus::FinalityTimeout(_) => 5,
			TransactionStatus::Finalized(_) => 6,
			TransactionStatus::Usurped(_) => 7,
			TransactionStatus::Dropped => 8,
			TransactionStatus::Invalid => 9,
		}
	}

	/// Statuses of a transaction that is still on its way into a (finalized) block.
	/// Anything else ends the watch process.
	pub fn is_supported(&self) -> bool {
		matches!(
			self,
			TransactionStatus::Future
				| TransactionStatus::Ready
				| TransactionStatus::Broadcast(_)
				| TransactionStatus::InBlock(_)
				| TransactionStatus::FinalityTimeout(_)
				| TransactionStatus::Finalized(_)
		)
	}

	/// Returns true if the status is supported and at least as far as `status`.
	pub fn reached_status(&self, status: XtStatus) -> bool {
		self.is_supported() && self.as_u8() >= status.as_u8()
	}

	/// Hash of the block the status refers to, if any.
	pub fn block_hash(&self) -> Option<&BlockHash> {
		match self {
			TransactionStatus::InBlock(block_hash)
			| TransactionStatus::Retracted(block_hash)
			| TransactionStatus::FinalityTimeout(block_hash)
			| TransactionStatus::Finalized(block_hash) => Some(block_hash),
			_ => None,
		}
	}

	/// Name of the status variant, as polkadot-js prints it.
	pub fn type_name(&self) -> &'static str {
		match self {
			TransactionStatus::Future => "Future",
			TransactionStatus::Ready => "Ready",
			TransactionStatus::Broadcast(_) => "Broadcast",
			TransactionStatus::InBlock(_) => "InBlock",
			TransactionStatus::Retracted(_) => "Retracted",
			TransactionStatus::FinalityTimeout(_) => "FinalityTimeout",
			TransactionStatus::Finalized(_) => "Finalized",
			TransactionStatus::Usurped(_) => "Usurped",
			TransactionStatus::Dropped => "Dropped",
			TransactionStatus::Invalid => "Invalid",
		}
	}
}
