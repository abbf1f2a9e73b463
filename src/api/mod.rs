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

pub use error::{Error, Result};
pub use nc_node_api::{DispatchError, EventRecord, ModuleErrorTable, Phase};
pub use nc_primitives::{TransactionStatus, XtStatus};
pub use session::*;
pub use waiter::*;

pub mod error;
pub mod session;
pub mod waiter;

use alloc::{string::String, vec::Vec};
use core::fmt;
use serde::Deserialize;
use serde_json::Value;

/// One status update of a submitted extrinsic, together with the events the
/// node delivered alongside it. Only updates that place the extrinsic into a
/// block carry events.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SubmissionUpdate<Hash> {
	pub status: TransactionStatus<Hash, Hash>,
	#[serde(default)]
	pub events: Vec<EventRecord>,
}

impl<Hash> SubmissionUpdate<Hash> {
	pub fn new(status: TransactionStatus<Hash, Hash>, events: Vec<EventRecord>) -> Self {
		Self { status, events }
	}

	/// An update without events.
	pub fn status(status: TransactionStatus<Hash, Hash>) -> Self {
		Self::new(status, Vec::new())
	}
}

/// Simplified TransactionStatus of the statuses that stop a watch process
/// before the extrinsic reached the desired confirmation depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnexpectedTxStatus {
	Retracted,
	Usurped,
	Dropped,
	Invalid,
}

impl UnexpectedTxStatus {
	pub fn from_status<Hash, BlockHash>(status: &TransactionStatus<Hash, BlockHash>) -> Option<Self> {
		match status {
			TransactionStatus::Retracted(_) => Some(UnexpectedTxStatus::Retracted),
			TransactionStatus::Usurped(_) => Some(UnexpectedTxStatus::Usurped),
			TransactionStatus::Dropped => Some(UnexpectedTxStatus::Dropped),
			TransactionStatus::Invalid => Some(UnexpectedTxStatus::Invalid),
			_ => None,
		}
	}
}

/// Outcome of the dispatch of an extrinsic, as told by the `System` events of its block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtrinsicOutcome {
	Success,
	Failed(DispatchError),
	/// Neither `ExtrinsicSuccess` nor `ExtrinsicFailed` was delivered, e.g. when
	/// watching only until `Ready`.
	Unknown,
}

/// A non-system event emitted by the extrinsic, with its data as delivered by the node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportedEvent {
	pub phase: Phase,
	pub pallet: String,
	pub variant: String,
	pub data: Vec<Value>,
}

impl fmt::Display for ReportedEvent {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{:?} {}.{} [", self.phase, self.pallet, self.variant)?;
		for (i, value) in self.data.iter().enumerate() {
			if i > 0 {
				f.write_str(", ")?;
			}
			write!(f, "{value}")?;
		}
		f.write_str("]")
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtrinsicReport<Hash> {
	// Hash of the extrinsic.
	pub extrinsic_hash: Option<Hash>,
	// Block hash of the block the extrinsic was included in.
	// Only available if watched until at least `InBlock`.
	pub block_hash: Option<Hash>,
	// Last known Transaction Status.
	pub status: TransactionStatus<Hash, Hash>,
	pub outcome: ExtrinsicOutcome,
	// Events associated to the extrinsic, without the `System` outcome events.
	pub events: Vec<ReportedEvent>,
}

impl<Hash> ExtrinsicReport<Hash> {
	pub fn new(
		extrinsic_hash: Option<Hash>,
		block_hash: Option<Hash>,
		status: TransactionStatus<Hash, Hash>,
		outcome: ExtrinsicOutcome,
		events: Vec<ReportedEvent>,
	) -> Self {
		Self { extrinsic_hash, block_hash, status, outcome, events }
	}

	pub fn dispatch_error(&self) -> Option<&DispatchError> {
		match &self.outcome {
			ExtrinsicOutcome::Failed(dispatch_error) => Some(dispatch_error),
			_ => None,
		}
	}

	pub fn is_success(&self) -> bool {
		self.outcome == ExtrinsicOutcome::Success
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::Hash;
	use serde_json::json;

	#[test]
	fn submission_update_decodes_node_json() {
		let update: SubmissionUpdate<Hash> = serde_json::from_value(json!({
			"status": {"inBlock": "0x0101010101010101010101010101010101010101010101010101010101010101"},
			"events": [
				{"phase": {"applyExtrinsic": 1}, "event": {"section": "balances", "method": "Transfer", "data": ["a", "b", 10]}},
				{"phase": {"applyExtrinsic": 1}, "event": {"section": "system", "method": "ExtrinsicSuccess", "data": []}}
			]
		}))
		.unwrap();

		assert_eq!(update.status, TransactionStatus::InBlock(Hash::repeat_byte(1)));
		assert_eq!(update.events.len(), 2);
	}

	#[test]
	fn submission_update_without_events() {
		let update: SubmissionUpdate<Hash> =
			serde_json::from_value(json!({"status": "ready"})).unwrap();
		assert_eq!(update, SubmissionUpdate::status(TransactionStatus::Ready));
	}

	#[test]
	fn unexpected_tx_status_matches_unsupported_statuses() {
		type Status = TransactionStatus<Hash, Hash>;
		assert_eq!(UnexpectedTxStatus::from_status(&Status::Dropped), Some(UnexpectedTxStatus::Dropped));
		assert_eq!(
			UnexpectedTxStatus::from_status(&Status::Usurped(Hash::zero())),
			Some(UnexpectedTxStatus::Usurped)
		);
		assert_eq!(UnexpectedTxStatus::from_status(&Status::Future), None);
		assert_eq!(UnexpectedTxStatus::from_status(&Status::Finalized(Hash::zero())), None);
	}

	#[test]
	fn reported_event_prints_data_as_json() {
		let event = ReportedEvent {
			phase: Phase::ApplyExtrinsic(1),
			pallet: "Balances".into(),
			variant: "Transfer".into(),
			data: vec![json!("alice"), json!(100)],
		};
		assert_eq!(event.to_string(), "ApplyExtrinsic(1) Balances.Transfer [\"alice\", 100]");
	}
}
