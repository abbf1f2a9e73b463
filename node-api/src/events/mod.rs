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

//! Contains stuff to interact with node events.
//!
//! Events reach the client as loosely typed records of the node connection.
//! They are decoded once into an [`EventRecord`], which tells the generic
//! extrinsic outcome events apart from all other (informational) events.

use crate::error::{Error, RawDispatchError};
use alloc::{string::String, vec::Vec};
use codec::{Decode, Encode};
use log::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Trait to uniquely identify the events's identity from the runtime metadata.
///
/// Pallet names are compared case-insensitively, because node connections
/// report them in camelCase (`system`) as well as in PascalCase (`System`).
pub trait StaticEvent {
	/// Pallet name.
	const PALLET: &'static str;
	/// Event name.
	const EVENT: &'static str;

	/// Returns true if the given pallet and event names match this event.
	fn is_event(pallet: &str, event: &str) -> bool {
		Self::PALLET.eq_ignore_ascii_case(pallet) && Self::EVENT == event
	}
}

/// An extrinsic completed successfully.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExtrinsicSuccess;

impl StaticEvent for ExtrinsicSuccess {
	const PALLET: &'static str = "System";
	const EVENT: &'static str = "ExtrinsicSuccess";
}

/// An extrinsic failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExtrinsicFailed;

impl StaticEvent for ExtrinsicFailed {
	const PALLET: &'static str = "System";
	const EVENT: &'static str = "ExtrinsicFailed";
}

/// A phase of a block's execution.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Encode, Decode, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
	/// Applying an extrinsic.
	ApplyExtrinsic(u32),
	/// Finalizing the block.
	Finalization,
	/// Initializing the block.
	Initialization,
}

/// An event as delivered by the node connection, not yet classified.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
	/// Name of the emitting pallet.
	#[serde(alias = "section")]
	pub module: String,
	#[serde(default)]
	pub module_index: Option<u8>,
	#[serde(alias = "method", alias = "eventName")]
	pub name: String,
	#[serde(default)]
	pub data: Vec<Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawEventRecord {
	pub phase: Phase,
	pub event: RawEvent,
}

/// An event of the block an extrinsic was included in, decoded at the boundary.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawEventRecord")]
pub struct EventRecord {
	pub phase: Phase,
	pub event: RuntimeEvent,
}

impl EventRecord {
	pub fn new(phase: Phase, event: RuntimeEvent) -> Self {
		Self { phase, event }
	}
}

impl TryFrom<RawEventRecord> for EventRecord {
	type Error = Error;

	fn try_from(raw: RawEventRecord) -> Result<Self, Self::Error> {
		Ok(EventRecord { phase: raw.phase, event: RuntimeEvent::try_from(raw.event)? })
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RuntimeEvent {
	ExtrinsicSuccess,
	/// Carries the dispatch error as found in the event payload.
	ExtrinsicFailed(RawDispatchError),
	Other(EventDetails),
}

impl TryFrom<RawEvent> for RuntimeEvent {
	type Error = Error;

	fn try_from(raw: RawEvent) -> Result<Self, Self::Error> {
		if ExtrinsicSuccess::is_event(&raw.module, &raw.name) {
			return Ok(RuntimeEvent::ExtrinsicSuccess)
		}
		if ExtrinsicFailed::is_event(&raw.module, &raw.name) {
			let Some(dispatch_error) = raw.data.into_iter().next() else {
				return Err(Error::Other("ExtrinsicFailed event without dispatch error".into()))
			};
			let dispatch_error = RawDispatchError::from_json(dispatch_error).map_err(|e| {
				warn!("Could not decode the dispatch error of an ExtrinsicFailed event: {e}");
				e
			})?;
			return Ok(RuntimeEvent::ExtrinsicFailed(dispatch_error))
		}
		Ok(RuntimeEvent::Other(EventDetails {
			pallet: raw.module,
			pallet_index: raw.module_index,
			variant: raw.name,
			data: raw.data,
		}))
	}
}

/// Any event other than the generic extrinsic outcome events. Data is kept as delivered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventDetails {
	pub pallet: String,
	pub pallet_index: Option<u8>,
	pub variant: String,
	pub data: Vec<Value>,
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::RawModuleError;
	use serde_json::json;
	use test_case::test_case;

	fn decode(value: Value) -> Result<EventRecord, serde_json::Error> {
		serde_json::from_value(value)
	}

	#[test_case("System", "ExtrinsicSuccess", true ; "pascal case pallet")]
	#[test_case("system", "ExtrinsicSuccess", true ; "camel case pallet")]
	#[test_case("System", "extrinsicSuccess", false ; "event name is case sensitive")]
	#[test_case("Balances", "ExtrinsicSuccess", false ; "other pallet")]
	fn extrinsic_success_matches(pallet: &str, event: &str, expected: bool) {
		assert_eq!(ExtrinsicSuccess::is_event(pallet, event), expected);
	}

	#[test]
	fn extrinsic_success_is_classified() {
		let record = decode(json!({
			"phase": {"applyExtrinsic": 1},
			"event": {"section": "system", "method": "ExtrinsicSuccess", "data": [{"weight": 1000}]}
		}))
		.unwrap();

		assert_eq!(record, EventRecord::new(Phase::ApplyExtrinsic(1), RuntimeEvent::ExtrinsicSuccess));
	}

	#[test]
	fn extrinsic_failed_carries_module_error() {
		let record = decode(json!({
			"phase": {"applyExtrinsic": 2},
			"event": {
				"module": "System",
				"moduleIndex": 0,
				"eventName": "ExtrinsicFailed",
				"data": [{"module": {"index": 3, "error": "0x02000000"}}, {"weight": 1000}]
			}
		}))
		.unwrap();

		assert_eq!(
			record.event,
			RuntimeEvent::ExtrinsicFailed(RawDispatchError::Module(RawModuleError::new(3, 2)))
		);
	}

	#[test]
	fn extrinsic_failed_accepts_legacy_scale_payload() {
		let record = decode(json!({
			"phase": {"applyExtrinsic": 1},
			"event": {"module": "System", "name": "ExtrinsicFailed", "data": ["0x030302", "0x00"]}
		}))
		.unwrap();

		assert_eq!(
			record.event,
			RuntimeEvent::ExtrinsicFailed(RawDispatchError::Module(RawModuleError::new(3, 2)))
		);
	}

	#[test]
	fn extrinsic_failed_without_payload_is_rejected() {
		let result = decode(json!({
			"phase": "finalization",
			"event": {"module": "System", "name": "ExtrinsicFailed", "data": []}
		}));
		assert!(result.is_err());
	}

	#[test]
	fn other_events_keep_their_data_verbatim() {
		let data = json!(["5GrwvaEF", "5FHneW46", "1000000000000"]);
		let record = decode(json!({
			"phase": {"applyExtrinsic": 1},
			"event": {"module": "Balances", "moduleIndex": 3, "name": "Transfer", "data": data}
		}))
		.unwrap();

		let RuntimeEvent::Other(details) = record.event else { panic!("expected other event") };
		assert_eq!(details.pallet, "Balances");
		assert_eq!(details.pallet_index, Some(3));
		assert_eq!(details.variant, "Transfer");
		assert_eq!(Value::Array(details.data), data);
	}

	#[test_case(json!({"applyExtrinsic": 4}), Phase::ApplyExtrinsic(4) ; "apply extrinsic")]
	#[test_case(json!("finalization"), Phase::Finalization ; "unit as string")]
	#[test_case(json!({"initialization": null}), Phase::Initialization ; "unit as map")]
	fn phase_from_json(value: Value, expected: Phase) {
		assert_eq!(serde_json::from_value::<Phase>(value).unwrap(), expected);
	}
}
