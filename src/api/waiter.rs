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

//! Confirmation waiter of a single submitted extrinsic.
//!
//! The [`UpdateHandler`] is fed with every status update the node sends for the
//! extrinsic. It never blocks and never fails. As soon as an update reaches the
//! desired [`XtStatus`], it scans the delivered events, resolves a failed dispatch
//! through the module error table and hands the resulting [`ExtrinsicReport`]
//! to the [`Completion`]. This happens exactly once; later updates are ignored.
//!
//! Only the update placing the extrinsic into a block carries events. When
//! watching beyond `InBlock`, those events are kept and scanned on resolution
//! if the extrinsic is still in the same block.

use crate::api::{
	EventRecord, ExtrinsicOutcome, ExtrinsicReport, ReportedEvent, SubmissionUpdate, TransactionStatus,
	XtStatus,
};
use alloc::{sync::Arc, vec::Vec};
use core::{
	fmt::Debug,
	sync::atomic::{AtomicBool, Ordering},
};
use log::*;
use nc_node_api::{DispatchError, ModuleErrorTable, RuntimeEvent};
use std::sync::{Mutex, PoisonError};
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaiterState {
	Waiting,
	Resolved,
}

/// Create the two halves of a waiter resolving at `watch_until`.
pub fn create_waiter<Hash>(
	module_errors: Arc<ModuleErrorTable>,
	watch_until: XtStatus,
) -> (UpdateHandler<Hash>, Completion<Hash>) {
	let (sender, receiver) = watch::channel(None);
	let handler = UpdateHandler {
		inner: Arc::new(HandlerInner {
			module_errors,
			watch_until,
			claimed: AtomicBool::new(false),
			in_block: Mutex::new(None),
			sender,
		}),
	};
	(handler, Completion { receiver })
}

/// Receiving half of the node's status updates.
pub struct UpdateHandler<Hash> {
	inner: Arc<HandlerInner<Hash>>,
}

struct HandlerInner<Hash> {
	module_errors: Arc<ModuleErrorTable>,
	watch_until: XtStatus,
	/// Set by the one update allowed to resolve the waiter.
	claimed: AtomicBool,
	/// Block hash and events of the latest `InBlock` update.
	in_block: Mutex<Option<(Hash, Vec<EventRecord>)>>,
	sender: watch::Sender<Option<ExtrinsicReport<Hash>>>,
}

impl<Hash> Clone for UpdateHandler<Hash> {
	fn clone(&self) -> Self {
		Self { inner: self.inner.clone() }
	}
}

impl<Hash: Clone + Debug + PartialEq> UpdateHandler<Hash> {
	pub fn watch_until(&self) -> XtStatus {
		self.inner.watch_until
	}

	/// `Resolved` once the report is available to the [`Completion`].
	pub fn state(&self) -> WaiterState {
		if self.inner.sender.borrow().is_some() {
			WaiterState::Resolved
		} else {
			WaiterState::Waiting
		}
	}

	/// Handle a status update and return the state of the waiter afterwards.
	pub fn on_update(&self, update: SubmissionUpdate<Hash>) -> WaiterState {
		if self.inner.claimed.load(Ordering::Acquire) {
			trace!("Waiter already resolved, ignoring {} update", update.status.type_name());
			return WaiterState::Resolved
		}
		if !update.status.reached_status(self.inner.watch_until) {
			debug!(
				"Extrinsic status {}, waiting for {}",
				update.status.type_name(),
				self.inner.watch_until
			);
			self.keep_in_block_events(update);
			return WaiterState::Waiting
		}
		// Concurrent terminal updates: only the first one gets to resolve.
		if self.inner.claimed.swap(true, Ordering::AcqRel) {
			return WaiterState::Resolved
		}

		let report = self.resolve(update);
		self.inner.sender.send_replace(Some(report));
		WaiterState::Resolved
	}

	fn keep_in_block_events(&self, update: SubmissionUpdate<Hash>) {
		if let TransactionStatus::InBlock(block_hash) = update.status {
			let mut in_block = self.inner.in_block.lock().unwrap_or_else(PoisonError::into_inner);
			*in_block = Some((block_hash, update.events));
		}
	}

	/// Events of the resolving update, or those kept from its block.
	fn events_of(&self, update: &mut SubmissionUpdate<Hash>) -> Vec<EventRecord> {
		if !update.events.is_empty() {
			return core::mem::take(&mut update.events)
		}
		let kept = self.inner.in_block.lock().unwrap_or_else(PoisonError::into_inner).take();
		match (kept, update.status.block_hash()) {
			(Some((in_block, events)), Some(block_hash)) if &in_block == block_hash => events,
			(Some((in_block, _)), Some(block_hash)) => {
				warn!("Extrinsic moved from block {:?} to {:?}, events unknown", in_block, block_hash);
				Vec::new()
			},
			_ => Vec::new(),
		}
	}

	fn resolve(&self, mut update: SubmissionUpdate<Hash>) -> ExtrinsicReport<Hash> {
		let block_hash = update.status.block_hash().cloned();
		match &block_hash {
			Some(hash) => info!("{} BlockHash({:?})", update.status.type_name(), hash),
			None => info!("{}", update.status.type_name()),
		}

		let mut outcome = ExtrinsicOutcome::Unknown;
		let mut events = Vec::new();
		for record in self.events_of(&mut update) {
			match record.event {
				RuntimeEvent::ExtrinsicFailed(raw) => {
					let dispatch_error = DispatchError::from_raw(raw, &self.inner.module_errors);
					warn!("error: {dispatch_error}");
					outcome = ExtrinsicOutcome::Failed(dispatch_error);
				},
				RuntimeEvent::ExtrinsicSuccess =>
					if matches!(outcome, ExtrinsicOutcome::Unknown) {
						outcome = ExtrinsicOutcome::Success;
					},
				RuntimeEvent::Other(details) => {
					let event = ReportedEvent {
						phase: record.phase,
						pallet: details.pallet,
						variant: details.variant,
						data: details.data,
					};
					info!("event: {event}");
					events.push(event);
				},
			}
		}

		ExtrinsicReport::new(None, block_hash, update.status, outcome, events)
	}
}

/// Waiting half, awaited once by the submitter.
pub struct Completion<Hash> {
	receiver: watch::Receiver<Option<ExtrinsicReport<Hash>>>,
}

impl<Hash: Clone> Completion<Hash> {
	/// Returns true once the waiter resolved.
	pub fn is_complete(&self) -> bool {
		self.receiver.borrow().is_some()
	}

	/// Suspend until the waiter resolved.
	///
	/// Returns `None` if all update handlers were dropped without a single update
	/// reaching the desired status.
	pub async fn wait(mut self) -> Option<ExtrinsicReport<Hash>> {
		match self.receiver.wait_for(Option::is_some).await {
			Ok(report) => report.clone(),
			Err(_) => {
				debug!("All update handlers dropped before the extrinsic was confirmed");
				None
			},
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{api::Phase, Hash, TransactionStatus};
	use nc_node_api::{
		test_utils::{extrinsic_success, module_error_failed, module_error_table, other_event},
		RawDispatchError,
	};
	use serde_json::json;
	use std::time::Duration;
	use test_case::test_case;
	use tokio::time::{sleep, timeout, Instant};

	type Status = TransactionStatus<Hash, Hash>;

	fn waiter(watch_until: XtStatus) -> (UpdateHandler<Hash>, Completion<Hash>) {
		create_waiter(Arc::new(module_error_table()), watch_until)
	}

	fn block(n: u8) -> Hash {
		Hash::repeat_byte(n)
	}

	fn in_block(block_hash: Hash) -> Status {
		Status::InBlock(block_hash)
	}

	#[test_case(vec![Status::Future, Status::Ready, Status::Broadcast(vec!["peer".into()])], XtStatus::InBlock ; "before in block")]
	#[test_case(vec![Status::Ready, Status::InBlock(Hash::zero())], XtStatus::Finalized ; "before finalized")]
	#[test_case(vec![Status::Future], XtStatus::Ready ; "before ready")]
	fn pre_terminal_updates_leave_waiter_waiting(statuses: Vec<Status>, watch_until: XtStatus) {
		let (handler, completion) = waiter(watch_until);

		for status in statuses {
			// Events of pre-terminal updates are never looked at.
			let update = SubmissionUpdate::new(status, vec![module_error_failed(1, 3, 2)]);
			assert_eq!(handler.on_update(update), WaiterState::Waiting);
		}

		assert_eq!(handler.state(), WaiterState::Waiting);
		assert!(!completion.is_complete());
	}

	#[tokio::test]
	async fn terminal_update_resolves_exactly_once() {
		let (handler, completion) = waiter(XtStatus::InBlock);

		let first = SubmissionUpdate::new(in_block(block(1)), vec![extrinsic_success(1)]);
		let second = SubmissionUpdate::new(
			Status::Finalized(block(1)),
			vec![module_error_failed(1, 3, 2), other_event(1, "Balances", "Transfer", vec![])],
		);

		assert_eq!(handler.on_update(first), WaiterState::Resolved);
		assert!(completion.is_complete());
		assert_eq!(handler.on_update(second), WaiterState::Resolved);

		let report = completion.wait().await.unwrap();
		assert_eq!(report.status, in_block(block(1)));
		assert_eq!(report.block_hash, Some(block(1)));
		assert_eq!(report.outcome, ExtrinsicOutcome::Success);
		assert!(report.events.is_empty());
	}

	#[tokio::test]
	async fn extrinsic_failed_is_decoded_through_module_error_table() {
		let (handler, completion) = waiter(XtStatus::InBlock);

		handler.on_update(SubmissionUpdate::new(in_block(block(2)), vec![module_error_failed(1, 3, 2)]));

		let report = completion.wait().await.unwrap();
		let dispatch_error = report.dispatch_error().unwrap();
		let module_error = dispatch_error.module_error().unwrap();
		assert_eq!(module_error.pallet, "Balances");
		assert_eq!(module_error.error, "InsufficientBalance");
		assert_eq!(dispatch_error.to_string(), "Balances.InsufficientBalance");
	}

	#[tokio::test]
	async fn extrinsic_failed_with_unknown_module_still_completes() {
		let (handler, completion) = waiter(XtStatus::InBlock);

		handler.on_update(SubmissionUpdate::new(in_block(block(2)), vec![module_error_failed(1, 77, 0)]));

		let report = completion.wait().await.unwrap();
		assert!(matches!(report.dispatch_error(), Some(DispatchError::UnresolvedModule(_))));
	}

	#[tokio::test]
	async fn non_module_dispatch_error_is_reported_by_name() {
		let (handler, completion) = waiter(XtStatus::InBlock);
		let failed = nc_node_api::test_utils::extrinsic_failed(1, RawDispatchError::BadOrigin);

		handler.on_update(SubmissionUpdate::new(in_block(block(2)), vec![failed]));

		let report = completion.wait().await.unwrap();
		assert_eq!(report.outcome, ExtrinsicOutcome::Failed(DispatchError::BadOrigin));
	}

	#[tokio::test]
	async fn only_extrinsic_success_completes_without_failure() {
		let (handler, completion) = waiter(XtStatus::InBlock);

		handler.on_update(SubmissionUpdate::new(in_block(block(3)), vec![extrinsic_success(0)]));

		let report = completion.wait().await.unwrap();
		assert!(report.is_success());
		assert_eq!(report.dispatch_error(), None);
		assert!(report.events.is_empty());
	}

	#[tokio::test]
	async fn informational_events_are_reported_verbatim() {
		let (handler, completion) = waiter(XtStatus::InBlock);
		let transfer_data = vec![json!("5GrwvaEF"), json!("5FHneW46"), json!("1000000000000")];
		let events = vec![
			other_event(1, "Balances", "Withdraw", vec![json!("5GrwvaEF"), json!(125000141)]),
			other_event(1, "Balances", "Transfer", transfer_data.clone()),
			extrinsic_success(1),
		];

		handler.on_update(SubmissionUpdate::new(in_block(block(4)), events));

		let report = completion.wait().await.unwrap();
		assert!(report.is_success());
		let names: Vec<_> =
			report.events.iter().map(|e| (e.pallet.as_str(), e.variant.as_str())).collect();
		assert_eq!(names, [("Balances", "Withdraw"), ("Balances", "Transfer")]);
		assert_eq!(report.events[1].data, transfer_data);
		assert_eq!(report.events[1].phase, Phase::ApplyExtrinsic(1));
	}

	#[tokio::test]
	async fn in_block_events_are_scanned_when_finalized() {
		let (handler, completion) = waiter(XtStatus::Finalized);

		handler.on_update(SubmissionUpdate::status(Status::Ready));
		handler.on_update(SubmissionUpdate::new(
			in_block(block(8)),
			vec![other_event(1, "Nftmart", "CreatedClass", vec![]), module_error_failed(1, 3, 2)],
		));
		assert!(!completion.is_complete());
		handler.on_update(SubmissionUpdate::status(Status::Finalized(block(8))));

		let report = completion.wait().await.unwrap();
		assert_eq!(report.status, Status::Finalized(block(8)));
		assert_eq!(report.dispatch_error().unwrap().to_string(), "Balances.InsufficientBalance");
		assert_eq!(report.events[0].variant, "CreatedClass");
	}

	#[tokio::test]
	async fn latest_in_block_update_wins_when_finalized() {
		let (handler, completion) = waiter(XtStatus::Finalized);

		handler.on_update(SubmissionUpdate::new(in_block(block(1)), vec![module_error_failed(1, 3, 2)]));
		handler.on_update(SubmissionUpdate::new(in_block(block(2)), vec![extrinsic_success(1)]));
		handler.on_update(SubmissionUpdate::status(Status::Finalized(block(2))));

		let report = completion.wait().await.unwrap();
		assert_eq!(report.outcome, ExtrinsicOutcome::Success);
	}

	#[tokio::test]
	async fn events_of_another_block_are_not_reported() {
		let (handler, completion) = waiter(XtStatus::Finalized);

		handler.on_update(SubmissionUpdate::new(in_block(block(1)), vec![module_error_failed(1, 3, 2)]));
		handler.on_update(SubmissionUpdate::status(Status::Finalized(block(9))));

		let report = completion.wait().await.unwrap();
		assert_eq!(report.outcome, ExtrinsicOutcome::Unknown);
		assert_eq!(report.block_hash, Some(block(9)));
	}

	#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
	async fn resolved_state_implies_available_report() {
		let (handler, completion) = waiter(XtStatus::InBlock);
		let completion = Arc::new(completion);

		let observer = {
			let (handler, completion) = (handler.clone(), completion.clone());
			tokio::task::spawn_blocking(move || loop {
				if handler.state() == WaiterState::Resolved {
					assert!(completion.is_complete());
					break
				}
				std::hint::spin_loop();
			})
		};
		handler.on_update(SubmissionUpdate::new(in_block(block(3)), vec![extrinsic_success(1)]));

		timeout(Duration::from_secs(5), observer).await.unwrap().unwrap();
		assert_eq!(handler.state(), WaiterState::Resolved);
	}

	#[tokio::test]
	async fn update_without_outcome_event_is_unknown() {
		let (handler, completion) = waiter(XtStatus::Ready);

		handler.on_update(SubmissionUpdate::status(Status::Ready));

		let report = completion.wait().await.unwrap();
		assert_eq!(report.outcome, ExtrinsicOutcome::Unknown);
		assert_eq!(report.block_hash, None);
	}

	#[tokio::test]
	async fn wait_suspends_until_delayed_terminal_update() {
		let (handler, completion) = waiter(XtStatus::InBlock);
		let delay = Duration::from_millis(150);

		let start = Instant::now();
		let feeder = tokio::spawn(async move {
			handler.on_update(SubmissionUpdate::status(Status::Ready));
			sleep(delay).await;
			handler.on_update(SubmissionUpdate::new(in_block(block(5)), vec![extrinsic_success(1)]));
		});

		let report = timeout(Duration::from_secs(5), completion.wait()).await.unwrap().unwrap();
		let elapsed = start.elapsed();

		assert!(elapsed >= delay, "returned after {elapsed:?}");
		assert!(elapsed < delay + Duration::from_secs(1), "returned after {elapsed:?}");
		assert_eq!(report.block_hash, Some(block(5)));
		feeder.await.unwrap();
	}

	#[tokio::test]
	async fn wait_returns_none_if_handlers_are_dropped() {
		let (handler, completion) = waiter(XtStatus::InBlock);
		let clone = handler.clone();
		clone.on_update(SubmissionUpdate::status(Status::Ready));

		drop(handler);
		drop(clone);

		assert_eq!(completion.wait().await, None);
	}

	#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
	async fn waiters_sharing_a_table_decode_independently() {
		let table = Arc::new(module_error_table());
		let (first_handler, first) = create_waiter::<Hash>(table.clone(), XtStatus::InBlock);
		let (second_handler, second) = create_waiter::<Hash>(table, XtStatus::InBlock);

		let first_feeder = tokio::spawn(async move {
			first_handler.on_update(SubmissionUpdate::status(Status::Ready));
			sleep(Duration::from_millis(40)).await;
			first_handler
				.on_update(SubmissionUpdate::new(in_block(block(6)), vec![module_error_failed(1, 3, 2)]));
		});
		let second_feeder = tokio::spawn(async move {
			second_handler.on_update(SubmissionUpdate::status(Status::Ready));
			sleep(Duration::from_millis(20)).await;
			second_handler
				.on_update(SubmissionUpdate::new(in_block(block(7)), vec![module_error_failed(2, 0, 5)]));
		});

		let (first, second) = tokio::join!(first.wait(), second.wait());
		first_feeder.await.unwrap();
		second_feeder.await.unwrap();

		let (first, second) = (first.unwrap(), second.unwrap());
		assert_eq!(first.block_hash, Some(block(6)));
		assert_eq!(first.dispatch_error().unwrap().to_string(), "Balances.InsufficientBalance");
		assert_eq!(second.block_hash, Some(block(7)));
		assert_eq!(second.dispatch_error().unwrap().to_string(), "System.CallFiltered");
	}
}
