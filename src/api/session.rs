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

//! Submit extrinsics and watch them until the desired confirmation depth.

use crate::{
	api::{
		create_waiter, Completion, Error, ExtrinsicOutcome, ExtrinsicReport, Result,
		SubmissionUpdate, UnexpectedTxStatus, UpdateHandler, WaiterState, XtStatus,
	},
	rpc::{FetchMetadata, HandleSubscription, WatchExtrinsic},
};
use alloc::{sync::Arc, vec::Vec};
use core::{fmt::Debug, time::Duration};
use log::*;
use nc_node_api::ModuleErrorTable;
use sp_crypto_hashing::blake2_256;

/// Until when, and for how long, submitted extrinsics are watched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchConfig {
	pub watch_until: XtStatus,
	/// Upper bound on the wait for a single extrinsic. `None` waits forever.
	pub timeout: Option<Duration>,
}

impl Default for WatchConfig {
	fn default() -> Self {
		Self { watch_until: XtStatus::InBlock, timeout: None }
	}
}

impl WatchConfig {
	pub fn until(watch_until: XtStatus) -> Self {
		Self { watch_until, ..Default::default() }
	}

	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = Some(timeout);
		self
	}
}

/// One node connection together with the module error table of its runtime.
///
/// The table is fetched once and shared read-only with every waiter the session creates.
pub struct Session<Client> {
	client: Client,
	module_errors: Arc<ModuleErrorTable>,
	config: WatchConfig,
}

impl<Client: FetchMetadata> Session<Client> {
	/// Create a new session, fetching the module errors from the node.
	pub async fn new(client: Client) -> Result<Self> {
		let metadata = client.fetch_metadata().await?;
		let module_errors = ModuleErrorTable::try_from(metadata)?;
		info!("Fetched module errors of {} pallets", module_errors.len());
		Ok(Self::new_offline(client, module_errors))
	}
}

impl<Client> Session<Client> {
	/// Create a session with a module error table at hand, without asking the node.
	pub fn new_offline(client: Client, module_errors: ModuleErrorTable) -> Self {
		Self { client, module_errors: Arc::new(module_errors), config: WatchConfig::default() }
	}

	pub fn with_config(mut self, config: WatchConfig) -> Self {
		self.config = config;
		self
	}

	pub fn config(&self) -> &WatchConfig {
		&self.config
	}

	pub fn module_errors(&self) -> &Arc<ModuleErrorTable> {
		&self.module_errors
	}

	pub fn client(&self) -> &Client {
		&self.client
	}

	/// A waiter resolving at the configured confirmation depth.
	pub fn waiter<Hash>(&self) -> (UpdateHandler<Hash>, Completion<Hash>) {
		create_waiter(self.module_errors.clone(), self.config.watch_until)
	}
}

impl<Client> Session<Client>
where
	Client: WatchExtrinsic + Sync,
	Client::Hash: From<[u8; 32]> + Clone + Debug + PartialEq + Send + Sync,
{
	/// Submit an extrinsic and watch it until the configured status is reached,
	/// if no error is encountered previously.
	///
	/// A dispatch failure is not an error here: it is reported as
	/// [`ExtrinsicOutcome::Failed`].
	pub async fn submit_and_watch_until(
		&self,
		encoded_extrinsic: Vec<u8>,
	) -> Result<ExtrinsicReport<Client::Hash>> {
		let extrinsic_hash: Client::Hash = blake2_256(&encoded_extrinsic).into();
		debug!("Submitting extrinsic {:?}", extrinsic_hash);

		let mut subscription = self.client.submit_and_watch(encoded_extrinsic).await?;
		let (handler, completion) = self.waiter();

		let watched = watch_subscription(&mut subscription, handler, completion);
		let result = match self.config.timeout {
			Some(timeout) => tokio::time::timeout(timeout, watched).await.unwrap_or_else(|_| {
				warn!("Extrinsic {:?} not confirmed within {:?}", extrinsic_hash, timeout);
				Err(Error::Timeout)
			}),
			None => watched.await,
		};

		let unsubscribed = subscription.unsubscribe().await;
		let mut report = result?;
		unsubscribed?;

		report.extrinsic_hash = Some(extrinsic_hash);
		Ok(report)
	}

	/// Submit an extrinsic and watch it until the configured status is reached.
	/// A dispatch failure is returned as [`Error::Dispatch`].
	pub async fn submit_and_watch_until_success(
		&self,
		encoded_extrinsic: Vec<u8>,
	) -> Result<ExtrinsicReport<Client::Hash>> {
		let mut report = self.submit_and_watch_until(encoded_extrinsic).await?;
		match core::mem::replace(&mut report.outcome, ExtrinsicOutcome::Unknown) {
			ExtrinsicOutcome::Failed(dispatch_error) => Err(Error::Dispatch(dispatch_error)),
			outcome => {
				report.outcome = outcome;
				Ok(report)
			},
		}
	}
}

/// Forward the subscription into the waiter while waiting for its completion.
async fn watch_subscription<Hash, Subscription>(
	subscription: &mut Subscription,
	handler: UpdateHandler<Hash>,
	completion: Completion<Hash>,
) -> Result<ExtrinsicReport<Hash>>
where
	Hash: Clone + Debug + PartialEq,
	Subscription: HandleSubscription<SubmissionUpdate<Hash>>,
{
	let forward = forward_updates(subscription, handler);
	let wait = async { completion.wait().await.ok_or(Error::NoStream) };
	let ((), report) = tokio::try_join!(forward, wait)?;
	Ok(report)
}

/// Returns as soon as the waiter resolved. Fails if the subscription ends, or
/// reports a status the extrinsic can not recover from, before that.
async fn forward_updates<Hash, Subscription>(
	subscription: &mut Subscription,
	handler: UpdateHandler<Hash>,
) -> Result<()>
where
	Hash: Clone + Debug + PartialEq,
	Subscription: HandleSubscription<SubmissionUpdate<Hash>>,
{
	while let Some(update) = subscription.next().await {
		let update = update?;
		if let Some(unexpected) = UnexpectedTxStatus::from_status(&update.status) {
			warn!("Unsupported transaction status {:?}, stopping watch process", unexpected);
			return Err(Error::UnexpectedTxStatus(unexpected))
		}
		if handler.on_update(update) == WaiterState::Resolved {
			return Ok(())
		}
	}
	Err(Error::NoStream)
}
