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

//! Scripted node connection, replaying recorded status updates.

use crate::{
	api::SubmissionUpdate,
	rpc::{Error, FetchMetadata, HandleSubscription, Result, WatchExtrinsic},
	Hash,
};
use async_trait::async_trait;
use codec::{Decode, Encode};
use frame_metadata::RuntimeMetadataPrefixed;
use log::*;
use serde::Deserialize;
use std::{
	collections::VecDeque,
	sync::{
		atomic::{AtomicUsize, Ordering},
		Arc,
	},
	time::Duration,
};
use tokio::{sync::Mutex, time::sleep};

/// A status update, sent after `delay_ms` have passed since the previous one.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptedUpdate {
	#[serde(default)]
	pub delay_ms: u64,
	#[serde(flatten)]
	pub update: SubmissionUpdate<Hash>,
}

impl ScriptedUpdate {
	pub fn new(delay_ms: u64, update: SubmissionUpdate<Hash>) -> Self {
		Self { delay_ms, update }
	}

	pub fn delay(&self) -> Duration {
		Duration::from_millis(self.delay_ms)
	}
}

/// Connection answering every submission with the next script of updates.
#[derive(Debug, Default)]
pub struct ScriptedClient {
	encoded_metadata: Option<Vec<u8>>,
	scripts: Mutex<VecDeque<Vec<ScriptedUpdate>>>,
	submitted: Mutex<Vec<Vec<u8>>>,
	unsubscribed: Arc<AtomicUsize>,
}

impl ScriptedClient {
	pub fn new(scripts: impl IntoIterator<Item = Vec<ScriptedUpdate>>) -> Self {
		Self { scripts: Mutex::new(scripts.into_iter().collect()), ..Default::default() }
	}

	/// Runtime metadata answered to `fetch_metadata`.
	pub fn with_metadata(mut self, metadata: RuntimeMetadataPrefixed) -> Self {
		self.encoded_metadata = Some(metadata.encode());
		self
	}

	/// Encoded extrinsics submitted so far.
	pub async fn submitted(&self) -> Vec<Vec<u8>> {
		self.submitted.lock().await.clone()
	}

	/// Number of subscriptions that have been unsubscribed.
	pub fn unsubscribed(&self) -> usize {
		self.unsubscribed.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl WatchExtrinsic for ScriptedClient {
	type Hash = Hash;
	type Subscription = SubscriptionMock;

	async fn submit_and_watch(&self, encoded_extrinsic: Vec<u8>) -> Result<Self::Subscription> {
		let script = self
			.scripts
			.lock()
			.await
			.pop_front()
			.ok_or_else(|| Error::Client("no scripted submission left".into()))?;
		debug!("replaying {} scripted updates", script.len());
		self.submitted.lock().await.push(encoded_extrinsic);
		Ok(SubscriptionMock { updates: script.into(), unsubscribed: self.unsubscribed.clone() })
	}
}

#[async_trait]
impl FetchMetadata for ScriptedClient {
	async fn fetch_metadata(&self) -> Result<RuntimeMetadataPrefixed> {
		let encoded = self.encoded_metadata.as_deref().ok_or(Error::ConnectionClosed)?;
		Ok(RuntimeMetadataPrefixed::decode(&mut &encoded[..])?)
	}
}

#[derive(Debug)]
pub struct SubscriptionMock {
	updates: VecDeque<ScriptedUpdate>,
	unsubscribed: Arc<AtomicUsize>,
}

#[async_trait]
impl HandleSubscription<SubmissionUpdate<Hash>> for SubscriptionMock {
	async fn next(&mut self) -> Option<Result<SubmissionUpdate<Hash>>> {
		let scripted = self.updates.pop_front()?;
		sleep(scripted.delay()).await;
		Some(Ok(scripted.update))
	}

	async fn unsubscribe(self) -> Result<()> {
		self.unsubscribed.fetch_add(1, Ordering::SeqCst);
		Ok(())
	}
}
