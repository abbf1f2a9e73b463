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

//! Seams to the node connection.

pub use error::*;

pub mod error;
#[cfg(any(feature = "mocks", test))]
pub mod mocks;

use crate::api::SubmissionUpdate;
use alloc::vec::Vec;
use async_trait::async_trait;
use frame_metadata::RuntimeMetadataPrefixed;

/// Trait to be implemented by the subscription of a node connection.
#[async_trait]
pub trait HandleSubscription<Notification> {
	/// Returns the next notification from the stream.
	/// This may return `None` if the subscription has been terminated,
	/// which may happen if the channel becomes full or is dropped.
	async fn next(&mut self) -> Option<Result<Notification>>;

	/// Unsubscribe and consume the subscription.
	async fn unsubscribe(self) -> Result<()>;
}

/// Submit an extrinsic and subscribe to its status updates
/// (`author_submitAndWatchExtrinsic`).
#[async_trait]
pub trait WatchExtrinsic {
	type Hash;
	type Subscription: HandleSubscription<SubmissionUpdate<Self::Hash>> + Send;

	async fn submit_and_watch(&self, encoded_extrinsic: Vec<u8>) -> Result<Self::Subscription>;
}

/// Fetch the runtime metadata of the node (`state_getMetadata`).
#[async_trait]
pub trait FetchMetadata {
	async fn fetch_metadata(&self) -> Result<RuntimeMetadataPrefixed>;
}
