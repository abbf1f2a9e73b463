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

use crate::{api::UnexpectedTxStatus, rpc::Error as RpcClientError};
use core::fmt;
use nc_node_api::{error::DispatchError, metadata::InvalidMetadataError};

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, derive_more::From)]
pub enum Error {
	/// Rpc Client Error.
	RpcClient(RpcClientError),
	/// Invalid Metadata Error.
	InvalidMetadata(InvalidMetadataError),
	/// Node Api Dispatch Error.
	Dispatch(DispatchError),
	/// Encountered unexpected tx status during watch process.
	UnexpectedTxStatus(UnexpectedTxStatus),
	/// The subscription was closed before the desired status was reached.
	NoStream,
	/// The desired status was not reached within the configured timeout.
	Timeout,
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Error::RpcClient(e) => write!(f, "rpc client error: {e}"),
			Error::InvalidMetadata(e) => write!(f, "invalid metadata: {e:?}"),
			Error::Dispatch(e) => write!(f, "extrinsic failed: {e}"),
			Error::UnexpectedTxStatus(status) =>
				write!(f, "unexpected transaction status: {status:?}"),
			Error::NoStream => f.write_str("subscription closed before the extrinsic was confirmed"),
			Error::Timeout => f.write_str("extrinsic was not confirmed in time"),
		}
	}
}

impl core::error::Error for Error {}
