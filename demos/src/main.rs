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

//! Command line demo of the extrinsic confirmation waiter.
//!
//! Replays recorded submissions of the NFTMart demo actions (balance transfer,
//! class creation, minting, whitelisting) through a session on a scripted node
//! connection, and prints the module errors of an NFTMart runtime.

use clap::{Parser, Subcommand};
use log::*;
use nftmart_client::{
	nc_node_api::metadata::MetadataError,
	rpc::mocks::{ScriptedClient, ScriptedUpdate},
	ExtrinsicOutcome, ExtrinsicReport, Hash, ModuleErrorTable, Session, WatchConfig, XtStatus,
};
use serde::Deserialize;
use std::{
	fmt, fs,
	path::{Path, PathBuf},
	time::Duration,
};

#[derive(Debug)]
enum CliError {
	Io(std::io::Error),
	Json(serde_json::Error),
	Hex(hex::FromHexError),
	Api(nftmart_client::Error),
	Metadata(MetadataError),
}

impl fmt::Display for CliError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			CliError::Io(e) => write!(f, "IO error: {}", e),
			CliError::Json(e) => write!(f, "JSON error: {}", e),
			CliError::Hex(e) => write!(f, "Hex decoding error: {}", e),
			CliError::Api(e) => write!(f, "API error: {}", e),
			CliError::Metadata(e) => write!(f, "Metadata error: {:?}", e),
		}
	}
}

impl std::error::Error for CliError {}

impl From<std::io::Error> for CliError {
	fn from(e: std::io::Error) -> Self {
		CliError::Io(e)
	}
}

impl From<serde_json::Error> for CliError {
	fn from(e: serde_json::Error) -> Self {
		CliError::Json(e)
	}
}

impl From<hex::FromHexError> for CliError {
	fn from(e: hex::FromHexError) -> Self {
		CliError::Hex(e)
	}
}

impl From<nftmart_client::Error> for CliError {
	fn from(e: nftmart_client::Error) -> Self {
		CliError::Api(e)
	}
}

impl From<MetadataError> for CliError {
	fn from(e: MetadataError) -> Self {
		CliError::Metadata(e)
	}
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Replay a recorded submission and wait for its confirmation
	Replay {
		/// Module error table of the runtime (JSON)
		#[arg(short, long)]
		metadata: PathBuf,

		/// Recorded submission: the extrinsic and the status updates of the node
		scenario: PathBuf,

		#[arg(short, long, default_value_t = XtStatus::InBlock)]
		until: XtStatus,

		#[arg(short, long)]
		timeout_secs: Option<u64>,
	},

	/// Print the module errors of the runtime
	ShowErrors {
		#[arg(short, long)]
		metadata: PathBuf,

		/// Only print the errors of this pallet
		#[arg(short, long)]
		pallet: Option<String>,
	},
}

/// A submission as recorded from an NFTMart node.
#[derive(Debug, Deserialize)]
struct RecordedSubmission {
	extrinsic: String,
	updates: Vec<ScriptedUpdate>,
}

#[tokio::main]
async fn main() {
	env_logger::init();

	let args = Args::parse();
	let result = match args.command {
		Command::Replay { metadata, scenario, until, timeout_secs } => {
			let mut config = WatchConfig::until(until);
			if let Some(secs) = timeout_secs {
				config = config.with_timeout(Duration::from_secs(secs));
			}
			replay(&metadata, &scenario, config).await
		},
		Command::ShowErrors { metadata, pallet } => show_errors(&metadata, pallet.as_deref()),
	};

	if let Err(e) = result {
		error!("{}", e);
		eprintln!("[-] {}", e);
		std::process::exit(1);
	}
}

fn load_module_errors(path: &Path) -> Result<ModuleErrorTable, CliError> {
	let table: ModuleErrorTable = serde_json::from_str(&fs::read_to_string(path)?)?;
	debug!("Loaded module errors of {} pallets from {}", table.len(), path.display());
	Ok(table)
}

async fn replay(metadata: &Path, scenario: &Path, config: WatchConfig) -> Result<(), CliError> {
	let module_errors = load_module_errors(metadata)?;
	let submission: RecordedSubmission = serde_json::from_str(&fs::read_to_string(scenario)?)?;

	let report = replay_submission(module_errors, submission, config).await?;
	for line in report_lines(&report) {
		println!("{line}");
	}
	Ok(())
}

async fn replay_submission(
	module_errors: ModuleErrorTable,
	submission: RecordedSubmission,
	config: WatchConfig,
) -> Result<ExtrinsicReport<Hash>, CliError> {
	let extrinsic = hex::decode(submission.extrinsic.trim_start_matches("0x"))?;
	let client = ScriptedClient::new([submission.updates]);
	let session = Session::new_offline(client, module_errors).with_config(config);

	println!("[+] Submitting extrinsic, watching until {}", config.watch_until);
	Ok(session.submit_and_watch_until(extrinsic).await?)
}

/// Same lines the NFTMart node scripts print for a confirmed extrinsic.
fn report_lines(report: &ExtrinsicReport<Hash>) -> Vec<String> {
	let mut lines = Vec::new();
	if let Some(extrinsic_hash) = &report.extrinsic_hash {
		lines.push(format!("[+] Extrinsic hash: {:?}", extrinsic_hash));
	}
	match &report.block_hash {
		Some(block_hash) => lines.push(format!("{} BlockHash({:?})", report.status.type_name(), block_hash)),
		None => lines.push(report.status.type_name().to_string()),
	}
	if let ExtrinsicOutcome::Failed(dispatch_error) = &report.outcome {
		lines.push(format!("error: {dispatch_error}"));
	}
	for event in &report.events {
		lines.push(format!("event: {event}"));
	}
	lines
}

fn show_errors(metadata: &Path, pallet: Option<&str>) -> Result<(), CliError> {
	let module_errors = load_module_errors(metadata)?;
	match pallet {
		Some(name) => module_errors.pallet_by_name_err(name)?.print_errors(),
		None => module_errors.print_overview(),
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn module_errors() -> ModuleErrorTable {
		serde_json::from_str(include_str!("../scenarios/nftmart-errors.json")).unwrap()
	}

	fn submission(json: &str) -> RecordedSubmission {
		serde_json::from_str(json).unwrap()
	}

	#[test]
	fn nftmart_error_table_uses_positional_error_codes() {
		let table = module_errors();
		let nftmart = table.pallet_by_name("Nftmart").unwrap();
		assert_eq!(nftmart.index, 61);
		assert_eq!(nftmart.error_variant_by_index(6).unwrap().name, "CannotDestroyClass");
	}

	#[tokio::test]
	async fn transfer_reports_balance_events() {
		let report = replay_submission(
			module_errors(),
			submission(include_str!("../scenarios/transfer.json")),
			WatchConfig::default(),
		)
		.await
		.unwrap();

		assert!(report.is_success());
		let lines = report_lines(&report);
		assert!(lines[1].starts_with("InBlock BlockHash(0x9a3f8c7a"));
		assert!(lines.iter().any(|l| l.starts_with("event: ApplyExtrinsic(1) balances.Transfer")));
	}

	#[tokio::test]
	async fn transfer_can_be_watched_until_finalized() {
		let report = replay_submission(
			module_errors(),
			submission(include_str!("../scenarios/transfer.json")),
			WatchConfig::until(XtStatus::Finalized),
		)
		.await
		.unwrap();

		assert_eq!(report_lines(&report)[1].split(' ').next(), Some("Finalized"));
	}

	#[tokio::test]
	async fn create_class_reports_created_class() {
		let report = replay_submission(
			module_errors(),
			submission(include_str!("../scenarios/create-class.json")),
			WatchConfig::default(),
		)
		.await
		.unwrap();

		assert!(report.is_success());
		let created = report.events.iter().find(|e| e.variant == "CreatedClass").unwrap();
		assert_eq!(created.data[1], serde_json::json!(0));
	}

	#[tokio::test]
	async fn mint_without_funds_decodes_insufficient_balance() {
		let report = replay_submission(
			module_errors(),
			submission(include_str!("../scenarios/mint-insufficient-balance.json")),
			WatchConfig::default(),
		)
		.await
		.unwrap();

		assert!(report_lines(&report).contains(&"error: Balances.InsufficientBalance".to_string()));
	}

	#[tokio::test]
	async fn add_whitelist_reports_bad_origin() {
		let report = replay_submission(
			module_errors(),
			submission(include_str!("../scenarios/add-whitelist-bad-origin.json")),
			WatchConfig::default(),
		)
		.await
		.unwrap();

		assert!(report_lines(&report).contains(&"error: BadOrigin".to_string()));
	}

	#[tokio::test]
	async fn slow_node_runs_into_timeout() {
		let result = replay_submission(
			module_errors(),
			submission(include_str!("../scenarios/transfer.json")),
			WatchConfig::default().with_timeout(Duration::from_millis(50)),
		)
		.await;

		assert!(matches!(result, Err(CliError::Api(nftmart_client::Error::Timeout))));
	}
}
