// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! `warden`: create a Firebase user with a role claim, a profile document and
//! an audit entry, then print a one-time summary with the temporary password.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use thiserror::Error;
use warden_cli_config::{CliOverrides, ConfigError, WardenConfig};
use warden_firebase::{FirebaseClient, FirebaseConfig, RetryConfig, ServiceAccountKey};
use warden_provisioning::{FirebaseBackend, ProvisionError, Provisioner};

mod collect;
mod logging;
mod report;

use collect::{collect_account, AccountRequest, CollectError, Prompter};

/// Create a Firebase Auth user, assign its role claim, and initialize its
/// Firestore profile and audit log.
#[derive(Parser, Debug, Default)]
#[command(name = "warden", version)]
struct Args {
	/// Path to the service-account JSON key
	#[arg(long, value_name = "PATH")]
	service_account: Option<PathBuf>,

	/// Firebase project id (defaults to the service account's project)
	#[arg(long, value_name = "ID")]
	project_id: Option<String>,

	/// Username; prompted for when omitted
	#[arg(long)]
	username: Option<String>,

	/// Email address; inferred from the username when omitted
	#[arg(long)]
	email: Option<String>,

	/// Domain used to infer the email address
	#[arg(long)]
	domain: Option<String>,

	/// Role to assign as a custom claim
	#[arg(long, value_parser = ["admin", "staff", "user"], ignore_case = true)]
	role: Option<String>,

	/// Temporary password length; values below 10 are raised to 10
	#[arg(long, value_name = "N", allow_negative_numbers = true)]
	password_length: Option<i64>,

	/// Never prompt; fail if required details are missing
	#[arg(long)]
	no_input: bool,

	/// Config file to use instead of the user config
	#[arg(long, value_name = "PATH", env = "WARDEN_CONFIG")]
	config: Option<PathBuf>,

	/// Log level: trace, debug, info, warn or error
	#[arg(long, value_name = "LEVEL")]
	log_level: Option<String>,

	/// Emit logs as JSON
	#[arg(long)]
	json_logs: bool,
}

impl Args {
	fn overrides(&self) -> CliOverrides {
		CliOverrides {
			service_account: self.service_account.clone(),
			project_id: self.project_id.clone(),
			domain: self.domain.clone(),
			role: self.role.clone(),
			password_length: self.password_length,
			log_level: self.log_level.clone(),
			log_format: self.json_logs.then(|| "json".to_string()),
			config_file: self.config.clone(),
		}
	}

	fn account_request(&self, config: &WardenConfig) -> AccountRequest {
		AccountRequest {
			username: self.username.clone(),
			email: self.email.clone(),
			domain: config.defaults.email_domain.clone(),
			role: self.role.clone(),
			default_role: config.defaults.role.clone(),
			password_length: config.defaults.password_length,
			interactive: !self.no_input,
		}
	}
}

#[derive(Debug, Error)]
enum Failure {
	#[error("{0}")]
	Credentials(#[source] ConfigError),

	#[error("{0:#}")]
	Setup(anyhow::Error),

	#[error("{0}")]
	Input(#[from] CollectError),

	#[error("Error during account creation: {0}")]
	Provision(#[from] ProvisionError),
}

impl Failure {
	fn exit_code(&self) -> u8 {
		match self {
			Failure::Credentials(_) | Failure::Setup(_) => 1,
			Failure::Input(CollectError::Io(_)) => 1,
			Failure::Input(_) => 2,
			Failure::Provision(_) => 3,
		}
	}

	/// Uid of an auth user left without its claim, profile or audit entry.
	fn orphaned_uid(&self) -> Option<&str> {
		match self {
			Failure::Provision(e) => e.orphaned_uid(),
			_ => None,
		}
	}
}

fn firebase_client(config: &WardenConfig, key_path: Option<&Path>) -> anyhow::Result<FirebaseClient> {
	let key = key_path.map(ServiceAccountKey::from_file).transpose()?;

	let project_id = config
		.firebase
		.project_id
		.clone()
		.or_else(|| {
			key.as_ref()
				.map(|k| k.project_id.clone())
				.filter(|p| !p.is_empty())
		})
		.context(
			"no project id: pass --project-id, set WARDEN_PROJECT_ID, or set firebase.project_id",
		)?;

	let mut settings = FirebaseConfig::new(project_id)
		.with_retry(RetryConfig::with_max_attempts(config.retry.max_attempts));
	if let Some(host) = &config.firebase.auth_emulator_host {
		settings = settings.with_auth_emulator(host);
	}
	if let Some(host) = &config.firebase.firestore_emulator_host {
		settings = settings.with_firestore_emulator(host);
	}

	Ok(FirebaseClient::new(settings, key)?)
}

/// Everything after configuration: credentials, prompting, provisioning and
/// the summary.
async fn provision_account<R: BufRead, W: Write>(
	args: &Args,
	config: &WardenConfig,
	input: R,
	mut output: W,
) -> Result<(), Failure> {
	let key_path = config.locate_service_account().map_err(Failure::Credentials)?;
	if let Some(path) = &key_path {
		tracing::info!(path = %path.display(), "using service account");
	}

	let client = firebase_client(config, key_path.as_deref())
		.context("Failed to initialize Firebase Admin")
		.map_err(Failure::Setup)?;
	tracing::info!(project_id = %client.project_id(), "firebase client ready");

	let account = {
		let mut prompter = Prompter::new(input, &mut output);
		collect_account(&args.account_request(config), &mut prompter)?
	};

	let provisioner = Provisioner::new(FirebaseBackend::new(client), config.audit.actor.as_str());
	let provisioned = provisioner.provision(&account).await?;

	report::write_summary(&mut output, &provisioned.uid, &account)
		.context("writing summary")
		.map_err(Failure::Setup)?;
	Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
	let args = Args::parse();

	let config = match warden_cli_config::load_config(args.overrides()) {
		Ok(config) => config,
		Err(e) => {
			eprintln!("Invalid configuration: {e}");
			return ExitCode::from(1);
		}
	};

	logging::init(&config.logging);

	let stdin = io::stdin();
	let result = provision_account(&args, &config, stdin.lock(), io::stdout()).await;

	match result {
		Ok(()) => ExitCode::SUCCESS,
		Err(failure) => {
			if let Some(uid) = failure.orphaned_uid() {
				tracing::warn!(uid, "auth user was created but provisioning did not finish");
			}
			eprintln!("{failure}");
			ExitCode::from(failure.exit_code())
		}
	}
}
