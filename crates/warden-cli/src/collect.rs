// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Gathering the account details from flags and, when needed, the terminal.

use std::io::{self, BufRead, Write};

use thiserror::Error;
use tracing::debug;
use warden_common_secret::generate_temp_password;
use warden_provisioning::{infer_email, is_conventional_username, is_valid_email, pick_role, NewAccount};

#[derive(Debug, Error)]
pub enum CollectError {
	#[error("Username is required.")]
	MissingUsername,

	#[error("Input closed before a username was entered.")]
	EndOfInput,

	#[error("Provided email is invalid format.")]
	InvalidProvidedEmail,

	#[error("Email is invalid. Aborting.")]
	InvalidEmail,

	#[error("terminal I/O failed: {0}")]
	Io(#[from] io::Error),
}

/// What the operator asked for before any prompting.
#[derive(Debug, Clone)]
pub struct AccountRequest {
	pub username: Option<String>,
	pub email: Option<String>,
	pub domain: String,
	pub role: Option<String>,
	pub default_role: String,
	pub password_length: usize,
	/// Prompting is allowed.
	pub interactive: bool,
}

/// Line-oriented terminal: answers come from `input`, prompts and notices go
/// to `output`.
pub struct Prompter<R, W> {
	input: R,
	output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
	pub fn new(input: R, output: W) -> Self {
		Self { input, output }
	}

	/// Print `prompt` and read one trimmed line. `None` at end of input.
	pub fn ask(&mut self, prompt: &str) -> io::Result<Option<String>> {
		write!(self.output, "{prompt}")?;
		self.output.flush()?;

		let mut line = String::new();
		if self.input.read_line(&mut line)? == 0 {
			return Ok(None);
		}
		Ok(Some(line.trim().to_string()))
	}

	pub fn say(&mut self, message: &str) -> io::Result<()> {
		writeln!(self.output, "{message}")
	}

	pub fn into_output(self) -> W {
		self.output
	}
}

fn read_username<R: BufRead, W: Write>(
	request: &AccountRequest,
	prompter: &mut Prompter<R, W>,
) -> Result<String, CollectError> {
	if let Some(username) = request.username.as_deref().map(str::trim) {
		if !username.is_empty() {
			return Ok(username.to_string());
		}
	}

	if !request.interactive {
		return Err(CollectError::MissingUsername);
	}

	loop {
		match prompter.ask("Enter username: ")? {
			None => return Err(CollectError::EndOfInput),
			Some(answer) if answer.is_empty() => prompter.say("Username is required.")?,
			Some(answer) => return Ok(answer),
		}
	}
}

/// Build the [`NewAccount`]: username, email, role and a fresh temporary
/// password.
pub fn collect_account<R: BufRead, W: Write>(
	request: &AccountRequest,
	prompter: &mut Prompter<R, W>,
) -> Result<NewAccount, CollectError> {
	let username = read_username(request, prompter)?;

	if !is_conventional_username(&username) {
		prompter.say("Warning: unusual username format. Allowed: letters/digits/._- (3-64 chars).")?;
	}

	let email = match request.email.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
		Some(email) => {
			if !is_valid_email(email) {
				return Err(CollectError::InvalidProvidedEmail);
			}
			email.to_string()
		}
		None => {
			let email = infer_email(&username, &request.domain);
			prompter.say(&format!("Inferred email: {email}"))?;
			email
		}
	};

	let role = pick_role(request.role.as_deref(), &request.default_role);
	let temp_password = generate_temp_password(request.password_length);
	debug!(role = %role, password_length = temp_password.char_len(), "collected account details");

	let account = NewAccount {
		username,
		email,
		role,
		temp_password,
	};

	if !is_valid_email(&account.email) {
		return Err(CollectError::InvalidEmail);
	}

	Ok(account)
}
