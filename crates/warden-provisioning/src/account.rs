// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Account, profile and audit record types.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use warden_common_secret::SecretString;

use crate::role::Role;

/// Profile field the server stamps with the commit time.
pub const PROFILE_TIMESTAMP_FIELD: &str = "tempPasswordSetAt";

/// Audit field the server stamps with the commit time.
pub const AUDIT_TIMESTAMP_FIELD: &str = "at";

/// Everything needed to provision one account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
	pub username: String,
	pub email: String,
	pub role: Role,
	pub temp_password: SecretString,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
	Active,
}

impl AccountStatus {
	pub fn as_str(&self) -> &'static str {
		match self {
			AccountStatus::Active => "active",
		}
	}
}

/// The `profiles/{uid}` document, minus its server-stamped
/// [`PROFILE_TIMESTAMP_FIELD`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
	pub username: String,
	pub email: String,
	pub role: Role,
	pub status: AccountStatus,
	/// UTC, microsecond precision, `Z` suffix.
	pub created_at: String,
	pub must_change_password: bool,
}

impl Profile {
	pub fn for_account(account: &NewAccount, now: DateTime<Utc>) -> Self {
		Self {
			username: account.username.clone(),
			email: account.email.clone(),
			role: account.role,
			status: AccountStatus::Active,
			created_at: now.to_rfc3339_opts(SecondsFormat::Micros, true),
			must_change_password: true,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
	AccountCreated,
}

impl AuditAction {
	pub fn as_str(&self) -> &'static str {
		match self {
			AuditAction::AccountCreated => "account_created",
		}
	}
}

impl fmt::Display for AuditAction {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// An event under `auth_logs/{uid}/events`, minus its server-stamped
/// [`AUDIT_TIMESTAMP_FIELD`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditEvent {
	pub action: AuditAction,
	pub by: String,
	pub meta: AuditMeta,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditMeta {
	pub role: Role,
}

impl AuditEvent {
	pub fn account_created(actor: impl Into<String>, role: Role) -> Self {
		Self {
			action: AuditAction::AccountCreated,
			by: actor.into(),
			meta: AuditMeta { role },
		}
	}
}

/// Result of a fully successful provisioning run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionedAccount {
	pub uid: String,
	pub audit_event_id: String,
}
