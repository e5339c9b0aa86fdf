// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Authorization role, stored as the `role` custom claim and on the profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
	Admin,
	Staff,
	User,
}

impl Role {
	pub fn as_str(&self) -> &'static str {
		match self {
			Role::Admin => "admin",
			Role::Staff => "staff",
			Role::User => "user",
		}
	}
}

impl fmt::Display for Role {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role '{0}' (expected admin, staff or user)")]
pub struct RoleParseError(pub String);

impl FromStr for Role {
	type Err = RoleParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"admin" => Ok(Role::Admin),
			"staff" => Ok(Role::Staff),
			"user" => Ok(Role::User),
			_ => Err(RoleParseError(s.to_string())),
		}
	}
}

/// `raw` if it names a role, otherwise `default` if that does, otherwise
/// [`Role::User`].
pub fn pick_role(raw: Option<&str>, default: &str) -> Role {
	raw.and_then(|r| r.parse().ok())
		.or_else(|| default.parse().ok())
		.unwrap_or(Role::User)
}
