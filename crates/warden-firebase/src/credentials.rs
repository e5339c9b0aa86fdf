// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Google service-account key files.

use std::path::Path;

use serde::Deserialize;
use tracing::{debug, instrument};
use warden_common_secret::SecretString;

use crate::error::FirebaseError;

pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

const SERVICE_ACCOUNT_TYPE: &str = "service_account";

/// A parsed service-account key, as downloaded from the Firebase console.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
	#[serde(rename = "type")]
	pub key_type: String,
	#[serde(default)]
	pub project_id: String,
	#[serde(default)]
	pub private_key_id: String,
	pub private_key: SecretString,
	pub client_email: String,
	#[serde(default = "default_token_uri")]
	pub token_uri: String,
}

fn default_token_uri() -> String {
	DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
	#[instrument(skip_all, fields(path = %path.display()))]
	pub fn from_file(path: &Path) -> Result<Self, FirebaseError> {
		let raw = std::fs::read_to_string(path).map_err(|e| {
			FirebaseError::Credentials(format!("cannot read {}: {e}", path.display()))
		})?;
		let key = Self::from_json(&raw)?;
		debug!(client_email = %key.client_email, project_id = %key.project_id, "loaded service account");
		Ok(key)
	}

	pub fn from_json(raw: &str) -> Result<Self, FirebaseError> {
		let key: ServiceAccountKey = serde_json::from_str(raw)
			.map_err(|e| FirebaseError::Credentials(format!("malformed service account JSON: {e}")))?;

		if key.key_type != SERVICE_ACCOUNT_TYPE {
			return Err(FirebaseError::Credentials(format!(
				"expected \"type\": \"{SERVICE_ACCOUNT_TYPE}\", found \"{}\"",
				key.key_type
			)));
		}
		if key.client_email.trim().is_empty() {
			return Err(FirebaseError::Credentials("client_email is empty".to_string()));
		}
		if key.private_key.is_empty() {
			return Err(FirebaseError::Credentials("private_key is empty".to_string()));
		}

		Ok(key)
	}
}
