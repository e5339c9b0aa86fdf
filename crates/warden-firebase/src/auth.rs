// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Identity Toolkit operations: user creation and custom claims.

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use warden_common_http::retry;
use warden_common_secret::SecretString;

use crate::client::{FirebaseClient, Service};
use crate::error::FirebaseError;

/// Serialized custom claims may not exceed this many bytes.
pub const MAX_CLAIMS_PAYLOAD_BYTES: usize = 1000;

/// Token claim names Firebase reserves for itself.
pub const RESERVED_CLAIMS: &[&str] = &[
	"acr", "amr", "at_hash", "aud", "auth_time", "azp", "cnf", "c_hash", "exp", "firebase", "iat",
	"iss", "jti", "nbf", "nonce", "sub",
];

#[derive(Debug, Clone)]
pub struct CreateUserRequest {
	pub email: String,
	pub password: SecretString,
	pub display_name: Option<String>,
	pub email_verified: bool,
	pub disabled: bool,
}

impl CreateUserRequest {
	pub fn new(email: impl Into<String>, password: SecretString) -> Self {
		Self {
			email: email.into(),
			password,
			display_name: None,
			email_verified: false,
			disabled: false,
		}
	}

	pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
		self.display_name = Some(display_name.into());
		self
	}
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignUpBody<'a> {
	email: &'a str,
	password: &'a str,
	#[serde(skip_serializing_if = "Option::is_none")]
	display_name: Option<&'a str>,
	email_verified: bool,
	disabled: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignUpResponse {
	local_id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateBody<'a> {
	local_id: &'a str,
	custom_attributes: &'a str,
}

/// Check claims the way Firebase would and return their serialized form.
///
/// `null` clears all claims and serializes to `{}`.
pub fn validate_custom_claims(claims: &serde_json::Value) -> Result<String, FirebaseError> {
	let object = match claims {
		serde_json::Value::Null => return Ok("{}".to_string()),
		serde_json::Value::Object(map) => map,
		_ => {
			return Err(FirebaseError::InvalidClaims(
				"claims must be a JSON object".to_string(),
			))
		}
	};

	if let Some(reserved) = object.keys().find(|k| RESERVED_CLAIMS.contains(&k.as_str())) {
		return Err(FirebaseError::InvalidClaims(format!(
			"\"{reserved}\" is a reserved claim"
		)));
	}

	let serialized = serde_json::to_string(object)
		.map_err(|e| FirebaseError::InvalidClaims(e.to_string()))?;
	if serialized.len() > MAX_CLAIMS_PAYLOAD_BYTES {
		return Err(FirebaseError::InvalidClaims(format!(
			"payload is {} bytes, limit is {MAX_CLAIMS_PAYLOAD_BYTES}",
			serialized.len()
		)));
	}

	Ok(serialized)
}

impl FirebaseClient {
	/// Create an email/password user and return its uid.
	///
	/// Sent once: a retried sign-up could create a duplicate or surface a
	/// misleading `EMAIL_EXISTS`.
	#[instrument(skip_all, fields(project_id = %self.project_id()))]
	pub async fn create_user(&self, request: &CreateUserRequest) -> Result<String, FirebaseError> {
		let body = SignUpBody {
			email: &request.email,
			password: request.password.expose(),
			display_name: request.display_name.as_deref(),
			email_verified: request.email_verified,
			disabled: request.disabled,
		};

		let url = self.config().accounts_url("");
		let response = self
			.post_json::<_, SignUpResponse>(Service::Auth, &url, &body)
			.await?;

		if response.local_id.is_empty() {
			return Err(FirebaseError::InvalidResponse(
				"sign-up response has an empty localId".to_string(),
			));
		}

		info!(uid = %response.local_id, "created auth user");
		Ok(response.local_id)
	}

	/// Replace the user's custom claims.
	#[instrument(skip(self, claims), fields(project_id = %self.project_id()))]
	pub async fn set_custom_user_claims(
		&self,
		uid: &str,
		claims: &serde_json::Value,
	) -> Result<(), FirebaseError> {
		let custom_attributes = validate_custom_claims(claims)?;
		let body = UpdateBody {
			local_id: uid,
			custom_attributes: &custom_attributes,
		};
		let url = self.config().accounts_url(":update");

		retry(&self.config().retry, || {
			self.post_json::<_, serde_json::Value>(Service::Auth, &url, &body)
		})
		.await?;

		info!(uid, "set custom claims");
		Ok(())
	}
}
