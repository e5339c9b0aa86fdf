// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! OAuth2 access tokens for a service account (JWT bearer grant).

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};
use warden_common_http::{retry, RetryConfig};
use warden_common_secret::SecretString;

use crate::credentials::ServiceAccountKey;
use crate::error::FirebaseError;

/// Bearer token accepted by the Auth and Firestore emulators.
pub const EMULATOR_TOKEN: &str = "owner";

pub const OAUTH_SCOPES: &[&str] = &[
	"https://www.googleapis.com/auth/cloud-platform",
	"https://www.googleapis.com/auth/datastore",
	"https://www.googleapis.com/auth/firebase",
	"https://www.googleapis.com/auth/identitytoolkit",
	"https://www.googleapis.com/auth/userinfo.email",
];

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const TOKEN_REFRESH_BUFFER_SECS: i64 = 60;

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct AssertionClaims {
	pub iss: String,
	pub sub: String,
	pub aud: String,
	pub scope: String,
	pub iat: i64,
	pub exp: i64,
}

/// Sign the self-issued assertion exchanged at the key's `token_uri`.
#[instrument(skip_all, fields(client_email = %key.client_email))]
pub fn build_assertion(key: &ServiceAccountKey, now: DateTime<Utc>) -> Result<String, FirebaseError> {
	let iat = now.timestamp();
	let claims = AssertionClaims {
		iss: key.client_email.clone(),
		sub: key.client_email.clone(),
		aud: key.token_uri.clone(),
		scope: OAUTH_SCOPES.join(" "),
		iat,
		exp: iat + ASSERTION_LIFETIME_SECS,
	};

	let encoding_key = EncodingKey::from_rsa_pem(key.private_key.expose().as_bytes())
		.map_err(|e| FirebaseError::Credentials(format!("invalid RSA private key: {e}")))?;

	let mut header = Header::new(Algorithm::RS256);
	if !key.private_key_id.is_empty() {
		header.kid = Some(key.private_key_id.clone());
	}

	encode(&header, &claims, &encoding_key)
		.map_err(|e| FirebaseError::Token(format!("failed to sign assertion: {e}")))
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
	access_token: String,
	#[serde(default = "default_expires_in")]
	expires_in: i64,
}

fn default_expires_in() -> i64 {
	ASSERTION_LIFETIME_SECS
}

#[derive(Debug, Deserialize)]
struct OAuthErrorBody {
	error: String,
	#[serde(default)]
	error_description: Option<String>,
}

struct CachedToken {
	token: SecretString,
	expires_at: DateTime<Utc>,
}

/// Mints and caches access tokens for one service account.
pub struct ServiceAccountTokens {
	key: ServiceAccountKey,
	cached: RwLock<Option<CachedToken>>,
}

impl ServiceAccountTokens {
	pub fn new(key: ServiceAccountKey) -> Self {
		Self {
			key,
			cached: RwLock::new(None),
		}
	}

	/// A valid access token, exchanging a fresh assertion when the cached one
	/// is missing or within a minute of expiry.
	pub async fn access_token(
		&self,
		http: &Client,
		retry_config: &RetryConfig,
	) -> Result<SecretString, FirebaseError> {
		{
			let cached = self.cached.read().await;
			if let Some(ref token) = *cached {
				let refresh_at = token.expires_at - Duration::seconds(TOKEN_REFRESH_BUFFER_SECS);
				if Utc::now() < refresh_at {
					return Ok(token.token.clone());
				}
			}
		}

		let assertion = build_assertion(&self.key, Utc::now())?;
		let fresh = retry(retry_config, || self.exchange(http, &assertion)).await?;
		let token = fresh.token.clone();

		{
			let mut cached = self.cached.write().await;
			*cached = Some(fresh);
		}

		Ok(token)
	}

	#[instrument(skip_all, fields(token_uri = %self.key.token_uri))]
	async fn exchange(&self, http: &Client, assertion: &str) -> Result<CachedToken, FirebaseError> {
		let response = http
			.post(&self.key.token_uri)
			.form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion)])
			.send()
			.await?;

		let status = response.status();
		if status.is_success() {
			let body: TokenResponse = response
				.json()
				.await
				.map_err(|e| FirebaseError::InvalidResponse(e.to_string()))?;
			debug!(expires_in = body.expires_in, "obtained access token");
			return Ok(CachedToken {
				token: SecretString::new(body.access_token),
				expires_at: Utc::now() + Duration::seconds(body.expires_in),
			});
		}

		let body = response.text().await.unwrap_or_default();
		warn!(status = %status, "token exchange failed");

		if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
			return Err(FirebaseError::from_status_and_body(status, &body));
		}

		let reason = match serde_json::from_str::<OAuthErrorBody>(&body) {
			Ok(parsed) => match parsed.error_description {
				Some(desc) => format!("{}: {desc}", parsed.error),
				None => parsed.error,
			},
			Err(_) => format!("HTTP {status}"),
		};
		Err(FirebaseError::Token(reason))
	}
}

impl std::fmt::Debug for ServiceAccountTokens {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ServiceAccountTokens")
			.field("client_email", &self.key.client_email)
			.field(
				"has_cached_token",
				&self.cached.try_read().map(|c| c.is_some()).unwrap_or(false),
			)
			.finish()
	}
}
