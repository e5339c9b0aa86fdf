// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! The Firebase REST client.

use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument};
use warden_common_secret::SecretString;

use crate::config::FirebaseConfig;
use crate::credentials::ServiceAccountKey;
use crate::error::FirebaseError;
use crate::token::{ServiceAccountTokens, EMULATOR_TOKEN};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Service {
	Auth,
	Firestore,
}

/// Authorized client for Identity Toolkit and Firestore.
///
/// Operations live in [`crate::auth`] and [`crate::firestore`].
#[derive(Debug)]
pub struct FirebaseClient {
	http: Client,
	config: FirebaseConfig,
	tokens: Option<ServiceAccountTokens>,
}

impl FirebaseClient {
	/// Build a client. `key` may be `None` only when both endpoints are
	/// emulated.
	pub fn new(config: FirebaseConfig, key: Option<ServiceAccountKey>) -> Result<Self, FirebaseError> {
		if config.project_id.trim().is_empty() {
			return Err(FirebaseError::Config("project id is empty".to_string()));
		}
		if key.is_none() && config.needs_credentials() {
			return Err(FirebaseError::Credentials(
				"a service account is required unless both emulators are configured".to_string(),
			));
		}

		let http = warden_common_http::build_client(Some(config.timeout))?;

		Ok(Self {
			http,
			config,
			tokens: key.map(ServiceAccountTokens::new),
		})
	}

	pub fn project_id(&self) -> &str {
		&self.config.project_id
	}

	pub fn config(&self) -> &FirebaseConfig {
		&self.config
	}

	async fn bearer(&self, service: Service) -> Result<SecretString, FirebaseError> {
		let emulated = match service {
			Service::Auth => self.config.auth_emulated,
			Service::Firestore => self.config.firestore_emulated,
		};
		if emulated {
			return Ok(SecretString::new(EMULATOR_TOKEN.to_string()));
		}

		match &self.tokens {
			Some(tokens) => tokens.access_token(&self.http, &self.config.retry).await,
			None => Err(FirebaseError::Credentials(
				"no service account configured".to_string(),
			)),
		}
	}

	/// POST a JSON body and decode a JSON reply. Makes exactly one attempt;
	/// callers decide whether to wrap it in a retry.
	#[instrument(skip(self, body))]
	pub(crate) async fn post_json<B, T>(
		&self,
		service: Service,
		url: &str,
		body: &B,
	) -> Result<T, FirebaseError>
	where
		B: Serialize + ?Sized + Sync,
		T: DeserializeOwned,
	{
		let token = self.bearer(service).await?;

		let response = self
			.http
			.post(url)
			.header(AUTHORIZATION, format!("Bearer {}", token.expose()))
			.json(body)
			.send()
			.await?;

		let status = response.status();
		debug!(status = %status, "firebase response");

		if !status.is_success() {
			return Err(FirebaseError::from_response(response).await);
		}

		response
			.json::<T>()
			.await
			.map_err(|e| FirebaseError::InvalidResponse(e.to_string()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_support::service_account;

	#[test]
	fn production_requires_service_account() {
		let err = FirebaseClient::new(FirebaseConfig::new("demo"), None).unwrap_err();
		assert!(matches!(err, FirebaseError::Credentials(_)));
	}

	#[test]
	fn emulators_need_no_credentials() {
		let config = FirebaseConfig::new("demo")
			.with_auth_emulator("localhost:9099")
			.with_firestore_emulator("localhost:8080");
		let client = FirebaseClient::new(config, None).unwrap();
		assert_eq!(client.project_id(), "demo");
	}

	#[test]
	fn empty_project_is_rejected() {
		let err = FirebaseClient::new(
			FirebaseConfig::new(" "),
			Some(service_account("https://oauth2.googleapis.com/token")),
		)
		.unwrap_err();
		assert!(matches!(err, FirebaseError::Config(_)));
	}

	#[tokio::test]
	async fn emulated_service_uses_owner_token() {
		let config = FirebaseConfig::new("demo")
			.with_auth_emulator("localhost:9099")
			.with_firestore_emulator("localhost:8080");
		let client = FirebaseClient::new(config, None).unwrap();
		let token = client.bearer(Service::Firestore).await.unwrap();
		assert_eq!(token.expose(), "owner");
	}
}
