// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Endpoint configuration for the Firebase client.

use std::time::Duration;

use warden_common_http::{RetryConfig, DEFAULT_TIMEOUT};

pub const IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com";
pub const FIRESTORE_URL: &str = "https://firestore.googleapis.com";
pub const DEFAULT_DATABASE: &str = "(default)";

/// Where and how the client talks to Firebase.
///
/// Emulated endpoints are authorized with the emulator owner token and never
/// need service-account credentials.
#[derive(Debug, Clone)]
pub struct FirebaseConfig {
	pub project_id: String,
	pub auth_base_url: String,
	pub firestore_base_url: String,
	pub database_id: String,
	pub auth_emulated: bool,
	pub firestore_emulated: bool,
	pub retry: RetryConfig,
	pub timeout: Duration,
}

impl FirebaseConfig {
	pub fn new(project_id: impl Into<String>) -> Self {
		Self {
			project_id: project_id.into(),
			auth_base_url: IDENTITY_TOOLKIT_URL.to_string(),
			firestore_base_url: FIRESTORE_URL.to_string(),
			database_id: DEFAULT_DATABASE.to_string(),
			auth_emulated: false,
			firestore_emulated: false,
			retry: RetryConfig::default(),
			timeout: DEFAULT_TIMEOUT,
		}
	}

	/// Route Identity Toolkit calls to the Auth emulator at `host` (`host:port`).
	pub fn with_auth_emulator(mut self, host: &str) -> Self {
		self.auth_base_url = format!("http://{}/identitytoolkit.googleapis.com", host.trim());
		self.auth_emulated = true;
		self
	}

	/// Route Firestore calls to the Firestore emulator at `host` (`host:port`).
	pub fn with_firestore_emulator(mut self, host: &str) -> Self {
		self.firestore_base_url = format!("http://{}", host.trim());
		self.firestore_emulated = true;
		self
	}

	pub fn with_auth_base_url(mut self, url: impl Into<String>) -> Self {
		self.auth_base_url = url.into();
		self
	}

	pub fn with_firestore_base_url(mut self, url: impl Into<String>) -> Self {
		self.firestore_base_url = url.into();
		self
	}

	pub fn with_retry(mut self, retry: RetryConfig) -> Self {
		self.retry = retry;
		self
	}

	/// True when at least one endpoint still needs real credentials.
	pub fn needs_credentials(&self) -> bool {
		!(self.auth_emulated && self.firestore_emulated)
	}

	pub(crate) fn accounts_url(&self, action: &str) -> String {
		format!(
			"{}/v1/projects/{}/accounts{action}",
			self.auth_base_url.trim_end_matches('/'),
			self.project_id
		)
	}

	/// Resource name prefix for documents, e.g.
	/// `projects/demo/databases/(default)/documents`.
	pub(crate) fn documents_root(&self) -> String {
		format!(
			"projects/{}/databases/{}/documents",
			self.project_id, self.database_id
		)
	}

	pub(crate) fn commit_url(&self) -> String {
		format!(
			"{}/v1/{}:commit",
			self.firestore_base_url.trim_end_matches('/'),
			self.documents_root()
		)
	}
}
