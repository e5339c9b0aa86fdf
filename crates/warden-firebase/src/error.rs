// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Error types for the Firebase client.

use reqwest::{Response, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use warden_common_http::{is_retryable_status, RetryableError};

#[derive(Debug, Error)]
pub enum FirebaseError {
	/// Network-level error during HTTP communication.
	#[error("Network error: {0}")]
	Network(#[from] reqwest::Error),

	/// Service-account file missing, unreadable or malformed.
	#[error("Invalid credentials: {0}")]
	Credentials(String),

	/// Signing the assertion or exchanging it for an access token failed.
	#[error("Token error: {0}")]
	Token(String),

	#[error("Unauthorized: {0}")]
	Unauthorized(String),

	#[error("Forbidden: {0}")]
	Forbidden(String),

	#[error("Rate limit exceeded")]
	RateLimited,

	/// The service rejected the request. `message` carries the service's own
	/// error code for Identity Toolkit (e.g. `EMAIL_EXISTS`).
	#[error("Firebase API error: {status} - {message}")]
	Api {
		status: u16,
		code: Option<String>,
		message: String,
	},

	#[error("Invalid response from Firebase: {0}")]
	InvalidResponse(String),

	#[error("Invalid custom claims: {0}")]
	InvalidClaims(String),

	#[error("Invalid document path '{0}'")]
	InvalidPath(String),

	#[error("Configuration error: {0}")]
	Config(String),
}

impl RetryableError for FirebaseError {
	fn is_retryable(&self) -> bool {
		match self {
			FirebaseError::Network(e) => e.is_retryable(),
			FirebaseError::RateLimited => true,
			FirebaseError::Api { status, .. } => StatusCode::from_u16(*status)
				.map(is_retryable_status)
				.unwrap_or(false),
			_ => false,
		}
	}
}

#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
	error: GoogleErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorDetail {
	#[serde(default)]
	message: String,
	#[serde(default)]
	status: Option<String>,
}

impl FirebaseError {
	pub fn api_error(status: u16, message: impl Into<String>) -> Self {
		Self::Api {
			status,
			code: None,
			message: message.into(),
		}
	}

	/// The service's error code, e.g. `EMAIL_EXISTS` or `ALREADY_EXISTS`.
	///
	/// Identity Toolkit puts its code at the start of `message` (sometimes
	/// followed by ` : detail`); that wins over the generic envelope `status`.
	pub fn service_code(&self) -> Option<&str> {
		match self {
			FirebaseError::Api { code, message, .. } => leading_code(message).or(code.as_deref()),
			_ => None,
		}
	}

	/// Turn a non-success response into an error, reading the Google error
	/// envelope when present.
	pub(crate) async fn from_response(resp: Response) -> Self {
		let status = resp.status();
		let body = resp.text().await.unwrap_or_default();
		Self::from_status_and_body(status, &body)
	}

	pub(crate) fn from_status_and_body(status: StatusCode, body: &str) -> Self {
		let (message, code) = match serde_json::from_str::<GoogleErrorBody>(body) {
			Ok(parsed) => (parsed.error.message, parsed.error.status),
			Err(_) => (body.trim().to_string(), None),
		};

		match status {
			StatusCode::UNAUTHORIZED => FirebaseError::Unauthorized(message),
			StatusCode::FORBIDDEN => FirebaseError::Forbidden(message),
			StatusCode::TOO_MANY_REQUESTS => FirebaseError::RateLimited,
			_ => FirebaseError::Api {
				status: status.as_u16(),
				code,
				message,
			},
		}
	}
}

fn leading_code(message: &str) -> Option<&str> {
	let token = message.split([' ', ':']).next()?;
	let is_code = !token.is_empty()
		&& token
			.chars()
			.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
		&& token.starts_with(|c: char| c.is_ascii_uppercase());
	is_code.then_some(token)
}
