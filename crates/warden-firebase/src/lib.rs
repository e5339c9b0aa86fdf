// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Firebase client for warden.
//!
//! A typed client for the two Firebase REST surfaces warden needs:
//!
//! - Identity Toolkit v1 (create a user, set custom claims)
//! - Cloud Firestore v1 (batched document writes with server timestamps)
//!
//! Requests are authorized with OAuth2 access tokens minted from a
//! service-account key (RS256 JWT bearer grant). When the Firebase emulators
//! are configured, the emulator owner token is used instead.

pub mod auth;
pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod firestore;
pub mod token;

#[cfg(test)]
pub(crate) mod test_support;

pub use auth::{validate_custom_claims, CreateUserRequest, MAX_CLAIMS_PAYLOAD_BYTES, RESERVED_CLAIMS};
pub use client::FirebaseClient;
pub use config::FirebaseConfig;
pub use credentials::ServiceAccountKey;
pub use error::FirebaseError;
pub use firestore::{auto_id, CommitResponse, Fields, Value, Write};
pub use token::{ServiceAccountTokens, EMULATOR_TOKEN, OAUTH_SCOPES};
pub use warden_common_http::RetryConfig;
