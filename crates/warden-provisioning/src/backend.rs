// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! The storage seam and its Firebase implementation.

use async_trait::async_trait;
use tracing::instrument;
use warden_firebase::{CreateUserRequest, Fields, FirebaseClient, FirebaseError, Value};

use crate::account::{AuditEvent, NewAccount, Profile, AUDIT_TIMESTAMP_FIELD, PROFILE_TIMESTAMP_FIELD};
use crate::error::BackendError;
use crate::role::Role;

pub const PROFILES_COLLECTION: &str = "profiles";
pub const AUDIT_COLLECTION: &str = "auth_logs";
const AUDIT_EVENTS_SUBCOLLECTION: &str = "events";

#[async_trait]
pub trait AccountBackend: Send + Sync {
	/// Create the sign-in identity and return its uid.
	async fn create_identity(&self, account: &NewAccount) -> Result<String, BackendError>;
	async fn set_role_claim(&self, uid: &str, role: Role) -> Result<(), BackendError>;
	async fn write_profile(&self, uid: &str, profile: &Profile) -> Result<(), BackendError>;
	/// Append an audit event for `uid` and return the event id.
	async fn append_audit_event(&self, uid: &str, event: &AuditEvent) -> Result<String, BackendError>;
}

/// Firebase Auth for identities and claims, Firestore for documents.
#[derive(Debug)]
pub struct FirebaseBackend {
	client: FirebaseClient,
}

impl FirebaseBackend {
	pub fn new(client: FirebaseClient) -> Self {
		Self { client }
	}
}

pub(crate) fn profile_fields(profile: &Profile) -> Fields {
	let mut fields = Fields::new();
	fields.insert("username".into(), profile.username.as_str().into());
	fields.insert("email".into(), profile.email.as_str().into());
	fields.insert("role".into(), profile.role.as_str().into());
	fields.insert("status".into(), profile.status.as_str().into());
	fields.insert("createdAt".into(), profile.created_at.as_str().into());
	fields.insert("mustChangePassword".into(), profile.must_change_password.into());
	fields
}

pub(crate) fn audit_fields(event: &AuditEvent) -> Fields {
	let mut meta = Fields::new();
	meta.insert("role".into(), event.meta.role.as_str().into());

	let mut fields = Fields::new();
	fields.insert("action".into(), event.action.as_str().into());
	fields.insert("by".into(), event.by.as_str().into());
	fields.insert("meta".into(), Value::Map(meta));
	fields
}

fn map_create_error(err: FirebaseError) -> BackendError {
	match err.service_code() {
		Some("EMAIL_EXISTS") => BackendError::EmailExists,
		_ => BackendError::Firebase(err),
	}
}

#[async_trait]
impl AccountBackend for FirebaseBackend {
	#[instrument(skip_all)]
	async fn create_identity(&self, account: &NewAccount) -> Result<String, BackendError> {
		let request = CreateUserRequest::new(account.email.as_str(), account.temp_password.clone())
			.with_display_name(account.username.as_str());
		self.client.create_user(&request).await.map_err(map_create_error)
	}

	async fn set_role_claim(&self, uid: &str, role: Role) -> Result<(), BackendError> {
		let claims = serde_json::json!({ "role": role.as_str() });
		self.client.set_custom_user_claims(uid, &claims).await?;
		Ok(())
	}

	async fn write_profile(&self, uid: &str, profile: &Profile) -> Result<(), BackendError> {
		self.client
			.set_document(
				&format!("{PROFILES_COLLECTION}/{uid}"),
				profile_fields(profile),
				&[PROFILE_TIMESTAMP_FIELD],
			)
			.await?;
		Ok(())
	}

	async fn append_audit_event(&self, uid: &str, event: &AuditEvent) -> Result<String, BackendError> {
		let id = self
			.client
			.add_document(
				&format!("{AUDIT_COLLECTION}/{uid}/{AUDIT_EVENTS_SUBCOLLECTION}"),
				audit_fields(event),
				&[AUDIT_TIMESTAMP_FIELD],
			)
			.await?;
		Ok(id)
	}
}
