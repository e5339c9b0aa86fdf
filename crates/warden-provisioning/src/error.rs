// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::fmt;

use thiserror::Error;
use warden_firebase::FirebaseError;

/// Failure reported by an [`crate::AccountBackend`].
#[derive(Debug, Error)]
pub enum BackendError {
	#[error("an account with this email address already exists")]
	EmailExists,

	#[error(transparent)]
	Firebase(#[from] FirebaseError),

	#[error("{0}")]
	Other(String),
}

/// Steps that run after the identity exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
	RoleClaim,
	Profile,
	AuditEvent,
}

impl fmt::Display for Stage {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Stage::RoleClaim => write!(f, "setting role claim"),
			Stage::Profile => write!(f, "writing profile"),
			Stage::AuditEvent => write!(f, "writing audit event"),
		}
	}
}

#[derive(Debug, Error)]
pub enum ProvisionError {
	#[error("creating identity: {0}")]
	CreateIdentity(#[source] BackendError),

	/// The identity was created but a later step failed. It is left in place.
	#[error("account {uid} is incomplete, failed while {stage}: {source}")]
	Incomplete {
		uid: String,
		stage: Stage,
		#[source]
		source: BackendError,
	},
}

impl ProvisionError {
	/// Uid of an identity left behind by a partial failure.
	pub fn orphaned_uid(&self) -> Option<&str> {
		match self {
			ProvisionError::Incomplete { uid, .. } => Some(uid),
			ProvisionError::CreateIdentity(_) => None,
		}
	}
}
