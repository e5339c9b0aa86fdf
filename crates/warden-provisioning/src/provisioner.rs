// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use chrono::Utc;
use tracing::{error, info, instrument};

use crate::account::{AuditEvent, NewAccount, Profile, ProvisionedAccount};
use crate::backend::AccountBackend;
use crate::error::{BackendError, ProvisionError, Stage};

/// Runs the provisioning sequence for one account.
pub struct Provisioner<B> {
	backend: B,
	audit_actor: String,
}

impl<B: AccountBackend> Provisioner<B> {
	pub fn new(backend: B, audit_actor: impl Into<String>) -> Self {
		Self {
			backend,
			audit_actor: audit_actor.into(),
		}
	}

	pub fn backend(&self) -> &B {
		&self.backend
	}

	#[instrument(skip_all, fields(username = %account.username, role = %account.role))]
	pub async fn provision(&self, account: &NewAccount) -> Result<ProvisionedAccount, ProvisionError> {
		let uid = self
			.backend
			.create_identity(account)
			.await
			.map_err(ProvisionError::CreateIdentity)?;
		info!(uid = %uid, "identity created");

		let incomplete = |stage: Stage| {
			let uid = uid.clone();
			move |source: BackendError| {
				error!(uid = %uid, stage = %stage, "provisioning stopped; identity left in place");
				ProvisionError::Incomplete { uid, stage, source }
			}
		};

		self.backend
			.set_role_claim(&uid, account.role)
			.await
			.map_err(incomplete(Stage::RoleClaim))?;

		let profile = Profile::for_account(account, Utc::now());
		self.backend
			.write_profile(&uid, &profile)
			.await
			.map_err(incomplete(Stage::Profile))?;

		let event = AuditEvent::account_created(self.audit_actor.as_str(), account.role);
		let audit_event_id = self
			.backend
			.append_audit_event(&uid, &event)
			.await
			.map_err(incomplete(Stage::AuditEvent))?;

		info!(uid = %uid, audit_event_id = %audit_event_id, "account provisioned");
		Ok(ProvisionedAccount {
			uid,
			audit_event_id,
		})
	}
}
