// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Account provisioning for warden.
//!
//! Provisioning one account is a fixed sequence against an
//! [`AccountBackend`]:
//!
//! 1. create the sign-in identity with a temporary password
//! 2. attach the `role` custom claim
//! 3. write the profile document (`profiles/{uid}`)
//! 4. append an `account_created` audit event (`auth_logs/{uid}/events`)
//!
//! The sequence stops at the first failure. Failures after step 1 are
//! reported as [`ProvisionError::Incomplete`] carrying the uid, and nothing
//! is rolled back.

pub mod account;
pub mod backend;
pub mod error;
pub mod provisioner;
pub mod role;
pub mod validation;

pub use account::{
	AccountStatus, AuditAction, AuditEvent, NewAccount, Profile, ProvisionedAccount,
	AUDIT_TIMESTAMP_FIELD, PROFILE_TIMESTAMP_FIELD,
};
pub use backend::{AccountBackend, FirebaseBackend, AUDIT_COLLECTION, PROFILES_COLLECTION};
pub use error::{BackendError, ProvisionError, Stage};
pub use provisioner::Provisioner;
pub use role::{pick_role, Role, RoleParseError};
pub use validation::{infer_email, is_conventional_username, is_valid_email};
