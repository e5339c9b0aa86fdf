// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Partial configuration layer for merging from multiple sources.

use std::path::PathBuf;

use serde::Deserialize;

use crate::service_account::ServiceAccountCandidate;

/// Partial configuration layer - all fields are Option for merging.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigLayer {
	#[serde(default)]
	pub defaults: Option<DefaultsLayer>,
	#[serde(default)]
	pub firebase: Option<FirebaseLayer>,
	#[serde(default)]
	pub audit: Option<AuditLayer>,
	#[serde(default)]
	pub logging: Option<LoggingLayer>,
	#[serde(default)]
	pub retry: Option<RetryLayer>,

	/// Service-account locations offered by this layer. Not read from TOML;
	/// file sources translate `firebase.service_account` into a candidate.
	#[serde(skip)]
	pub service_account_candidates: Vec<ServiceAccountCandidate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DefaultsLayer {
	#[serde(default)]
	pub email_domain: Option<String>,
	#[serde(default)]
	pub role: Option<String>,
	#[serde(default)]
	pub password_length: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FirebaseLayer {
	#[serde(default)]
	pub project_id: Option<String>,
	#[serde(default)]
	pub service_account: Option<PathBuf>,
	#[serde(default)]
	pub auth_emulator_host: Option<String>,
	#[serde(default)]
	pub firestore_emulator_host: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditLayer {
	#[serde(default)]
	pub actor: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingLayer {
	#[serde(default)]
	pub level: Option<String>,
	#[serde(default)]
	pub format: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RetryLayer {
	#[serde(default)]
	pub max_attempts: Option<u32>,
}

macro_rules! overlay {
	($base:expr, $other:expr, [$($field:ident),+ $(,)?]) => {
		$(
			if $other.$field.is_some() {
				$base.$field = $other.$field;
			}
		)+
	};
}

impl ConfigLayer {
	/// Merge `other` on top of `self`. Values set in `other` win.
	pub fn merge(&mut self, other: ConfigLayer) {
		if let Some(o) = other.defaults {
			let d = self.defaults.get_or_insert_with(DefaultsLayer::default);
			overlay!(d, o, [email_domain, role, password_length]);
		}
		if let Some(o) = other.firebase {
			let f = self.firebase.get_or_insert_with(FirebaseLayer::default);
			overlay!(
				f,
				o,
				[
					project_id,
					service_account,
					auth_emulator_host,
					firestore_emulator_host
				]
			);
		}
		if let Some(o) = other.audit {
			let a = self.audit.get_or_insert_with(AuditLayer::default);
			overlay!(a, o, [actor]);
		}
		if let Some(o) = other.logging {
			let l = self.logging.get_or_insert_with(LoggingLayer::default);
			overlay!(l, o, [level, format]);
		}
		if let Some(o) = other.retry {
			let r = self.retry.get_or_insert_with(RetryLayer::default);
			overlay!(r, o, [max_attempts]);
		}
		self
			.service_account_candidates
			.extend(other.service_account_candidates);
	}

	pub(crate) fn defaults_mut(&mut self) -> &mut DefaultsLayer {
		self.defaults.get_or_insert_with(DefaultsLayer::default)
	}

	pub(crate) fn firebase_mut(&mut self) -> &mut FirebaseLayer {
		self.firebase.get_or_insert_with(FirebaseLayer::default)
	}

	pub(crate) fn logging_mut(&mut self) -> &mut LoggingLayer {
		self.logging.get_or_insert_with(LoggingLayer::default)
	}
}
