// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Runtime configuration types with resolved defaults.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::layer::ConfigLayer;
use crate::paths::PathsConfig;
use crate::service_account::{resolve_service_account, ServiceAccountCandidate};
use crate::ConfigError;
use warden_common_secret::password::{effective_length, DEFAULT_PASSWORD_LENGTH};

pub const DEFAULT_EMAIL_DOMAIN: &str = "pcacs.com";
pub const DEFAULT_ROLE: &str = "admin";
/// Recorded as `by` on audit events written by this tool.
pub const DEFAULT_AUDIT_ACTOR: &str = "admin_script";

const DEFAULT_RETRY_ATTEMPTS: u32 = 3;

/// The final, validated configuration.
#[derive(Debug, Clone)]
pub struct WardenConfig {
	pub defaults: DefaultsConfig,
	pub firebase: FirebaseSettings,
	pub audit: AuditConfig,
	pub logging: LoggingConfig,
	pub retry: RetrySettings,
	pub service_account_candidates: Vec<ServiceAccountCandidate>,
	pub paths: PathsConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultsConfig {
	pub email_domain: String,
	/// Raw role name. Unknown names are tolerated here and mapped to the
	/// least privileged role when the account is built.
	pub role: String,
	pub password_length: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FirebaseSettings {
	pub project_id: Option<String>,
	pub auth_emulator_host: Option<String>,
	pub firestore_emulator_host: Option<String>,
}

impl FirebaseSettings {
	/// Both emulators are configured, so no real credentials are needed.
	pub fn emulator_mode(&self) -> bool {
		self.auth_emulator_host.is_some() && self.firestore_emulator_host.is_some()
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditConfig {
	pub actor: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoggingConfig {
	pub level: LogLevel,
	pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrySettings {
	pub max_attempts: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
	Trace,
	Debug,
	Info,
	Warn,
	Error,
}

impl FromStr for LogLevel {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"trace" => Ok(LogLevel::Trace),
			"debug" => Ok(LogLevel::Debug),
			"info" => Ok(LogLevel::Info),
			"warn" | "warning" => Ok(LogLevel::Warn),
			"error" => Ok(LogLevel::Error),
			other => Err(ConfigError::invalid_value(
				"logging.level",
				format!("unknown level '{other}'"),
			)),
		}
	}
}

impl fmt::Display for LogLevel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			LogLevel::Trace => "trace",
			LogLevel::Debug => "debug",
			LogLevel::Info => "info",
			LogLevel::Warn => "warn",
			LogLevel::Error => "error",
		};
		f.write_str(s)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
	Compact,
	Pretty,
	Json,
}

impl FromStr for LogFormat {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"compact" => Ok(LogFormat::Compact),
			"pretty" => Ok(LogFormat::Pretty),
			"json" => Ok(LogFormat::Json),
			other => Err(ConfigError::invalid_value(
				"logging.format",
				format!("unknown format '{other}'"),
			)),
		}
	}
}

impl WardenConfig {
	/// Fill unset fields with defaults and validate what was set.
	pub fn from_layer(layer: ConfigLayer, paths: PathsConfig) -> Result<Self, ConfigError> {
		let defaults = layer.defaults.unwrap_or_default();
		let firebase = layer.firebase.unwrap_or_default();
		let audit = layer.audit.unwrap_or_default();
		let logging = layer.logging.unwrap_or_default();
		let retry = layer.retry.unwrap_or_default();

		let max_attempts = retry.max_attempts.unwrap_or(DEFAULT_RETRY_ATTEMPTS);
		if max_attempts == 0 {
			return Err(ConfigError::invalid_value(
				"retry.max_attempts",
				"must be at least 1",
			));
		}

		let email_domain = defaults
			.email_domain
			.unwrap_or_else(|| DEFAULT_EMAIL_DOMAIN.to_string());
		let email_domain = email_domain.trim().trim_start_matches('@').to_string();
		if email_domain.is_empty() {
			return Err(ConfigError::invalid_value(
				"defaults.email_domain",
				"must not be empty",
			));
		}

		Ok(Self {
			defaults: DefaultsConfig {
				email_domain,
				role: defaults.role.unwrap_or_else(|| DEFAULT_ROLE.to_string()),
				password_length: defaults
					.password_length
					.map_or(DEFAULT_PASSWORD_LENGTH, |n| {
						effective_length(usize::try_from(n).unwrap_or(0))
					}),
			},
			firebase: FirebaseSettings {
				project_id: firebase.project_id.filter(|p| !p.trim().is_empty()),
				auth_emulator_host: firebase.auth_emulator_host,
				firestore_emulator_host: firebase.firestore_emulator_host,
			},
			audit: AuditConfig {
				actor: audit
					.actor
					.unwrap_or_else(|| DEFAULT_AUDIT_ACTOR.to_string()),
			},
			logging: LoggingConfig {
				level: match logging.level {
					Some(ref l) => l.parse()?,
					None => LogLevel::Warn,
				},
				format: match logging.format {
					Some(ref f) => f.parse()?,
					None => LogFormat::Compact,
				},
			},
			retry: RetrySettings { max_attempts },
			service_account_candidates: layer.service_account_candidates,
			paths,
		})
	}

	/// Locate the service-account file.
	///
	/// Returns `Ok(None)` only in emulator mode, where credentials are optional.
	pub fn locate_service_account(&self) -> Result<Option<PathBuf>, ConfigError> {
		match resolve_service_account(&self.service_account_candidates) {
			Ok(path) => Ok(Some(path)),
			Err(ConfigError::ServiceAccountNotFound) if self.firebase.emulator_mode() => {
				tracing::info!("no service account found, continuing against emulators");
				Ok(None)
			}
			Err(e) => Err(e),
		}
	}
}
