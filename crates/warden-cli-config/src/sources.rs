// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: defaults, config file, environment, CLI.

use std::collections::HashMap;
use std::path::PathBuf;

use tracing::{debug, trace, warn};

use crate::layer::*;
use crate::paths::PathsConfig;
use crate::service_account::{CandidateOrigin, ServiceAccountCandidate, SERVICE_ACCOUNT_ENV};
use crate::ConfigError;

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	UserFile = 30,
	Environment = 50,
	Cli = 60,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	/// Name for logging
	fn name(&self) -> &'static str;

	fn precedence(&self) -> Precedence;

	fn load(&self) -> Result<ConfigLayer, ConfigError>;
}

/// Built-in defaults. Scalar defaults are applied when the runtime config is
/// built; this source only offers the working-directory service account.
pub struct DefaultsSource {
	working_dir: PathBuf,
}

impl DefaultsSource {
	pub fn new(paths: &PathsConfig) -> Self {
		Self {
			working_dir: paths.working_dir.clone(),
		}
	}
}

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<ConfigLayer, ConfigError> {
		let mut layer = ConfigLayer::default();
		layer
			.service_account_candidates
			.push(ServiceAccountCandidate::working_directory(&self.working_dir));
		Ok(layer)
	}
}

/// TOML configuration file.
pub struct FileSource {
	path: PathBuf,
	required: bool,
}

impl FileSource {
	/// User config: ~/.config/warden/config.toml. Skipped when absent.
	pub fn user(paths: &PathsConfig) -> Self {
		Self {
			path: paths.user_config_file.clone(),
			required: false,
		}
	}

	/// File named with `--config`. Must exist.
	pub fn explicit(path: PathBuf) -> Self {
		Self {
			path,
			required: true,
		}
	}
}

impl ConfigSource for FileSource {
	fn name(&self) -> &'static str {
		"config-file"
	}

	fn precedence(&self) -> Precedence {
		Precedence::UserFile
	}

	fn load(&self) -> Result<ConfigLayer, ConfigError> {
		if !self.path.exists() {
			if self.required {
				return Err(ConfigError::ConfigFileNotFound(self.path.clone()));
			}
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(ConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");

		let content = std::fs::read_to_string(&self.path)?;
		let mut layer: ConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		if let Some(path) = layer.firebase.as_mut().and_then(|f| f.service_account.take()) {
			let path = match self.path.parent() {
				Some(dir) if path.is_relative() => dir.join(path),
				_ => path,
			};
			layer
				.service_account_candidates
				.push(ServiceAccountCandidate::new(CandidateOrigin::ConfigFile, path));
		}

		trace!("parsed config layer");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Reads the `FIREBASE_*` variables shared with other Firebase tooling and the
/// `WARDEN_*` variables specific to this tool. Empty values are ignored.
pub struct EnvSource {
	vars: HashMap<String, String>,
}

impl EnvSource {
	pub fn from_process() -> Self {
		Self::from_vars(std::env::vars())
	}

	pub fn from_vars<I, K, V>(vars: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		Self {
			vars: vars
				.into_iter()
				.map(|(k, v)| (k.into(), v.into()))
				.collect(),
		}
	}
}

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<ConfigLayer, ConfigError> {
		let mut layer = ConfigLayer::default();

		for (key, value) in &self.vars {
			let value = value.trim();
			if value.is_empty() {
				continue;
			}
			let value = value.to_string();

			match key.as_str() {
				SERVICE_ACCOUNT_ENV => {
					layer
						.service_account_candidates
						.push(ServiceAccountCandidate::new(CandidateOrigin::Environment, value));
				}
				"FIREBASE_DEFAULT_EMAIL_DOMAIN" => layer.defaults_mut().email_domain = Some(value),
				"FIREBASE_DEFAULT_ROLE" => layer.defaults_mut().role = Some(value),
				"FIREBASE_AUTH_EMULATOR_HOST" => layer.firebase_mut().auth_emulator_host = Some(value),
				"FIRESTORE_EMULATOR_HOST" => layer.firebase_mut().firestore_emulator_host = Some(value),
				"WARDEN_PROJECT_ID" => layer.firebase_mut().project_id = Some(value),
				"WARDEN_PASSWORD_LENGTH" => match value.parse() {
					Ok(v) => layer.defaults_mut().password_length = Some(v),
					Err(_) => warn!(key = %key, "ignoring non-numeric value"),
				},
				"WARDEN_AUDIT_ACTOR" => {
					layer.audit.get_or_insert_with(AuditLayer::default).actor = Some(value)
				}
				"WARDEN_LOG_LEVEL" => layer.logging_mut().level = Some(value),
				"WARDEN_LOG_FORMAT" => layer.logging_mut().format = Some(value),
				"WARDEN_RETRY_MAX_ATTEMPTS" => match value.parse() {
					Ok(v) => {
						layer.retry.get_or_insert_with(RetryLayer::default).max_attempts = Some(v)
					}
					Err(_) => warn!(key = %key, "ignoring non-numeric value"),
				},
				_ => continue,
			}
			trace!(key = %key, "applied env var");
		}

		Ok(layer)
	}
}

/// Values taken from command line flags.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
	pub service_account: Option<PathBuf>,
	pub project_id: Option<String>,
	pub domain: Option<String>,
	pub role: Option<String>,
	pub password_length: Option<i64>,
	pub log_level: Option<String>,
	pub log_format: Option<String>,
	pub config_file: Option<PathBuf>,
}

pub struct CliSource {
	overrides: CliOverrides,
}

impl CliSource {
	pub fn new(overrides: CliOverrides) -> Self {
		Self { overrides }
	}
}

impl ConfigSource for CliSource {
	fn name(&self) -> &'static str {
		"cli"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Cli
	}

	fn load(&self) -> Result<ConfigLayer, ConfigError> {
		let o = &self.overrides;
		let mut layer = ConfigLayer::default();

		if let Some(ref path) = o.service_account {
			layer
				.service_account_candidates
				.push(ServiceAccountCandidate::new(CandidateOrigin::Cli, path));
		}
		if let Some(ref project_id) = o.project_id {
			layer.firebase_mut().project_id = Some(project_id.clone());
		}
		if let Some(ref domain) = o.domain {
			layer.defaults_mut().email_domain = Some(domain.clone());
		}
		if let Some(ref role) = o.role {
			layer.defaults_mut().role = Some(role.clone());
		}
		if let Some(length) = o.password_length {
			layer.defaults_mut().password_length = Some(length);
		}
		if let Some(ref level) = o.log_level {
			layer.logging_mut().level = Some(level.clone());
		}
		if let Some(ref format) = o.log_format {
			layer.logging_mut().format = Some(format.clone());
		}

		Ok(layer)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn precedence_ordering() {
		assert!(Precedence::Cli > Precedence::Environment);
		assert!(Precedence::Environment > Precedence::UserFile);
		assert!(Precedence::UserFile > Precedence::Defaults);
	}

	#[test]
	fn defaults_offer_working_directory_candidate() {
		let paths = PathsConfig {
			user_config_file: "/tmp/warden/config.toml".into(),
			working_dir: "/srv/ops".into(),
		};
		let layer = DefaultsSource::new(&paths).load().unwrap();
		assert_eq!(
			layer.service_account_candidates,
			vec![ServiceAccountCandidate::new(
				CandidateOrigin::WorkingDirectory,
				"/srv/ops/service-account.json"
			)]
		);
	}

	#[test]
	fn missing_user_file_is_skipped() {
		let source = FileSource {
			path: PathBuf::from("/nonexistent/warden/config.toml"),
			required: false,
		};
		let layer = source.load().unwrap();
		assert!(layer.defaults.is_none());
	}

	#[test]
	fn missing_explicit_file_is_an_error() {
		let source = FileSource::explicit(PathBuf::from("/nonexistent/custom.toml"));
		assert!(matches!(
			source.load(),
			Err(ConfigError::ConfigFileNotFound(_))
		));
	}

	#[test]
	fn malformed_file_reports_path() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("config.toml");
		std::fs::write(&path, "[defaults\nrole = ").unwrap();

		let err = FileSource::explicit(path.clone()).load().unwrap_err();
		match err {
			ConfigError::TomlParse { path: p, .. } => assert_eq!(p, path),
			other => panic!("unexpected error: {other:?}"),
		}
	}

	#[test]
	fn relative_service_account_resolves_against_config_dir() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("config.toml");
		std::fs::write(&path, "[firebase]\nservice_account = \"keys/sa.json\"\n").unwrap();

		let layer = FileSource::explicit(path).load().unwrap();
		assert_eq!(
			layer.service_account_candidates,
			vec![ServiceAccountCandidate::new(
				CandidateOrigin::ConfigFile,
				dir.path().join("keys/sa.json")
			)]
		);
		assert!(layer.firebase.unwrap().service_account.is_none());
	}

	#[test]
	fn env_source_reads_firebase_and_warden_vars() {
		let source = EnvSource::from_vars([
			("FIREBASE_SERVICE_ACCOUNT", "/keys/sa.json"),
			("FIREBASE_DEFAULT_EMAIL_DOMAIN", "corp.example"),
			("FIREBASE_DEFAULT_ROLE", "staff"),
			("WARDEN_RETRY_MAX_ATTEMPTS", "5"),
			("WARDEN_PASSWORD_LENGTH", "not-a-number"),
			("WARDEN_LOG_LEVEL", "  "),
			("UNRELATED", "value"),
		]);
		let layer = source.load().unwrap();

		let defaults = layer.defaults.unwrap();
		assert_eq!(defaults.email_domain.as_deref(), Some("corp.example"));
		assert_eq!(defaults.role.as_deref(), Some("staff"));
		assert_eq!(defaults.password_length, None);
		assert_eq!(layer.retry.unwrap().max_attempts, Some(5));
		assert!(layer.logging.is_none());
		assert_eq!(
			layer.service_account_candidates,
			vec![ServiceAccountCandidate::new(
				CandidateOrigin::Environment,
				"/keys/sa.json"
			)]
		);
	}

	#[test]
	fn cli_source_maps_every_override() {
		let source = CliSource::new(CliOverrides {
			service_account: Some("/cli/sa.json".into()),
			project_id: Some("proj-1".to_string()),
			domain: Some("cli.example".to_string()),
			role: Some("user".to_string()),
			password_length: Some(18),
			log_level: Some("debug".to_string()),
			log_format: Some("json".to_string()),
			config_file: None,
		});
		let layer = source.load().unwrap();

		assert_eq!(layer.firebase.unwrap().project_id.as_deref(), Some("proj-1"));
		let defaults = layer.defaults.unwrap();
		assert_eq!(defaults.email_domain.as_deref(), Some("cli.example"));
		assert_eq!(defaults.role.as_deref(), Some("user"));
		assert_eq!(defaults.password_length, Some(18));
		let logging = layer.logging.unwrap();
		assert_eq!(logging.level.as_deref(), Some("debug"));
		assert_eq!(logging.format.as_deref(), Some("json"));
		assert_eq!(layer.service_account_candidates.len(), 1);
	}
}
