// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration for the warden CLI.
//!
//! Values are merged from, lowest precedence first:
//!
//! 1. built-in defaults
//! 2. the user config file (`$XDG_CONFIG_HOME/warden/config.toml`, or `--config`)
//! 3. environment variables (`FIREBASE_*` and `WARDEN_*`)
//! 4. command line flags
//!
//! The service-account file is located separately from the merge: every
//! source contributes a candidate path and the first candidate that exists on
//! disk wins, in the order CLI, environment, config file, working directory.

pub mod error;
pub mod layer;
pub mod paths;
pub mod registry;
pub mod runtime;
pub mod service_account;
pub mod sources;

pub use error::ConfigError;
pub use layer::ConfigLayer;
pub use paths::PathsConfig;
pub use registry::ConfigRegistry;
pub use runtime::{
	AuditConfig, DefaultsConfig, FirebaseSettings, LogFormat, LogLevel, LoggingConfig, RetrySettings,
	WardenConfig, DEFAULT_AUDIT_ACTOR, DEFAULT_EMAIL_DOMAIN, DEFAULT_ROLE,
};
pub use service_account::{
	resolve_service_account, CandidateOrigin, ServiceAccountCandidate, SERVICE_ACCOUNT_ENV,
	SERVICE_ACCOUNT_FILE_NAME,
};
pub use sources::{CliOverrides, CliSource, ConfigSource, EnvSource, Precedence};

/// Load configuration from defaults, the config file, the process
/// environment, and the given CLI overrides.
pub fn load_config(cli: CliOverrides) -> Result<WardenConfig, ConfigError> {
	let paths = paths::resolve_paths()?;

	let mut registry = ConfigRegistry::new();
	registry.register(Box::new(sources::DefaultsSource::new(&paths)));
	registry.register(Box::new(match &cli.config_file {
		Some(path) => sources::FileSource::explicit(path.clone()),
		None => sources::FileSource::user(&paths),
	}));
	registry.register(Box::new(EnvSource::from_process()));
	registry.register(Box::new(sources::CliSource::new(cli)));

	registry.load(paths)
}
