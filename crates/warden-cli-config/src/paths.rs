// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! XDG-style path resolution.

use std::path::PathBuf;

use crate::ConfigError;

#[derive(Debug, Clone)]
pub struct PathsConfig {
	/// User config file: ~/.config/warden/config.toml
	pub user_config_file: PathBuf,
	/// Directory the operator invoked warden from.
	pub working_dir: PathBuf,
}

/// Resolve paths from `XDG_CONFIG_HOME` (falling back to `~/.config`) and the
/// current directory.
pub fn resolve_paths() -> Result<PathsConfig, ConfigError> {
	let config_home = match std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
		Some(dir) => PathBuf::from(dir),
		None => dirs::home_dir()
			.ok_or(ConfigError::HomeDirNotFound)?
			.join(".config"),
	};
	let working_dir = std::env::current_dir()?;

	tracing::debug!(
		config_home = %config_home.display(),
		working_dir = %working_dir.display(),
		"resolved paths"
	);

	Ok(PathsConfig {
		user_config_file: config_home.join("warden/config.toml"),
		working_dir,
	})
}
