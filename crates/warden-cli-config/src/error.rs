// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration error types.

use std::path::PathBuf;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	#[error("TOML parse error in {path}: {source}")]
	TomlParse {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	/// `--config` named a file that does not exist.
	#[error("config file not found: {0}")]
	ConfigFileNotFound(PathBuf),

	#[error("Invalid value for {field}: {message}")]
	InvalidValue { field: String, message: String },

	#[error(
		"Service account JSON not found. Provide --service-account or set $FIREBASE_SERVICE_ACCOUNT or place service-account.json in the working directory."
	)]
	ServiceAccountNotFound,

	#[error("Could not determine home directory")]
	HomeDirNotFound,
}

impl ConfigError {
	pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
		Self::InvalidValue {
			field: field.into(),
			message: message.into(),
		}
	}
}
