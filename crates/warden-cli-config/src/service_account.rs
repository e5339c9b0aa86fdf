// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Service-account file lookup.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::ConfigError;

/// Environment variable naming the service-account JSON.
pub const SERVICE_ACCOUNT_ENV: &str = "FIREBASE_SERVICE_ACCOUNT";

/// File looked up in the working directory when nothing else is configured.
pub const SERVICE_ACCOUNT_FILE_NAME: &str = "service-account.json";

/// Where a candidate path came from. Earlier variants are tried first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CandidateOrigin {
	Cli,
	Environment,
	ConfigFile,
	WorkingDirectory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceAccountCandidate {
	pub origin: CandidateOrigin,
	pub path: PathBuf,
}

impl ServiceAccountCandidate {
	pub fn new(origin: CandidateOrigin, path: impl Into<PathBuf>) -> Self {
		Self {
			origin,
			path: path.into(),
		}
	}

	/// `service-account.json` inside `dir`.
	pub fn working_directory(dir: &Path) -> Self {
		Self::new(
			CandidateOrigin::WorkingDirectory,
			dir.join(SERVICE_ACCOUNT_FILE_NAME),
		)
	}
}

/// Return the first candidate, in origin order, that is an existing file.
///
/// Candidates that are set but missing are skipped rather than reported.
pub fn resolve_service_account(
	candidates: &[ServiceAccountCandidate],
) -> Result<PathBuf, ConfigError> {
	let mut ordered: Vec<&ServiceAccountCandidate> = candidates.iter().collect();
	ordered.sort_by_key(|c| c.origin);

	for candidate in ordered {
		if candidate.path.is_file() {
			debug!(
				origin = ?candidate.origin,
				path = %candidate.path.display(),
				"using service account"
			);
			return Ok(candidate.path.clone());
		}
		debug!(
			origin = ?candidate.origin,
			path = %candidate.path.display(),
			"service account candidate not found, skipping"
		);
	}

	Err(ConfigError::ServiceAccountNotFound)
}
