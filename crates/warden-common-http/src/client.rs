// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! HTTP client construction with a consistent User-Agent.

use std::time::Duration;

use reqwest::{Client, ClientBuilder};

/// Request timeout applied by [`build_client`] when none is given.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client builder preloaded with the warden User-Agent.
///
/// ```ignore
/// let client = warden_common_http::builder()
///     .connect_timeout(Duration::from_secs(5))
///     .build()?;
/// ```
pub fn builder() -> ClientBuilder {
	Client::builder().user_agent(user_agent())
}

/// Build a client with the warden User-Agent and the given request timeout.
pub fn build_client(timeout: Option<Duration>) -> Result<Client, reqwest::Error> {
	builder().timeout(timeout.unwrap_or(DEFAULT_TIMEOUT)).build()
}

/// Format: `warden/{version} ({os}-{arch})`
pub fn user_agent() -> String {
	format!(
		"warden/{} ({}-{})",
		env!("CARGO_PKG_VERSION"),
		std::env::consts::OS,
		std::env::consts::ARCH
	)
}
