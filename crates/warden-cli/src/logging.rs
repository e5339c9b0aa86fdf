// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use warden_cli_config::{LogFormat, LoggingConfig};

/// Filter used when `RUST_LOG` is unset.
pub fn default_directive(config: &LoggingConfig) -> String {
	format!("warden={}", config.level)
}

/// Install the global subscriber. Output goes to stderr; stdout belongs to
/// prompts and the summary.
pub fn init(config: &LoggingConfig) {
	let filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(default_directive(config)));

	let compact = (config.format == LogFormat::Compact).then(|| {
		tracing_subscriber::fmt::layer()
			.with_writer(std::io::stderr)
			.with_target(false)
			.compact()
	});
	let pretty = (config.format == LogFormat::Pretty)
		.then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr).pretty());
	let json = (config.format == LogFormat::Json)
		.then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr).json());

	let _ = tracing_subscriber::registry()
		.with(filter)
		.with(compact)
		.with(pretty)
		.with(json)
		.try_init();
}
