// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Shared HTTP utilities for warden.
//!
//! - A client builder carrying the `warden/{version}` User-Agent
//! - Retry with exponential backoff for transient failures

mod client;
mod retry;

pub use client::{build_client, builder, user_agent, DEFAULT_TIMEOUT};
pub use retry::{is_retryable_status, retry, RetryConfig, RetryableError};
