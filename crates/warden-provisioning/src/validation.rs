// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Input checks for usernames and email addresses.

use regex::Regex;
use std::sync::LazyLock;

static EMAIL_REGEX: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

static USERNAME_REGEX: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._-]{3,64}$").unwrap());

/// Loose shape check: `local@domain.tld`, no whitespace, exactly one `@`.
pub fn is_valid_email(email: &str) -> bool {
	!email.is_empty() && email.contains('@') && EMAIL_REGEX.is_match(email)
}

/// `username@domain`, lowercased.
pub fn infer_email(username: &str, domain: &str) -> String {
	format!("{username}@{domain}").to_lowercase()
}

/// Letters, digits, `.`, `_` and `-`, 3 to 64 characters. Advisory only.
pub fn is_conventional_username(username: &str) -> bool {
	USERNAME_REGEX.is_match(username)
}
