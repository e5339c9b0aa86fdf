// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Temporary password synthesis.
//!
//! Passwords contain at least one lowercase letter, one uppercase letter, one
//! digit and one symbol. Remaining positions are drawn uniformly from the union
//! of all four classes and the result is shuffled, so the guaranteed characters
//! do not sit at predictable offsets.

use rand::rngs::OsRng;
use rand::seq::SliceRandom;
use rand::{CryptoRng, Rng};
use tracing::debug;

use crate::SecretString;

/// Shortest password ever produced. Shorter requests are raised to this.
pub const MIN_PASSWORD_LENGTH: usize = 10;

pub const DEFAULT_PASSWORD_LENGTH: usize = 14;

const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";

/// Symbols accepted in generated passwords.
pub const SYMBOLS: &str = "!@#$%^&*()-_=+[]{}:,.?";

/// Generate a temporary password from the operating system CSPRNG.
pub fn generate_temp_password(length: usize) -> SecretString {
	generate_temp_password_with(&mut OsRng, length)
}

/// Generate a temporary password from the given cryptographic RNG.
pub fn generate_temp_password_with<R>(rng: &mut R, length: usize) -> SecretString
where
	R: Rng + CryptoRng + ?Sized,
{
	let length = effective_length(length);
	let symbols = SYMBOLS.as_bytes();
	let pool: Vec<u8> = [LOWERCASE, UPPERCASE, DIGITS, symbols].concat();

	let mut chars = Vec::with_capacity(length);
	for class in [LOWERCASE, UPPERCASE, DIGITS, symbols] {
		chars.push(pick(rng, class));
	}
	while chars.len() < length {
		chars.push(pick(rng, &pool));
	}
	chars.shuffle(rng);

	debug!(length, "generated temporary password");
	SecretString::new(chars.into_iter().map(char::from).collect())
}

/// Length actually used for a requested password length.
pub fn effective_length(requested: usize) -> usize {
	requested.max(MIN_PASSWORD_LENGTH)
}

fn pick<R>(rng: &mut R, alphabet: &[u8]) -> u8
where
	R: Rng + ?Sized,
{
	alphabet[rng.gen_range(0..alphabet.len())]
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;
	use rand::rngs::StdRng;
	use rand::SeedableRng;

	fn has_all_classes(password: &str) -> bool {
		password.chars().any(|c| c.is_ascii_lowercase())
			&& password.chars().any(|c| c.is_ascii_uppercase())
			&& password.chars().any(|c| c.is_ascii_digit())
			&& password.chars().any(|c| SYMBOLS.contains(c))
	}

	#[test]
	fn default_length_is_honoured() {
		let password = generate_temp_password(DEFAULT_PASSWORD_LENGTH);
		assert_eq!(password.char_len(), 14);
		assert!(has_all_classes(password.expose()));
	}

	#[test]
	fn short_requests_are_raised_to_minimum() {
		for requested in [0, 1, 4, 9] {
			let password = generate_temp_password(requested);
			assert_eq!(password.char_len(), MIN_PASSWORD_LENGTH);
		}
		assert_eq!(effective_length(10), 10);
		assert_eq!(effective_length(32), 32);
	}

	#[test]
	fn only_allowed_characters_appear() {
		let password = generate_temp_password(64);
		assert!(password
			.expose()
			.chars()
			.all(|c| c.is_ascii_alphanumeric() || SYMBOLS.contains(c)));
	}

	#[test]
	fn seeded_generation_is_deterministic() {
		let mut a = StdRng::seed_from_u64(7);
		let mut b = StdRng::seed_from_u64(7);
		assert_eq!(
			generate_temp_password_with(&mut a, 20),
			generate_temp_password_with(&mut b, 20)
		);
	}

	#[test]
	fn successive_passwords_differ() {
		let first = generate_temp_password(20);
		let second = generate_temp_password(20);
		assert_ne!(first, second);
	}

	proptest! {
		#[test]
		fn every_password_meets_composition_rules(seed in any::<u64>(), length in 0usize..80) {
			let mut rng = StdRng::seed_from_u64(seed);
			let password = generate_temp_password_with(&mut rng, length);
			prop_assert_eq!(password.char_len(), length.max(MIN_PASSWORD_LENGTH));
			prop_assert!(has_all_classes(password.expose()));
		}
	}
}
