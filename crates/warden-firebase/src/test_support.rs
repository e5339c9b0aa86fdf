// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::sync::OnceLock;
use std::time::Duration;

use rsa::{pkcs1::EncodeRsaPublicKey, pkcs8::EncodePrivateKey, RsaPrivateKey};
use warden_common_http::RetryConfig;

use crate::credentials::ServiceAccountKey;

pub struct TestKeys {
	pub private_pem: String,
	pub public_pem: String,
}

/// One RSA key pair per test binary; generation is slow in debug builds.
pub fn test_keys() -> &'static TestKeys {
	static KEYS: OnceLock<TestKeys> = OnceLock::new();
	KEYS.get_or_init(|| {
		let mut rng = rand::thread_rng();
		let private_key = RsaPrivateKey::new(&mut rng, 2048).expect("Failed to generate RSA key");
		let public_key = private_key.to_public_key();

		TestKeys {
			private_pem: private_key
				.to_pkcs8_pem(rsa::pkcs8::LineEnding::LF)
				.expect("Failed to convert private key to PEM")
				.to_string(),
			public_pem: public_key
				.to_pkcs1_pem(rsa::pkcs1::LineEnding::LF)
				.expect("Failed to convert public key to PEM"),
		}
	})
}

pub fn service_account(token_uri: &str) -> ServiceAccountKey {
	let raw = serde_json::json!({
		"type": "service_account",
		"project_id": "demo-project",
		"private_key_id": "test-key-id",
		"private_key": test_keys().private_pem,
		"client_email": "firebase-adminsdk@demo-project.iam.gserviceaccount.com",
		"token_uri": token_uri,
	})
	.to_string();
	ServiceAccountKey::from_json(&raw).expect("valid service account")
}

pub fn fast_retry() -> RetryConfig {
	RetryConfig {
		max_attempts: 3,
		base_delay: Duration::from_millis(1),
		max_delay: Duration::from_millis(5),
		backoff_factor: 2.0,
		jitter: false,
	}
}
