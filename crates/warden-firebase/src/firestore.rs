// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Cloud Firestore document writes over the v1 REST API.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};

use chrono::{DateTime, SecondsFormat, Utc};
use rand::rngs::OsRng;
use rand::Rng;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use tracing::{debug, instrument};
use warden_common_http::retry;

use crate::client::{FirebaseClient, Service};
use crate::error::FirebaseError;

const AUTO_ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
const AUTO_ID_LENGTH: usize = 20;
const REQUEST_TIME: &str = "REQUEST_TIME";

pub type Fields = BTreeMap<String, Value>;

/// A Firestore field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
	Null,
	Boolean(bool),
	Integer(i64),
	Double(f64),
	String(String),
	Timestamp(DateTime<Utc>),
	Map(Fields),
	Array(Vec<Value>),
}

#[derive(Serialize)]
struct MapValue<'a> {
	fields: &'a Fields,
}

#[derive(Serialize)]
struct ArrayValue<'a> {
	values: &'a [Value],
}

impl Serialize for Value {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		let mut map = serializer.serialize_map(Some(1))?;
		match self {
			Value::Null => map.serialize_entry("nullValue", &())?,
			Value::Boolean(b) => map.serialize_entry("booleanValue", b)?,
			Value::Integer(i) => map.serialize_entry("integerValue", &i.to_string())?,
			Value::Double(d) => map.serialize_entry("doubleValue", d)?,
			Value::String(s) => map.serialize_entry("stringValue", s)?,
			Value::Timestamp(ts) => map.serialize_entry(
				"timestampValue",
				&ts.to_rfc3339_opts(SecondsFormat::Micros, true),
			)?,
			Value::Map(fields) => map.serialize_entry("mapValue", &MapValue { fields })?,
			Value::Array(values) => map.serialize_entry("arrayValue", &ArrayValue { values })?,
		}
		map.end()
	}
}

impl From<&str> for Value {
	fn from(s: &str) -> Self {
		Value::String(s.to_string())
	}
}

impl From<String> for Value {
	fn from(s: String) -> Self {
		Value::String(s)
	}
}

impl From<bool> for Value {
	fn from(b: bool) -> Self {
		Value::Boolean(b)
	}
}

impl From<i64> for Value {
	fn from(i: i64) -> Self {
		Value::Integer(i)
	}
}

impl From<f64> for Value {
	fn from(d: f64) -> Self {
		Value::Double(d)
	}
}

impl From<DateTime<Utc>> for Value {
	fn from(ts: DateTime<Utc>) -> Self {
		Value::Timestamp(ts)
	}
}

impl From<Fields> for Value {
	fn from(fields: Fields) -> Self {
		Value::Map(fields)
	}
}

impl<T: Into<Value>> From<Vec<T>> for Value {
	fn from(values: Vec<T>) -> Self {
		Value::Array(values.into_iter().map(Into::into).collect())
	}
}

/// One document write inside a commit.
#[derive(Debug, Clone, PartialEq)]
pub struct Write {
	/// Document path relative to the database root, e.g. `profiles/uid`.
	pub document: String,
	pub fields: Fields,
	/// Fields set to the commit time by the server.
	pub server_timestamps: Vec<String>,
	/// Fail with `ALREADY_EXISTS` instead of overwriting.
	pub must_not_exist: bool,
}

impl Write {
	/// Overwrite (or create) the document at `document`.
	pub fn set(document: impl Into<String>, fields: Fields) -> Self {
		Self {
			document: document.into(),
			fields,
			server_timestamps: Vec::new(),
			must_not_exist: false,
		}
	}

	/// Create the document at `document`; the commit fails if it exists.
	pub fn create(document: impl Into<String>, fields: Fields) -> Self {
		Self {
			must_not_exist: true,
			..Self::set(document, fields)
		}
	}

	pub fn with_server_timestamp(mut self, field: impl Into<String>) -> Self {
		self.server_timestamps.push(field.into());
		self
	}
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CommitBody<'a> {
	writes: Vec<WireWrite<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireWrite<'a> {
	update: WireDocument<'a>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	update_transforms: Vec<FieldTransform<'a>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	current_document: Option<Precondition>,
}

#[derive(Serialize)]
struct WireDocument<'a> {
	name: String,
	fields: &'a Fields,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FieldTransform<'a> {
	field_path: &'a str,
	set_to_server_value: &'static str,
}

#[derive(Serialize)]
struct Precondition {
	exists: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitResponse {
	#[serde(default)]
	pub commit_time: Option<String>,
	#[serde(default)]
	pub write_results: Vec<WriteResult>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteResult {
	#[serde(default)]
	pub update_time: Option<String>,
}

/// A 20-character alphanumeric document id.
pub fn auto_id() -> String {
	let mut rng = OsRng;
	(0..AUTO_ID_LENGTH)
		.map(|_| AUTO_ID_ALPHABET[rng.gen_range(0..AUTO_ID_ALPHABET.len())] as char)
		.collect()
}

fn validate_path(path: &str, expect_document: bool) -> Result<(), FirebaseError> {
	let segments: Vec<&str> = path.split('/').collect();
	let well_formed = segments.iter().all(|s| !s.is_empty() && *s != "." && *s != "..");
	let is_document = segments.len() % 2 == 0;
	if !well_formed || is_document != expect_document {
		return Err(FirebaseError::InvalidPath(path.to_string()));
	}
	Ok(())
}

fn is_already_exists(err: &FirebaseError) -> bool {
	matches!(err, FirebaseError::Api { status: 409, .. }) && err.service_code() == Some("ALREADY_EXISTS")
}

impl FirebaseClient {
	/// Apply `writes` atomically.
	///
	/// Retried on transient failures. When every write is a create, an
	/// `ALREADY_EXISTS` on a retry means an earlier attempt was applied, and
	/// the commit counts as done.
	#[instrument(skip_all, fields(project_id = %self.project_id(), writes = writes.len()))]
	pub async fn commit(&self, writes: &[Write]) -> Result<CommitResponse, FirebaseError> {
		for write in writes {
			validate_path(&write.document, true)?;
		}

		let root = self.config().documents_root();
		let body = CommitBody {
			writes: writes
				.iter()
				.map(|w| WireWrite {
					update: WireDocument {
						name: format!("{root}/{}", w.document),
						fields: &w.fields,
					},
					update_transforms: w
						.server_timestamps
						.iter()
						.map(|field| FieldTransform {
							field_path: field,
							set_to_server_value: REQUEST_TIME,
						})
						.collect(),
					current_document: w.must_not_exist.then_some(Precondition { exists: false }),
				})
				.collect(),
		};

		let url = self.config().commit_url();
		let only_creates = writes.iter().all(|w| w.must_not_exist);
		let attempts = AtomicU32::new(0);
		let response: CommitResponse = retry(&self.config().retry, || {
			let attempt = attempts.fetch_add(1, Ordering::Relaxed) + 1;
			let request = self.post_json::<_, CommitResponse>(Service::Firestore, &url, &body);
			async move {
				match request.await {
					Err(err) if attempt > 1 && only_creates && is_already_exists(&err) => {
						debug!(attempt, "create already applied by an earlier attempt");
						Ok(CommitResponse::default())
					}
					other => other,
				}
			}
		})
		.await?;

		debug!(commit_time = ?response.commit_time, "committed writes");
		Ok(response)
	}

	/// Overwrite the document at `path`.
	pub async fn set_document(
		&self,
		path: &str,
		fields: Fields,
		server_timestamps: &[&str],
	) -> Result<CommitResponse, FirebaseError> {
		let mut write = Write::set(path, fields);
		write.server_timestamps = server_timestamps.iter().map(|f| f.to_string()).collect();
		self.commit(std::slice::from_ref(&write)).await
	}

	/// Create a document with a generated id under `collection` and return the
	/// id.
	pub async fn add_document(
		&self,
		collection: &str,
		fields: Fields,
		server_timestamps: &[&str],
	) -> Result<String, FirebaseError> {
		validate_path(collection, false)?;
		let id = auto_id();
		let mut write = Write::create(format!("{collection}/{id}"), fields);
		write.server_timestamps = server_timestamps.iter().map(|f| f.to_string()).collect();
		self.commit(std::slice::from_ref(&write)).await?;
		Ok(id)
	}
}

#[cfg(test)]
mod tests {
	use chrono::TimeZone;
	use proptest::prelude::*;
	use serde_json::json;
	use wiremock::matchers::{body_json, header, method, path};
	use wiremock::{Mock, MockServer, Request, ResponseTemplate};

	use super::*;
	use crate::config::FirebaseConfig;
	use crate::test_support::fast_retry;

	const COMMIT_PATH: &str = "/v1/projects/demo/databases/(default)/documents:commit";

	fn emulated_client(server: &MockServer) -> FirebaseClient {
		let host = server.address().to_string();
		let config = FirebaseConfig::new("demo")
			.with_auth_emulator(&host)
			.with_firestore_emulator(&host)
			.with_retry(fast_retry());
		FirebaseClient::new(config, None).unwrap()
	}

	fn commit_ok() -> ResponseTemplate {
		ResponseTemplate::new(200).set_body_json(json!({
			"writeResults": [{"updateTime": "2025-01-01T00:00:00.000001Z"}],
			"commitTime": "2025-01-01T00:00:00.000001Z"
		}))
	}

	#[test]
	fn values_use_rest_encoding() {
		let ts = Utc.with_ymd_and_hms(2025, 3, 4, 5, 6, 7).unwrap();
		let mut inner = Fields::new();
		inner.insert("role".into(), "admin".into());

		let encoded = serde_json::to_value(Value::Array(vec![
			Value::Null,
			true.into(),
			42i64.into(),
			1.5f64.into(),
			"x".into(),
			ts.into(),
			inner.into(),
		]))
		.unwrap();

		assert_eq!(
			encoded,
			json!({"arrayValue": {"values": [
				{"nullValue": null},
				{"booleanValue": true},
				{"integerValue": "42"},
				{"doubleValue": 1.5},
				{"stringValue": "x"},
				{"timestampValue": "2025-03-04T05:06:07.000000Z"},
				{"mapValue": {"fields": {"role": {"stringValue": "admin"}}}}
			]}})
		);
	}

	#[test]
	fn paths_are_checked_for_kind() {
		assert!(validate_path("profiles/uid", true).is_ok());
		assert!(validate_path("auth_logs/uid/events", false).is_ok());
		assert!(validate_path("profiles", true).is_err());
		assert!(validate_path("profiles//x", true).is_err());
		assert!(validate_path("profiles/uid", false).is_err());
	}

	proptest! {
		#[test]
		fn auto_ids_are_twenty_alphanumerics(_seed in 0u8..50) {
			let id = auto_id();
			prop_assert_eq!(id.len(), 20);
			prop_assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
		}
	}

	#[tokio::test]
	async fn set_document_sends_fields_and_transforms() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path(COMMIT_PATH))
			.and(header("authorization", "Bearer owner"))
			.and(body_json(json!({
				"writes": [{
					"update": {
						"name": "projects/demo/databases/(default)/documents/profiles/uid-1",
						"fields": {
							"mustChangePassword": {"booleanValue": true},
							"username": {"stringValue": "alice"}
						}
					},
					"updateTransforms": [
						{"fieldPath": "tempPasswordSetAt", "setToServerValue": "REQUEST_TIME"}
					]
				}]
			})))
			.respond_with(commit_ok())
			.expect(1)
			.mount(&server)
			.await;

		let mut fields = Fields::new();
		fields.insert("username".into(), "alice".into());
		fields.insert("mustChangePassword".into(), true.into());

		let client = emulated_client(&server);
		let response = client
			.set_document("profiles/uid-1", fields, &["tempPasswordSetAt"])
			.await
			.unwrap();
		assert_eq!(response.write_results.len(), 1);
	}

	#[tokio::test]
	async fn add_document_uses_auto_id_and_precondition() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path(COMMIT_PATH))
			.respond_with(commit_ok())
			.expect(1)
			.mount(&server)
			.await;

		let client = emulated_client(&server);
		let id = client
			.add_document("auth_logs/uid-1/events", Fields::new(), &["at"])
			.await
			.unwrap();
		assert_eq!(id.len(), 20);

		let requests: Vec<Request> = server.received_requests().await.unwrap();
		let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
		let write = &body["writes"][0];
		assert_eq!(
			write["update"]["name"],
			format!("projects/demo/databases/(default)/documents/auth_logs/uid-1/events/{id}")
		);
		assert_eq!(write["currentDocument"], json!({"exists": false}));
		assert_eq!(write["updateTransforms"][0]["fieldPath"], "at");
	}

	#[tokio::test]
	async fn add_document_rejects_document_path() {
		let server = MockServer::start().await;
		let client = emulated_client(&server);
		let err = client
			.add_document("profiles/uid-1", Fields::new(), &[])
			.await
			.unwrap_err();
		assert!(matches!(err, FirebaseError::InvalidPath(_)));
	}

	#[tokio::test]
	async fn commit_retries_unavailable() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path(COMMIT_PATH))
			.respond_with(ResponseTemplate::new(503).set_body_json(json!({
				"error": {"code": 503, "message": "The service is currently unavailable.", "status": "UNAVAILABLE"}
			})))
			.up_to_n_times(1)
			.expect(1)
			.mount(&server)
			.await;
		Mock::given(method("POST"))
			.and(path(COMMIT_PATH))
			.respond_with(commit_ok())
			.expect(1)
			.mount(&server)
			.await;

		let client = emulated_client(&server);
		client
			.commit(&[Write::set("profiles/u", Fields::new())])
			.await
			.unwrap();
	}

	fn already_exists() -> ResponseTemplate {
		ResponseTemplate::new(409).set_body_json(json!({
			"error": {"code": 409, "message": "Document already exists: projects/demo/databases/(default)/documents/auth_logs/u/events/x", "status": "ALREADY_EXISTS"}
		}))
	}

	#[tokio::test]
	async fn create_applied_before_a_retry_is_not_an_error() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path(COMMIT_PATH))
			.respond_with(ResponseTemplate::new(503).set_body_json(json!({
				"error": {"code": 503, "message": "Deadline exceeded.", "status": "UNAVAILABLE"}
			})))
			.up_to_n_times(1)
			.expect(1)
			.mount(&server)
			.await;
		Mock::given(method("POST"))
			.and(path(COMMIT_PATH))
			.respond_with(already_exists())
			.expect(1)
			.mount(&server)
			.await;

		let client = emulated_client(&server);
		let id = client
			.add_document("auth_logs/u/events", Fields::new(), &["at"])
			.await
			.unwrap();
		assert_eq!(id.len(), 20);
	}

	#[tokio::test]
	async fn already_exists_on_first_attempt_is_an_error() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path(COMMIT_PATH))
			.respond_with(already_exists())
			.expect(1)
			.mount(&server)
			.await;

		let client = emulated_client(&server);
		let err = client
			.add_document("auth_logs/u/events", Fields::new(), &["at"])
			.await
			.unwrap_err();
		assert_eq!(err.service_code(), Some("ALREADY_EXISTS"));
	}

	#[tokio::test]
	async fn permission_denied_is_forbidden() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path(COMMIT_PATH))
			.respond_with(ResponseTemplate::new(403).set_body_json(json!({
				"error": {"code": 403, "message": "Missing or insufficient permissions.", "status": "PERMISSION_DENIED"}
			})))
			.expect(1)
			.mount(&server)
			.await;

		let client = emulated_client(&server);
		let err = client
			.commit(&[Write::set("profiles/u", Fields::new())])
			.await
			.unwrap_err();
		match err {
			FirebaseError::Forbidden(msg) => assert_eq!(msg, "Missing or insufficient permissions."),
			other => panic!("unexpected: {other:?}"),
		}
	}
}
