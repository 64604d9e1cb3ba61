use reqwest::header::AUTHORIZATION;
use serde_json::{Map, Value};

use atelier_providers::Error;

#[test]
fn builds_bearer_auth_header() {
	let headers = atelier_providers::auth_headers("hf_secret", &Map::new())
		.expect("Failed to build headers.");
	let value = headers.get(AUTHORIZATION).expect("Missing authorization header.");

	assert_eq!(value, "Bearer hf_secret");
}

#[test]
fn default_headers_are_forwarded() {
	let mut defaults = Map::new();

	defaults.insert("x-wait-for-model".to_string(), Value::String("true".to_string()));

	let headers =
		atelier_providers::auth_headers("key", &defaults).expect("Failed to build headers.");

	assert_eq!(headers.get("x-wait-for-model").expect("Missing default header."), "true");
}

#[test]
fn non_string_default_headers_are_config_errors() {
	let mut defaults = Map::new();

	defaults.insert("x-retries".to_string(), Value::from(3));

	let err =
		atelier_providers::auth_headers("key", &defaults).expect_err("Expected config error.");

	assert!(matches!(err, Error::InvalidConfig { .. }), "Unexpected error: {err}");
}

#[test]
fn model_replies_are_trimmed_to_their_json_object() {
	let reply = "Here is the intent:\n{\"subQueries\": [{\"query\": \"red heels\"}]}\nLet me know!";

	assert_eq!(
		atelier_providers::first_json_object(reply),
		Some("{\"subQueries\": [{\"query\": \"red heels\"}]}")
	);
}
