//! Text encoder for the image-embedding space (CLIP via a feature-extraction endpoint).

use serde_json::Value;

use crate::{Error, Result, embedding};
use atelier_config::EmbeddingProviderConfig;

pub async fn embed_text(cfg: &EmbeddingProviderConfig, text: &str) -> Result<Vec<f32>> {
	let body = serde_json::json!({
		"inputs": text,
		"options": { "wait_for_model": true },
	});
	let res = crate::client(cfg.timeout_ms)?
		.post(crate::endpoint(&cfg.api_base, &cfg.path))
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_feature_response(&json, cfg.dimensions as usize)
}

/// Accepts either a flat vector or a batch whose first row is the vector.
fn parse_feature_response(json: &Value, dimensions: usize) -> Result<Vec<f32>> {
	let row = match json.as_array().and_then(|rows| rows.first()) {
		Some(first) if first.is_array() => first,
		_ => json,
	};
	let vector = embedding::number_array(row)?;

	if vector.len() != dimensions {
		return Err(Error::response(format!(
			"Image-space embedding has {} dimensions, expected {dimensions}.",
			vector.len()
		)));
	}

	Ok(vector)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn accepts_flat_and_batched_shapes() {
		let flat = serde_json::json!([0.1, 0.2, 0.3]);
		let batched = serde_json::json!([[0.1, 0.2, 0.3]]);

		assert_eq!(parse_feature_response(&flat, 3).expect("flat"), vec![0.1, 0.2, 0.3]);
		assert_eq!(parse_feature_response(&batched, 3).expect("batched"), vec![0.1, 0.2, 0.3]);
	}

	#[test]
	fn rejects_wrong_dimensions_and_shapes() {
		assert!(parse_feature_response(&serde_json::json!([0.1, 0.2]), 3).is_err());
		assert!(parse_feature_response(&serde_json::json!({ "error": "loading" }), 3).is_err());
	}
}
