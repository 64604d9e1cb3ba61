use serde_json::Value;

use crate::{Error, Result};
use atelier_config::EmbeddingProviderConfig;

/// Embeds `texts` with an OpenAI-compatible `/embeddings` endpoint, preserving input order.
pub async fn embed(cfg: &EmbeddingProviderConfig, texts: &[String]) -> Result<Vec<Vec<f32>>> {
	let body = serde_json::json!({
		"model": cfg.model,
		"input": texts,
		"dimensions": cfg.dimensions,
	});
	let res = crate::client(cfg.timeout_ms)?
		.post(crate::endpoint(&cfg.api_base, &cfg.path))
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;
	let vectors = parse_embedding_response(&json)?;

	tracing::debug!(model = %cfg.model, inputs = texts.len(), "Embeddings returned.");

	if vectors.len() != texts.len() {
		return Err(Error::response(format!(
			"Embedding provider returned {} vectors for {} inputs.",
			vectors.len(),
			texts.len()
		)));
	}
	if let Some(vector) = vectors.iter().find(|vector| vector.len() != cfg.dimensions as usize) {
		return Err(Error::response(format!(
			"Embedding dimension mismatch: expected {}, got {}.",
			cfg.dimensions,
			vector.len()
		)));
	}

	Ok(vectors)
}

fn parse_embedding_response(json: &Value) -> Result<Vec<Vec<f32>>> {
	let data = json
		.get("data")
		.and_then(Value::as_array)
		.ok_or_else(|| Error::response("Embedding response is missing the data array."))?;
	let mut indexed = data
		.iter()
		.enumerate()
		.map(|(position, item)| {
			let index = item
				.get("index")
				.and_then(Value::as_u64)
				.map(|index| index as usize)
				.unwrap_or(position);
			let vector = item
				.get("embedding")
				.ok_or_else(|| Error::response("Embedding item is missing its vector."))
				.and_then(number_array)?;

			Ok((index, vector))
		})
		.collect::<Result<Vec<_>>>()?;

	indexed.sort_by_key(|(index, _)| *index);

	Ok(indexed.into_iter().map(|(_, vector)| vector).collect())
}

pub(crate) fn number_array(value: &Value) -> Result<Vec<f32>> {
	let items = value.as_array().ok_or_else(|| Error::response("Expected a numeric array."))?;

	items
		.iter()
		.map(|item| {
			item.as_f64()
				.map(|number| number as f32)
				.ok_or_else(|| Error::response("Embedding values must be numeric."))
		})
		.collect()
}
