use serde_json::Value;

use crate::{Error, Result};
use atelier_config::LlmProviderConfig;

/// Sends `messages` to an OpenAI-compatible chat completion endpoint and returns the reply text.
///
/// The reply is returned verbatim; callers decide how to extract structure from it.
pub async fn complete(cfg: &LlmProviderConfig, messages: &[Value]) -> Result<String> {
	let body = serde_json::json!({
		"model": cfg.model,
		"temperature": cfg.temperature,
		"max_tokens": cfg.max_tokens,
		"messages": messages,
	});
	let res = crate::client(cfg.timeout_ms)?
		.post(crate::endpoint(&cfg.api_base, &cfg.path))
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	tracing::debug!(model = %cfg.model, messages = messages.len(), "Chat completion returned.");

	parse_reply(&json)
}

pub(crate) fn parse_reply(json: &Value) -> Result<String> {
	json.get("choices")
		.and_then(Value::as_array)
		.and_then(|choices| choices.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|message| message.get("content"))
		.and_then(Value::as_str)
		.map(str::to_string)
		.ok_or_else(|| Error::response("Chat response is missing message content."))
}
