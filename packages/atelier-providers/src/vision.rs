use serde::Deserialize;

use crate::{Error, Result, chat};
use atelier_config::LlmProviderConfig;

const SCORE_PROMPT: &str = "You are a fashion expert judging product images for search relevance.

Score how well the product image matches the shopper's query on a 0-10 scale:
- 9-10: exactly what was asked for.
- 7-8: the item with most of the requested characteristics.
- 5-6: the right item type, missing key characteristics.
- 3-4: the right item type with the opposite style.
- 0-2: the wrong item type.

For the query \"sexy boots\": thigh-high stiletto boots score 10, heeled platform ankle boots 8, \
plain ankle boots with a small heel 5, flat work boots 2, fuzzy winter boots 1.

Reply with JSON only: {\"score\": <0-10>, \"reasoning\": \"<short reason>\", \"isMatch\": <true when score >= 6>}";

const DESCRIBE_PROMPT: &str =
	"List the fashion items with: type, style, colors, patterns, materials, fit. Be concise and specific.";

/// Relevance of one product image to a query.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VisionScore {
	pub score: f32,
	#[serde(default, rename = "isMatch", alias = "is_match")]
	pub is_match: bool,
	#[serde(default)]
	pub reasoning: String,
}

pub async fn score_image(
	cfg: &LlmProviderConfig,
	image_url: &str,
	query: &str,
	product_title: &str,
) -> Result<VisionScore> {
	let messages = [
		serde_json::json!({ "role": "system", "content": SCORE_PROMPT }),
		serde_json::json!({
			"role": "user",
			"content": [
				{
					"type": "text",
					"text": format!(
						"Shopper's query: \"{query}\"\n\nProduct title: \"{product_title}\"\n\nScore this product image:"
					),
				},
				{ "type": "image_url", "image_url": { "url": image_url, "detail": "low" } },
			],
		}),
	];
	let reply = chat::complete(cfg, &messages).await?;

	parse_score(&reply)
}

/// Describes the fashion items visible in up to a handful of images as one search-ready sentence.
pub async fn describe_images(cfg: &LlmProviderConfig, image_urls: &[String]) -> Result<String> {
	let mut content = vec![serde_json::json!({ "type": "text", "text": DESCRIBE_PROMPT })];

	content.extend(image_urls.iter().map(|url| {
		serde_json::json!({ "type": "image_url", "image_url": { "url": url, "detail": "low" } })
	}));

	let messages = [serde_json::json!({ "role": "user", "content": content })];
	let reply = chat::complete(cfg, &messages).await?;
	let description = reply.trim();

	if description.is_empty() {
		return Err(Error::response("Vision model returned an empty description."));
	}

	Ok(description.to_string())
}

fn parse_score(reply: &str) -> Result<VisionScore> {
	let raw = crate::first_json_object(reply)
		.ok_or_else(|| Error::response("Vision reply does not contain a JSON object."))?;
	let mut parsed: VisionScore = serde_json::from_str(raw)?;

	if !parsed.score.is_finite() {
		return Err(Error::response("Vision score is not a finite number."));
	}

	parsed.score = parsed.score.clamp(0.0, 10.0);

	Ok(parsed)
}
