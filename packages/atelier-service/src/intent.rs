//! Turns a raw query into a [`SearchIntent`].
//!
//! Short plain queries are parsed locally. Everything else goes to the intent model, whose reply is
//! normalized so downstream stages can rely on a non-empty, priority-ordered sub-query list.

use serde::Deserialize;
use serde_json::Value;

use atelier_domain::{
	Lexicon, PriceRange, category, color,
	lexicon::{ANY_CATEGORY, CATEGORIES},
	price, query, text,
};

use crate::{AtelierService, Error, Result, SearchIntent, SubQuery};

const MIN_WEIGHT: f32 = 0.1;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawIntent {
	#[serde(default)]
	occasion: Option<String>,
	#[serde(default)]
	style: OneOrMany,
	#[serde(default)]
	constraints: OneOrMany,
	#[serde(default)]
	color: Option<String>,
	#[serde(default, alias = "price_range")]
	price_range: Option<RawPriceRange>,
	#[serde(default, alias = "primary_item")]
	primary_item: Option<String>,
	#[serde(default, alias = "secondary_items")]
	secondary_items: OneOrMany,
	#[serde(default, alias = "sub_queries", alias = "searchQueries")]
	sub_queries: Option<Vec<RawSubQuery>>,
	#[serde(default)]
	explanation: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawPriceRange {
	#[serde(default)]
	min: Option<f64>,
	#[serde(default)]
	max: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawSubQuery {
	#[serde(alias = "query")]
	text: String,
	#[serde(default)]
	category: Option<String>,
	#[serde(default)]
	priority: Option<u32>,
	#[serde(default)]
	weight: Option<f32>,
}

// Models occasionally answer a list field with a bare string.
#[derive(Debug, Default, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
	#[default]
	None,
	One(String),
	Many(Vec<String>),
}
impl OneOrMany {
	fn into_vec(self) -> Vec<String> {
		let items = match self {
			Self::None => Vec::new(),
			Self::One(item) => vec![item],
			Self::Many(items) => items,
		};

		items
			.into_iter()
			.map(|item| item.trim().to_string())
			.filter(|item| !item.is_empty())
			.collect()
	}
}

impl AtelierService {
	/// Parses `query` locally when it is simple, otherwise through the intent model.
	///
	/// A model reply without a usable JSON object is an [`Error::IntentParse`]. An unreachable
	/// model degrades to the local parser.
	pub async fn parse_intent(&self, query: &str) -> Result<SearchIntent> {
		if query::is_simple_query(query, self.lexicon) {
			return Ok(fast_intent(query, self.lexicon));
		}

		let messages = build_messages(query, self.lexicon);
		let reply =
			match self.providers.intent.complete(&self.cfg.providers.llm_intent, &messages).await {
				Ok(reply) => reply,
				Err(err) => {
					tracing::warn!(
						query,
						error = %err,
						"Intent model unavailable. Using local parse."
					);

					return Ok(fast_intent(query, self.lexicon));
				},
			};

		parse_model_reply(query, &reply, self.lexicon).inspect_err(|err| {
			tracing::error!(query, error = err.detail(), "Intent model reply could not be parsed.");
		})
	}
}

/// Local parse for short queries. Pure: the same query always yields the same intent.
pub fn fast_intent(query: &str, lexicon: &Lexicon) -> SearchIntent {
	let query = query.trim();
	let color = color::extract_color(query, lexicon);
	let detected = category::detect_category(query, lexicon);
	let explanation = match (color, detected) {
		(Some(color), Some((_, item))) => format!(
			"I can help you find {color} {item}! I'll show you {color} options that match your style."
		),
		(Some(color), None) => format!(
			"I can help you find {color} pieces! I'll search our collection for {color} styles."
		),
		(None, Some((_, item))) =>
			format!("I can help you find {item}! I'll look through our {item} for great matches."),
		(None, None) => format!(
			"I can help you find {query}! I'll search our collection for pieces that match what you're looking for."
		),
	};

	SearchIntent {
		color: color.map(str::to_string),
		primary_item: detected.map(|(_, item)| item.to_string()),
		sub_queries: vec![SubQuery {
			text: query.to_string(),
			category: detected.map(|(category, _)| category).unwrap_or(ANY_CATEGORY).to_string(),
			priority: 1,
			weight: 1.0,
		}],
		explanation,
		..SearchIntent::default()
	}
}

pub fn build_messages(query: &str, lexicon: &Lexicon) -> Vec<Value> {
	let occasions = lexicon
		.occasion_styles
		.iter()
		.map(|(occasion, styles)| format!("\"{occasion}\" -> {}", styles.join("/")))
		.collect::<Vec<_>>()
		.join(", ");
	let system = format!(
		"You are a fashion search intent parser. Read the shopper's request and reply with one JSON \
object and nothing else:
{{
  \"occasion\": string or null,
  \"style\": [string],
  \"constraints\": [string],
  \"color\": string or null,
  \"priceRange\": {{ \"min\": number or null, \"max\": number or null }} or null,
  \"primaryItem\": string or null,
  \"secondaryItems\": [string],
  \"subQueries\": [{{ \"text\": string, \"category\": string, \"priority\": integer, \"weight\": number }}],
  \"explanation\": string
}}

Rules:
- subQueries must not be empty. Write each text as a focused description for semantic search.
- category is one of: {categories}, or \"all\".
- The primary item gets priority 1 and weight 1.0. Secondary items get higher priority numbers and \
weights between 0.6 and 0.8.
- color is only a color the shopper named, written exactly as they wrote it. Never infer a color from \
a style and never default one. Otherwise null.
- Prices: \"under $X\" -> max X, \"over $X\" -> min X, \"$X-$Y\" or \"between $X and $Y\" -> both, \
\"around $X\" -> X-10 to X+10, \"affordable\" -> max 50, \"luxury\" -> min 100.
- Keep the shopper's own words. If they say \"stunning\" or \"glamorous\", keep it.
- Only add styles implied by an occasion: {occasions}.
- explanation is one or two friendly sentences addressed to the shopper.",
		categories = CATEGORIES.join(", "),
	);

	vec![
		serde_json::json!({ "role": "system", "content": system }),
		serde_json::json!({ "role": "user", "content": query }),
	]
}

/// Extracts and normalizes the first JSON object in a model reply.
pub fn parse_model_reply(query: &str, reply: &str, lexicon: &Lexicon) -> Result<SearchIntent> {
	let parse_error = |message: String| Error::IntentParse { query: query.to_string(), message };
	let raw = atelier_providers::first_json_object(reply)
		.ok_or_else(|| parse_error("Intent reply does not contain a JSON object.".to_string()))?;
	let raw: RawIntent = serde_json::from_str(raw)
		.map_err(|err| parse_error(format!("Intent reply is not a valid intent: {err}.")))?;
	let mut sub_queries: Vec<SubQuery> = raw
		.sub_queries
		.unwrap_or_default()
		.into_iter()
		.filter(|sub_query| !sub_query.text.trim().is_empty())
		.enumerate()
		.map(|(idx, sub_query)| normalize_sub_query(idx, sub_query, lexicon))
		.collect();

	if sub_queries.is_empty() {
		return Err(parse_error("Intent reply has no sub-queries.".to_string()));
	}

	sub_queries.sort_by_key(|sub_query| sub_query.priority);

	let normalized_query = text::normalize(query);
	let color = raw
		.color
		.map(|color| text::normalize(color.trim()))
		.filter(|color| !color.is_empty() && color != "null")
		.filter(|color| {
			let named = text::contains_word(&normalized_query, color);

			if !named {
				tracing::debug!(query, color, "Dropping a color the shopper did not name.");
			}

			named
		});
	let price_range = raw
		.price_range
		.map(|range| PriceRange::new(range.min, range.max))
		.filter(|range| !range.is_unbounded())
		.or_else(|| price::extract_price_range(query, lexicon));
	let mut style = raw.style.into_vec();
	let mut occasion = non_blank(raw.occasion);

	if let Some((named, implied)) = query::infer_occasion(query, lexicon) {
		occasion.get_or_insert_with(|| named.to_string());

		for implied_style in implied {
			if !style.iter().any(|existing| existing.eq_ignore_ascii_case(implied_style)) {
				style.push((*implied_style).to_string());
			}
		}
	}

	let explanation = non_blank(raw.explanation)
		.unwrap_or_else(|| format!("Here's what I found for \"{}\".", query.trim()));

	Ok(SearchIntent {
		occasion,
		style,
		constraints: raw.constraints.into_vec(),
		color,
		price_range,
		primary_item: non_blank(raw.primary_item),
		secondary_items: raw.secondary_items.into_vec(),
		sub_queries,
		explanation,
	})
}

fn non_blank(value: Option<String>) -> Option<String> {
	value.map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

fn normalize_sub_query(idx: usize, raw: RawSubQuery, lexicon: &Lexicon) -> SubQuery {
	let weight =
		raw.weight.filter(|weight| weight.is_finite()).unwrap_or(1.0).clamp(MIN_WEIGHT, 1.0);
	let fallback_priority = u32::try_from(idx + 1).unwrap_or(u32::MAX);
	let category = raw
		.category
		.as_deref()
		.map(|label| category::canonical_category(label, lexicon))
		.unwrap_or(ANY_CATEGORY);

	SubQuery {
		text: raw.text.trim().to_string(),
		category: category.to_string(),
		priority: raw.priority.unwrap_or(fallback_priority).max(1),
		weight,
	}
}
