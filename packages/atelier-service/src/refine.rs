//! Narrowing a result set the shopper already has ("only in black", "not red", "under $100").
//!
//! Plain refinements are parsed locally. Anything with a qualifier the local parser cannot place
//! ("hiking boots") goes through the full intent parser instead.

use std::{collections::HashMap, sync::LazyLock};

use regex::Regex;
use serde::Serialize;

use atelier_domain::{Lexicon, PriceRange, color, text};

use crate::{
	AtelierService, Error, Product, Result,
	pipeline::{color::filter_by_color, personalization},
};

pub const MAX_REFINED_RESULTS: usize = 100;

const MIN_REFINEMENT_CHARS: usize = 2;
const HIDE_AT_OR_BELOW: u8 = 2;

static NEGATED_COLOR: LazyLock<Option<Regex>> = LazyLock::new(|| {
	Regex::new(
		r"\b(?:except|without|excluding|not|other\s+than|anything\s+but|all\s+colou?rs?\s+except|every\s+colou?r\s+(?:except|but)|no)\s+(?:the\s+|colou?r\s+)?(\S+)",
	)
	.ok()
});
static BETWEEN: LazyLock<Option<Regex>> =
	LazyLock::new(|| Regex::new(r"between\s+\$?(\d+)\s+and\s+\$?(\d+)").ok());
static UNDER: LazyLock<Option<Regex>> =
	LazyLock::new(|| Regex::new(r"(?:under|below|less than|max|at most)\s+\$?(\d+)").ok());
static OVER: LazyLock<Option<Regex>> =
	LazyLock::new(|| Regex::new(r"(?:over|above|more than|min|at least)\s+\$?(\d+)").ok());

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefinementIntent {
	pub color: Option<String>,
	pub exclude_color: Option<String>,
	/// The item word as the shopper wrote it ("heels", not "shoes").
	pub primary_item: Option<String>,
	pub price_range: Option<PriceRange>,
	pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefineResponse {
	pub results: Vec<Product>,
	/// Refined results before the output cap.
	pub total_count: u64,
	pub intent: RefinementIntent,
}

impl AtelierService {
	/// Filters and re-orders `current` by `refinement`. Never retrieves new products.
	pub async fn refine(
		&self,
		current: Vec<Product>,
		refinement: &str,
		user_ratings: &HashMap<String, u8>,
	) -> Result<RefineResponse> {
		let refinement = refinement.trim();

		if refinement.chars().count() < MIN_REFINEMENT_CHARS {
			return Err(Error::InvalidRequest {
				message: format!(
					"Refinement query must be at least {MIN_REFINEMENT_CHARS} characters."
				),
			});
		}
		if current.is_empty() {
			return Ok(RefineResponse {
				results: Vec::new(),
				total_count: 0,
				intent: RefinementIntent::default(),
			});
		}

		let intent = match parse_refinement(refinement, self.lexicon) {
			Some(intent) => intent,
			None => {
				tracing::debug!(refinement, "Refinement needs the intent model.");

				let parsed = self.parse_intent(refinement).await?;

				RefinementIntent {
					color: parsed.color,
					exclude_color: None,
					primary_item: parsed.primary_item,
					price_range: parsed.price_range,
					explanation: parsed.explanation,
				}
			},
		};
		let before = current.len();
		let mut refined = apply_refinement(current, &intent, user_ratings, self.lexicon);
		let total_count = refined.len() as u64;

		refined.truncate(MAX_REFINED_RESULTS);

		tracing::info!(refinement, before, after = total_count, "Refinement applied.");

		Ok(RefineResponse { results: refined, total_count, intent })
	}
}

/// Local parse of a refinement. `None` when a qualifier is present or nothing could be read.
pub fn parse_refinement(refinement: &str, lexicon: &Lexicon) -> Option<RefinementIntent> {
	let lower = text::normalize(refinement.trim());

	let qualified = lexicon
		.refinement_qualifiers
		.iter()
		.any(|qualifier| text::contains_word(&lower, qualifier));

	if qualified {
		return None;
	}

	let exclude_color = negated_color(&lower, lexicon);
	// A negated color is never also the requested one.
	let color = match exclude_color {
		Some(_) => None,
		None => color::extract_color(&lower, lexicon).map(str::to_string),
	};
	let primary_item = lexicon
		.category_keywords
		.iter()
		.flat_map(|(_, keywords)| keywords.iter())
		.find(|keyword| text::contains_word(&lower, keyword))
		.map(|keyword| (*keyword).to_string());
	let price_range = refinement_price(&lower);

	if color.is_none() && exclude_color.is_none() && primary_item.is_none() && price_range.is_none()
	{
		return None;
	}

	let explanation = match &exclude_color {
		Some(excluded) => format!("Showing all colors except {excluded}."),
		None => {
			let price = match price_range {
				Some(PriceRange { max: Some(max), .. }) => Some(format!("under ${max}")),
				Some(PriceRange { min: Some(min), .. }) => Some(format!("over ${min}")),
				_ => None,
			};
			let described = [color.clone(), primary_item.clone(), price]
				.into_iter()
				.flatten()
				.collect::<Vec<_>>()
				.join(" ");

			format!("Showing {described} results.")
		},
	};

	Some(RefinementIntent { color, exclude_color, primary_item, price_range, explanation })
}

/// Exclusion, item, color and price filters in that order, then the shopper's own ratings.
pub fn apply_refinement(
	products: Vec<Product>,
	intent: &RefinementIntent,
	user_ratings: &HashMap<String, u8>,
	lexicon: &Lexicon,
) -> Vec<Product> {
	let mut products = products;

	if let Some(excluded) = intent.exclude_color.as_deref() {
		products.retain(|product| {
			!color::product_matches_color(
				&product.verified_colors,
				&product.title,
				&product.description,
				excluded,
				lexicon,
			)
		});
	}
	if let Some(item) = intent.primary_item.as_deref() {
		let item = text::normalize(item);
		let singular = item.strip_suffix('s').unwrap_or(&item).to_string();
		let matches_item =
			|product: &Product| text::contains_term(&text::normalize(&product.title), &singular);

		if products.iter().any(matches_item) {
			products.retain(matches_item);
		}
	}
	if let Some(wanted) = intent.color.as_deref() {
		products = filter_by_color(products, wanted, lexicon).0;
	}
	if let Some(range) = intent.price_range.filter(|range| !range.is_unbounded()) {
		products.retain(|product| range.contains(product.price));
	}

	products.retain(|product| {
		user_ratings.get(&product.id).is_none_or(|rating| *rating > HIDE_AT_OR_BELOW)
	});

	for product in &mut products {
		let rating = user_ratings.get(&product.id).copied();

		product.similarity += personalization::personal_boost(rating);
	}

	products.sort_by(|lhs, rhs| rhs.similarity.total_cmp(&lhs.similarity));

	products
}

fn negated_color(lower: &str, lexicon: &Lexicon) -> Option<String> {
	let captures = NEGATED_COLOR.as_ref()?.captures(lower)?;
	let candidate: String = captures
		.get(1)?
		.as_str()
		.chars()
		.filter(|c| c.is_ascii_lowercase() || *c == '-')
		.collect();

	lexicon.colors.contains(&candidate.as_str()).then_some(candidate)
}

fn refinement_price(lower: &str) -> Option<PriceRange> {
	let amount = |re: &LazyLock<Option<Regex>>, group: usize| -> Option<f64> {
		re.as_ref()?.captures(lower)?.get(group)?.as_str().parse().ok()
	};

	if let (Some(low), Some(high)) = (amount(&BETWEEN, 1), amount(&BETWEEN, 2)) {
		return Some(PriceRange::new(Some(low), Some(high)));
	}
	if let Some(max) = amount(&UNDER, 1) {
		return Some(PriceRange::new(None, Some(max)));
	}

	amount(&OVER, 1).map(|min| PriceRange::new(Some(min), None))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::pipeline::testing::{ids, product};

	#[test]
	fn negated_color_is_excluded_not_requested() {
		let intent = parse_refinement("anything but black", Lexicon::builtin()).expect("parsed");

		assert_eq!(intent.exclude_color.as_deref(), Some("black"));
		assert_eq!(intent.color, None);
		assert_eq!(intent.explanation, "Showing all colors except black.");
	}

	#[test]
	fn color_item_and_price_are_read_locally() {
		let intent = parse_refinement("red heels under $80", Lexicon::builtin()).expect("parsed");

		assert_eq!(intent.color.as_deref(), Some("red"));
		assert_eq!(intent.primary_item.as_deref(), Some("heels"));
		assert_eq!(intent.price_range, Some(PriceRange { min: None, max: Some(80.0) }));
		assert_eq!(intent.explanation, "Showing red heels under $80 results.");
	}

	#[test]
	fn qualifiers_and_empty_reads_decline() {
		assert_eq!(parse_refinement("hiking boots", Lexicon::builtin()), None);
		assert_eq!(parse_refinement("something nicer", Lexicon::builtin()), None);
	}

	#[test]
	fn refinement_filters_in_order_and_applies_ratings() {
		let lexicon = Lexicon::builtin();
		let intent = RefinementIntent {
			exclude_color: Some("black".to_string()),
			primary_item: Some("heels".to_string()),
			price_range: Some(PriceRange { min: None, max: Some(120.0) }),
			..RefinementIntent::default()
		};
		let mut pricey = product("pricey", "Red heel", 0.9);

		pricey.price = Some(300.0);

		let products = vec![
			product("black", "Black heels", 0.95),
			pricey,
			product("nude", "Nude heels", 0.5),
			product("tan", "Tan heel", 0.6),
			product("flat", "Ballet flat", 0.99),
			product("hidden", "Silver heels", 0.8),
		];
		let ratings = HashMap::from([("hidden".to_string(), 1_u8), ("nude".to_string(), 5)]);
		let refined = apply_refinement(products, &intent, &ratings, lexicon);

		// nude: 0.5 + 0.15 = 0.65 edges past tan.
		assert_eq!(ids(&refined), vec!["nude", "tan"]);
	}
}
