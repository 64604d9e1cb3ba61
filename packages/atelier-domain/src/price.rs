use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{Lexicon, text};

const AROUND_SPREAD: f64 = 10.0;
const AFFORDABLE_MAX: f64 = 50.0;
const LUXURY_MIN: f64 = 100.0;

const AMOUNT: &str = r"\$?\s*(\d+(?:,\d{3})*(?:\.\d+)?)";

static BETWEEN: LazyLock<Option<Regex>> =
	LazyLock::new(|| Regex::new(&format!(r"\bbetween\s+{AMOUNT}\s*(?:and|to|-)\s*{AMOUNT}")).ok());
static SPAN: LazyLock<Option<Regex>> = LazyLock::new(|| {
	Regex::new(r"\$\s*(\d+(?:,\d{3})*(?:\.\d+)?)\s*(?:-|–|to)\s*\$?\s*(\d+(?:,\d{3})*(?:\.\d+)?)").ok()
});
static UNDER: LazyLock<Option<Regex>> = LazyLock::new(|| {
	Regex::new(&format!(
		r"\b(?:under|below|less than|cheaper than|up to|no more than|max(?:imum)?)\s+{AMOUNT}"
	))
	.ok()
});
static OVER: LazyLock<Option<Regex>> = LazyLock::new(|| {
	Regex::new(&format!(r"\b(?:over|above|more than|at least|starting at|min(?:imum)?)\s+{AMOUNT}"))
		.ok()
});
static AROUND: LazyLock<Option<Regex>> = LazyLock::new(|| {
	Regex::new(&format!(r"(?:\b(?:around|about|approximately|roughly)\s+|~\s*){AMOUNT}")).ok()
});

/// Inclusive price bounds. Either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
	pub min: Option<f64>,
	pub max: Option<f64>,
}

impl PriceRange {
	pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
		match (min, max) {
			(Some(low), Some(high)) if low > high => Self { min: Some(high), max: Some(low) },
			_ => Self { min, max },
		}
	}

	pub fn is_unbounded(&self) -> bool {
		self.min.is_none() && self.max.is_none()
	}

	/// Unknown prices never satisfy a bounded range.
	pub fn contains(&self, price: Option<f64>) -> bool {
		if self.is_unbounded() {
			return true;
		}

		let Some(price) = price else {
			return false;
		};

		self.min.is_none_or(|min| price >= min) && self.max.is_none_or(|max| price <= max)
	}
}

/// Reads a price range out of natural-language phrasing ("under $150", "$50-$80", "affordable").
pub fn extract_price_range(query: &str, lexicon: &Lexicon) -> Option<PriceRange> {
	let normalized = text::normalize(query);

	if let Some([low, high]) = captures_pair(&BETWEEN, &normalized) {
		return Some(PriceRange::new(Some(low), Some(high)));
	}
	if let Some([low, high]) = captures_pair(&SPAN, &normalized) {
		return Some(PriceRange::new(Some(low), Some(high)));
	}
	if let Some(max) = capture_amount(&UNDER, &normalized) {
		return Some(PriceRange::new(None, Some(max)));
	}
	if let Some(min) = capture_amount(&OVER, &normalized) {
		return Some(PriceRange::new(Some(min), None));
	}
	if let Some(center) = capture_amount(&AROUND, &normalized) {
		return Some(PriceRange::new(
			Some((center - AROUND_SPREAD).max(0.0)),
			Some(center + AROUND_SPREAD),
		));
	}
	if lexicon.budget_words.iter().any(|word| text::contains_word(&normalized, word)) {
		return Some(PriceRange::new(None, Some(AFFORDABLE_MAX)));
	}
	if lexicon.luxury_words.iter().any(|word| text::contains_word(&normalized, word)) {
		return Some(PriceRange::new(Some(LUXURY_MIN), None));
	}

	None
}

fn capture_amount(re: &LazyLock<Option<Regex>>, haystack: &str) -> Option<f64> {
	let captures = re.as_ref()?.captures(haystack)?;

	parse_amount(captures.get(1)?.as_str())
}

fn captures_pair(re: &LazyLock<Option<Regex>>, haystack: &str) -> Option<[f64; 2]> {
	let captures = re.as_ref()?.captures(haystack)?;

	Some([parse_amount(captures.get(1)?.as_str())?, parse_amount(captures.get(2)?.as_str())?])
}

fn parse_amount(raw: &str) -> Option<f64> {
	raw.replace(',', "").parse::<f64>().ok().filter(|value| value.is_finite())
}
