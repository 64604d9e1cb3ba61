use std::sync::LazyLock;

use regex::Regex;

use crate::{Lexicon, text};

static DIMENSIONS: LazyLock<Option<Regex>> = LazyLock::new(|| {
	Regex::new(
		r#"\b\d+(?:\.\d+)?\s*(?:"|in|inch|inches|cm|mm|ft|yd)?\s*[x×]\s*\d+(?:\.\d+)?\s*(?:"|in\b|inch|inches|cm|mm|ft|yd|yards?)?"#,
	)
	.ok()
});

/// Whether the shopper asked for adult content themselves.
pub fn query_signals_explicit(query: &str, lexicon: &Lexicon) -> bool {
	let normalized = text::normalize(query);

	text::contains_any_term(&normalized, lexicon.explicit_query_markers)
		|| text::contains_any_term(&normalized, lexicon.explicit_markers)
}

pub fn is_explicit(title: &str, description: &str, lexicon: &Lexicon) -> bool {
	let normalized = text::normalize(&format!("{title} {description}"));

	text::contains_any_term(&normalized, lexicon.explicit_markers)
}

/// Whether a listing is marketed to men.
///
/// Unisex listings are never rejected, and a listing that names women more often than men is kept.
pub fn is_mens_product(title: &str, description: &str, lexicon: &Lexicon) -> bool {
	let normalized = text::normalize(&format!("{title} {description}"));

	if lexicon.unisex_markers.iter().any(|marker| text::contains_word(&normalized, marker)) {
		return false;
	}

	let mens = marker_count(&normalized, lexicon.mens_markers);

	if mens == 0 {
		return false;
	}

	marker_count(&normalized, lexicon.womens_markers) <= mens
}

/// Raw fabric, home decor and craft supplies that share vocabulary with clothing.
pub fn is_non_apparel(title: &str, description: &str, lexicon: &Lexicon) -> bool {
	let normalized = text::normalize(&format!("{title} {description}"));

	if text::contains_any_term(&normalized, lexicon.non_apparel_markers) {
		return true;
	}

	let has_dimensions = DIMENSIONS.as_ref().map(|re| re.is_match(&normalized)).unwrap_or(false);

	has_dimensions && text::contains_any_term(&normalized, lexicon.non_apparel_materials)
}

fn marker_count(normalized: &str, markers: &[&str]) -> usize {
	markers.iter().map(|marker| text::count_word(normalized, marker)).sum()
}
