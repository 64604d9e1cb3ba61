use serde::{Deserialize, Serialize};

use crate::{Lexicon, lexicon, text};

/// How well a product title fits a requested category.
///
/// Variants are ordered best first so sorting by `CategoryMatch` puts exact matches ahead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryMatch {
	Exact,
	/// A set or bundle that includes the item.
	Partial,
	None,
}

/// Category of the first fast-path keyword found in the query, with the keyword itself.
pub fn detect_category(query: &str, lexicon: &Lexicon) -> Option<(&'static str, &'static str)> {
	let normalized = text::normalize(query);

	for (category, keywords) in lexicon.category_keywords {
		for keyword in *keywords {
			if text::contains_term(&normalized, keyword) {
				return Some((category, keyword));
			}
		}
	}

	None
}

/// Maps a free-form category label (e.g. "heels", "Dresses") onto the taxonomy, or `"all"`.
pub fn canonical_category(label: &str, lexicon: &Lexicon) -> &'static str {
	let normalized = text::normalize(label.trim());

	if let Some(known) = lexicon::CATEGORIES.iter().find(|category| **category == normalized) {
		return known;
	}

	detect_category(&normalized, lexicon)
		.map(|(category, _)| category)
		.unwrap_or(lexicon::ANY_CATEGORY)
}

/// Terms that identify `category` in a title. Unknown categories match on their own name.
pub fn category_terms(category: &str, lexicon: &Lexicon) -> Vec<String> {
	let normalized = text::normalize(category.trim());
	let terms = lexicon.category_terms_for(&normalized);

	if terms.is_empty() {
		return vec![normalized];
	}

	terms.iter().map(|term| (*term).to_string()).collect()
}

pub fn classify_title(title: &str, category: &str, lexicon: &Lexicon) -> CategoryMatch {
	let mut normalized = text::normalize(title);

	// Blank out phrases where a category term names something else.
	for context in lexicon.unwanted_contexts_for(&text::normalize(category.trim())) {
		if normalized.contains(context) {
			normalized = normalized.replace(context, " ");
		}
	}

	let terms = category_terms(category, lexicon);

	if !terms.iter().any(|term| text::contains_term(&normalized, term)) {
		return CategoryMatch::None;
	}
	if lexicon.set_markers.iter().any(|marker| text::contains_word(&normalized, marker)) {
		return CategoryMatch::Partial;
	}

	CategoryMatch::Exact
}

/// Best match of a title across several requested categories.
pub fn classify_title_any(title: &str, categories: &[&str], lexicon: &Lexicon) -> CategoryMatch {
	categories
		.iter()
		.map(|category| classify_title(title, category, lexicon))
		.min()
		.unwrap_or(CategoryMatch::None)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn first_keyword_wins() {
		let lexicon = Lexicon::builtin();

		assert_eq!(detect_category("red heels", lexicon), Some(("shoes", "heels")));
		assert_eq!(detect_category("silk dress and clutch", lexicon), Some(("dress", "dress")));
		assert_eq!(detect_category("something sparkly", lexicon), None);
	}

	#[test]
	fn canonical_category_falls_back_to_all() {
		let lexicon = Lexicon::builtin();

		assert_eq!(canonical_category("Dresses", lexicon), "dress");
		assert_eq!(canonical_category("shoes", lexicon), "shoes");
		assert_eq!(canonical_category("loafers", lexicon), "shoes");
		assert_eq!(canonical_category("homeware", lexicon), "all");
	}

	#[test]
	fn classifies_exact_partial_and_none() {
		let lexicon = Lexicon::builtin();

		assert_eq!(classify_title("Satin Slip Dress", "dress", lexicon), CategoryMatch::Exact);
		assert_eq!(
			classify_title("Crop Top and Skirt Two-Piece Set", "bottoms", lexicon),
			CategoryMatch::Partial
		);
		assert_eq!(
			classify_title("Over-the-Door Shoe Organizer", "shoes", lexicon),
			CategoryMatch::None
		);
		assert_eq!(
			classify_title("Wool Dress Form Mannequin", "dress", lexicon),
			CategoryMatch::None
		);
	}

	#[test]
	fn best_match_across_categories() {
		let lexicon = Lexicon::builtin();

		assert_eq!(
			classify_title_any("Pearl Pendant Necklace", &["dress", "necklace"], lexicon),
			CategoryMatch::Exact
		);
	}
}
