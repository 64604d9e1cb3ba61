use std::sync::LazyLock;

use regex::Regex;

use crate::{Lexicon, text};

const MAX_SIMPLE_WORDS: usize = 4;

// Two or more consecutive capitalised words, e.g. "Eileen Fisher" or "Free People".
static BRAND: LazyLock<Option<Regex>> =
	LazyLock::new(|| Regex::new(r"\b[A-Z][A-Za-z'&.\-]*(?:\s+[A-Z][A-Za-z'&.\-]*)+\b").ok());

/// Short queries with no price, occasion, negation, conjunction or style words.
pub fn is_simple_query(query: &str, lexicon: &Lexicon) -> bool {
	let normalized = text::normalize(query.trim());
	let word_count = normalized.split_whitespace().count();

	if word_count == 0 || word_count > MAX_SIMPLE_WORDS {
		return false;
	}
	if lexicon.complexity_phrases.iter().any(|phrase| phrase_present(&normalized, phrase)) {
		return false;
	}

	!lexicon.complexity_words.iter().any(|word| text::contains_word(&normalized, word))
}

pub fn has_brand_pattern(query: &str) -> bool {
	BRAND.as_ref().map(|re| re.is_match(query)).unwrap_or(false)
}

pub fn attribute_term_count(query: &str, lexicon: &Lexicon) -> usize {
	let normalized = text::normalize(query);

	lexicon.attribute_terms.iter().filter(|term| text::contains_word(&normalized, term)).count()
}

/// Style descriptors a vision model can judge better than text similarity.
pub fn needs_visual_judgement(query: &str, lexicon: &Lexicon) -> bool {
	let normalized = text::normalize(query);

	text::contains_any_term(&normalized, lexicon.vision_keywords)
}

/// First occasion named in the query with the styles it implies.
pub fn infer_occasion(
	query: &str,
	lexicon: &Lexicon,
) -> Option<(&'static str, &'static [&'static str])> {
	let normalized = text::normalize(query);

	lexicon
		.occasion_styles
		.iter()
		.find(|(occasion, _)| text::contains_word(&normalized, occasion))
		.map(|(occasion, styles)| (*occasion, *styles))
}

// Symbols match anywhere; word phrases need boundaries.
fn phrase_present(normalized: &str, phrase: &str) -> bool {
	if phrase.chars().all(|c| !c.is_alphanumeric()) {
		return normalized.contains(phrase);
	}

	text::contains_word(normalized, phrase)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn simple_queries() {
		let lexicon = Lexicon::builtin();

		assert!(is_simple_query("red heels", lexicon));
		assert!(is_simple_query("black leather tote bag", lexicon));
		assert!(is_simple_query("floral shorts", lexicon));
	}

	#[test]
	fn complex_queries() {
		let lexicon = Lexicon::builtin();

		assert!(!is_simple_query("evening gowns under $150", lexicon));
		assert!(!is_simple_query("dress for a wedding", lexicon));
		assert!(!is_simple_query("jeans without rips", lexicon));
		assert!(!is_simple_query("blazer and trousers", lexicon));
		assert!(!is_simple_query("elegant gown", lexicon));
		assert!(!is_simple_query("long flowy boho maxi dress", lexicon));
		assert!(!is_simple_query("   ", lexicon));
	}

	#[test]
	fn brand_pattern_needs_two_capitalised_words() {
		assert!(has_brand_pattern("Eileen Fisher cardigan"));
		assert!(!has_brand_pattern("cashmere cardigan"));
		assert!(!has_brand_pattern("Cashmere cardigan"));
	}

	#[test]
	fn attribute_terms_are_counted() {
		let lexicon = Lexicon::builtin();

		assert_eq!(attribute_term_count("silk satin slip", lexicon), 2);
		assert_eq!(attribute_term_count("boho vibes", lexicon), 0);
	}

	#[test]
	fn occasion_and_vision_triggers() {
		let lexicon = Lexicon::builtin();

		assert_eq!(
			infer_occasion("outfit for brunch", lexicon).map(|(name, _)| name),
			Some("brunch")
		);
		assert!(needs_visual_judgement("sexy black boots", lexicon));
		assert!(!needs_visual_judgement("black boots", lexicon));
	}
}
