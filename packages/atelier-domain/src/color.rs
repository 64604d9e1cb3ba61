use crate::{Lexicon, text};

/// First color named in the query. Multi-word colors win over their single-word parts.
pub fn extract_color(query: &str, lexicon: &Lexicon) -> Option<&'static str> {
	let normalized = text::normalize(query);

	lexicon.colors.iter().copied().find(|color| text::contains_word(&normalized, color))
}

/// Color and its synonyms, the set of spellings a product may use for it.
pub fn color_terms(color: &str, lexicon: &Lexicon) -> Vec<String> {
	let color = text::normalize(color.trim());
	let mut terms = vec![color.clone()];

	for synonym in lexicon.color_synonyms_for(&color) {
		if !terms.iter().any(|term| term == synonym) {
			terms.push((*synonym).to_string());
		}
	}

	terms
}

/// Whether a product carries `color`.
///
/// Verified colors are authoritative when present. Otherwise title and description are searched.
pub fn product_matches_color(
	verified_colors: &[String],
	title: &str,
	description: &str,
	color: &str,
	lexicon: &Lexicon,
) -> bool {
	let terms = color_terms(color, lexicon);

	if verified_colors.iter().any(|verified| !verified.trim().is_empty()) {
		return verified_colors.iter().any(|verified| {
			let verified = text::normalize(verified.trim());

			terms.iter().any(|term| verified == *term || text::contains_word(&verified, term))
		});
	}

	let haystack = text::normalize(&format!("{title} {description}"));

	terms.iter().any(|term| text::contains_word(&haystack, term))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn extracts_first_listed_color() {
		let lexicon = Lexicon::builtin();

		assert_eq!(extract_color("red heels", lexicon), Some("red"));
		assert_eq!(extract_color("Navy Blue blazer", lexicon), Some("navy blue"));
		assert_eq!(extract_color("embroidered tunic", lexicon), None);
	}

	#[test]
	fn verified_colors_take_precedence_over_text() {
		let lexicon = Lexicon::builtin();
		let verified = vec!["Blue".to_string()];

		assert!(!product_matches_color(&verified, "Black midi dress", "", "black", lexicon));
		assert!(product_matches_color(&verified, "Midi dress", "", "blue", lexicon));
	}

	#[test]
	fn synonyms_count_as_matches() {
		let lexicon = Lexicon::builtin();

		assert!(product_matches_color(&["noir".to_string()], "Dress", "", "black", lexicon));
		assert!(product_matches_color(&[], "Crimson satin slip", "", "red", lexicon));
		assert!(!product_matches_color(&[], "Shredded denim shorts", "", "red", lexicon));
	}
}
