use crate::{Lexicon, category, lexicon, text};

/// A "show me the whole category" request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowseRequest {
	/// Browsed category, or `None` for the whole catalog.
	pub category: Option<&'static str>,
	/// Title terms that select the slice. Empty when browsing everything.
	pub terms: Vec<String>,
	/// No constraint besides the category: the semantic pipeline can be bypassed.
	pub pure: bool,
}

pub fn detect_browse(query: &str, lexicon: &Lexicon) -> Option<BrowseRequest> {
	let mut normalized = text::normalize(query);
	let mut phrase_hit = false;

	for phrase in lexicon.browse_phrases {
		if text::contains_word(&normalized, phrase) {
			phrase_hit = true;
			normalized = normalized.replace(phrase, " ");
		}
	}

	let tokens: Vec<&str> = text::words(&normalized)
		.filter(|word| !lexicon.browse_fillers.contains(word))
		.collect();
	let mut browsed = None;
	let mut has_other = false;

	for token in &tokens {
		match nav_category(token, lexicon) {
			Some(found) if browsed.is_none() => browsed = Some(found),
			Some(_) => {},
			None => has_other = true,
		}
	}

	if !phrase_hit && !(tokens.len() == 1 && browsed.is_some()) {
		return None;
	}

	let (category, terms) = match browsed {
		Some((category, terms)) => (Some(category), terms),
		None => (None, Vec::new()),
	};

	Some(BrowseRequest { category, terms, pure: !has_other })
}

/// Whether a browse of `category` should hide a product with this title.
pub fn excluded_from_browse(title: &str, category: &str, lexicon: &Lexicon) -> bool {
	let normalized = text::normalize(title);

	text::contains_any_term(&normalized, lexicon.cross_category_exclusions_for(category))
}

// A category name browses the whole category. A single keyword ("loafers") browses that item only.
fn nav_category(token: &str, lexicon: &Lexicon) -> Option<(&'static str, Vec<String>)> {
	for name in lexicon::CATEGORIES {
		if text::contains_term(token, name) {
			return Some((name, category::category_terms(name, lexicon)));
		}
	}
	for (name, keywords) in lexicon.category_keywords {
		if let Some(keyword) = keywords.iter().find(|keyword| text::contains_term(token, keyword)) {
			return Some((name, vec![(*keyword).to_string()]));
		}
	}

	None
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn single_nav_word_is_a_pure_browse() {
		let request = detect_browse("Dresses", Lexicon::builtin()).expect("browse");

		assert_eq!(request.category, Some("dress"));
		assert!(request.pure);
		assert!(request.terms.iter().any(|term| term == "gown"));
	}

	#[test]
	fn show_me_a_category_is_a_pure_browse() {
		let lexicon = Lexicon::builtin();
		let dresses = detect_browse("show me dresses", lexicon).expect("browse");
		let shoes = detect_browse("Show shoes", lexicon).expect("browse");

		assert_eq!(dresses.category, Some("dress"));
		assert!(dresses.pure);
		assert_eq!(shoes.category, Some("shoes"));
		assert!(shoes.pure);
		assert!(!detect_browse("show me red heels", lexicon).expect("browse").pure);
	}

	#[test]
	fn browse_phrase_without_category_browses_everything() {
		let request = detect_browse("show me everything", Lexicon::builtin()).expect("browse");

		assert_eq!(request.category, None);
		assert!(request.terms.is_empty());
		assert!(request.pure);
	}

	#[test]
	fn browse_with_constraints_is_not_pure() {
		let request = detect_browse("browse red dresses", Lexicon::builtin()).expect("browse");

		assert_eq!(request.category, Some("dress"));
		assert!(!request.pure);
	}

	#[test]
	fn described_items_are_not_browses() {
		assert_eq!(detect_browse("red heels", Lexicon::builtin()), None);
		assert_eq!(detect_browse("black dress for a garden party", Lexicon::builtin()), None);
	}

	#[test]
	fn dress_browse_excludes_jewelry() {
		let lexicon = Lexicon::builtin();

		assert!(excluded_from_browse("Layered Gold Necklace", "dress", lexicon));
		assert!(!excluded_from_browse("Silk Wrap Dress", "dress", lexicon));
	}
}
