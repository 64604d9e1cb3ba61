//! Word-boundary matching over lowercased text.
//!
//! Terms may contain spaces or hyphens; a boundary is any character that is not alphanumeric.

/// Lowercases and folds typographic apostrophes so `men’s` and `men's` compare equal.
pub fn normalize(text: &str) -> String {
	text.to_lowercase().replace(['\u{2019}', '\u{2018}'], "'")
}

/// True when `term` occurs in `haystack` with non-alphanumeric characters (or the ends) on both
/// sides.
///
/// Both arguments are expected to be normalized.
pub fn contains_word(haystack: &str, term: &str) -> bool {
	count_word(haystack, term) > 0
}

pub fn count_word(haystack: &str, term: &str) -> usize {
	if term.is_empty() {
		return 0;
	}

	haystack
		.match_indices(term)
		.filter(|(start, _)| {
			is_left_boundary(haystack, *start) && is_boundary_at(haystack, start + term.len())
		})
		.count()
}

/// Like [`contains_word`], but also accepts an `s` or `es` plural suffix ("dress" matches
/// "dresses").
pub fn contains_term(haystack: &str, term: &str) -> bool {
	if term.is_empty() {
		return false;
	}

	haystack.match_indices(term).any(|(start, _)| {
		if !is_left_boundary(haystack, start) {
			return false;
		}

		let end = start + term.len();

		is_boundary_at(haystack, end)
			|| (haystack[end..].starts_with('s') && is_boundary_at(haystack, end + 1))
			|| (haystack[end..].starts_with("es") && is_boundary_at(haystack, end + 2))
	})
}

pub fn contains_any_term(haystack: &str, terms: &[&str]) -> bool {
	terms.iter().any(|term| contains_term(haystack, term))
}

/// Splits on anything that is not alphanumeric, an apostrophe or a hyphen.
pub fn words(text: &str) -> impl Iterator<Item = &str> {
	text.split(|c: char| !(c.is_alphanumeric() || c == '\'' || c == '-')).filter(|w| !w.is_empty())
}

fn is_left_boundary(haystack: &str, start: usize) -> bool {
	haystack[..start].chars().next_back().is_none_or(|c| !c.is_alphanumeric())
}

fn is_boundary_at(haystack: &str, index: usize) -> bool {
	haystack.get(index..).and_then(|rest| rest.chars().next()).is_none_or(|c| !c.is_alphanumeric())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn word_matching_respects_boundaries() {
		assert!(contains_word("women's wrap dress", "women's"));
		assert!(!contains_word("women's wrap dress", "men"));
		assert!(!contains_word("embroidered top", "red"));
		assert!(contains_word("red, satin", "red"));
		assert_eq!(count_word("men's shirt for men", "men"), 2);
	}

	#[test]
	fn term_matching_accepts_plurals() {
		assert!(contains_term("floral dresses", "dress"));
		assert!(contains_term("strappy heels", "heel"));
		assert!(!contains_term("dressy top", "dress"));
		assert!(!contains_term("laptop sleeve", "top"));
	}

	#[test]
	fn normalize_folds_curly_apostrophes() {
		assert_eq!(normalize("Men\u{2019}s Boots"), "men's boots");
	}

	#[test]
	fn words_keep_hyphens_and_apostrophes() {
		let split: Vec<_> = words("off-shoulder, women's top!").collect();

		assert_eq!(split, vec!["off-shoulder", "women's", "top"]);
	}
}
