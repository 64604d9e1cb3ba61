//! Picks pure vector retrieval or a vector and full-text blend per sub-query.

use atelier_domain::{Lexicon, query};

/// Attribute words at or above this count make a query specific enough for full-text ranking.
const HYBRID_ATTRIBUTE_TERMS: usize = 2;
const BRAND_WEIGHTS: (f32, f32) = (0.35, 0.65);
const ATTRIBUTE_WEIGHTS: (f32, f32) = (0.5, 0.5);
const PURE_VECTOR: ModeDecision =
	ModeDecision { use_hybrid: false, vector_weight: 1.0, text_weight: 0.0 };

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
	Auto,
	Hybrid,
	Vector,
}
impl SearchMode {
	/// Unknown values fall back to `Auto`.
	pub fn from_setting(value: &str) -> Self {
		match value.trim().to_ascii_lowercase().as_str() {
			"hybrid" => Self::Hybrid,
			"vector" => Self::Vector,
			_ => Self::Auto,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModeDecision {
	pub use_hybrid: bool,
	pub vector_weight: f32,
	pub text_weight: f32,
}

/// Configured weights apply only in `Hybrid` mode. `Auto` leans lexical for brand names, splits
/// evenly for attribute-dense text and otherwise stays purely semantic.
pub fn classify(
	text: &str,
	mode: SearchMode,
	vector_weight: f32,
	text_weight: f32,
	lexicon: &Lexicon,
) -> ModeDecision {
	let (vector_weight, text_weight) = match mode {
		SearchMode::Vector => return PURE_VECTOR,
		SearchMode::Hybrid => (vector_weight, text_weight),
		SearchMode::Auto if query::has_brand_pattern(text) => BRAND_WEIGHTS,
		SearchMode::Auto if query::attribute_term_count(text, lexicon) >= HYBRID_ATTRIBUTE_TERMS =>
			ATTRIBUTE_WEIGHTS,
		SearchMode::Auto => return PURE_VECTOR,
	};

	ModeDecision { use_hybrid: true, vector_weight, text_weight }
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn brand_names_go_hybrid() {
		let decision =
			classify("Eileen Fisher cardigan", SearchMode::Auto, 0.7, 0.3, Lexicon::builtin());

		assert!(decision.use_hybrid);
		assert!(decision.text_weight > decision.vector_weight);
	}

	#[test]
	fn attribute_dense_text_splits_evenly() {
		let decision =
			classify("suede lace-up ankle boots", SearchMode::Auto, 0.7, 0.3, Lexicon::builtin());

		assert_eq!(
			decision,
			ModeDecision { use_hybrid: true, vector_weight: 0.5, text_weight: 0.5 }
		);
	}

	#[test]
	fn plain_descriptions_stay_vector() {
		let decision = classify("red heels", SearchMode::Auto, 0.7, 0.3, Lexicon::builtin());

		assert_eq!(decision, PURE_VECTOR);
	}

	#[test]
	fn forced_modes_override_heuristics() {
		let lexicon = Lexicon::builtin();

		assert_eq!(
			classify("red heels", SearchMode::Hybrid, 0.6, 0.4, lexicon),
			ModeDecision { use_hybrid: true, vector_weight: 0.6, text_weight: 0.4 }
		);
		assert_eq!(
			classify("Eileen Fisher cardigan", SearchMode::Vector, 0.6, 0.4, lexicon),
			PURE_VECTOR
		);
	}

	#[test]
	fn unknown_setting_is_auto() {
		assert_eq!(SearchMode::from_setting("HYBRID"), SearchMode::Hybrid);
		assert_eq!(SearchMode::from_setting("semantic"), SearchMode::Auto);
	}
}
