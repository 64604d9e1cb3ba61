use atelier_domain::{Lexicon, color};

use crate::{
	BoxFuture, Product,
	pipeline::{QualityReport, Stage, StageContext, StageOutput},
};

/// Strict color filter. When nothing carries the color the set is left alone and the miss is
/// reported.
pub struct ColorFilter;

impl Stage for ColorFilter {
	fn name(&self) -> &'static str {
		"color"
	}

	fn apply<'a>(
		&'a self,
		ctx: &'a StageContext<'a>,
		products: Vec<Product>,
	) -> BoxFuture<'a, StageOutput> {
		Box::pin(async move {
			let Some(color) = ctx.intent.color.as_deref() else {
				return StageOutput::unchanged(products);
			};
			let (products, matches) = filter_by_color(products, color, ctx.lexicon);

			if matches == 0 {
				tracing::info!(color, "No candidates carry the requested color. Keeping all.");
			}

			StageOutput {
				products,
				report: QualityReport { color_matches: Some(matches), ..QualityReport::default() },
			}
		})
	}
}

/// Returns the color matches in their existing order, or the untouched input when there are none.
pub fn filter_by_color(
	products: Vec<Product>,
	color: &str,
	lexicon: &Lexicon,
) -> (Vec<Product>, usize) {
	let (matched, rest): (Vec<Product>, Vec<Product>) = products.into_iter().partition(|product| {
		color::product_matches_color(
			&product.verified_colors,
			&product.title,
			&product.description,
			color,
			lexicon,
		)
	});

	if matched.is_empty() {
		return (rest, 0);
	}

	let count = matched.len();

	(matched, count)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::pipeline::testing::{ids, product};

	#[test]
	fn verified_colors_outrank_title_words() {
		let mut noir = product("noir", "Evening dress", 0.5);
		let mut mislabeled = product("mislabeled", "Black dress", 0.9);
		let blue = product("blue", "Blue dress", 0.8);

		noir.verified_colors = vec!["Noir".to_string()];
		mislabeled.verified_colors = vec!["navy".to_string()];

		let (kept, matches) =
			filter_by_color(vec![mislabeled, blue, noir], "black", Lexicon::builtin());

		assert_eq!(ids(&kept), vec!["noir"]);
		assert_eq!(matches, 1);
	}

	#[test]
	fn no_matches_keeps_everything() {
		let products = vec![product("a", "Blue dress", 0.8), product("b", "Green dress", 0.7)];
		let (kept, matches) = filter_by_color(products, "red", Lexicon::builtin());

		assert_eq!(ids(&kept), vec!["a", "b"]);
		assert_eq!(matches, 0);
	}
}
