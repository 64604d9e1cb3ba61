use atelier_domain::{
	Lexicon,
	category::{self, CategoryMatch},
};

use crate::{
	BoxFuture, Product,
	pipeline::{Stage, StageContext, StageOutput, category::target_categories},
};

/// Multi-category requests list each category's products together, in the order they were asked
/// for.
pub struct CategoryGrouping;

impl Stage for CategoryGrouping {
	fn name(&self) -> &'static str {
		"category_grouping"
	}

	fn apply<'a>(
		&'a self,
		ctx: &'a StageContext<'a>,
		products: Vec<Product>,
	) -> BoxFuture<'a, StageOutput> {
		Box::pin(async move {
			let targets = target_categories(ctx.intent);

			if targets.len() < 2 {
				return StageOutput::unchanged(products);
			}

			StageOutput::unchanged(group_by_category(products, &targets, ctx.lexicon))
		})
	}
}

/// Buckets each product under the first requested category it matches. Unmatched products trail.
pub fn group_by_category(
	products: Vec<Product>,
	targets: &[&str],
	lexicon: &Lexicon,
) -> Vec<Product> {
	let mut buckets: Vec<Vec<Product>> = vec![Vec::new(); targets.len() + 1];

	for product in products {
		let bucket = targets
			.iter()
			.position(|target| {
				category::classify_title(&product.title, target, lexicon) != CategoryMatch::None
			})
			.unwrap_or(targets.len());

		buckets[bucket].push(product);
	}

	buckets.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::pipeline::testing::{ids, product};

	#[test]
	fn dresses_come_before_necklaces() {
		let products = vec![
			product("x", "Canvas tote", 0.95),
			product("n1", "Gold pendant necklace", 0.9),
			product("d1", "Satin midi dress", 0.8),
			product("n2", "Pearl necklace", 0.7),
			product("d2", "Velvet wrap dress", 0.6),
		];
		let grouped = group_by_category(products, &["dress", "accessories"], Lexicon::builtin());

		assert_eq!(ids(&grouped), vec!["d1", "d2", "n1", "n2", "x"]);
	}
}
