use atelier_domain::browse;

use crate::{
	BoxFuture, Product,
	pipeline::{Stage, StageContext, StageOutput},
};

/// For category browsing, drops titles that name a different kind of product.
pub struct BrowseExclusion;

impl Stage for BrowseExclusion {
	fn name(&self) -> &'static str {
		"browse_exclusion"
	}

	fn apply<'a>(
		&'a self,
		ctx: &'a StageContext<'a>,
		mut products: Vec<Product>,
	) -> BoxFuture<'a, StageOutput> {
		Box::pin(async move {
			if let Some(category) = ctx.browse.and_then(|request| request.category) {
				products.retain(|product| {
					!browse::excluded_from_browse(&product.title, category, ctx.lexicon)
				});
			}

			StageOutput::unchanged(products)
		})
	}
}

#[cfg(test)]
mod tests {
	use std::collections::HashMap;

	use atelier_config::Search;
	use atelier_domain::browse::BrowseRequest;

	use super::*;
	use crate::pipeline::testing::{context, ids, intent, product};

	#[tokio::test]
	async fn dress_browse_hides_jewelry() {
		let search = Search::default();
		let ratings = HashMap::new();
		let intent = intent(&["dress"]);
		let request = BrowseRequest {
			category: Some("dress"),
			terms: vec!["dress".to_string()],
			pure: false,
		};
		let mut ctx = context("show me all dresses under $100", &intent, &search, &ratings);

		ctx.browse = Some(&request);

		let products = vec![
			product("dress", "Tiered maxi dress", 0.6),
			product("necklace", "Dress necklace", 0.6),
		];
		let output = BrowseExclusion.apply(&ctx, products.clone()).await;

		assert_eq!(ids(&output.products), vec!["dress"]);

		ctx.browse = None;

		assert_eq!(BrowseExclusion.apply(&ctx, products).await.products.len(), 2);
	}
}
