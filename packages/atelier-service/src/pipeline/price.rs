use crate::{
	BoxFuture, Product,
	pipeline::{QualityReport, Stage, StageContext, StageOutput},
};

/// Drops products outside the requested price range. Unknown prices fail a bounded range.
pub struct PriceFilter;

impl Stage for PriceFilter {
	fn name(&self) -> &'static str {
		"price_range"
	}

	fn apply<'a>(
		&'a self,
		ctx: &'a StageContext<'a>,
		mut products: Vec<Product>,
	) -> BoxFuture<'a, StageOutput> {
		Box::pin(async move {
			let Some(range) = ctx.intent.price_range.filter(|range| !range.is_unbounded()) else {
				return StageOutput::unchanged(products);
			};
			let before = products.len();

			products.retain(|product| range.contains(product.price));

			let report = QualityReport {
				price_filtered: Some((before, products.len())),
				..QualityReport::default()
			};

			StageOutput { products, report }
		})
	}
}
