use atelier_domain::{
	Lexicon,
	category::{self, CategoryMatch},
	lexicon::ANY_CATEGORY,
};

use crate::{
	BoxFuture, Product, SearchIntent,
	pipeline::{QualityReport, Stage, StageContext, StageOutput},
};

/// Orders exact matches ahead of sets and drops unrelated items when anything matched.
pub struct CategoryFilter;

impl Stage for CategoryFilter {
	fn name(&self) -> &'static str {
		"category"
	}

	fn apply<'a>(
		&'a self,
		ctx: &'a StageContext<'a>,
		products: Vec<Product>,
	) -> BoxFuture<'a, StageOutput> {
		Box::pin(async move {
			let targets = target_categories(ctx.intent);

			if targets.is_empty() {
				return StageOutput::unchanged(products);
			}

			let (products, matches) = filter_by_category(products, &targets, ctx.lexicon);

			let report =
				QualityReport { category_matches: Some(matches), ..QualityReport::default() };

			StageOutput { products, report }
		})
	}
}

/// Distinct requested categories in sub-query order, without `"all"`.
pub fn target_categories(intent: &SearchIntent) -> Vec<&str> {
	let mut targets: Vec<&str> = Vec::new();

	for sub_query in &intent.sub_queries {
		let category = sub_query.category.as_str();

		if category != ANY_CATEGORY && !targets.contains(&category) {
			targets.push(category);
		}
	}

	targets
}

/// Sorts exact, then partial, then unrelated, by similarity within each group. Unrelated products
/// are dropped when at least one product matched. Returns the number of matches.
pub fn filter_by_category(
	products: Vec<Product>,
	targets: &[&str],
	lexicon: &Lexicon,
) -> (Vec<Product>, usize) {
	let mut classified: Vec<(CategoryMatch, Product)> = products
		.into_iter()
		.map(|product| (category::classify_title_any(&product.title, targets, lexicon), product))
		.collect();

	classified.sort_by(|(lhs_match, lhs), (rhs_match, rhs)| {
		lhs_match.cmp(rhs_match).then(rhs.similarity.total_cmp(&lhs.similarity))
	});

	let matches = classified.iter().filter(|(kind, _)| *kind != CategoryMatch::None).count();

	if matches > 0 {
		classified.retain(|(kind, _)| *kind != CategoryMatch::None);
	}

	(classified.into_iter().map(|(_, product)| product).collect(), matches)
}
