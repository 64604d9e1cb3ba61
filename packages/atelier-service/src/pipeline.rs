//! Ordered post-filter stages applied to the ranked pool.
//!
//! Each stage takes the previous stage's products and returns the narrowed or reordered list along
//! with anything the response assembler needs to judge result quality. Stages never fail: an
//! unavailable collaborator turns its stage into a pass-through.

pub mod browse;
pub mod category;
pub mod color;
pub mod grouping;
pub mod personalization;
pub mod price;
pub mod threshold;
pub mod vision;

use std::collections::HashMap;

use atelier_config::{LlmProviderConfig, Search};
use atelier_domain::{Lexicon, browse::BrowseRequest};

use crate::{BoxFuture, CommunityStatsStore, Product, SearchIntent, VisionProvider};

pub trait Stage
where
	Self: Send + Sync,
{
	fn name(&self) -> &'static str;

	fn apply<'a>(
		&'a self,
		ctx: &'a StageContext<'a>,
		products: Vec<Product>,
	) -> BoxFuture<'a, StageOutput>;
}

/// Everything a stage may read. Nothing in here is mutated by stages.
pub struct StageContext<'a> {
	pub query: &'a str,
	pub intent: &'a SearchIntent,
	pub search: &'a Search,
	pub lexicon: &'a Lexicon,
	/// Set when the query is a category browse that still runs the semantic pipeline.
	pub browse: Option<&'a BrowseRequest>,
	pub similarity_threshold: f32,
	pub page: u32,
	pub skip_vision: bool,
	pub user_ratings: &'a HashMap<String, u8>,
	/// `None` when no vision model is configured.
	pub vision: Option<VisionSeam<'a>>,
	pub community: &'a dyn CommunityStatsStore,
}

#[derive(Clone, Copy)]
pub struct VisionSeam<'a> {
	pub provider: &'a dyn VisionProvider,
	pub cfg: &'a LlmProviderConfig,
}

/// Observations the quality warning is computed from. Stages fill only their own fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QualityReport {
	/// Products carrying the requested color, when a color was requested.
	pub color_matches: Option<usize>,
	/// Candidates before and after the price range filter, when a range was requested.
	pub price_filtered: Option<(usize, usize)>,
	/// Exact or partial category matches, when the intent names a category.
	pub category_matches: Option<usize>,
}
impl QualityReport {
	pub fn absorb(&mut self, other: QualityReport) {
		if other.color_matches.is_some() {
			self.color_matches = other.color_matches;
		}
		if other.price_filtered.is_some() {
			self.price_filtered = other.price_filtered;
		}
		if other.category_matches.is_some() {
			self.category_matches = other.category_matches;
		}
	}
}

#[derive(Debug, Clone)]
pub struct StageOutput {
	pub products: Vec<Product>,
	pub report: QualityReport,
}
impl StageOutput {
	pub fn unchanged(products: Vec<Product>) -> Self {
		Self { products, report: QualityReport::default() }
	}
}

/// The fixed stage order used by every search.
pub fn default_stages() -> Vec<Box<dyn Stage>> {
	vec![
		Box::new(threshold::TieredThreshold),
		Box::new(color::ColorFilter),
		Box::new(category::CategoryFilter),
		Box::new(browse::BrowseExclusion),
		Box::new(price::PriceFilter),
		Box::new(vision::VisionRerank),
		Box::new(personalization::Personalization),
		Box::new(grouping::CategoryGrouping),
	]
}

pub async fn run(
	stages: &[Box<dyn Stage>],
	ctx: &StageContext<'_>,
	mut products: Vec<Product>,
) -> (Vec<Product>, QualityReport) {
	let mut report = QualityReport::default();

	for stage in stages {
		let before = products.len();
		let output = stage.apply(ctx, products).await;

		tracing::debug!(
			stage = stage.name(),
			before,
			after = output.products.len(),
			"Stage applied."
		);

		report.absorb(output.report);

		products = output.products;
	}

	(products, report)
}

#[cfg(test)]
pub(crate) mod testing {
	use std::collections::HashMap;

	use atelier_config::Search;
	use atelier_domain::Lexicon;

	use super::StageContext;
	use crate::{BoxFuture, CommunityStats, CommunityStatsStore, Product, SearchIntent, SubQuery};

	pub(crate) struct NoCommunity;

	impl CommunityStatsStore for NoCommunity {
		fn community_stats<'a>(
			&'a self,
			_: &'a [String],
		) -> BoxFuture<'a, atelier_storage::Result<HashMap<String, CommunityStats>>> {
			Box::pin(async { Ok(HashMap::new()) })
		}
	}

	pub(crate) fn product(id: &str, title: &str, similarity: f32) -> Product {
		Product {
			id: id.to_string(),
			title: title.to_string(),
			description: String::new(),
			brand: format!("Brand {id}"),
			price: Some(100.0),
			currency: "USD".to_string(),
			image_url: format!("https://img.example/{id}.jpg"),
			product_url: String::new(),
			merchant_name: String::new(),
			on_sale: false,
			tags: Vec::new(),
			verified_colors: Vec::new(),
			similarity,
			vision_score: None,
			image_embedding: None,
		}
	}

	pub(crate) fn intent(categories: &[&str]) -> SearchIntent {
		SearchIntent {
			sub_queries: categories
				.iter()
				.enumerate()
				.map(|(idx, category)| SubQuery {
					text: format!("{category} query"),
					category: (*category).to_string(),
					priority: idx as u32 + 1,
					weight: 1.0,
				})
				.collect(),
			..SearchIntent::default()
		}
	}

	pub(crate) fn context<'a>(
		query: &'a str,
		intent: &'a SearchIntent,
		search: &'a Search,
		user_ratings: &'a HashMap<String, u8>,
	) -> StageContext<'a> {
		StageContext {
			query,
			intent,
			search,
			lexicon: Lexicon::builtin(),
			browse: None,
			similarity_threshold: search.similarity_threshold,
			page: 1,
			skip_vision: false,
			user_ratings,
			vision: None,
			community: &NoCommunity,
		}
	}

	pub(crate) fn ids(products: &[Product]) -> Vec<&str> {
		products.iter().map(|product| product.id.as_str()).collect()
	}
}

#[cfg(test)]
mod tests {
	use std::collections::HashMap;

	use atelier_config::Search;

	use super::{testing::*, *};

	#[tokio::test]
	async fn stages_run_in_order_and_collect_reports() {
		let search = Search::default();
		let ratings = HashMap::new();
		let mut intent = intent(&["dress"]);

		intent.color = Some("black".to_string());

		let ctx = context("black dress", &intent, &search, &ratings);
		let mut black = product("black", "Black wrap dress", 0.8);
		let blue = product("blue", "Blue wrap dress", 0.75);
		let bag = product("bag", "Black leather bag", 0.7);

		black.verified_colors = vec!["black".to_string()];

		let (products, report) =
			run(&default_stages(), &ctx, vec![black, blue, bag]).await;

		assert_eq!(ids(&products), vec!["black"]);
		assert_eq!(report.color_matches, Some(2));
		assert_eq!(report.category_matches, Some(1));
		assert_eq!(report.price_filtered, None);
	}
}
