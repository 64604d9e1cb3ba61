//! The `search` entry point: validation, browse routing and the full semantic pipeline.

use atelier_config::{LlmProviderConfig, Search};
use atelier_domain::browse;

use crate::{
	AtelierService, Error, Result, SearchOptions, SearchResponse,
	executor::ExecutionPlan,
	pipeline::{self, StageContext, VisionSeam},
	ranker::{self, RankParams},
	response,
};

/// Validated request parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paging {
	pub page: u32,
	pub limit: u32,
	pub similarity_threshold: f32,
	pub diversity_factor: f32,
}

impl AtelierService {
	/// Runs one natural-language search and returns the requested page.
	///
	/// Only an unparseable model reply and an unreachable catalog are errors. Every other
	/// collaborator failure narrows or neutralises its own stage.
	pub async fn search(&self, query: &str, options: &SearchOptions) -> Result<SearchResponse> {
		let query = query.trim();
		let paging = validate(query, options, &self.cfg.search)?;
		let settings = self.settings().get().await;
		let browse = browse::detect_browse(query, self.lexicon);

		if let Some(request) = browse.as_ref().filter(|request| request.pure) {
			return self.browse(query, request, paging.page, paging.limit, &settings).await;
		}

		let intent = self.parse_intent(query).await?;
		// Later pages need at least enough pooled candidates to reach them.
		let pool_size = self.cfg.search.pool_size.max(paging.page.saturating_mul(paging.limit));
		let plan = ExecutionPlan {
			query,
			pool_size,
			similarity_threshold: paging.similarity_threshold,
			allow_unsafe_content: options.allow_unsafe_content,
			settings: &settings,
		};
		let per_query = self.execute(&intent.sub_queries, &plan).await?;
		let diversity = &self.cfg.search.diversity;
		let params = RankParams {
			pool_size: pool_size as usize,
			diversity_factor: paging.diversity_factor,
			brand_cap: diversity.brand_cap,
			high_tier: diversity.high_tier,
			mid_tier: diversity.mid_tier,
		};
		let ranked =
			self.with_rng(|rng| ranker::rank(&per_query, &intent.sub_queries, &params, rng));
		let pooled = ranked.len();
		let ctx = StageContext {
			query,
			intent: &intent,
			search: &self.cfg.search,
			lexicon: self.lexicon,
			browse: browse.as_ref(),
			similarity_threshold: paging.similarity_threshold,
			page: paging.page,
			skip_vision: options.skip_vision_reranking,
			user_ratings: &options.user_ratings,
			vision: vision_config(self.cfg.providers.vision.as_ref())
				.map(|cfg| VisionSeam { provider: self.providers.vision.as_ref(), cfg }),
			community: self.stores.community.as_ref(),
		};
		let (products, report) = pipeline::run(&pipeline::default_stages(), &ctx, ranked).await;
		let warning = response::quality_warning(
			&products,
			&report,
			&intent,
			browse.is_some(),
			&self.cfg.search.quality,
		);

		tracing::info!(
			query,
			sub_queries = intent.sub_queries.len(),
			pooled,
			results = products.len(),
			page = paging.page,
			warned = warning.is_some(),
			"Search completed."
		);

		Ok(response::assemble(query, intent, products, paging.page, paging.limit, warning))
	}
}

/// Checks the query length and normalises page, limit and the tuning overrides.
pub fn validate(query: &str, options: &SearchOptions, search: &Search) -> Result<Paging> {
	let min_chars = search.min_query_chars as usize;

	if query.trim().chars().count() < min_chars {
		return Err(Error::InvalidRequest {
			message: format!("Query must be at least {min_chars} characters."),
		});
	}

	let similarity_threshold = unit_override(
		"similarity_threshold",
		options.similarity_threshold,
		search.similarity_threshold,
	)?;
	let diversity_factor =
		unit_override("diversity_factor", options.diversity_factor, search.diversity_factor)?;
	let max_limit = search.max_limit.max(1);

	Ok(Paging {
		page: options.page.unwrap_or(1).max(1),
		limit: options.limit.unwrap_or(search.default_limit).clamp(1, max_limit),
		similarity_threshold,
		diversity_factor,
	})
}

fn unit_override(name: &str, value: Option<f32>, default: f32) -> Result<f32> {
	match value {
		None => Ok(default),
		Some(value) if value.is_finite() && (0.0..=1.0).contains(&value) => Ok(value),
		Some(_) =>
			Err(Error::InvalidRequest { message: format!("{name} must be between 0 and 1.") }),
	}
}

pub(crate) fn vision_config(cfg: Option<&LlmProviderConfig>) -> Option<&LlmProviderConfig> {
	cfg.filter(|cfg| !cfg.api_key.trim().is_empty())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn short_queries_are_rejected() {
		let search = Search::default();
		let err = validate("  ab ", &SearchOptions::default(), &search).unwrap_err();

		assert_eq!(err.to_string(), "Invalid request: Query must be at least 3 characters.");
	}

	#[test]
	fn paging_is_clamped() {
		let search = Search::default();
		let options = SearchOptions { limit: Some(500), page: Some(0), ..SearchOptions::default() };
		let paging = validate("dresses", &options, &search).expect("valid");

		assert_eq!(paging.limit, search.max_limit);
		assert_eq!(paging.page, 1);

		let options = SearchOptions { limit: Some(0), ..SearchOptions::default() };

		assert_eq!(validate("dresses", &options, &search).expect("valid").limit, 1);
		assert_eq!(
			validate("dresses", &SearchOptions::default(), &search).expect("valid").limit,
			search.default_limit
		);
	}

	#[test]
	fn tuning_overrides_must_be_unit_values() {
		let search = Search::default();
		let options = SearchOptions { similarity_threshold: Some(1.5), ..SearchOptions::default() };

		assert!(matches!(
			validate("dresses", &options, &search),
			Err(Error::InvalidRequest { .. })
		));

		let options = SearchOptions { diversity_factor: Some(0.0), ..SearchOptions::default() };

		assert_eq!(validate("dresses", &options, &search).expect("valid").diversity_factor, 0.0);
	}
}
