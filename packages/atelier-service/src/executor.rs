//! Runs every sub-query against the catalog concurrently and cleans each candidate list.

use std::collections::HashMap;

use futures::future::join_all;

use atelier_config::{EmbeddingProviderConfig, QualityFilterSettings, Search};
use atelier_domain::{Lexicon, category, lexicon::ANY_CATEGORY, safety, text};
use atelier_storage::catalog::{LexicalQuery, VectorFilters};

use crate::{
	AtelierService, Error, Product, Result, SubQuery,
	mode::{self, SearchMode},
};

/// Candidates per sub-query text, each list best first.
pub type SubQueryResults = HashMap<String, Vec<Product>>;

const MIN_FALLBACK_TERM_CHARS: usize = 3;

#[derive(Debug, Clone, Copy)]
pub struct ExecutionPlan<'a> {
	/// The shopper's original query. It decides whether explicit items may pass.
	pub query: &'a str,
	pub pool_size: u32,
	pub similarity_threshold: f32,
	pub allow_unsafe_content: bool,
	pub settings: &'a QualityFilterSettings,
}

/// Per-candidate rules applied to every retrieved list before ranking.
#[derive(Debug, Clone, Default)]
pub struct CandidateFilters {
	pub allow_explicit: bool,
	pub exclude_mens: bool,
	pub exclude_non_apparel: bool,
	/// Known prices below this are dropped.
	pub price_floor: Option<f64>,
	pub similarity_threshold: f32,
	/// Lowercased merchant name that must clear `similarity_threshold + low_trust_penalty`.
	pub low_trust_merchant: Option<String>,
	pub low_trust_penalty: f32,
}

struct Retrieved {
	products: Vec<Product>,
	/// Neither the embedding provider nor text search answered.
	unreachable: bool,
}

impl AtelierService {
	/// Retrieves and filters candidates for every sub-query in parallel.
	///
	/// A failing sub-query contributes an empty list. The search only fails when no sub-query could
	/// reach either semantic or text retrieval.
	pub async fn execute(
		&self,
		sub_queries: &[SubQuery],
		plan: &ExecutionPlan<'_>,
	) -> Result<SubQueryResults> {
		let runs = sub_queries.iter().map(|sub_query| self.run_sub_query(sub_query, plan));
		let outcomes = join_all(runs).await;

		if !outcomes.is_empty() && outcomes.iter().all(|(_, retrieved)| retrieved.unreachable) {
			tracing::error!(
				query = plan.query,
				"Embedding and text retrieval are both unreachable."
			);

			return Err(Error::Unavailable {
				message: "Embedding provider and text search both failed for every sub-query."
					.to_string(),
			});
		}

		let mut results = SubQueryResults::with_capacity(outcomes.len());

		for (text, retrieved) in outcomes {
			results.entry(text).or_default().extend(retrieved.products);
		}

		Ok(results)
	}

	async fn run_sub_query(
		&self,
		sub_query: &SubQuery,
		plan: &ExecutionPlan<'_>,
	) -> (String, Retrieved) {
		let limit = fetch_limit(plan.pool_size, sub_query.weight, &self.cfg.search);
		// Started alongside retrieval so the encoder latency overlaps the catalog round trip.
		let (image_query, retrieved) = tokio::join!(
			self.image_query_embedding(&sub_query.text),
			self.retrieve(sub_query, limit, plan)
		);
		let filters = self.candidate_filters(plan);
		let mut products = filter_candidates(retrieved.products, &filters, self.lexicon);

		if let Some(image_query) = image_query {
			blend_image_similarity(
				&mut products,
				&image_query,
				self.cfg.search.clip_text_weight,
				self.cfg.search.clip_image_weight,
			);
		}

		tracing::debug!(
			sub_query = %sub_query.text,
			limit,
			candidates = products.len(),
			"Sub-query retrieved."
		);

		(sub_query.text.clone(), Retrieved { products, unreachable: retrieved.unreachable })
	}

	async fn retrieve(
		&self,
		sub_query: &SubQuery,
		limit: u32,
		plan: &ExecutionPlan<'_>,
	) -> Retrieved {
		let texts = std::slice::from_ref(&sub_query.text);
		let embedded = self.providers.embedding.embed(&self.cfg.providers.embedding, texts).await;
		let embedding = match embedded {
			Ok(vectors) => vectors.into_iter().next(),
			Err(err) => {
				tracing::warn!(
					sub_query = %sub_query.text,
					error = %err,
					"Embedding failed. Falling back to text search."
				);

				None
			},
		};
		let Some(embedding) = embedding else {
			return self.lexical_fallback(sub_query, limit, plan).await;
		};
		let settings = plan.settings;
		let decision = mode::classify(
			&sub_query.text,
			SearchMode::from_setting(&settings.search_mode),
			settings.hybrid_vector_weight,
			settings.hybrid_text_weight,
			self.lexicon,
		);
		let catalog = &self.stores.catalog;
		let result = if decision.use_hybrid {
			catalog
				.hybrid_search(
					&embedding,
					&sub_query.text,
					limit,
					decision.vector_weight,
					decision.text_weight,
				)
				.await
		} else {
			let filters = VectorFilters { min_price: price_floor(settings) };

			catalog.vector_search(&embedding, limit, &filters).await
		};

		match result {
			Ok(products) => Retrieved { products, unreachable: false },
			Err(err) => {
				tracing::warn!(
					sub_query = %sub_query.text,
					hybrid = decision.use_hybrid,
					error = %err,
					"Catalog retrieval failed. Sub-query contributes no candidates."
				);

				Retrieved { products: Vec::new(), unreachable: false }
			},
		}
	}

	// Word-boundary title search scored by how many query words each product carries.
	async fn lexical_fallback(
		&self,
		sub_query: &SubQuery,
		limit: u32,
		plan: &ExecutionPlan<'_>,
	) -> Retrieved {
		let words = query_words(&sub_query.text);
		let include_terms = if sub_query.category == ANY_CATEGORY {
			words.clone()
		} else {
			category::category_terms(&sub_query.category, self.lexicon)
		};
		let query = LexicalQuery {
			include_terms,
			min_price: price_floor(plan.settings),
			limit: i64::from(limit),
			..LexicalQuery::default()
		};

		match self.stores.catalog.lexical_search(&query).await {
			Ok(page) => {
				let mut products = page.products;

				for product in &mut products {
					product.similarity =
						word_overlap(&words, &format!("{} {}", product.title, product.description));
				}

				products.sort_by(|lhs, rhs| rhs.similarity.total_cmp(&lhs.similarity));

				Retrieved { products, unreachable: false }
			},
			Err(err) => {
				tracing::warn!(
					sub_query = %sub_query.text,
					error = %err,
					"Text search fallback failed."
				);

				Retrieved { products: Vec::new(), unreachable: true }
			},
		}
	}

	async fn image_query_embedding(&self, text: &str) -> Option<Vec<f32>> {
		let cfg = image_embedding_config(self.cfg.providers.image_embedding.as_ref())?;

		match self.providers.image_embedding.embed_text(cfg, text).await {
			Ok(vector) => Some(vector),
			Err(err) => {
				tracing::warn!(
					sub_query = text,
					error = %err,
					"Image-space embedding failed. Using text similarity only."
				);

				None
			},
		}
	}

	fn candidate_filters(&self, plan: &ExecutionPlan<'_>) -> CandidateFilters {
		let search = &self.cfg.search;

		CandidateFilters {
			allow_explicit: plan.allow_unsafe_content
				|| safety::query_signals_explicit(plan.query, self.lexicon),
			exclude_mens: plan.settings.enable_mens_filter,
			exclude_non_apparel: plan.settings.enable_non_apparel_filter,
			price_floor: price_floor(plan.settings),
			similarity_threshold: plan.similarity_threshold,
			low_trust_merchant: search
				.low_trust_merchant
				.as_deref()
				.map(|merchant| merchant.trim().to_lowercase())
				.filter(|merchant| !merchant.is_empty()),
			low_trust_penalty: search.low_trust_penalty,
		}
	}
}

/// `min(ceil(pool × weight × multiplier), max_fetch_per_query)`, at least 1.
pub fn fetch_limit(pool_size: u32, weight: f32, search: &Search) -> u32 {
	let wanted = (pool_size as f32 * weight * search.fetch_multiplier).ceil();

	if !wanted.is_finite() || wanted < 1.0 {
		return 1;
	}

	(wanted as u32).clamp(1, search.max_fetch_per_query.max(1))
}

/// Safety, gender, non-apparel, price floor and similarity bar, in that order.
pub fn filter_candidates(
	products: Vec<Product>,
	filters: &CandidateFilters,
	lexicon: &Lexicon,
) -> Vec<Product> {
	products
		.into_iter()
		.filter(|product| {
			let (title, description) = (product.title.as_str(), product.description.as_str());

			if !filters.allow_explicit && safety::is_explicit(title, description, lexicon) {
				return false;
			}
			if filters.exclude_mens && safety::is_mens_product(title, description, lexicon) {
				return false;
			}
			if filters.exclude_non_apparel && safety::is_non_apparel(title, description, lexicon) {
				return false;
			}
			if let (Some(floor), Some(price)) = (filters.price_floor, product.price)
				&& price < floor
			{
				return false;
			}

			product.similarity >= required_similarity(product, filters)
		})
		.collect()
}

/// Re-scores candidates that carry an image embedding and re-sorts the list.
pub fn blend_image_similarity(
	products: &mut [Product],
	image_query: &[f32],
	text_weight: f32,
	image_weight: f32,
) {
	for product in products.iter_mut() {
		let Some(image) = product.image_embedding.as_deref() else {
			continue;
		};
		let Some(cosine) = cosine_similarity(image_query, image) else {
			continue;
		};

		product.similarity = text_weight * product.similarity + image_weight * cosine;
	}

	products.sort_by(|lhs, rhs| rhs.similarity.total_cmp(&lhs.similarity));
}

/// `None` for empty, mismatched or zero-length vectors.
pub fn cosine_similarity(lhs: &[f32], rhs: &[f32]) -> Option<f32> {
	if lhs.is_empty() || lhs.len() != rhs.len() {
		return None;
	}

	let mut dot = 0.0_f32;
	let mut lhs_norm = 0.0_f32;
	let mut rhs_norm = 0.0_f32;

	for (l, r) in lhs.iter().zip(rhs.iter()) {
		dot += l * r;
		lhs_norm += l * l;
		rhs_norm += r * r;
	}

	if lhs_norm <= f32::EPSILON || rhs_norm <= f32::EPSILON {
		return None;
	}

	Some((dot / (lhs_norm.sqrt() * rhs_norm.sqrt())).clamp(-1.0, 1.0))
}

fn image_embedding_config(
	cfg: Option<&EmbeddingProviderConfig>,
) -> Option<&EmbeddingProviderConfig> {
	cfg.filter(|cfg| !cfg.api_key.trim().is_empty())
}

pub(crate) fn price_floor(settings: &QualityFilterSettings) -> Option<f64> {
	(settings.enable_price_filter && settings.min_price_threshold > 0.0)
		.then_some(settings.min_price_threshold)
}

fn required_similarity(product: &Product, filters: &CandidateFilters) -> f32 {
	let low_trust = filters
		.low_trust_merchant
		.as_deref()
		.is_some_and(|merchant| product.merchant_name.to_lowercase().contains(merchant));

	if low_trust {
		filters.similarity_threshold + filters.low_trust_penalty
	} else {
		filters.similarity_threshold
	}
}

fn query_words(text: &str) -> Vec<String> {
	let normalized = text::normalize(text);
	let mut words: Vec<String> = Vec::new();

	for word in text::words(&normalized) {
		let long_enough = word.chars().count() >= MIN_FALLBACK_TERM_CHARS;

		if long_enough && !words.iter().any(|seen| seen == word) {
			words.push(word.to_string());
		}
	}

	words
}

fn word_overlap(words: &[String], haystack: &str) -> f32 {
	if words.is_empty() {
		return 0.0;
	}

	let haystack = text::normalize(haystack);
	let matched = words.iter().filter(|word| text::contains_term(&haystack, word)).count();

	matched as f32 / words.len() as f32
}
