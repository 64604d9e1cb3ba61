//! Category browsing served straight from text search.
//!
//! A browse has nothing to rank by, so the whole catalog slice is listed cheapest first and paged
//! by the store instead of being pulled through the semantic pipeline.

use atelier_config::QualityFilterSettings;
use atelier_domain::{Lexicon, browse::BrowseRequest, lexicon::ANY_CATEGORY};
use atelier_storage::catalog::LexicalQuery;

use crate::{AtelierService, Error, Result, SearchIntent, SearchResponse, SubQuery, executor};

impl AtelierService {
	/// Lists one page of the browsed slice. Only the price floor and the gender filter apply.
	pub async fn browse(
		&self,
		query: &str,
		request: &BrowseRequest,
		page: u32,
		limit: u32,
		settings: &QualityFilterSettings,
	) -> Result<SearchResponse> {
		let lexical = browse_query(request, page, limit, settings, self.lexicon);
		let catalog_page = self.stores.catalog.lexical_search(&lexical).await.map_err(|err| {
			tracing::error!(query, error = %err, "Browse listing failed.");

			Error::Unavailable { message: err.to_string() }
		})?;
		let intent = browse_intent(query, request);
		let warning = (catalog_page.total < u64::from(self.cfg.search.quality.min_results))
			.then(|| self.cfg.search.quality.message.clone());

		tracing::info!(
			query,
			category = request.category.unwrap_or(ANY_CATEGORY),
			total = catalog_page.total,
			page,
			"Browse served."
		);

		Ok(SearchResponse {
			query: query.to_string(),
			results: catalog_page.products,
			total_count: catalog_page.total,
			page,
			page_size: limit,
			intent,
			quality_warning: warning,
		})
	}
}

fn browse_query(
	request: &BrowseRequest,
	page: u32,
	limit: u32,
	settings: &QualityFilterSettings,
	lexicon: &Lexicon,
) -> LexicalQuery {
	let (exclude_terms, exclude_unless_terms) = if settings.enable_mens_filter {
		(to_strings(lexicon.mens_markers), to_strings(lexicon.unisex_markers))
	} else {
		(Vec::new(), Vec::new())
	};

	LexicalQuery {
		include_terms: request.terms.clone(),
		exclude_terms,
		exclude_unless_terms,
		min_price: executor::price_floor(settings),
		limit: i64::from(limit),
		offset: i64::from(page.saturating_sub(1)) * i64::from(limit),
	}
}

/// The intent reported back for a browse, built without any parsing.
pub fn browse_intent(query: &str, request: &BrowseRequest) -> SearchIntent {
	let category = request.category.unwrap_or(ANY_CATEGORY);
	let explanation = match request.category {
		Some(category) => format!("Showing every {category} in the catalog, lowest price first."),
		None => "Showing the whole catalog, lowest price first.".to_string(),
	};

	SearchIntent {
		primary_item: request.category.map(str::to_string),
		sub_queries: vec![SubQuery {
			text: query.trim().to_string(),
			category: category.to_string(),
			priority: 1,
			weight: 1.0,
		}],
		explanation,
		..SearchIntent::default()
	}
}

fn to_strings(terms: &[&str]) -> Vec<String> {
	terms.iter().map(|term| (*term).to_string()).collect()
}
