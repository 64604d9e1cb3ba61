//! Page cutting and the result-quality warning.

use atelier_config::SearchQuality;

use crate::{Product, SearchIntent, SearchResponse, pipeline::QualityReport};

/// Cuts page `page` (1-based) of `page_size` out of the fully filtered list.
pub fn assemble(
	query: &str,
	intent: SearchIntent,
	products: Vec<Product>,
	page: u32,
	page_size: u32,
	quality_warning: Option<String>,
) -> SearchResponse {
	let total_count = products.len() as u64;
	let page = page.max(1);
	let page_size = page_size.max(1);
	let skip = (page as usize - 1).saturating_mul(page_size as usize);
	let results = products.into_iter().skip(skip).take(page_size as usize).collect();

	SearchResponse {
		query: query.to_string(),
		results,
		total_count,
		page,
		page_size,
		intent,
		quality_warning,
	}
}

/// The fixed warning message when the filtered set looks weak, otherwise `None`.
///
/// Browse queries only warn when the slice is small; their similarities carry no meaning.
pub fn quality_warning(
	products: &[Product],
	report: &QualityReport,
	intent: &SearchIntent,
	is_browse: bool,
	cfg: &SearchQuality,
) -> Option<String> {
	weak_results(products, report, intent, is_browse, cfg).then(|| cfg.message.clone())
}

fn weak_results(
	products: &[Product],
	report: &QualityReport,
	intent: &SearchIntent,
	is_browse: bool,
	cfg: &SearchQuality,
) -> bool {
	let total = products.len();

	if total == 0 {
		return true;
	}
	if is_browse {
		return total < cfg.min_results as usize;
	}

	let max = products.iter().map(|product| product.similarity).fold(f32::MIN, f32::max);
	let avg = products.iter().map(|product| product.similarity).sum::<f32>() / total as f32;

	if max < cfg.min_max_similarity && avg < cfg.min_avg_similarity {
		return true;
	}
	if intent.color.is_some()
		&& let Some(matches) = report.color_matches
		&& (matches < cfg.min_color_matches as usize || total < cfg.min_results as usize)
	{
		return true;
	}
	if let Some((before, after)) = report.price_filtered
		&& before > 0
		&& (before - after.min(before)) as f32 / before as f32 > cfg.max_price_removed_ratio
	{
		return true;
	}

	report.category_matches.is_some_and(|matches| matches < cfg.min_category_matches as usize)
}
