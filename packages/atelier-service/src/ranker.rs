//! Merges per-sub-query candidate lists into one ranked, de-duplicated, brand-diversified pool.

use std::collections::{HashMap, HashSet};

use rand::Rng;

use crate::{Product, SubQuery, executor::SubQueryResults};

const POSITION_DECAY: f32 = 0.3;
const REPEAT_MATCH_FACTOR: f32 = 0.5;

#[derive(Debug, Clone, Copy)]
pub struct RankParams {
	pub pool_size: usize,
	/// Chance in [0, 1] that a brand over its cap loses another slot in a tier.
	pub diversity_factor: f32,
	pub brand_cap: u32,
	pub high_tier: f32,
	pub mid_tier: f32,
}

pub fn rank(
	per_query: &SubQueryResults,
	sub_queries: &[SubQuery],
	params: &RankParams,
	rng: &mut impl Rng,
) -> Vec<Product> {
	let merged = merge(per_query, sub_queries);
	let unique = dedup(merged);
	let mut ranked = diversify(unique, params, rng);

	ranked.truncate(params.pool_size);

	ranked
}

/// Scores each product by `similarity × weight × position decay` and sums repeat matches at half
/// weight. Best first; ties keep first-seen order.
///
/// A product matched by several sub-queries keeps its highest similarity.
pub fn merge(per_query: &SubQueryResults, sub_queries: &[SubQuery]) -> Vec<Product> {
	let mut seen_texts = HashSet::new();
	let mut slots: HashMap<String, usize> = HashMap::new();
	let mut scored: Vec<(Product, f32)> = Vec::new();

	for sub_query in sub_queries {
		if !seen_texts.insert(sub_query.text.as_str()) {
			continue;
		}

		let Some(products) = per_query.get(&sub_query.text) else {
			continue;
		};
		let len = products.len() as f32;

		for (idx, product) in products.iter().enumerate() {
			let decay = 1.0 - (idx as f32 / len) * POSITION_DECAY;
			let score = product.similarity * sub_query.weight * decay;

			match slots.get(&product.id) {
				Some(&slot) => {
					let (existing, total) = &mut scored[slot];

					*total += REPEAT_MATCH_FACTOR * score;

					if product.similarity > existing.similarity {
						existing.similarity = product.similarity;
					}
				},
				None => {
					slots.insert(product.id.clone(), scored.len());
					scored.push((product.clone(), score));
				},
			}
		}
	}

	scored.sort_by(|(_, lhs), (_, rhs)| rhs.total_cmp(lhs));

	scored.into_iter().map(|(product, _)| product).collect()
}

/// Keeps the first product for each case-insensitive, trimmed `(brand, title)` pair.
pub fn dedup(products: Vec<Product>) -> Vec<Product> {
	let mut seen = HashSet::new();

	products
		.into_iter()
		.filter(|product| seen.insert(dedup_key(product)))
		.collect()
}

/// Soft per-brand cap inside each similarity tier. Tiers are concatenated best first, so capping
/// never moves a weaker tier ahead of a stronger one.
pub fn diversify(products: Vec<Product>, params: &RankParams, rng: &mut impl Rng) -> Vec<Product> {
	let mut tiers: [Vec<Product>; 3] = [Vec::new(), Vec::new(), Vec::new()];

	for product in products {
		let tier = if product.similarity >= params.high_tier {
			0
		} else if product.similarity >= params.mid_tier {
			1
		} else {
			2
		};

		tiers[tier].push(product);
	}

	let mut out = Vec::new();

	for tier in tiers {
		let mut brand_counts: HashMap<String, u32> = HashMap::new();

		for product in tier {
			let brand = product.brand.trim().to_lowercase();

			if brand.is_empty() {
				out.push(product);

				continue;
			}

			let count = brand_counts.entry(brand).or_default();

			if *count >= params.brand_cap && rng.r#gen::<f32>() < params.diversity_factor {
				continue;
			}

			*count += 1;

			out.push(product);
		}
	}

	out
}

fn dedup_key(product: &Product) -> (String, String) {
	(product.brand.trim().to_lowercase(), product.title.trim().to_lowercase())
}
