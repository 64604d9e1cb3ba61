use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use atelier_domain::PriceRange;

/// One catalog product as it moves through a search.
///
/// `similarity` starts as the retrieval score and is adjusted by image blending and
/// personalization. The image embedding is carried for blending only and never serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
	pub id: String,
	pub title: String,
	pub description: String,
	pub brand: String,
	pub price: Option<f64>,
	pub currency: String,
	pub image_url: String,
	pub product_url: String,
	pub merchant_name: String,
	pub on_sale: bool,
	pub tags: Vec<String>,
	pub verified_colors: Vec<String>,
	pub similarity: f32,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub vision_score: Option<f32>,
	#[serde(skip)]
	pub image_embedding: Option<Vec<f32>>,
}

/// One retrieval unit produced by intent parsing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubQuery {
	pub text: String,
	/// Taxonomy category, or `"all"`.
	pub category: String,
	/// 1 is the most important.
	pub priority: u32,
	/// In (0, 1]. Scales both the fetch size and the merge score.
	pub weight: f32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchIntent {
	pub occasion: Option<String>,
	pub style: Vec<String>,
	pub constraints: Vec<String>,
	/// Only ever a color the shopper named.
	pub color: Option<String>,
	pub price_range: Option<PriceRange>,
	pub primary_item: Option<String>,
	pub secondary_items: Vec<String>,
	pub sub_queries: Vec<SubQuery>,
	pub explanation: String,
}

#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
	/// Page size. Clamped to `1..=search.max_limit`; defaults to `search.default_limit`.
	pub limit: Option<u32>,
	/// 1-based. Values below 1 are treated as 1.
	pub page: Option<u32>,
	pub similarity_threshold: Option<f32>,
	pub diversity_factor: Option<f32>,
	/// Skips the explicit-content filter.
	pub allow_unsafe_content: bool,
	/// The caller's own 1-5 ratings keyed by product id. Empty disables personalization.
	pub user_ratings: HashMap<String, u8>,
	pub skip_vision_reranking: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
	pub query: String,
	pub results: Vec<Product>,
	/// Size of the whole ranked set, not just this page.
	pub total_count: u64,
	pub page: u32,
	pub page_size: u32,
	pub intent: SearchIntent,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub quality_warning: Option<String>,
}

/// Aggregate ratings for one product. Percentages are 0-100.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CommunityStats {
	pub total_ratings: u32,
	pub avg_rating: f32,
	pub pct_three_plus: f32,
	pub pct_five: f32,
	pub pct_two_or_less: f32,
}
