/// One catalog row as returned by every search query.
///
/// `image_embedding` is selected as pgvector text and parsed on demand with
/// [`crate::vector::parse_pg_vector`].
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
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
	pub image_embedding: Option<String>,
	pub similarity: f32,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SearchSettingsRow {
	pub min_price_threshold: f64,
	pub enable_mens_filter: bool,
	pub enable_price_filter: bool,
	pub enable_non_apparel_filter: bool,
	pub search_mode: String,
	pub hybrid_vector_weight: f32,
	pub hybrid_text_weight: f32,
}

/// Aggregate ratings for one product. Percentages are 0-100.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RatingStatsRow {
	pub product_id: String,
	pub total_ratings: i64,
	pub avg_rating: f64,
	pub pct_three_plus: f64,
	pub pct_five: f64,
	pub pct_two_or_less: f64,
}
