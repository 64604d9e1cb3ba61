//! Postgres-backed implementations of the store traits.

use std::collections::HashMap;

use atelier_config::QualityFilterSettings;
use atelier_storage::{
	catalog::{self, LexicalQuery, VectorFilters},
	db::Db,
	models::{ProductRow, RatingStatsRow, SearchSettingsRow},
	ratings, settings, vector,
};

use crate::{
	BoxFuture, CatalogPage, CatalogStore, CommunityStats, CommunityStatsStore, Product,
	SettingsStore,
};

pub struct PgStores {
	db: Db,
}
impl PgStores {
	pub fn new(db: Db) -> Self {
		Self { db }
	}
}

impl CatalogStore for PgStores {
	fn vector_search<'a>(
		&'a self,
		embedding: &'a [f32],
		limit: u32,
		filters: &'a VectorFilters,
	) -> BoxFuture<'a, atelier_storage::Result<Vec<Product>>> {
		Box::pin(async move {
			let rows =
				catalog::vector_search(&self.db, embedding, i64::from(limit), filters).await?;

			Ok(rows.into_iter().map(product_from_row).collect())
		})
	}

	fn hybrid_search<'a>(
		&'a self,
		embedding: &'a [f32],
		text: &'a str,
		limit: u32,
		vector_weight: f32,
		text_weight: f32,
	) -> BoxFuture<'a, atelier_storage::Result<Vec<Product>>> {
		Box::pin(async move {
			let rows = catalog::hybrid_search(
				&self.db,
				embedding,
				text,
				i64::from(limit),
				vector_weight,
				text_weight,
			)
			.await?;

			Ok(rows.into_iter().map(product_from_row).collect())
		})
	}

	fn lexical_search<'a>(
		&'a self,
		query: &'a LexicalQuery,
	) -> BoxFuture<'a, atelier_storage::Result<CatalogPage>> {
		Box::pin(async move {
			let page = catalog::lexical_search(&self.db, query).await?;

			Ok(CatalogPage {
				products: page.rows.into_iter().map(product_from_row).collect(),
				total: u64::try_from(page.total).unwrap_or(0),
			})
		})
	}
}

impl SettingsStore for PgStores {
	fn load_settings(
		&self,
	) -> BoxFuture<'_, atelier_storage::Result<Option<QualityFilterSettings>>> {
		Box::pin(async move {
			let row = settings::load_search_settings(&self.db).await?;

			Ok(row.map(settings_from_row))
		})
	}
}

impl CommunityStatsStore for PgStores {
	fn community_stats<'a>(
		&'a self,
		product_ids: &'a [String],
	) -> BoxFuture<'a, atelier_storage::Result<HashMap<String, CommunityStats>>> {
		Box::pin(async move {
			let rows = ratings::community_stats(&self.db, product_ids).await?;

			Ok(rows.into_iter().map(stats_from_row).collect())
		})
	}
}

pub(crate) fn product_from_row(row: ProductRow) -> Product {
	let image_embedding = match row.image_embedding.as_deref().map(vector::parse_pg_vector) {
		Some(Ok(vec)) if !vec.is_empty() => Some(vec),
		Some(Err(err)) => {
			tracing::warn!(
				product_id = %row.id,
				error = %err,
				"Ignoring unreadable image embedding."
			);

			None
		},
		_ => None,
	};

	Product {
		id: row.id,
		title: row.title,
		description: row.description,
		brand: row.brand,
		price: row.price,
		currency: row.currency,
		image_url: row.image_url,
		product_url: row.product_url,
		merchant_name: row.merchant_name,
		on_sale: row.on_sale,
		tags: row.tags,
		verified_colors: row.verified_colors,
		similarity: row.similarity,
		vision_score: None,
		image_embedding,
	}
}

fn settings_from_row(row: SearchSettingsRow) -> QualityFilterSettings {
	QualityFilterSettings {
		min_price_threshold: row.min_price_threshold,
		enable_mens_filter: row.enable_mens_filter,
		enable_price_filter: row.enable_price_filter,
		enable_non_apparel_filter: row.enable_non_apparel_filter,
		search_mode: row.search_mode.trim().to_ascii_lowercase(),
		hybrid_vector_weight: row.hybrid_vector_weight,
		hybrid_text_weight: row.hybrid_text_weight,
	}
}

fn stats_from_row(row: RatingStatsRow) -> (String, CommunityStats) {
	let stats = CommunityStats {
		total_ratings: u32::try_from(row.total_ratings).unwrap_or(u32::MAX),
		avg_rating: row.avg_rating as f32,
		pct_three_plus: row.pct_three_plus as f32,
		pct_five: row.pct_five as f32,
		pct_two_or_less: row.pct_two_or_less as f32,
	};

	(row.product_id, stats)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn row(image_embedding: Option<&str>) -> ProductRow {
		ProductRow {
			id: "p-1".to_string(),
			title: "Silk slip dress".to_string(),
			description: String::new(),
			brand: "Reformation".to_string(),
			price: Some(120.0),
			currency: "USD".to_string(),
			image_url: "https://img.example/p-1.jpg".to_string(),
			product_url: "https://shop.example/p-1".to_string(),
			merchant_name: "Reformation".to_string(),
			on_sale: false,
			tags: vec!["silk".to_string()],
			verified_colors: vec!["black".to_string()],
			image_embedding: image_embedding.map(str::to_string),
			similarity: 0.61,
		}
	}

	#[test]
	fn parses_image_embedding_text() {
		let product = product_from_row(row(Some("[0.5,-0.25,1]")));

		assert_eq!(product.image_embedding, Some(vec![0.5, -0.25, 1.0]));
		assert_eq!(product.similarity, 0.61);
		assert_eq!(product.vision_score, None);
	}

	#[test]
	fn unreadable_or_empty_embeddings_are_dropped() {
		assert_eq!(product_from_row(row(Some("0.5,0.25"))).image_embedding, None);
		assert_eq!(product_from_row(row(Some("[]"))).image_embedding, None);
		assert_eq!(product_from_row(row(None)).image_embedding, None);
	}

	#[test]
	fn settings_mode_is_normalized() {
		let settings = settings_from_row(SearchSettingsRow {
			min_price_threshold: 15.0,
			enable_mens_filter: true,
			enable_price_filter: false,
			enable_non_apparel_filter: true,
			search_mode: " Hybrid ".to_string(),
			hybrid_vector_weight: 0.6,
			hybrid_text_weight: 0.4,
		});

		assert_eq!(settings.search_mode, "hybrid");
		assert!(!settings.enable_price_filter);
	}
}
