use crate::{Result, db::Db, models::SearchSettingsRow};

/// Reads the single admin-maintained settings row, if one has been written.
pub async fn load_search_settings(db: &Db) -> Result<Option<SearchSettingsRow>> {
	let row = sqlx::query_as::<_, SearchSettingsRow>(
		"\
SELECT
	min_price_threshold,
	enable_mens_filter,
	enable_price_filter,
	enable_non_apparel_filter,
	search_mode,
	hybrid_vector_weight,
	hybrid_text_weight
FROM search_settings
WHERE id = 1",
	)
	.fetch_optional(&db.pool)
	.await?;

	Ok(row)
}
