use crate::{Result, db::Db, models::RatingStatsRow};

/// Aggregate rating stats for the given products. Products nobody rated are absent.
pub async fn community_stats(db: &Db, product_ids: &[String]) -> Result<Vec<RatingStatsRow>> {
	if product_ids.is_empty() {
		return Ok(Vec::new());
	}

	let rows = sqlx::query_as::<_, RatingStatsRow>(
		"\
SELECT
	product_id,
	count(*)::int8 AS total_ratings,
	avg(rating)::float8 AS avg_rating,
	(100.0 * count(*) FILTER (WHERE rating >= 3) / count(*))::float8 AS pct_three_plus,
	(100.0 * count(*) FILTER (WHERE rating = 5) / count(*))::float8 AS pct_five,
	(100.0 * count(*) FILTER (WHERE rating <= 2) / count(*))::float8 AS pct_two_or_less
FROM product_ratings
WHERE product_id = ANY($1)
GROUP BY product_id",
	)
	.bind(product_ids)
	.fetch_all(&db.pool)
	.await?;

	Ok(rows)
}
