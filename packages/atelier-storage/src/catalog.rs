use crate::{Result, db::Db, models::ProductRow, vector};

const PRODUCT_COLUMNS: &str = "\
	p.id,
	p.title,
	p.description,
	p.brand,
	p.price,
	p.currency,
	p.image_url,
	p.product_url,
	p.merchant_name,
	p.on_sale,
	p.tags,
	p.verified_colors,
	p.image_embedding::text AS image_embedding";

// $1 include pattern, $2 exclude pattern, $3 exclusion override pattern, $4 price floor.
const LEXICAL_WHERE: &str = "\
WHERE ($1::text IS NULL OR p.title ~* $1)
	AND (
		$2::text IS NULL
		OR NOT (concat_ws(' ', p.title, p.description) ~* $2)
		OR ($3::text IS NOT NULL AND concat_ws(' ', p.title, p.description) ~* $3)
	)
	AND ($4::float8 IS NULL OR p.price >= $4)";

#[derive(Debug, Clone, Default)]
pub struct VectorFilters {
	/// Rows priced below this are skipped. Rows without a price are kept.
	pub min_price: Option<f64>,
}

/// Word-boundary catalog browse, cheapest first.
#[derive(Debug, Clone, Default)]
pub struct LexicalQuery {
	/// Title must contain one of these words (plural suffixes allowed). Empty matches everything.
	pub include_terms: Vec<String>,
	/// Rows whose title or description contains one of these words are skipped, unless they also
	/// contain one of `exclude_unless_terms`.
	pub exclude_terms: Vec<String>,
	pub exclude_unless_terms: Vec<String>,
	pub min_price: Option<f64>,
	pub limit: i64,
	pub offset: i64,
}

#[derive(Debug, Clone)]
pub struct LexicalPage {
	pub rows: Vec<ProductRow>,
	/// Matching rows across all pages.
	pub total: i64,
}

pub async fn vector_search(
	db: &Db,
	embedding: &[f32],
	limit: i64,
	filters: &VectorFilters,
) -> Result<Vec<ProductRow>> {
	let sql = format!(
		"\
SELECT
{PRODUCT_COLUMNS},
	(1 - (p.embedding <=> $1::text::vector))::real AS similarity
FROM products p
WHERE p.embedding IS NOT NULL
	AND ($3::float8 IS NULL OR p.price IS NULL OR p.price >= $3)
ORDER BY p.embedding <=> $1::text::vector
LIMIT $2"
	);
	let rows = sqlx::query_as::<_, ProductRow>(&sql)
		.bind(vector::vector_to_pg(embedding))
		.bind(limit)
		.bind(filters.min_price)
		.fetch_all(&db.pool)
		.await?;

	Ok(rows)
}

/// Blends cosine similarity with normalized full-text rank.
pub async fn hybrid_search(
	db: &Db,
	embedding: &[f32],
	text: &str,
	limit: i64,
	vector_weight: f32,
	text_weight: f32,
) -> Result<Vec<ProductRow>> {
	let sql = format!(
		"\
WITH q AS (
	SELECT $1::text::vector AS vec, websearch_to_tsquery('english', $2) AS tsq
)
SELECT
{PRODUCT_COLUMNS},
	(
		$4::real * (1 - (p.embedding <=> q.vec))
		+ $5::real * ts_rank_cd(p.search_document, q.tsq, 32)
	)::real AS similarity
FROM products p, q
WHERE p.embedding IS NOT NULL
ORDER BY similarity DESC
LIMIT $3"
	);
	let rows = sqlx::query_as::<_, ProductRow>(&sql)
		.bind(vector::vector_to_pg(embedding))
		.bind(text)
		.bind(limit)
		.bind(vector_weight)
		.bind(text_weight)
		.fetch_all(&db.pool)
		.await?;

	Ok(rows)
}

pub async fn lexical_search(db: &Db, query: &LexicalQuery) -> Result<LexicalPage> {
	let include = word_pattern(&query.include_terms);
	let exclude = word_pattern(&query.exclude_terms);
	let unless = word_pattern(&query.exclude_unless_terms);
	let sql = format!(
		"\
SELECT
{PRODUCT_COLUMNS},
	0::real AS similarity
FROM products p
{LEXICAL_WHERE}
ORDER BY p.price ASC NULLS LAST, p.id ASC
LIMIT $5 OFFSET $6"
	);
	let rows = sqlx::query_as::<_, ProductRow>(&sql)
		.bind(include.as_deref())
		.bind(exclude.as_deref())
		.bind(unless.as_deref())
		.bind(query.min_price)
		.bind(query.limit)
		.bind(query.offset)
		.fetch_all(&db.pool)
		.await?;
	let count_sql = format!("SELECT count(*) FROM products p\n{LEXICAL_WHERE}");
	let total: i64 = sqlx::query_scalar(&count_sql)
		.bind(include.as_deref())
		.bind(exclude.as_deref())
		.bind(unless.as_deref())
		.bind(query.min_price)
		.fetch_one(&db.pool)
		.await?;

	tracing::debug!(
		rows = rows.len(),
		total,
		offset = query.offset,
		"Lexical catalog page fetched."
	);

	Ok(LexicalPage { rows, total })
}

/// Builds a case-insensitive Postgres word-boundary pattern (`\m(a|b)(s|es)?\M`).
///
/// Returns `None` when there is nothing to match so the clause is skipped.
pub fn word_pattern(terms: &[String]) -> Option<String> {
	let alternatives: Vec<String> = terms
		.iter()
		.map(|term| term.trim().to_lowercase())
		.filter(|term| !term.is_empty())
		.map(|term| escape_pattern(&term))
		.collect();

	if alternatives.is_empty() {
		return None;
	}

	Some(format!(r"\m({})(s|es)?\M", alternatives.join("|")))
}

fn escape_pattern(term: &str) -> String {
	let mut out = String::with_capacity(term.len());

	for c in term.chars() {
		if matches!(
			c,
			'\\' | '.' | '+' | '*' | '?' | '(' | ')' | '|' | '[' | ']' | '{' | '}' | '^' | '$'
		) {
			out.push('\\');
		}

		out.push(c);
	}

	out
}
