const SCHEMA_TEMPLATE: &str = "\
CREATE EXTENSION IF NOT EXISTS vector;

CREATE TABLE IF NOT EXISTS products (
	id text PRIMARY KEY,
	title text NOT NULL,
	description text NOT NULL DEFAULT '',
	brand text NOT NULL DEFAULT '',
	price double precision,
	currency text NOT NULL DEFAULT 'USD',
	image_url text NOT NULL DEFAULT '',
	product_url text NOT NULL DEFAULT '',
	merchant_name text NOT NULL DEFAULT '',
	on_sale boolean NOT NULL DEFAULT false,
	tags text[] NOT NULL DEFAULT '{}',
	verified_colors text[] NOT NULL DEFAULT '{}',
	embedding vector(<TEXT_DIM>),
	image_embedding vector(<IMAGE_DIM>),
	search_document tsvector GENERATED ALWAYS AS (
		to_tsvector('english', title || ' ' || brand || ' ' || description)
	) STORED
);

CREATE INDEX IF NOT EXISTS products_search_document_idx ON products USING gin (search_document);

CREATE INDEX IF NOT EXISTS products_embedding_idx ON products USING hnsw (embedding vector_cosine_ops);

CREATE INDEX IF NOT EXISTS products_price_idx ON products (price);

CREATE TABLE IF NOT EXISTS search_settings (
	id smallint PRIMARY KEY DEFAULT 1 CHECK (id = 1),
	min_price_threshold double precision NOT NULL DEFAULT 0,
	enable_mens_filter boolean NOT NULL DEFAULT true,
	enable_price_filter boolean NOT NULL DEFAULT true,
	enable_non_apparel_filter boolean NOT NULL DEFAULT true,
	search_mode text NOT NULL DEFAULT 'auto',
	hybrid_vector_weight real NOT NULL DEFAULT 0.7,
	hybrid_text_weight real NOT NULL DEFAULT 0.3,
	updated_at timestamptz NOT NULL DEFAULT now()
);

CREATE TABLE IF NOT EXISTS product_ratings (
	product_id text NOT NULL,
	user_id text NOT NULL,
	rating smallint NOT NULL CHECK (rating BETWEEN 1 AND 5),
	rated_at timestamptz NOT NULL DEFAULT now(),
	PRIMARY KEY (product_id, user_id)
);

CREATE INDEX IF NOT EXISTS product_ratings_product_idx ON product_ratings (product_id)";

pub fn render_schema(text_vector_dim: u32, image_vector_dim: u32) -> String {
	SCHEMA_TEMPLATE
		.replace("<TEXT_DIM>", &text_vector_dim.to_string())
		.replace("<IMAGE_DIM>", &image_vector_dim.to_string())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn dimensions_are_substituted() {
		let sql = render_schema(1_536, 512);

		assert!(sql.contains("embedding vector(1536)"));
		assert!(sql.contains("image_embedding vector(512)"));
		assert!(!sql.contains('<'));
	}
}
