use std::env;

use tokio::runtime::Runtime;

use atelier_config::Postgres;
use atelier_storage::{
	catalog::{self, LexicalQuery},
	db::Db,
	ratings, settings,
};

fn env_dsn() -> Option<String> {
	env::var("ATELIER_PG_DSN").ok().filter(|dsn| !dsn.trim().is_empty())
}

#[test]
#[ignore = "Requires external Postgres with pgvector. Set ATELIER_PG_DSN to run."]
fn schema_bootstraps_and_lexical_browse_pages() {
	let Some(dsn) = env_dsn() else {
		eprintln!("Skipping schema_bootstraps_and_lexical_browse_pages; set ATELIER_PG_DSN to run this test.");

		return;
	};
	let rt = Runtime::new().expect("Failed to build runtime.");

	rt.block_on(async {
		let cfg = Postgres { dsn, pool_max_conns: 1 };
		let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");

		db.ensure_schema(3, 2).await.expect("Failed to ensure schema.");

		sqlx::query("DELETE FROM products WHERE id LIKE 'smoke-%'")
			.execute(&db.pool)
			.await
			.expect("Failed to clear smoke rows.");

		for (id, title, price) in [
			("smoke-1", "Silk Slip Dress", 120.0),
			("smoke-2", "Men's Dress Shirt", 40.0),
			("smoke-3", "Linen Sundress", 60.0),
		] {
			sqlx::query("INSERT INTO products (id, title, price, embedding) VALUES ($1, $2, $3, '[1,0,0]')")
				.bind(id)
				.bind(title)
				.bind(price)
				.execute(&db.pool)
				.await
				.expect("Failed to insert smoke row.");
		}

		let page = catalog::lexical_search(
			&db,
			&LexicalQuery {
				include_terms: vec!["dress".to_string(), "sundress".to_string()],
				exclude_terms: vec!["men's".to_string()],
				exclude_unless_terms: vec!["unisex".to_string()],
				min_price: Some(10.0),
				limit: 10,
				offset: 0,
			},
		)
		.await
		.expect("Lexical search failed.");
		let ids: Vec<_> = page
			.rows
			.iter()
			.filter(|row| row.id.starts_with("smoke-"))
			.map(|row| row.id.as_str())
			.collect();

		assert_eq!(ids, vec!["smoke-3", "smoke-1"]);

		let hits = catalog::vector_search(&db, &[1.0, 0.0, 0.0], 5, &Default::default())
			.await
			.expect("Vector search failed.");

		assert!(hits.iter().any(|row| row.similarity > 0.99));

		settings::load_search_settings(&db).await.expect("Settings query failed.");
		ratings::community_stats(&db, &["smoke-1".to_string()]).await.expect("Stats query failed.");
	});
}
