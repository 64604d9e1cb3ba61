use proptest::prelude::*;

use atelier_domain::{
	Lexicon, PriceRange, browse,
	category::{self, CategoryMatch},
	color, price, query, safety,
};

#[test]
fn simple_color_category_query_is_fully_understood() {
	let lexicon = Lexicon::builtin();
	let raw = "red heels";

	assert!(query::is_simple_query(raw, lexicon));
	assert_eq!(color::extract_color(raw, lexicon), Some("red"));
	assert_eq!(
		category::detect_category(raw, lexicon).map(|(category, _)| category),
		Some("shoes")
	);
	assert_eq!(browse::detect_browse(raw, lexicon), None);
}

#[test]
fn price_bounded_query_is_not_simple() {
	let lexicon = Lexicon::builtin();
	let raw = "evening gowns under $150";

	assert!(!query::is_simple_query(raw, lexicon));
	assert_eq!(price::extract_price_range(raw, lexicon), Some(PriceRange::new(None, Some(150.0))));
}

#[test]
fn brand_query_shape() {
	let lexicon = Lexicon::builtin();

	assert!(query::has_brand_pattern("Eileen Fisher cardigan"));
	assert_eq!(query::attribute_term_count("Eileen Fisher cardigan", lexicon), 0);
}

#[test]
fn catalog_hygiene_filters_compose() {
	let lexicon = Lexicon::builtin();
	let listings = [
		("Men's Slim Chinos", "Tailored fit for men.", true),
		("Women's Wide Leg Trousers", "High rise.", false),
		("Cotton Fabric Bundle", "Fat quarter pack, 18 x 22 in.", true),
		("Linen Midi Dress", "Relaxed fit, 48 in length.", false),
	];

	for (title, description, rejected) in listings {
		let hit = safety::is_mens_product(title, description, lexicon)
			|| safety::is_non_apparel(title, description, lexicon);

		assert_eq!(hit, rejected, "{title}");
	}
}

#[test]
fn category_matches_sort_best_first() {
	let lexicon = Lexicon::builtin();
	let titles = ["Shoe Rack", "Sneaker and Sock Bundle", "Leather Loafers"];
	let mut matches: Vec<CategoryMatch> = titles
		.iter()
		.map(|title| category::classify_title(title, "shoes", lexicon))
		.collect();

	matches.sort();

	assert_eq!(matches, vec![CategoryMatch::Exact, CategoryMatch::Partial, CategoryMatch::None]);
}

#[test]
fn lexicon_is_versioned() {
	assert!(!Lexicon::builtin().version.is_empty());
	assert_eq!(Lexicon::default().version, Lexicon::builtin().version);
}

proptest! {
	#[test]
	fn heuristics_accept_arbitrary_text(title in "\\PC{0,40}", description in "\\PC{0,40}") {
		let lexicon = Lexicon::builtin();

		let _ = category::classify_title(&title, "dress", lexicon);
		let _ = color::product_matches_color(&[], &title, &description, "black", lexicon);
		let _ = safety::is_mens_product(&title, &description, lexicon);
		let _ = safety::is_non_apparel(&title, &description, lexicon);
		let _ = browse::detect_browse(&title, lexicon);
		let _ = price::extract_price_range(&title, lexicon);
	}

	#[test]
	fn extracted_ranges_are_ordered(low in 1u32..5_000, high in 1u32..5_000) {
		let raw = format!("between ${low} and ${high}");
		let range = price::extract_price_range(&raw, Lexicon::builtin()).expect("range");

		prop_assert!(range.min <= range.max);
	}
}
