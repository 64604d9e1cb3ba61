//! Keyword tables behind every text heuristic in the crate.
//!
//! The tables are plain data. Matching code takes a `&Lexicon` so callers can swap in an edited
//! copy
//! without touching the heuristics, and `version` identifies which table set produced a decision.

/// A keyed list of terms, for example a category and its spellings.
pub type Table = &'static [(&'static str, &'static [&'static str])];

/// Fixed category taxonomy used by sub-queries, in display order. `"all"` is the wildcard.
pub const CATEGORIES: [&str; 7] =
	["dress", "shoes", "bags", "tops", "bottoms", "outerwear", "accessories"];
pub const ANY_CATEGORY: &str = "all";

#[derive(Debug, Clone, Copy)]
pub struct Lexicon {
	pub version: &'static str,
	/// Canonical color tokens. Multi-word entries are checked before single words.
	pub colors: &'static [&'static str],
	pub color_synonyms: Table,
	/// Ordered fast-path keywords per category. First matching category wins.
	pub category_keywords: Table,
	/// Title spellings that identify a product as belonging to a category.
	pub category_terms: Table,
	/// Phrases where a category term names something else ("shoe organizer").
	pub unwanted_contexts: Table,
	pub set_markers: &'static [&'static str],
	pub complexity_words: &'static [&'static str],
	pub complexity_phrases: &'static [&'static str],
	/// Price words that cap the range at the affordable maximum.
	pub budget_words: &'static [&'static str],
	/// Price words that floor the range at the luxury minimum.
	pub luxury_words: &'static [&'static str],
	pub occasion_styles: Table,
	pub explicit_markers: &'static [&'static str],
	pub explicit_query_markers: &'static [&'static str],
	pub mens_markers: &'static [&'static str],
	pub womens_markers: &'static [&'static str],
	pub unisex_markers: &'static [&'static str],
	pub non_apparel_markers: &'static [&'static str],
	/// Material words that turn a bare dimension ("58 x 36 in") into a non-apparel signal.
	pub non_apparel_materials: &'static [&'static str],
	pub attribute_terms: &'static [&'static str],
	pub browse_phrases: &'static [&'static str],
	/// Words ignored when deciding whether a browse query carries any other constraint.
	pub browse_fillers: &'static [&'static str],
	/// Title terms that are never the browsed category ("necklace" in a dress browse).
	pub cross_category_exclusions: Table,
	pub vision_keywords: &'static [&'static str],
	/// Words that narrow a category in a way the local refinement parser cannot express.
	pub refinement_qualifiers: &'static [&'static str],
}

impl Lexicon {
	pub fn builtin() -> &'static Lexicon {
		&BUILTIN
	}

	pub fn color_synonyms_for(&self, color: &str) -> &'static [&'static str] {
		lookup(self.color_synonyms, color)
	}

	pub fn category_terms_for(&self, category: &str) -> &'static [&'static str] {
		lookup(self.category_terms, category)
	}

	pub fn unwanted_contexts_for(&self, category: &str) -> &'static [&'static str] {
		lookup(self.unwanted_contexts, category)
	}

	pub fn cross_category_exclusions_for(&self, category: &str) -> &'static [&'static str] {
		lookup(self.cross_category_exclusions, category)
	}
}

impl Default for Lexicon {
	fn default() -> Self {
		BUILTIN
	}
}

pub fn lookup(table: Table, key: &str) -> &'static [&'static str] {
	table.iter().find(|(name, _)| *name == key).map(|(_, terms)| *terms).unwrap_or(&[])
}

pub static BUILTIN: Lexicon = Lexicon {
	version: "2025.1",
	colors: &[
		"navy blue",
		"hot pink",
		"off white",
		"off-white",
		"black",
		"white",
		"red",
		"blue",
		"navy",
		"green",
		"yellow",
		"orange",
		"purple",
		"pink",
		"brown",
		"beige",
		"cream",
		"grey",
		"gray",
		"gold",
		"silver",
		"tan",
		"burgundy",
		"maroon",
		"olive",
		"emerald",
		"lavender",
		"ivory",
		"coral",
		"teal",
		"khaki",
		"camel",
		"nude",
		"blush",
		"champagne",
		"charcoal",
		"turquoise",
	],
	color_synonyms: &[
		("black", &["noir", "ebony", "jet black", "onyx"]),
		("white", &["ivory", "off white", "off-white", "snow", "optic white"]),
		("red", &["crimson", "scarlet", "ruby", "cherry", "wine"]),
		("blue", &["navy", "cobalt", "azure", "sapphire", "royal blue", "sky blue", "denim blue"]),
		("navy", &["navy blue", "midnight", "dark blue"]),
		("navy blue", &["navy", "midnight", "dark blue"]),
		("green", &["emerald", "olive", "sage", "forest", "mint", "jade", "kelly green"]),
		("yellow", &["mustard", "lemon", "canary", "butter"]),
		("orange", &["tangerine", "rust", "burnt orange", "apricot"]),
		("purple", &["violet", "lilac", "plum", "mauve", "lavender", "eggplant"]),
		("pink", &["blush", "rose", "fuchsia", "magenta", "hot pink", "dusty pink"]),
		("hot pink", &["fuchsia", "magenta"]),
		("brown", &["chocolate", "cognac", "mocha", "espresso", "chestnut", "tan", "camel"]),
		("beige", &["nude", "sand", "taupe", "khaki", "oatmeal", "ecru", "stone"]),
		("cream", &["ivory", "ecru", "off white", "off-white", "vanilla"]),
		("grey", &["gray", "charcoal", "slate", "heather grey", "ash"]),
		("gray", &["grey", "charcoal", "slate", "heather gray", "ash"]),
		("gold", &["golden", "gilded", "metallic gold"]),
		("silver", &["metallic silver", "chrome", "pewter"]),
		("tan", &["camel", "caramel", "cognac", "sand"]),
		("burgundy", &["wine", "maroon", "oxblood", "bordeaux", "merlot"]),
		("maroon", &["burgundy", "wine", "oxblood"]),
		("olive", &["khaki green", "army green", "moss"]),
		("emerald", &["emerald green", "jewel green"]),
		("lavender", &["lilac", "light purple"]),
		("ivory", &["cream", "off white", "off-white", "ecru"]),
		("off white", &["ivory", "cream", "ecru"]),
		("off-white", &["ivory", "cream", "ecru"]),
		("coral", &["salmon", "peach"]),
		("teal", &["turquoise", "aqua"]),
		("khaki", &["tan", "sand", "beige"]),
		("camel", &["tan", "caramel", "cognac"]),
		("nude", &["beige", "blush", "skin tone"]),
		("blush", &["pale pink", "nude", "light pink"]),
		("champagne", &["gold", "beige"]),
		("charcoal", &["dark grey", "dark gray"]),
		("turquoise", &["teal", "aqua"]),
	],
	category_keywords: &[
		("dress", &["dress", "gown", "frock"]),
		(
			"shoes",
			&[
				"shoes", "shoe", "heels", "boots", "sandals", "sneakers", "loafers", "pumps",
				"flats",
			],
		),
		("bags", &["bag", "purse", "handbag", "tote", "clutch", "backpack", "satchel"]),
		("tops", &["top", "blouse", "shirt", "sweater", "cardigan", "t-shirt", "tee"]),
		("bottoms", &["pants", "jeans", "skirt", "shorts", "trousers", "leggings"]),
		("outerwear", &["jacket", "coat", "blazer"]),
		(
			"accessories",
			&[
				"jewelry",
				"scarf",
				"belt",
				"hat",
				"watch",
				"sunglasses",
				"necklace",
				"earrings",
				"bracelet",
			],
		),
	],
	category_terms: &[
		("dress", &["dress", "gown", "frock", "sundress", "minidress"]),
		(
			"shoes",
			&[
				"shoe", "heel", "boot", "bootie", "sandal", "sneaker", "loafer", "pump", "flat",
				"stiletto", "mule", "clog", "wedge", "espadrille", "slingback", "oxford",
			],
		),
		(
			"bags",
			&[
				"bag", "purse", "handbag", "tote", "clutch", "backpack", "satchel", "crossbody",
				"hobo",
			],
		),
		(
			"tops",
			&[
				"top", "blouse", "shirt", "sweater", "cardigan", "t-shirt", "tee", "tank", "cami",
				"camisole", "bodysuit", "pullover", "hoodie", "tunic",
			],
		),
		(
			"bottoms",
			&[
				"pants", "jeans", "skirt", "shorts", "trousers", "leggings", "chinos", "joggers",
				"culottes", "slacks",
			],
		),
		("outerwear", &["jacket", "coat", "blazer", "trench", "parka", "puffer", "anorak"]),
		(
			"accessories",
			&[
				"jewelry", "necklace", "earring", "bracelet", "scarf", "belt", "hat", "watch",
				"sunglasses", "pendant", "brooch", "headband",
			],
		),
		("necklace", &["necklace", "pendant", "choker", "chain"]),
	],
	unwanted_contexts: &[
		(
			"dress",
			&[
				"dress form",
				"dress shirt",
				"dress socks",
				"dress shoe",
				"dress pants",
				"dress hanger",
				"dress clip",
				"dress up",
			],
		),
		(
			"shoes",
			&[
				"shoe organizer",
				"shoe rack",
				"shoe horn",
				"shoe polish",
				"shoe bag",
				"shoe box",
				"shoe charm",
				"shoe clip",
				"shoe tree",
				"boot tray",
				"boot shaper",
			],
		),
		(
			"bags",
			&["bag charm", "garment bag", "dust bag", "bag organizer", "bag insert", "tea bag"],
		),
		("tops", &["top handle", "top coat", "table top", "tabletop", "top stitch"]),
		("bottoms", &["pants hanger", "skirt hanger", "skirt steak"]),
		("outerwear", &["coat hanger", "coat rack", "jacket hanger", "top coat"]),
		(
			"accessories",
			&[
				"jewelry box",
				"jewelry organizer",
				"watch box",
				"watch band",
				"hat box",
				"hat rack",
			],
		),
	],
	set_markers: &[
		"set", "2 piece", "2-piece", "two piece", "two-piece", "3 piece", "3-piece", "outfit",
		"bundle", "co-ord", "coord", "matching",
	],
	complexity_words: &[
		"under", "over", "less", "more", "between", "around", "below", "above", "cheap",
		"affordable", "budget", "luxury", "expensive", "not", "without", "except", "but", "with",
		"and", "or", "plus", "formal", "casual", "elegant", "wedding", "party", "work", "office",
		"date", "brunch", "gala", "prom", "cocktail", "interview", "vacation", "beach",
	],
	complexity_phrases: &["for a", "for an", "for the", "for my", "not too", "&", "$"],
	budget_words: &["affordable", "budget", "cheap", "inexpensive"],
	luxury_words: &["luxury", "expensive", "high-end", "high end"],
	occasion_styles: &[
		("brunch", &["casual", "modest"]),
		("lunch", &["casual", "modest"]),
		("dinner", &["elegant", "evening"]),
		("date night", &["elegant", "evening"]),
		("date", &["elegant", "evening"]),
		("work", &["professional", "modest"]),
		("office", &["professional", "modest"]),
		("interview", &["professional", "polished"]),
		("party", &["fun", "statement"]),
		("club", &["fun", "statement"]),
		("wedding", &["elegant", "formal"]),
		("cocktail", &["elegant", "evening"]),
		("gala", &["formal", "glamorous"]),
		("prom", &["formal", "glamorous"]),
		("beach", &["resort", "lightweight"]),
		("vacation", &["resort", "lightweight"]),
		("gym", &["athletic"]),
		("funeral", &["modest", "formal"]),
	],
	explicit_markers: &[
		"sex toy",
		"adult toy",
		"vibrator",
		"dildo",
		"bondage",
		"fetish",
		"erotic",
		"crotchless",
		"pasties",
		"nipple",
		"porn",
		"xxx",
		"bdsm",
		"strap-on",
		"stripper",
	],
	explicit_query_markers: &[
		"lingerie", "erotic", "fetish", "bdsm", "adult", "naughty", "boudoir", "crotchless",
		"stripper",
	],
	mens_markers: &[
		"men", "men's", "mens", "man", "man's", "male", "masculine", "gentleman", "gentlemen",
		"boys", "boy's", "him", "his",
	],
	womens_markers: &[
		"women", "women's", "womens", "woman", "woman's", "ladies", "lady", "female", "feminine",
		"girls", "girl's", "her",
	],
	unisex_markers: &[
		"unisex",
		"gender neutral",
		"gender-neutral",
		"men and women",
		"women and men",
	],
	non_apparel_markers: &[
		"by the yard",
		"fabric roll",
		"upholstery",
		"curtain",
		"drape",
		"pillow",
		"cushion",
		"tablecloth",
		"table runner",
		"bedding",
		"duvet",
		"quilt",
		"rug",
		"wallpaper",
		"sewing pattern",
		"craft supplies",
		"fat quarter",
		"yarn",
		"home decor",
		"wall art",
		"poster",
		"sticker",
		"dress form",
		"mannequin",
		"hanger",
	],
	non_apparel_materials: &[
		"fabric", "material", "cloth", "textile", "sheet", "roll", "yard", "yards",
	],
	attribute_terms: &[
		"leather",
		"suede",
		"silk",
		"satin",
		"linen",
		"cotton",
		"wool",
		"cashmere",
		"denim",
		"velvet",
		"lace",
		"chiffon",
		"sequin",
		"mesh",
		"tweed",
		"corduroy",
		"faux fur",
		"knit",
		"ribbed",
		"pleated",
		"ruched",
		"smocked",
		"embroidered",
		"quilted",
		"cropped",
		"high-waisted",
		"high waisted",
		"wrap",
		"halter",
		"strapless",
		"v-neck",
		"crew neck",
		"button-down",
		"zip",
		"pockets",
		"lined",
		"stretch",
		"polyester",
		"nylon",
		"patent",
	],
	browse_phrases: &[
		"show me everything",
		"show me all",
		"show everything",
		"show all",
		"show me",
		"browse",
		"everything",
		"view all",
		"see all",
		"shop all",
		"all items",
		"all products",
	],
	browse_fillers: &[
		"show", "me", "the", "all", "our", "your", "of", "in", "some", "any", "please", "items",
	],
	cross_category_exclusions: &[
		(
			"dress",
			&[
				"necklace", "earring", "bracelet", "pendant", "shoe", "heel", "boot", "sandal",
				"bag", "purse", "handbag", "hanger", "socks",
			],
		),
		("shoes", &["dress", "necklace", "earring", "bag", "purse", "socks", "skirt"]),
		("bags", &["dress", "shoe", "boot", "necklace", "earring", "skirt"]),
		("tops", &["dress", "pants", "skirt", "jeans", "shoe", "necklace", "earring"]),
		("bottoms", &["dress", "blouse", "shoe", "necklace", "earring", "jacket"]),
		("outerwear", &["dress", "shoe", "necklace", "earring", "bag", "skirt"]),
		("accessories", &["dress", "shoe", "boot", "pants", "skirt", "jacket", "blouse"]),
	],
	vision_keywords: &[
		"sexy",
		"elegant",
		"casual",
		"professional",
		"formal",
		"glamorous",
		"cute",
		"trendy",
		"stylish",
		"chic",
		"edgy",
		"bohemian",
		"vintage",
		"minimalist",
		"classic",
		"modern",
		"sophisticated",
		"high heel",
		"stiletto",
		"platform",
		"wedge",
		"flat",
		"thigh-high",
		"knee-high",
		"ankle",
		"bodycon",
		"flowy",
		"fitted",
		"loose",
		"tight",
		"sheer",
		"opaque",
		"sparkly",
		"metallic",
		"shiny",
		"strappy",
		"backless",
		"off-shoulder",
		"halter",
		"party",
		"club",
		"date night",
		"wedding",
		"cocktail",
		"red carpet",
		"gala",
		"prom",
	],
	refinement_qualifiers: &[
		"hiking",
		"running",
		"trail",
		"rain",
		"snow",
		"winter",
		"summer",
		"spring",
		"fall",
		"athletic",
		"workout",
		"sport",
		"sports",
		"gym",
		"outdoor",
		"waterproof",
		"insulated",
		"warm",
		"lightweight",
		"casual",
		"formal",
		"business",
		"office",
		"work",
		"comfortable",
		"stretchy",
		"slim",
		"oversized",
		"fitted",
	],
};

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn every_category_has_terms_and_keywords() {
		let lexicon = Lexicon::builtin();

		for category in CATEGORIES {
			assert!(!lexicon.category_terms_for(category).is_empty(), "{category} has no terms");
			assert!(
				!lookup(lexicon.category_keywords, category).is_empty(),
				"{category} has no keywords"
			);
		}
	}

	#[test]
	fn unknown_keys_resolve_to_empty() {
		assert!(Lexicon::builtin().color_synonyms_for("chartreuse").is_empty());
		assert!(Lexicon::builtin().category_terms_for(ANY_CATEGORY).is_empty());
	}
}
