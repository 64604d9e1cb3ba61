use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	#[serde(default)]
	pub search: Search,
	#[serde(default)]
	pub settings: Settings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	#[serde(default = "default_log_level")]
	pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
	pub text_vector_dim: u32,
	pub image_vector_dim: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
	pub llm_intent: LlmProviderConfig,
	/// Optional. CLIP-style text encoder whose vectors live in the stored image embedding space.
	pub image_embedding: Option<EmbeddingProviderConfig>,
	/// Optional. Vision-capable chat model used for re-ranking and image description.
	pub vision: Option<LlmProviderConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	#[serde(default = "default_max_tokens")]
	pub max_tokens: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Search {
	pub default_limit: u32,
	pub max_limit: u32,
	pub min_query_chars: u32,
	pub similarity_threshold: f32,
	pub diversity_factor: f32,
	/// Candidate pool size for a first-page search.
	pub pool_size: u32,
	pub fetch_multiplier: f32,
	pub max_fetch_per_query: u32,
	/// Merchant name (case-insensitive substring) held to a stricter similarity bar.
	pub low_trust_merchant: Option<String>,
	pub low_trust_penalty: f32,
	pub clip_text_weight: f32,
	pub clip_image_weight: f32,
	pub tiers: SearchTiers,
	pub diversity: SearchDiversity,
	pub vision: SearchVision,
	pub personalization: SearchPersonalization,
	pub quality: SearchQuality,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchTiers {
	pub boosts: Vec<SearchTierBoost>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SearchTierBoost {
	/// Inclusive upper bound of the zero-based result position this boost applies to.
	pub max_position: u32,
	pub boost: f32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchDiversity {
	pub brand_cap: u32,
	pub high_tier: f32,
	pub mid_tier: f32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchVision {
	pub max_to_analyze: u32,
	pub batch_size: u32,
	pub vision_weight: f32,
	pub text_weight: f32,
	pub neutral_score: f32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchPersonalization {
	pub community_timeout_ms: u64,
	pub veto_min_ratings: u32,
	pub veto_percent: f32,
	pub boost_min_ratings: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchQuality {
	pub message: String,
	pub min_max_similarity: f32,
	pub min_avg_similarity: f32,
	pub min_color_matches: u32,
	pub min_results: u32,
	pub min_category_matches: u32,
	/// Share of candidates the price filter may remove before the result set counts as weak.
	pub max_price_removed_ratio: f32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
	pub cache_ttl_secs: u64,
	pub defaults: QualityFilterSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct QualityFilterSettings {
	pub min_price_threshold: f64,
	pub enable_mens_filter: bool,
	pub enable_price_filter: bool,
	pub enable_non_apparel_filter: bool,
	/// One of auto, hybrid, or vector.
	pub search_mode: String,
	pub hybrid_vector_weight: f32,
	pub hybrid_text_weight: f32,
}

impl Default for Search {
	fn default() -> Self {
		Self {
			default_limit: 12,
			max_limit: 50,
			min_query_chars: 3,
			similarity_threshold: 0.3,
			diversity_factor: 0.1,
			pool_size: 120,
			fetch_multiplier: 1.5,
			max_fetch_per_query: 200,
			low_trust_merchant: None,
			low_trust_penalty: 0.1,
			clip_text_weight: 0.7,
			clip_image_weight: 0.3,
			tiers: SearchTiers::default(),
			diversity: SearchDiversity::default(),
			vision: SearchVision::default(),
			personalization: SearchPersonalization::default(),
			quality: SearchQuality::default(),
		}
	}
}

impl Default for SearchTiers {
	fn default() -> Self {
		Self {
			boosts: vec![
				SearchTierBoost { max_position: 0, boost: 0.10 },
				SearchTierBoost { max_position: 2, boost: 0.07 },
				SearchTierBoost { max_position: 5, boost: 0.05 },
				SearchTierBoost { max_position: 11, boost: 0.02 },
			],
		}
	}
}

impl Default for SearchDiversity {
	fn default() -> Self {
		Self { brand_cap: 10, high_tier: 0.6, mid_tier: 0.4 }
	}
}

impl Default for SearchVision {
	fn default() -> Self {
		Self {
			max_to_analyze: 12,
			batch_size: 3,
			vision_weight: 0.7,
			text_weight: 0.3,
			neutral_score: 5.0,
		}
	}
}

impl Default for SearchPersonalization {
	fn default() -> Self {
		Self {
			community_timeout_ms: 5_000,
			veto_min_ratings: 10,
			veto_percent: 51.0,
			boost_min_ratings: 5,
		}
	}
}

impl Default for SearchQuality {
	fn default() -> Self {
		Self {
			message: "We couldn't find many strong matches for this search. Try different wording \
or fewer constraints."
				.to_string(),
			min_max_similarity: 0.30,
			min_avg_similarity: 0.25,
			min_color_matches: 6,
			min_results: 12,
			min_category_matches: 6,
			max_price_removed_ratio: 0.5,
		}
	}
}

impl Default for Settings {
	fn default() -> Self {
		Self { cache_ttl_secs: 60, defaults: QualityFilterSettings::default() }
	}
}

impl Default for QualityFilterSettings {
	fn default() -> Self {
		Self {
			min_price_threshold: 0.0,
			enable_mens_filter: true,
			enable_price_filter: true,
			enable_non_apparel_filter: true,
			search_mode: "auto".to_string(),
			hybrid_vector_weight: 0.7,
			hybrid_text_weight: 0.3,
		}
	}
}

fn default_log_level() -> String {
	"info".to_string()
}

fn default_max_tokens() -> u32 {
	1_024
}
