mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, EmbeddingProviderConfig, LlmProviderConfig, Postgres, Providers,
	QualityFilterSettings, Search, SearchDiversity, SearchPersonalization, SearchQuality,
	SearchTierBoost, SearchTiers, SearchVision, Service, Settings, Storage,
};

use std::{fs, path::Path};

pub const SEARCH_MODES: [&str; 3] = ["auto", "hybrid", "vector"];

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.storage.postgres.dsn.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.postgres.dsn must be non-empty.".to_string(),
		});
	}
	if cfg.storage.text_vector_dim == 0 || cfg.storage.image_vector_dim == 0 {
		return Err(Error::Validation {
			message: "storage vector dimensions must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions != cfg.storage.text_vector_dim {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must match storage.text_vector_dim."
				.to_string(),
		});
	}
	if let Some(image) = cfg.providers.image_embedding.as_ref()
		&& image.dimensions != cfg.storage.image_vector_dim
	{
		return Err(Error::Validation {
			message: "providers.image_embedding.dimensions must match storage.image_vector_dim."
				.to_string(),
		});
	}

	for (label, key) in [
		("embedding", &cfg.providers.embedding.api_key),
		("llm_intent", &cfg.providers.llm_intent.api_key),
	] {
		if key.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("Provider {label} api_key must be non-empty."),
			});
		}
	}

	validate_search(&cfg.search)?;
	validate_settings(&cfg.settings.defaults)?;

	Ok(())
}

fn validate_search(search: &Search) -> Result<()> {
	if search.max_limit == 0 {
		return Err(Error::Validation {
			message: "search.max_limit must be greater than zero.".to_string(),
		});
	}
	if search.default_limit == 0 || search.default_limit > search.max_limit {
		return Err(Error::Validation {
			message: "search.default_limit must be between 1 and search.max_limit.".to_string(),
		});
	}
	if search.pool_size == 0 || search.max_fetch_per_query == 0 {
		return Err(Error::Validation {
			message: "search.pool_size and search.max_fetch_per_query must be greater than zero."
				.to_string(),
		});
	}
	if !search.fetch_multiplier.is_finite() || search.fetch_multiplier <= 0.0 {
		return Err(Error::Validation {
			message: "search.fetch_multiplier must be a positive finite number.".to_string(),
		});
	}

	for (label, value) in [
		("search.similarity_threshold", search.similarity_threshold),
		("search.diversity_factor", search.diversity_factor),
		("search.low_trust_penalty", search.low_trust_penalty),
		("search.clip_text_weight", search.clip_text_weight),
		("search.clip_image_weight", search.clip_image_weight),
		("search.diversity.high_tier", search.diversity.high_tier),
		("search.diversity.mid_tier", search.diversity.mid_tier),
		("search.vision.vision_weight", search.vision.vision_weight),
		("search.vision.text_weight", search.vision.text_weight),
		("search.quality.min_max_similarity", search.quality.min_max_similarity),
		("search.quality.min_avg_similarity", search.quality.min_avg_similarity),
		("search.quality.max_price_removed_ratio", search.quality.max_price_removed_ratio),
	] {
		check_unit_interval(label, value)?;
	}

	if search.diversity.mid_tier > search.diversity.high_tier {
		return Err(Error::Validation {
			message: "search.diversity.mid_tier must not exceed search.diversity.high_tier."
				.to_string(),
		});
	}

	let mut last_position = None;

	for tier in &search.tiers.boosts {
		check_unit_interval("search.tiers.boosts.boost", tier.boost)?;

		if last_position.map(|last| tier.max_position <= last).unwrap_or(false) {
			return Err(Error::Validation {
				message: "search.tiers.boosts must be ordered by increasing max_position."
					.to_string(),
			});
		}

		last_position = Some(tier.max_position);
	}

	if search.vision.batch_size == 0 {
		return Err(Error::Validation {
			message: "search.vision.batch_size must be greater than zero.".to_string(),
		});
	}
	if !(0.0..=10.0).contains(&search.vision.neutral_score) {
		return Err(Error::Validation {
			message: "search.vision.neutral_score must be in the range 0-10.".to_string(),
		});
	}
	if !(0.0..=100.0).contains(&search.personalization.veto_percent) {
		return Err(Error::Validation {
			message: "search.personalization.veto_percent must be in the range 0-100.".to_string(),
		});
	}
	if search.quality.message.trim().is_empty() {
		return Err(Error::Validation {
			message: "search.quality.message must be non-empty.".to_string(),
		});
	}

	Ok(())
}

fn validate_settings(settings: &QualityFilterSettings) -> Result<()> {
	if !SEARCH_MODES.contains(&settings.search_mode.as_str()) {
		return Err(Error::Validation {
			message: "settings.defaults.search_mode must be one of auto, hybrid, or vector."
				.to_string(),
		});
	}
	if !settings.min_price_threshold.is_finite() || settings.min_price_threshold < 0.0 {
		return Err(Error::Validation {
			message: "settings.defaults.min_price_threshold must be zero or greater.".to_string(),
		});
	}

	check_unit_interval("settings.defaults.hybrid_vector_weight", settings.hybrid_vector_weight)?;
	check_unit_interval("settings.defaults.hybrid_text_weight", settings.hybrid_text_weight)?;

	if settings.hybrid_vector_weight + settings.hybrid_text_weight <= 0.0 {
		return Err(Error::Validation {
			message: "settings.defaults hybrid weights must sum to a positive value.".to_string(),
		});
	}

	Ok(())
}

fn check_unit_interval(label: &str, value: f32) -> Result<()> {
	if !value.is_finite() {
		return Err(Error::Validation { message: format!("{label} must be a finite number.") });
	}
	if !(0.0..=1.0).contains(&value) {
		return Err(Error::Validation {
			message: format!("{label} must be in the range 0.0-1.0."),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	// Optional providers with a blank key are treated as switched off.
	if cfg.providers.image_embedding.as_ref().map(|p| p.api_key.trim().is_empty()).unwrap_or(false)
	{
		cfg.providers.image_embedding = None;
	}
	if cfg.providers.vision.as_ref().map(|p| p.api_key.trim().is_empty()).unwrap_or(false) {
		cfg.providers.vision = None;
	}
	if cfg.search.low_trust_merchant.as_deref().map(|name| name.trim().is_empty()).unwrap_or(false)
	{
		cfg.search.low_trust_merchant = None;
	}

	cfg.settings.defaults.search_mode = cfg.settings.defaults.search_mode.trim().to_lowercase();
}
