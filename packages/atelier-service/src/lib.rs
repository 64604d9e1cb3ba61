//! Natural-language product search over a fashion catalog.
//!
//! A search is parsed into an intent, fanned out as weighted sub-queries, merged and diversified,
//! then narrowed by an ordered pipeline of post-filter stages before a page is cut. Every external
//! dependency sits behind a trait so the whole flow runs against in-memory fakes in tests.

pub mod browse;
pub mod executor;
pub mod intent;
pub mod mode;
pub mod pipeline;
pub mod ranker;
pub mod refine;
pub mod response;
pub mod search;
pub mod settings;
pub mod store;
pub mod types;
pub mod visual;

mod error;

pub use error::{Error, Result};
pub use refine::{RefineResponse, RefinementIntent};
pub use settings::SettingsCache;
pub use types::{
	CommunityStats, Product, SearchIntent, SearchOptions, SearchResponse, SubQuery,
};

use std::{
	collections::HashMap,
	future::Future,
	pin::Pin,
	sync::{Arc, Mutex, PoisonError},
	time::Duration,
};

use rand::{SeedableRng, rngs::StdRng};
use serde_json::Value;

use atelier_config::{Config, EmbeddingProviderConfig, LlmProviderConfig, QualityFilterSettings};
use atelier_domain::Lexicon;
use atelier_providers::{chat, clip, embedding, vision, vision::VisionScore};
use atelier_storage::{
	catalog::{LexicalQuery, VectorFilters},
	db::Db,
};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, atelier_providers::Result<Vec<Vec<f32>>>>;
}

/// Text encoder into the image embedding space.
pub trait ImageEmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed_text<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, atelier_providers::Result<Vec<f32>>>;
}

pub trait IntentProvider
where
	Self: Send + Sync,
{
	fn complete<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, atelier_providers::Result<String>>;
}

pub trait VisionProvider
where
	Self: Send + Sync,
{
	fn score_image<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		image_url: &'a str,
		query: &'a str,
		product_title: &'a str,
	) -> BoxFuture<'a, atelier_providers::Result<VisionScore>>;

	fn describe_images<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		image_urls: &'a [String],
	) -> BoxFuture<'a, atelier_providers::Result<String>>;
}

pub trait CatalogStore
where
	Self: Send + Sync,
{
	fn vector_search<'a>(
		&'a self,
		embedding: &'a [f32],
		limit: u32,
		filters: &'a VectorFilters,
	) -> BoxFuture<'a, atelier_storage::Result<Vec<Product>>>;

	fn hybrid_search<'a>(
		&'a self,
		embedding: &'a [f32],
		text: &'a str,
		limit: u32,
		vector_weight: f32,
		text_weight: f32,
	) -> BoxFuture<'a, atelier_storage::Result<Vec<Product>>>;

	fn lexical_search<'a>(
		&'a self,
		query: &'a LexicalQuery,
	) -> BoxFuture<'a, atelier_storage::Result<CatalogPage>>;
}

pub trait SettingsStore
where
	Self: Send + Sync,
{
	/// `Ok(None)` when no settings row has been written yet.
	fn load_settings(
		&self,
	) -> BoxFuture<'_, atelier_storage::Result<Option<QualityFilterSettings>>>;
}

pub trait CommunityStatsStore
where
	Self: Send + Sync,
{
	/// Stats for the products that have any ratings. Unrated ids are absent from the map.
	fn community_stats<'a>(
		&'a self,
		product_ids: &'a [String],
	) -> BoxFuture<'a, atelier_storage::Result<HashMap<String, CommunityStats>>>;
}

#[derive(Debug, Clone, Default)]
pub struct CatalogPage {
	pub products: Vec<Product>,
	/// Matching products across all pages.
	pub total: u64,
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub image_embedding: Arc<dyn ImageEmbeddingProvider>,
	pub intent: Arc<dyn IntentProvider>,
	pub vision: Arc<dyn VisionProvider>,
}

#[derive(Clone)]
pub struct Stores {
	pub catalog: Arc<dyn CatalogStore>,
	pub settings: Arc<dyn SettingsStore>,
	pub community: Arc<dyn CommunityStatsStore>,
}

pub struct AtelierService {
	pub cfg: Config,
	pub providers: Providers,
	pub stores: Stores,
	pub lexicon: &'static Lexicon,
	settings: SettingsCache,
	rng: Mutex<StdRng>,
}

struct DefaultProviders;

impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, atelier_providers::Result<Vec<Vec<f32>>>> {
		Box::pin(embedding::embed(cfg, texts))
	}
}

impl ImageEmbeddingProvider for DefaultProviders {
	fn embed_text<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, atelier_providers::Result<Vec<f32>>> {
		Box::pin(clip::embed_text(cfg, text))
	}
}

impl IntentProvider for DefaultProviders {
	fn complete<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, atelier_providers::Result<String>> {
		Box::pin(chat::complete(cfg, messages))
	}
}

impl VisionProvider for DefaultProviders {
	fn score_image<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		image_url: &'a str,
		query: &'a str,
		product_title: &'a str,
	) -> BoxFuture<'a, atelier_providers::Result<VisionScore>> {
		Box::pin(vision::score_image(cfg, image_url, query, product_title))
	}

	fn describe_images<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		image_urls: &'a [String],
	) -> BoxFuture<'a, atelier_providers::Result<String>> {
		Box::pin(vision::describe_images(cfg, image_urls))
	}
}

impl Providers {
	pub fn new(
		embedding: Arc<dyn EmbeddingProvider>,
		image_embedding: Arc<dyn ImageEmbeddingProvider>,
		intent: Arc<dyn IntentProvider>,
		vision: Arc<dyn VisionProvider>,
	) -> Self {
		Self { embedding, image_embedding, intent, vision }
	}
}

impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self {
			embedding: provider.clone(),
			image_embedding: provider.clone(),
			intent: provider.clone(),
			vision: provider,
		}
	}
}

impl Stores {
	pub fn new(
		catalog: Arc<dyn CatalogStore>,
		settings: Arc<dyn SettingsStore>,
		community: Arc<dyn CommunityStatsStore>,
	) -> Self {
		Self { catalog, settings, community }
	}

	pub fn postgres(db: Db) -> Self {
		let store = Arc::new(store::PgStores::new(db));

		Self { catalog: store.clone(), settings: store.clone(), community: store }
	}
}

impl AtelierService {
	pub fn new(cfg: Config, db: Db) -> Self {
		Self::with_providers(cfg, Providers::default(), Stores::postgres(db))
	}

	pub fn with_providers(cfg: Config, providers: Providers, stores: Stores) -> Self {
		let settings =
			SettingsCache::new(stores.settings.clone(), cfg.settings.defaults.clone())
				.invalidate_after(Duration::from_secs(cfg.settings.cache_ttl_secs));

		Self {
			cfg,
			providers,
			stores,
			lexicon: Lexicon::builtin(),
			settings,
			rng: Mutex::new(StdRng::from_entropy()),
		}
	}

	/// Fixes the diversity sampler so repeated searches rank identically.
	pub fn with_rng_seed(mut self, seed: u64) -> Self {
		self.rng = Mutex::new(StdRng::seed_from_u64(seed));

		self
	}

	pub fn settings(&self) -> &SettingsCache {
		&self.settings
	}

	pub(crate) fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
		let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);

		f(&mut rng)
	}
}
