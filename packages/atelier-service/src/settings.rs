//! Time-bounded cache over the admin-maintained quality filter settings.

use std::{
	sync::{Arc, PoisonError, RwLock},
	time::Duration,
};

use tokio::time::Instant;

use atelier_config::QualityFilterSettings;

use crate::SettingsStore;

const DEFAULT_TTL: Duration = Duration::from_secs(60);

pub struct SettingsCache {
	store: Arc<dyn SettingsStore>,
	defaults: QualityFilterSettings,
	ttl: Duration,
	state: RwLock<Option<Cached>>,
}

struct Cached {
	settings: QualityFilterSettings,
	fetched_at: Instant,
}

impl SettingsCache {
	pub fn new(store: Arc<dyn SettingsStore>, defaults: QualityFilterSettings) -> Self {
		Self { store, defaults, ttl: DEFAULT_TTL, state: RwLock::new(None) }
	}

	/// Sets how long a loaded value is served before the store is read again.
	pub fn invalidate_after(mut self, ttl: Duration) -> Self {
		self.ttl = ttl;

		self
	}

	/// Current settings, reloading from the store once the cached value is older than the TTL.
	///
	/// Never fails: a store error serves the last known value, or the configured defaults.
	pub async fn get(&self) -> QualityFilterSettings {
		if let Some(settings) = self.fresh() {
			return settings;
		}

		self.refresh().await
	}

	/// Reads the store now regardless of age.
	pub async fn refresh(&self) -> QualityFilterSettings {
		let loaded = match self.store.load_settings().await {
			Ok(Some(settings)) => settings,
			Ok(None) => {
				tracing::debug!("No stored search settings. Using configured defaults.");

				self.defaults.clone()
			},
			Err(err) => {
				let fallback = self.last_known().unwrap_or_else(|| self.defaults.clone());

				tracing::warn!(error = %err, "Failed to load search settings. Serving fallback.");

				fallback
			},
		};
		let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);

		*state = Some(Cached { settings: loaded.clone(), fetched_at: Instant::now() });

		loaded
	}

	/// Drops the cached value so the next [`SettingsCache::get`] reads the store.
	pub fn invalidate(&self) {
		let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);

		*state = None;
	}

	fn fresh(&self) -> Option<QualityFilterSettings> {
		let state = self.state.read().unwrap_or_else(PoisonError::into_inner);

		state
			.as_ref()
			.filter(|cached| cached.fetched_at.elapsed() < self.ttl)
			.map(|cached| cached.settings.clone())
	}

	fn last_known(&self) -> Option<QualityFilterSettings> {
		let state = self.state.read().unwrap_or_else(PoisonError::into_inner);

		state.as_ref().map(|cached| cached.settings.clone())
	}
}

#[cfg(test)]
mod tests {
	use std::sync::{
		Arc,
		atomic::{AtomicBool, AtomicUsize, Ordering},
	};

	use super::*;
	use crate::BoxFuture;

	struct CountingStore {
		calls: Arc<AtomicUsize>,
		failing: Arc<AtomicBool>,
		min_price: f64,
	}

	impl SettingsStore for CountingStore {
		fn load_settings(
			&self,
		) -> BoxFuture<'_, atelier_storage::Result<Option<QualityFilterSettings>>> {
			let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
			let failing = self.failing.load(Ordering::SeqCst);
			let min_price = self.min_price;

			Box::pin(async move {
				if failing {
					return Err(atelier_storage::Error::InvalidArgument(
						"store offline".to_string(),
					));
				}

				Ok(Some(QualityFilterSettings {
					min_price_threshold: min_price + call as f64,
					..QualityFilterSettings::default()
				}))
			})
		}
	}

	fn cache(calls: &Arc<AtomicUsize>, failing: &Arc<AtomicBool>) -> SettingsCache {
		let store =
			CountingStore { calls: calls.clone(), failing: failing.clone(), min_price: 10.0 };

		SettingsCache::new(Arc::new(store), QualityFilterSettings::default())
			.invalidate_after(Duration::from_secs(60))
	}

	#[tokio::test(start_paused = true)]
	async fn serves_cached_value_until_ttl_expires() {
		let calls = Arc::new(AtomicUsize::new(0));
		let failing = Arc::new(AtomicBool::new(false));
		let cache = cache(&calls, &failing);

		assert_eq!(cache.get().await.min_price_threshold, 11.0);
		tokio::time::advance(Duration::from_secs(30)).await;
		assert_eq!(cache.get().await.min_price_threshold, 11.0);
		assert_eq!(calls.load(Ordering::SeqCst), 1);

		tokio::time::advance(Duration::from_secs(31)).await;
		assert_eq!(cache.get().await.min_price_threshold, 12.0);
		assert_eq!(calls.load(Ordering::SeqCst), 2);
	}

	#[tokio::test(start_paused = true)]
	async fn store_errors_keep_last_known_settings() {
		let calls = Arc::new(AtomicUsize::new(0));
		let failing = Arc::new(AtomicBool::new(false));
		let cache = cache(&calls, &failing);

		assert_eq!(cache.get().await.min_price_threshold, 11.0);

		failing.store(true, Ordering::SeqCst);
		tokio::time::advance(Duration::from_secs(61)).await;

		assert_eq!(cache.get().await.min_price_threshold, 11.0);
	}

	#[tokio::test]
	async fn store_errors_without_history_use_defaults() {
		let calls = Arc::new(AtomicUsize::new(0));
		let failing = Arc::new(AtomicBool::new(true));
		let cache = cache(&calls, &failing);

		assert_eq!(cache.get().await, QualityFilterSettings::default());
	}

	#[tokio::test]
	async fn invalidate_forces_a_reload() {
		let calls = Arc::new(AtomicUsize::new(0));
		let failing = Arc::new(AtomicBool::new(false));
		let cache = cache(&calls, &failing);

		cache.get().await;
		cache.invalidate();

		assert_eq!(cache.get().await.min_price_threshold, 12.0);
		assert_eq!(calls.load(Ordering::SeqCst), 2);
	}
}
