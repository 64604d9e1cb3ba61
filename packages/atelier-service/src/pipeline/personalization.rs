use std::{collections::HashMap, time::Duration};

use atelier_config::SearchPersonalization;

use crate::{
	BoxFuture, CommunityStats, CommunityStatsStore, Product,
	pipeline::{Stage, StageContext, StageOutput},
};

const HIDE_AT_OR_BELOW: u8 = 2;

/// Applies the shopper's own ratings and the community's, when the shopper has rated anything.
pub struct Personalization;

impl Stage for Personalization {
	fn name(&self) -> &'static str {
		"personalization"
	}

	fn apply<'a>(
		&'a self,
		ctx: &'a StageContext<'a>,
		mut products: Vec<Product>,
	) -> BoxFuture<'a, StageOutput> {
		Box::pin(async move {
			if ctx.user_ratings.is_empty() {
				return StageOutput::unchanged(products);
			}

			products.retain(|product| {
				ctx.user_ratings.get(&product.id).is_none_or(|rating| *rating > HIDE_AT_OR_BELOW)
			});

			let ids: Vec<String> = products.iter().map(|product| product.id.clone()).collect();
			let cfg = &ctx.search.personalization;
			let stats = fetch_community_stats(ctx.community, &ids, cfg).await;

			StageOutput::unchanged(personalize(products, ctx.user_ratings, &stats, cfg))
		})
	}
}

/// Community stats bounded by the configured timeout. Failures mean "no community data".
pub async fn fetch_community_stats(
	store: &dyn CommunityStatsStore,
	product_ids: &[String],
	cfg: &SearchPersonalization,
) -> HashMap<String, CommunityStats> {
	if product_ids.is_empty() {
		return HashMap::new();
	}

	let timeout = Duration::from_millis(cfg.community_timeout_ms);

	match tokio::time::timeout(timeout, store.community_stats(product_ids)).await {
		Ok(Ok(stats)) => stats,
		Ok(Err(err)) => {
			tracing::warn!(stage = "personalization", error = %err, "Community stats unavailable.");

			HashMap::new()
		},
		Err(_) => {
			tracing::warn!(
				stage = "personalization",
				timeout_ms = cfg.community_timeout_ms,
				"Community stats timed out."
			);

			HashMap::new()
		},
	}
}

/// Hides products the shopper rated poorly or the community vetoed, then boosts and re-sorts the
/// rest by adjusted similarity.
pub fn personalize(
	products: Vec<Product>,
	user_ratings: &HashMap<String, u8>,
	stats: &HashMap<String, CommunityStats>,
	cfg: &SearchPersonalization,
) -> Vec<Product> {
	let mut kept: Vec<Product> = products
		.into_iter()
		.filter(|product| {
			user_ratings.get(&product.id).is_none_or(|rating| *rating > HIDE_AT_OR_BELOW)
		})
		.filter(|product| {
			let vetoed = stats.get(&product.id).is_some_and(|stats| community_veto(stats, cfg));

			if vetoed {
				tracing::debug!(product_id = %product.id, "Hidden by community veto.");
			}

			!vetoed
		})
		.collect();

	for product in &mut kept {
		product.similarity += personal_boost(user_ratings.get(&product.id).copied())
			+ community_boost(stats.get(&product.id), cfg);
	}

	kept.sort_by(|lhs, rhs| rhs.similarity.total_cmp(&lhs.similarity));

	kept
}

pub fn community_veto(stats: &CommunityStats, cfg: &SearchPersonalization) -> bool {
	stats.total_ratings >= cfg.veto_min_ratings && stats.pct_two_or_less >= cfg.veto_percent
}

pub fn personal_boost(rating: Option<u8>) -> f32 {
	match rating {
		Some(5) => 0.15,
		Some(4) => 0.10,
		Some(3) => 0.05,
		_ => 0.0,
	}
}

/// Up to 0.12 for a strong five-star share plus up to 0.06 for a strong three-plus share.
pub fn community_boost(stats: Option<&CommunityStats>, cfg: &SearchPersonalization) -> f32 {
	let Some(stats) = stats.filter(|stats| stats.total_ratings >= cfg.boost_min_ratings) else {
		return 0.0;
	};
	let five_star = if stats.pct_five >= 60.0 {
		0.12
	} else if stats.pct_five >= 40.0 {
		0.08
	} else if stats.pct_five >= 20.0 {
		0.04
	} else {
		0.0
	};
	let three_plus = if stats.pct_three_plus >= 80.0 {
		0.06
	} else if stats.pct_three_plus >= 60.0 {
		0.03
	} else {
		0.0
	};

	five_star + three_plus
}

#[cfg(test)]
mod tests {
	use atelier_config::Search;

	use super::*;
	use crate::pipeline::testing::{context, ids, intent, product};

	struct HangingCommunity;

	impl CommunityStatsStore for HangingCommunity {
		fn community_stats<'a>(
			&'a self,
			_: &'a [String],
		) -> BoxFuture<'a, atelier_storage::Result<HashMap<String, CommunityStats>>> {
			Box::pin(std::future::pending())
		}
	}

	struct FailingCommunity;

	impl CommunityStatsStore for FailingCommunity {
		fn community_stats<'a>(
			&'a self,
			_: &'a [String],
		) -> BoxFuture<'a, atelier_storage::Result<HashMap<String, CommunityStats>>> {
			Box::pin(async {
				Err(atelier_storage::Error::InvalidArgument("ratings table missing".to_string()))
			})
		}
	}

	struct FixedCommunity(HashMap<String, CommunityStats>);

	impl CommunityStatsStore for FixedCommunity {
		fn community_stats<'a>(
			&'a self,
			product_ids: &'a [String],
		) -> BoxFuture<'a, atelier_storage::Result<HashMap<String, CommunityStats>>> {
			Box::pin(async move {
				Ok(self
					.0
					.iter()
					.filter(|(id, _)| product_ids.contains(id))
					.map(|(id, stats)| (id.clone(), *stats))
					.collect())
			})
		}
	}

	fn stats(
		total_ratings: u32,
		pct_five: f32,
		pct_three_plus: f32,
		pct_two_or_less: f32,
	) -> CommunityStats {
		CommunityStats { total_ratings, avg_rating: 0.0, pct_three_plus, pct_five, pct_two_or_less }
	}

	#[test]
	fn own_low_ratings_and_vetoes_hide_products() {
		let cfg = SearchPersonalization::default();
		let user_ratings =
			HashMap::from([("disliked".to_string(), 2_u8), ("loved".to_string(), 5)]);
		let community = HashMap::from([("panned".to_string(), stats(12, 5.0, 30.0, 60.0))]);
		let products = vec![
			product("plain", "Dress", 0.7),
			product("disliked", "Dress", 0.9),
			product("panned", "Dress", 0.8),
			product("loved", "Dress", 0.6),
		];
		let kept = personalize(products, &user_ratings, &community, &cfg);

		// loved: 0.6 + 0.15 = 0.75 overtakes plain.
		assert_eq!(ids(&kept), vec!["loved", "plain"]);
	}

	#[test]
	fn small_samples_neither_veto_nor_boost() {
		let cfg = SearchPersonalization::default();

		assert!(!community_veto(&stats(9, 0.0, 0.0, 100.0), &cfg));
		assert_eq!(community_boost(Some(&stats(4, 100.0, 100.0, 0.0)), &cfg), 0.0);
	}

	#[test]
	fn community_boost_tiers() {
		let cfg = SearchPersonalization::default();

		assert!((community_boost(Some(&stats(20, 65.0, 85.0, 5.0)), &cfg) - 0.18).abs() < 1e-6);
		assert!((community_boost(Some(&stats(20, 45.0, 65.0, 5.0)), &cfg) - 0.11).abs() < 1e-6);
		assert!((community_boost(Some(&stats(20, 25.0, 50.0, 5.0)), &cfg) - 0.04).abs() < 1e-6);
		assert_eq!(community_boost(None, &cfg), 0.0);
	}

	#[test]
	fn personal_boost_by_rating() {
		assert_eq!(personal_boost(Some(5)), 0.15);
		assert_eq!(personal_boost(Some(4)), 0.10);
		assert_eq!(personal_boost(Some(3)), 0.05);
		assert_eq!(personal_boost(Some(1)), 0.0);
		assert_eq!(personal_boost(None), 0.0);
	}

	#[tokio::test(start_paused = true)]
	async fn community_stats_fail_open() {
		let cfg = SearchPersonalization::default();
		let ids = vec!["a".to_string(), "b".to_string()];

		assert!(fetch_community_stats(&HangingCommunity, &ids, &cfg).await.is_empty());
		assert!(fetch_community_stats(&FailingCommunity, &ids, &cfg).await.is_empty());
	}

	#[tokio::test(start_paused = true)]
	async fn stalled_community_store_leaves_the_order_alone() {
		let search = Search::default();
		let ratings = HashMap::from([("elsewhere".to_string(), 4_u8)]);
		let intent = intent(&["dress"]);
		let mut ctx = context("silk dress", &intent, &search, &ratings);

		ctx.community = &HangingCommunity;

		let products = vec![
			product("a", "Silk dress", 0.9),
			product("b", "Satin dress", 0.8),
			product("c", "Slip dress", 0.7),
		];
		let output = Personalization.apply(&ctx, products).await;

		assert_eq!(ids(&output.products), vec!["a", "b", "c"]);
	}

	#[tokio::test]
	async fn community_veto_and_boost_apply_in_the_stage() {
		let search = Search::default();
		let ratings = HashMap::from([("elsewhere".to_string(), 4_u8)]);
		let intent = intent(&["dress"]);
		let community = FixedCommunity(HashMap::from([
			("panned".to_string(), stats(40, 0.0, 20.0, 70.0)),
			("adored".to_string(), stats(30, 70.0, 90.0, 2.0)),
		]));
		let mut ctx = context("silk dress", &intent, &search, &ratings);

		ctx.community = &community;

		let products = vec![
			product("panned", "Silk dress", 0.9),
			product("plain", "Satin dress", 0.8),
			product("adored", "Slip dress", 0.7),
		];
		let output = Personalization.apply(&ctx, products).await;

		// adored: 0.7 + 0.12 + 0.06 = 0.88 overtakes plain.
		assert_eq!(ids(&output.products), vec!["adored", "plain"]);
	}
}
