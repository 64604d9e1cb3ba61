use atelier_config::SearchTierBoost;

use crate::{
	BoxFuture, Product,
	pipeline::{Stage, StageContext, StageOutput},
};

/// Position-dependent similarity bar: the top slots must clear a higher threshold than the tail.
pub struct TieredThreshold;

impl Stage for TieredThreshold {
	fn name(&self) -> &'static str {
		"tiered_threshold"
	}

	fn apply<'a>(
		&'a self,
		ctx: &'a StageContext<'a>,
		products: Vec<Product>,
	) -> BoxFuture<'a, StageOutput> {
		Box::pin(async move {
			if ctx.browse.is_some() {
				return StageOutput::unchanged(products);
			}

			let boosts = &ctx.search.tiers.boosts;

			StageOutput::unchanged(apply_tiers(products, ctx.similarity_threshold, boosts))
		})
	}
}

/// Keeps a product when its similarity clears `threshold` plus the boost for its input position.
pub fn apply_tiers(
	products: Vec<Product>,
	threshold: f32,
	boosts: &[SearchTierBoost],
) -> Vec<Product> {
	products
		.into_iter()
		.enumerate()
		.filter(|(position, product)| {
			product.similarity >= threshold + position_boost(*position, boosts)
		})
		.map(|(_, product)| product)
		.collect()
}

/// Boost of the tightest tier covering `position`, or 0 past the last tier.
pub fn position_boost(position: usize, boosts: &[SearchTierBoost]) -> f32 {
	boosts
		.iter()
		.filter(|tier| position <= tier.max_position as usize)
		.min_by_key(|tier| tier.max_position)
		.map(|tier| tier.boost)
		.unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
	use atelier_config::SearchTiers;

	use super::*;
	use crate::pipeline::testing::{ids, product};

	#[test]
	fn boosts_follow_position_tiers() {
		let boosts = SearchTiers::default().boosts;

		assert_eq!(position_boost(0, &boosts), 0.10);
		assert_eq!(position_boost(2, &boosts), 0.07);
		assert_eq!(position_boost(3, &boosts), 0.05);
		assert_eq!(position_boost(11, &boosts), 0.02);
		assert_eq!(position_boost(12, &boosts), 0.0);
	}

	#[test]
	fn the_top_slot_needs_a_strong_match() {
		let boosts = SearchTiers::default().boosts;
		let products = vec![
			product("weak-top", "Dress", 0.38),
			product("second", "Dress", 0.38),
			product("tail", "Dress", 0.31),
		];
		let kept = apply_tiers(products, 0.3, &boosts);

		// Positions are input positions: 0 needs 0.40, 1 needs 0.37, 2 needs 0.37.
		assert_eq!(ids(&kept), vec!["second"]);
	}
}
