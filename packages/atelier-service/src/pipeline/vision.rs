use futures::future::join_all;

use atelier_config::SearchVision;
use atelier_domain::query;

use crate::{
	BoxFuture, Product,
	pipeline::{Stage, StageContext, StageOutput, VisionSeam},
};

/// Re-orders the head of the list by how well each product image matches the query's look.
///
/// Runs only for style-driven queries on the first page, and only when a vision model is
/// configured.
pub struct VisionRerank;

impl Stage for VisionRerank {
	fn name(&self) -> &'static str {
		"vision_rerank"
	}

	fn apply<'a>(
		&'a self,
		ctx: &'a StageContext<'a>,
		products: Vec<Product>,
	) -> BoxFuture<'a, StageOutput> {
		Box::pin(async move {
			let Some(seam) = ctx.vision else {
				return StageOutput::unchanged(products);
			};

			let wanted = query::needs_visual_judgement(ctx.query, ctx.lexicon);

			if ctx.skip_vision || ctx.page > 1 || !wanted {
				return StageOutput::unchanged(products);
			}

			StageOutput::unchanged(rerank(products, ctx.query, seam, &ctx.search.vision).await)
		})
	}
}

/// Scores the first `max_to_analyze` images in sequential batches and sorts them by
/// `vision × vision_weight + similarity × 100 × text_weight`. The rest keep their order behind
/// them.
pub async fn rerank(
	mut products: Vec<Product>,
	query: &str,
	seam: VisionSeam<'_>,
	cfg: &SearchVision,
) -> Vec<Product> {
	let analyzed = products.len().min(cfg.max_to_analyze as usize);
	let rest = products.split_off(analyzed);
	let mut scores = Vec::with_capacity(analyzed);

	for batch in products.chunks(cfg.batch_size.max(1) as usize) {
		let runs = batch.iter().map(|product| score(product, query, seam, cfg.neutral_score));
		let batch_scores = join_all(runs).await;

		scores.extend(batch_scores);
	}

	let mut scored: Vec<(f32, Product)> = products
		.into_iter()
		.zip(scores)
		.map(|(mut product, score)| {
			let combined = score * cfg.vision_weight + product.similarity * 100.0 * cfg.text_weight;

			product.vision_score = Some(score);

			(combined, product)
		})
		.collect();

	scored.sort_by(|(lhs, _), (rhs, _)| rhs.total_cmp(lhs));

	scored.into_iter().map(|(_, product)| product).chain(rest).collect()
}

async fn score(product: &Product, query: &str, seam: VisionSeam<'_>, neutral: f32) -> f32 {
	if product.image_url.trim().is_empty() {
		return neutral;
	}

	match seam.provider.score_image(seam.cfg, &product.image_url, query, &product.title).await {
		Ok(scored) => scored.score,
		Err(err) => {
			tracing::warn!(
				stage = "vision_rerank",
				product_id = %product.id,
				error = %err,
				"Image scoring failed. Using neutral score."
			);

			neutral
		},
	}
}
