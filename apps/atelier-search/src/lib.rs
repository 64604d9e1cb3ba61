use std::path::PathBuf;

use clap::{
	Parser,
	builder::{
		Styles,
		styling::{AnsiColor, Effects},
	},
};
use color_eyre::eyre;
use tracing_subscriber::EnvFilter;

use atelier_service::{AtelierService, SearchOptions};
use atelier_storage::db::Db;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Parser)]
#[command(
	version = VERSION,
	rename_all = "kebab",
	styles = styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	/// What the shopper is looking for. Optional when searching by image.
	pub query: Option<String>,
	#[arg(long)]
	pub limit: Option<u32>,
	#[arg(long)]
	pub page: Option<u32>,
	#[arg(long)]
	pub similarity_threshold: Option<f32>,
	#[arg(long)]
	pub diversity_factor: Option<f32>,
	/// Example image URL. Repeat for up to three images.
	#[arg(long = "image", value_name = "URL")]
	pub images: Vec<String>,
	#[arg(long)]
	pub allow_unsafe_content: bool,
	#[arg(long)]
	pub skip_vision_reranking: bool,
	/// Fixes the diversity sampler for reproducible rankings.
	#[arg(long)]
	pub seed: Option<u64>,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = atelier_config::load(&args.config)?;
	init_tracing(&config)?;
	let db = Db::connect(&config.storage.postgres).await?;
	db.ensure_schema(config.storage.text_vector_dim, config.storage.image_vector_dim).await?;

	let mut service = AtelierService::new(config, db);
	if let Some(seed) = args.seed {
		service = service.with_rng_seed(seed);
	}

	let options = SearchOptions {
		limit: args.limit,
		page: args.page,
		similarity_threshold: args.similarity_threshold,
		diversity_factor: args.diversity_factor,
		allow_unsafe_content: args.allow_unsafe_content,
		skip_vision_reranking: args.skip_vision_reranking,
		..SearchOptions::default()
	};
	let response = match (args.query.as_deref(), args.images.is_empty()) {
		(query, false) => service.search_by_images(&args.images, query, &options).await?,
		(Some(query), true) => service.search(query, &options).await?,
		(None, true) => return Err(eyre::eyre!("Provide a query or at least one --image.")),
	};

	tracing::info!(
		total = response.total_count,
		page = response.page,
		warned = response.quality_warning.is_some(),
		"Search finished."
	);
	println!("{}", serde_json::to_string_pretty(&response)?);

	Ok(())
}

pub fn styles() -> Styles {
	Styles::styled()
		.header(AnsiColor::Red.on_default() | Effects::BOLD)
		.usage(AnsiColor::Red.on_default() | Effects::BOLD)
		.literal(AnsiColor::Blue.on_default() | Effects::BOLD)
		.placeholder(AnsiColor::Green.on_default())
}

fn init_tracing(config: &atelier_config::Config) -> color_eyre::Result<()> {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
	tracing_subscriber::fmt().with_env_filter(filter).init();
	Ok(())
}
