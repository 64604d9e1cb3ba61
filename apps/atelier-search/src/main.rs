use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = atelier_search::Args::parse();
	atelier_search::run(args).await
}
