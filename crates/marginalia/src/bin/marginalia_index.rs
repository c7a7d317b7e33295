//! Marginalia index provisioner
//!
//! Deletes the reading index if it exists and creates it fresh. Every
//! document previously in the index is lost.

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use marginalia::config::{SearchServiceArgs, DEFAULT_EMBEDDING_DIMENSIONS};
use marginalia::index::{provision, IndexSchema};
use marginalia::services::AzureSearchClient;

#[derive(Parser)]
#[command(name = "marginalia_index")]
#[command(about = "Create or replace the reading index")]
#[command(version)]
struct Args {
  /// Admin key for the search service
  #[arg(long = "admin-key", env = "AZURE_SEARCH_ADMIN_KEY", hide_env_values = true, default_value = "")]
  admin_key: String,

  /// Dimensionality of the vector field
  #[arg(long = "embedding-dim", env = "EMBEDDING_DIM", default_value_t = DEFAULT_EMBEDDING_DIMENSIONS)]
  embedding_dimensions: usize,

  /// Print the index definition and exit without contacting the service
  #[arg(long)]
  print_schema: bool,

  /// Enable verbose logging
  #[arg(short, long)]
  verbose: bool,

  #[command(flatten)]
  search: SearchServiceArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
  dotenvy::dotenv().ok();
  let args = Args::parse();

  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
    EnvFilter::new(if args.verbose { "marginalia=debug,info" } else { "marginalia=info,warn" })
  });
  tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

  let schema = IndexSchema::reading(&args.search.index_name, args.embedding_dimensions);
  schema.validate(args.embedding_dimensions)?;

  if args.print_schema {
    println!("{}", serde_json::to_string_pretty(&schema)?);
    return Ok(());
  }

  if args.admin_key.trim().is_empty() {
    anyhow::bail!("AZURE_SEARCH_ADMIN_KEY must not be empty");
  }
  args.search.validate()?;

  let admin = AzureSearchClient::new(&args.search, &args.admin_key)?;
  provision(&admin, &schema, args.embedding_dimensions)
    .await
    .with_context(|| format!("failed to provision index '{}'", schema.name))?;

  println!("Created index: {} (dim={})", schema.name, args.embedding_dimensions);
  Ok(())
}
