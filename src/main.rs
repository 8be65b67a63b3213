use clap::Parser;
use log::{error, info};
use std::process::ExitCode;

use recipe_cards::config::load_config;
use recipe_cards::{AppConfig, AppError, RecipeId, SearchOutcome, Session};

#[derive(Parser, Debug)]
#[command(
    name = "recipe-cards",
    version,
    about = "Search recipes and render the result cards"
)]
struct Args {
    /// Search query
    query: String,

    /// Category filter (defaults to the configured "all" sentinel)
    #[arg(short, long)]
    category: Option<String>,

    /// Open the cooking assistant for this recipe id once results settle
    #[arg(long)]
    open: Option<String>,

    /// Config file to load instead of ./recipe_cards.toml
    #[arg(long)]
    config: Option<String>,
}

fn parse_recipe_id(raw: &str) -> RecipeId {
    raw.parse::<i64>()
        .map(RecipeId::from)
        .unwrap_or_else(|_| RecipeId::from(raw))
}

async fn run(args: Args) -> Result<(), AppError> {
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => AppConfig::load()?,
    };
    info!("Using recipe server at {}", config.base_url);

    let session = Session::connect(&config)?;
    let outcome = session
        .search
        .search(&args.query, args.category.as_deref())
        .await;
    if outcome == SearchOutcome::Ignored {
        eprintln!("Please enter a search query.");
        return Ok(());
    }
    println!("{}", session.search.render());

    if let Some(raw_id) = &args.open {
        let id = parse_recipe_id(raw_id);
        match session.assistant.open(&id).await {
            Ok(html) => println!("{}", html),
            Err(AppError::RecipeNotCached(_)) => {
                eprintln!("Could not find recipe data. Please try again.");
            }
            Err(e) => return Err(e),
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    // one cooperative scheduler for the whole session
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to start runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(args)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
