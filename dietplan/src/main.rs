//! Diet planner command line entry point
//!
//! Generates a weekly plan for a stored diet and prints it as JSON.
//!
//! Usage:
//! ```bash
//! dietplan --diet <DIET_ID>
//! dietplan --diet <DIET_ID> --seed 42 --save "Week 1"
//! dietplan --diet <DIET_ID> --data-dir /var/lib/dietplan
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dietplan::app::AppState;
use dietplan::config::{AppConfig, DATA_DIR_ENV, DEFAULT_DATA_DIR};
use dietplan::planner::RngSource;

#[derive(Parser)]
#[command(
    name = "dietplan",
    about = "Weekly meal plan generator",
    long_about = "Generate a weighted-random weekly meal plan from a stored diet and print it as JSON"
)]
struct Cli {
    /// Id of the diet to plan
    #[arg(long)]
    diet: String,

    /// Directory holding the database
    #[arg(long, env = DATA_DIR_ENV, default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,

    /// Seed for a reproducible plan
    #[arg(long)]
    seed: Option<u64>,

    /// Save the generated plan under this name
    #[arg(long)]
    save: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dietplan=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let state = AppState::init(AppConfig::new(cli.data_dir))
        .await
        .context("Failed to open the diet database")?;

    let plan = match cli.seed {
        Some(seed) => {
            state
                .plans
                .generate(&cli.diet, &mut RngSource::seeded(seed))
                .await?
        }
        None => state.plans.shuffle(&cli.diet).await?,
    };

    if let Some(name) = cli.save.as_deref() {
        let saved = state.plans.save_plan(&cli.diet, name, &plan).await?;
        tracing::info!("Saved plan {} as '{}'", saved.id, saved.name);
    }

    println!("{}", serde_json::to_string_pretty(&plan)?);

    Ok(())
}
