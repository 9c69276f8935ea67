mod config;
mod generate_cmd;
mod progress_cmds;
mod roadmap_cmds;

use anyhow::Context;
use clap::{Parser, Subcommand};

use pathwise_db::config::DbConfig;
use pathwise_db::pool;

use config::{CliOverrides, PathwiseConfig};
use generate_cmd::GenerateArgs;
use progress_cmds::StepAction;

#[derive(Parser)]
#[command(name = "pathwise", about = "Generate learning roadmaps and track your progress")]
struct Cli {
    /// Database URL (overrides PATHWISE_DATABASE_URL env var)
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// User id to act as (overrides PATHWISE_USER_ID env var)
    #[arg(long, global = true)]
    user: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a pathwise config file (no database required)
    Init {
        /// PostgreSQL connection URL
        #[arg(long, default_value = DbConfig::DEFAULT_URL)]
        db_url: String,
        /// API key for the hosted model
        #[arg(long)]
        api_key: Option<String>,
        /// Model name (default: gemini-1.5-flash)
        #[arg(long)]
        model: Option<String>,
        /// User id to store as the default identity
        #[arg(long)]
        user_id: Option<String>,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Initialize the pathwise database (requires config file or env vars)
    DbInit,
    /// Generate a new roadmap with the hosted model
    Generate {
        /// What you want to learn, e.g. "learn Go"
        goal: String,
        /// Beginner, Intermediate or Advanced
        #[arg(long)]
        skill_level: Option<String>,
        /// e.g. "5 to 10 hours per week"
        #[arg(long)]
        time_commitment: Option<String>,
        /// e.g. "Hands-on projects"
        #[arg(long)]
        learning_style: Option<String>,
        /// Model override for this request
        #[arg(long)]
        model: Option<String>,
    },
    /// List your roadmaps, newest first
    List,
    /// Show a roadmap and your progress on it
    Show {
        /// Roadmap ID
        roadmap_id: String,
    },
    /// Flip the completion state of a step
    Toggle {
        /// Roadmap ID
        roadmap_id: String,
        /// Step number, starting at 1
        step: u32,
    },
    /// Mark a step as completed
    Complete {
        /// Roadmap ID
        roadmap_id: String,
        /// Step number, starting at 1
        step: u32,
    },
    /// Mark a step as not completed
    Uncomplete {
        /// Roadmap ID
        roadmap_id: String,
        /// Step number, starting at 1
        step: u32,
    },
}

/// Execute the `pathwise init` command: write config file.
fn cmd_init(
    db_url: &str,
    api_key: Option<String>,
    model: Option<String>,
    user_id: Option<String>,
    force: bool,
) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let cfg = config::ConfigFile {
        database: config::DatabaseSection {
            url: db_url.to_string(),
        },
        generation: config::GenerationSection {
            api_key,
            model,
            base_url: None,
        },
        identity: config::IdentitySection { user_id },
    };

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("  database.url = {db_url}");
    match &cfg.generation.api_key {
        Some(key) => println!("  generation.api_key = {}", config::mask_secret(key)),
        None => println!("  generation.api_key = (unset; export {})", config::API_KEY_ENV),
    }
    if let Some(model) = &cfg.generation.model {
        println!("  generation.model = {model}");
    }
    if let Some(user_id) = &cfg.identity.user_id {
        println!("  identity.user_id = {user_id}");
    }
    println!();
    println!("Next: run `pathwise db-init` to create and migrate the database.");

    Ok(())
}

/// Execute the `pathwise db-init` command: create database and run migrations.
async fn cmd_db_init(resolved: &PathwiseConfig) -> anyhow::Result<()> {
    println!("Initializing pathwise database...");

    let bootstrap = pool::ensure_database_exists(&resolved.db_config).await?;
    let db_pool = pool::create_pool(&resolved.db_config).await?;
    pool::run_migrations(&db_pool).await?;

    let report = pool::schema_report(&db_pool).await?;
    let name = resolved.db_config.database_name().unwrap_or("?");
    match bootstrap {
        pool::Bootstrap::Created => println!("Created database {name}."),
        pool::Bootstrap::AlreadyExisted => println!("Database {name} already exists."),
    }
    println!("  {report}");

    db_pool.close().await;

    println!("pathwise db-init complete.");
    Ok(())
}

async fn connect(resolved: &PathwiseConfig) -> anyhow::Result<sqlx::PgPool> {
    pool::create_pool(&resolved.db_config)
        .await
        .context("failed to connect to the pathwise database (did you run `pathwise db-init`?)")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if let Commands::Init {
        db_url,
        api_key,
        model,
        user_id,
        force,
    } = cli.command
    {
        return cmd_init(&db_url, api_key, model, user_id, force);
    }

    let model_override = match &cli.command {
        Commands::Generate { model, .. } => model.as_deref(),
        _ => None,
    };
    let resolved = PathwiseConfig::resolve(CliOverrides {
        database_url: cli.database_url.as_deref(),
        user_id: cli.user.as_deref(),
        model: model_override,
    })?;

    tracing::debug!(
        database = resolved.db_config.database_name().unwrap_or("?"),
        model = %resolved.model,
        "configuration resolved"
    );

    if let Commands::DbInit = cli.command {
        return cmd_db_init(&resolved).await;
    }

    let identity = resolved.identity();

    let command = match cli.command {
        Commands::Generate {
            goal,
            skill_level,
            time_commitment,
            learning_style,
            model: _,
        } => {
            let args = GenerateArgs {
                goal,
                skill_level,
                time_commitment,
                learning_style,
            };
            let prepared =
                generate_cmd::prepare(&identity, resolved.generation_config(), &args)?;
            let db_pool = connect(&resolved).await?;
            let result = generate_cmd::run_generate(&db_pool, prepared).await;
            db_pool.close().await;
            return result;
        }
        other => other,
    };

    let db_pool = connect(&resolved).await?;

    let result = match command {
        Commands::List => roadmap_cmds::run_list(&db_pool, &identity).await,
        Commands::Show { roadmap_id } => {
            roadmap_cmds::run_show(&db_pool, &identity, &roadmap_id).await
        }
        Commands::Toggle { roadmap_id, step } => {
            progress_cmds::run_step_update(&db_pool, &identity, &roadmap_id, step, StepAction::Toggle)
                .await
        }
        Commands::Complete { roadmap_id, step } => {
            progress_cmds::run_step_update(
                &db_pool,
                &identity,
                &roadmap_id,
                step,
                StepAction::Set(true),
            )
            .await
        }
        Commands::Uncomplete { roadmap_id, step } => {
            progress_cmds::run_step_update(
                &db_pool,
                &identity,
                &roadmap_id,
                step,
                StepAction::Set(false),
            )
            .await
        }
        Commands::Init { .. } | Commands::DbInit | Commands::Generate { .. } => Ok(()),
    };

    db_pool.close().await;
    result
}
