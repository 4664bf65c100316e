//! Concept Review - command line front end
//!
//! Runs revision selections and mastery reports against a JSON snapshot or a
//! SQLite database, mostly for inspecting how the engine behaves on real data.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use concept_review_core::{
    ActivityKind, Admission, ClassroomId, InMemoryStore, ReviewConfig, RevisionEngine,
    RevisionStore, SelectionResult, SqliteStore, UserId,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, Level};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "concept-review")]
#[command(about = "Adaptive concept-review selection for revision activities", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Set log level (ignored when RUST_LOG is set)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Engine configuration file (TOML)
    #[arg(short, long, global = true, env = "CONCEPT_REVIEW_CONFIG")]
    config: Option<PathBuf>,
}

/// Where tracking history and curriculum come from
#[derive(Args)]
struct SourceArgs {
    /// JSON snapshot file
    #[arg(long, conflicts_with = "db", required_unless_present = "db")]
    snapshot: Option<PathBuf>,

    /// SQLite database file
    #[arg(long)]
    db: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Select revision questions for a student
    Select {
        #[command(flatten)]
        source: SourceArgs,

        /// Student id
        #[arg(short, long)]
        user: i64,

        /// Classroom id
        #[arg(long)]
        classroom: i64,

        /// Activity kind
        #[arg(short, long, default_value = "revision")]
        kind: String,

        /// Maximum number of concepts (defaults to the configured cap)
        #[arg(long)]
        cap: Option<usize>,

        /// Seed for reproducible selections
        #[arg(long)]
        seed: Option<u64>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show per-concept mastery scores for a student
    Scores {
        #[command(flatten)]
        source: SourceArgs,

        /// Student id
        #[arg(short, long)]
        user: i64,

        /// Activity kind
        #[arg(short, long, default_value = "revision")]
        kind: String,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Load a JSON snapshot into a SQLite database
    Import {
        /// JSON snapshot file
        #[arg(long)]
        snapshot: PathBuf,

        /// SQLite database file (created if missing)
        #[arg(long)]
        db: PathBuf,
    },

    /// Print the effective configuration as TOML
    Config,
}

fn init_tracing(log_level: &str) {
    let level = match log_level {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "concept_review={0},concept_review_core={0}",
            level.as_str().to_lowercase()
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr) // Write logs to stderr, not stdout
        .init();
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ReviewConfig> {
    match path {
        Some(path) => ReviewConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(ReviewConfig::default()),
    }
}

async fn open_store(source: &SourceArgs) -> anyhow::Result<Arc<dyn RevisionStore>> {
    if let Some(path) = &source.snapshot {
        debug!("Using snapshot: {}", path.display());
        let store = InMemoryStore::from_json_file(path)
            .with_context(|| format!("Failed to load snapshot {}", path.display()))?;
        return Ok(Arc::new(store));
    }

    let path = source
        .db
        .as_ref()
        .context("Either --snapshot or --db is required")?;
    if !path.exists() {
        anyhow::bail!("Database not found: {}", path.display());
    }
    debug!("Using database: {}", path.display());
    Ok(Arc::new(SqliteStore::new(path)?))
}

fn print_selection(result: &SelectionResult) {
    if result.admitted.is_empty() {
        println!("No concepts selected");
        return;
    }

    println!("Concepts ({}):", result.admitted.len());
    for admitted in &result.admitted {
        let reason = match admitted.admission {
            Admission::Weak => "weak".to_string(),
            Admission::Tier { pass, score } => format!("tier {} (mastery {:.2})", pass, score),
            Admission::Backfill => "backfill".to_string(),
        };
        println!("  {:>8}  {}", admitted.concept_id.0, reason);
    }

    println!();
    println!("Questions ({}):", result.questions.len());
    for question in &result.questions {
        println!("  {}", question);
    }

    if !result.unmapped.is_empty() {
        println!();
        println!("Concepts without a live question:");
        for concept in &result.unmapped {
            println!("  {}", concept);
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    debug!("Concept Review v{} starting...", env!("CARGO_PKG_VERSION"));
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Select {
            source,
            user,
            classroom,
            kind,
            cap,
            seed,
            json,
        } => {
            let cap = cap.unwrap_or(config.max_concepts_to_review);
            let engine = RevisionEngine::new(open_store(&source).await?, config)?;
            let kind = ActivityKind::new(kind);
            let (user, classroom) = (UserId(user), ClassroomId(classroom));

            let result = match seed {
                Some(seed) => {
                    info!("Using seed {}", seed);
                    let mut rng = StdRng::seed_from_u64(seed);
                    engine
                        .select_revision_questions_at(
                            user,
                            classroom,
                            &kind,
                            cap,
                            chrono::Utc::now(),
                            &mut rng,
                        )
                        .await?
                }
                None => {
                    engine
                        .select_revision_questions(user, classroom, &kind, cap)
                        .await?
                }
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_selection(&result);
            }
        }

        Commands::Scores {
            source,
            user,
            kind,
            json,
        } => {
            let engine = RevisionEngine::new(open_store(&source).await?, config)?;
            let report = engine
                .mastery(UserId(user), &ActivityKind::new(kind))
                .await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else if report.is_empty() {
                println!("No tracking records");
            } else {
                let header: Vec<String> = engine
                    .config()
                    .windows
                    .iter()
                    .map(|w| format!("{:>10}", w.label()))
                    .collect();
                println!("{:>8} {:>8} {} {:>10}", "concept", "correct", header.join(" "), "mastery");

                for row in &report {
                    let windows: Vec<String> = row
                        .windows
                        .iter()
                        .map(|(_, score)| match score {
                            Some(s) => format!("{:>10.2}", s),
                            None => format!("{:>10}", "-"),
                        })
                        .collect();
                    let aggregate = row
                        .aggregate
                        .map(|s| format!("{:>10.2}", s))
                        .unwrap_or_else(|| format!("{:>10}", "-"));
                    println!(
                        "{:>8} {:>8} {} {}",
                        row.concept_id.0,
                        format!("{}/{}", row.correct, row.attempts),
                        windows.join(" "),
                        aggregate
                    );
                }
            }
        }

        Commands::Import { snapshot, db } => {
            let snapshot_store = InMemoryStore::from_json_file(&snapshot)
                .with_context(|| format!("Failed to load snapshot {}", snapshot.display()))?;
            if let Some(parent) = db.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }

            let store = SqliteStore::new(&db)?;
            store.init_schema().await?;
            store.import_snapshot(snapshot_store.snapshot()).await?;
            println!("Imported {} into {}", snapshot.display(), db.display());
        }

        Commands::Config => {
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}
