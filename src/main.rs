use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use playclip::config::Config;
use playclip::db::ProcessedStore;
use playclip::followup::{CatalogSource, Collaborators, FollowUpQueue, Intake, Scheduler};
use playclip::matching::score::{best_match, score_candidate};
use playclip::play::models::{BatterRef, EventKind, Half, PlayRecord, PostRef};
use playclip::processed::ProcessedSet;
use playclip::publish::DryRunPublisher;
use playclip::savant::animation::AnimationFetcher;
use playclip::savant::client::SavantClient;
use playclip::transcode::ffmpeg::Transcoder;

/// Playclip: delayed animated follow-ups for live play-by-play posts.
///
/// Matches a detected play to its clip in the animation catalog, turns the
/// clip into a size-bounded GIF, and posts it as a reply once it exists.
#[derive(Parser)]
#[command(name = "playclip", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the processed-set database
    Init,

    /// Show database size, processed at-bats and last sweep time
    Status,

    /// Score every catalog row for a play and show the winner
    Match {
        /// Game id
        #[arg(long)]
        game: u64,

        /// Game date (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,

        /// Inning number
        #[arg(long)]
        inning: u32,

        /// Batter name as the feed reports it
        #[arg(long)]
        batter: String,

        /// Feed event text (e.g. "Home Run")
        #[arg(long)]
        event: String,
    },

    /// Build and probe the media URL for a catalog play id
    Resolve {
        /// Catalog play id
        play_id: String,
    },

    /// Transcode one clip URL to a GIF in the work directory
    Transcode {
        /// Source clip URL
        url: String,

        /// Duration cap in seconds (default: PLAYCLIP_GIF_MAX_SECS)
        #[arg(long)]
        max_secs: Option<u32>,

        /// Size limit in bytes (default: PLAYCLIP_GIF_MAX_BYTES)
        #[arg(long)]
        max_bytes: Option<u64>,
    },

    /// Record a play from JSON and run its follow-up with the dry-run publisher
    Follow {
        /// Path to a JSON-encoded play record
        play: PathBuf,

        /// Reference to the already-published primary post
        #[arg(long)]
        post: String,
    },

    /// Forget processed at-bats older than the retention window
    Prune,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("playclip=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Init => {
            info!("Initializing playclip database...");
            let store = playclip::db::initialize(&config.db_path)?;
            let table_count = store.table_count().await?;
            println!("Database initialized at: {}", config.db_path);
            println!("Tables created: {table_count}");
            println!("Work directory: {}", config.work_dir.display());
        }

        Commands::Status => {
            if Path::new(&config.db_path).exists() {
                let store = playclip::db::open(&config.db_path)?;
                playclip::status::show(&store, &config.db_path).await?;
            } else {
                println!("Database: not initialized");
                println!("\nRun `playclip init` to set up the database.");
            }
        }

        Commands::Match {
            game,
            date,
            inning,
            batter,
            event,
        } => {
            let play = PlayRecord {
                game_pk: game,
                game_date: date,
                inning,
                half: Half::Top,
                at_bat_index: 0,
                event: EventKind::from_feed_event(&event),
                event_text: event,
                batter: BatterRef {
                    id: None,
                    name: Some(batter),
                },
                metrics: None,
            };
            run_match(&config, &play).await?;
        }

        Commands::Resolve { play_id } => {
            let fetcher = AnimationFetcher::new(&config.savant_base_url)?;
            let url = fetcher.media_url(&play_id);
            if fetcher.probe(&url).await {
                println!("{} {}", "available".green().bold(), url);
            } else {
                println!("{} {}", "not available yet".yellow().bold(), url);
            }
        }

        Commands::Transcode {
            url,
            max_secs,
            max_bytes,
        } => {
            let transcoder = Transcoder::new(
                &config.ffmpeg_path,
                &config.work_dir,
                config.transcode.clone(),
            )?;
            let max_secs = max_secs.unwrap_or(config.scheduler.max_duration_secs);
            let max_bytes = max_bytes.unwrap_or(config.scheduler.max_bytes);
            let path = transcoder.run(&url, max_secs, max_bytes).await?;
            let size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
            println!(
                "Created {} ({})",
                path.display(),
                playclip::status::format_bytes(size)
            );
        }

        Commands::Follow { play, post } => {
            run_follow(&config, &play, PostRef(post)).await?;
        }

        Commands::Prune => {
            let store = playclip::db::open(&config.db_path)?;
            let processed = ProcessedSet::load(store).await?;
            let removed = processed
                .sweep(Utc::now(), config.scheduler.processed_retention)
                .await?;
            println!(
                "Removed {} processed at-bats older than {} days ({} remain)",
                removed,
                config.scheduler.processed_retention.num_days(),
                processed.len()
            );
        }
    }

    Ok(())
}

/// Query the catalog for a play and print every candidate's breakdown.
async fn run_match(config: &Config, play: &PlayRecord) -> Result<()> {
    let client = SavantClient::new(&config.savant_base_url)?;
    let candidates = client.candidates(play.game_pk, play.game_date).await?;
    println!(
        "{} catalog rows for game {}",
        candidates.len(),
        play.game_pk
    );

    for candidate in &candidates {
        let Some(score) = score_candidate(play, candidate, &config.weights) else {
            continue;
        };
        println!(
            "  {:>5}  {}  inning {}  {}  contact={} desc={} event={}",
            score.total,
            candidate.asset_id.dimmed(),
            candidate.inning,
            candidate.batter_name,
            score.contact,
            score.description,
            score.event
        );
    }

    match best_match(play, &candidates, &config.weights) {
        Some((winner, score)) => {
            println!(
                "\n{} {} (score {}): {}",
                "Best match:".green().bold(),
                winner.asset_id,
                score.total,
                winner.description
            );
        }
        None => {
            println!("\n{}", "No candidate passed the inning/batter filter".yellow());
        }
    }

    Ok(())
}

/// Record a play, queue its follow-up, and run the worker until the job
/// leaves the queue (or Ctrl-C).
async fn run_follow(config: &Config, play_path: &Path, post: PostRef) -> Result<()> {
    let json = std::fs::read_to_string(play_path)
        .with_context(|| format!("Failed to read {}", play_path.display()))?;
    let play: PlayRecord = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse play record from {}", play_path.display()))?;

    let store = playclip::db::initialize(&config.db_path)?;
    let processed = Arc::new(ProcessedSet::load(store).await?);
    let queue = FollowUpQueue::new();
    let intake = Intake::new(processed.clone(), queue.clone());

    let now = Utc::now();
    if !intake.observe(&play, now).await? {
        println!(
            "{}",
            format!("At-bat {} was already processed", play.at_bat_key()).yellow()
        );
    }
    intake.follow_up(play, post, now);

    let collaborators = Collaborators {
        catalog: Arc::new(SavantClient::new(&config.savant_base_url)?),
        resolver: Arc::new(AnimationFetcher::new(&config.savant_base_url)?),
        transcoder: Arc::new(Transcoder::new(
            &config.ffmpeg_path,
            &config.work_dir,
            config.transcode.clone(),
        )?),
        publisher: Arc::new(DryRunPublisher),
    };

    let scheduler = Arc::new(
        Scheduler::new(queue.clone(), collaborators)
            .with_policy(config.retry.clone())
            .with_weights(config.weights.clone())
            .with_settings(config.scheduler.clone())
            .with_processed(processed),
    );
    let handle = scheduler.clone().spawn();

    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                println!("Interrupted; {} follow-up(s) abandoned", queue.len());
                break;
            }
            _ = ticker.tick() => {
                if queue.is_empty() {
                    break;
                }
                if handle.is_finished() {
                    println!(
                        "{}",
                        format!("Scheduler exited with {} follow-up(s) queued", queue.len()).red()
                    );
                    break;
                }
            }
        }
    }

    handle.stop();
    handle.join().await?;

    playclip::status::show_jobs(&queue.snapshot(scheduler.policy()));
    Ok(())
}
