use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use ml_backgammon::ai::{TdAgent, TrainableAgent};
use ml_backgammon::checkpoint::{CheckpointManager, CheckpointManagerConfig};
use ml_backgammon::config::AppConfig;
use ml_backgammon::game::Layout;
use ml_backgammon::training::{SelectionMode, Trainer};

#[derive(Clone, Copy, ValueEnum)]
#[value(rename_all = "snake_case")]
enum Selection {
    PerDie,
    FullRoll,
}

impl From<Selection> for SelectionMode {
    fn from(selection: Selection) -> Self {
        match selection {
            Selection::PerDie => SelectionMode::PerDie,
            Selection::FullRoll => SelectionMode::FullRoll,
        }
    }
}

/// Train a backgammon value network with TD(lambda) self-play.
#[derive(Parser)]
#[command(name = "train", about = "Train a backgammon TD(lambda) agent")]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Resume training from the latest checkpoint
    #[arg(long)]
    resume: bool,

    /// Override number of training episodes
    #[arg(long)]
    episodes: Option<usize>,

    /// Override learning rate
    #[arg(long)]
    lr: Option<f32>,

    /// Override self-play selection granularity
    #[arg(long, value_enum)]
    selection: Option<Selection>,

    /// Play on the reduced nine-checker board (three points of three)
    #[arg(long)]
    simple: bool,

    /// Seed network initialisation and dice for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Print the default configuration as TOML and exit
    #[arg(long)]
    print_config: bool,

    /// Log at debug level
    #[arg(long, short)]
    verbose: bool,
}

fn init_logging(verbose: bool) -> Result<()> {
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    simplelog::TermLogger::init(
        level,
        config,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )
    .context("initializing logger")
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.print_config {
        print!("{}", AppConfig::default_toml());
        return Ok(());
    }

    init_logging(cli.verbose)?;

    let mut app_config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;

    if let Some(episodes) = cli.episodes {
        app_config.training.num_episodes = episodes;
    }
    if let Some(lr) = cli.lr {
        app_config.agent.learning_rate = lr;
    }
    if let Some(selection) = cli.selection {
        app_config.training.selection = selection.into();
    }
    if cli.simple {
        app_config.training.layout = Layout::Simple;
    }
    if let Some(seed) = cli.seed {
        app_config.agent.seed = Some(seed);
        app_config.training.seed = Some(seed);
    }
    app_config
        .validate()
        .context("validating configuration overrides")?;

    let mut agent = TdAgent::new(app_config.agent.clone());
    if cli.resume {
        resume_agent(&mut agent, &app_config)?;
    }

    let trainer = Trainer::new(app_config.training, app_config.checkpoint);
    let stats = trainer.train(&mut agent).context("training run failed")?;
    log::info!(
        "{} games played, {} aborted, {} total training steps",
        stats.games_played(),
        stats.aborted(),
        agent.step_count()
    );
    Ok(())
}

/// Restore the agent from the newest checkpoint, if there is one.
fn resume_agent(agent: &mut dyn TrainableAgent, config: &AppConfig) -> Result<()> {
    let manager = CheckpointManager::new(CheckpointManagerConfig {
        checkpoint_dir: config.training.checkpoint_dir.clone(),
        ..config.checkpoint.clone()
    });
    match manager.load_latest() {
        Ok(data) => {
            data.restore_into(agent).with_context(|| {
                format!("restoring checkpoint {}", data.path.display())
            })?;
            log::info!(
                "Resumed from episode {} ({})",
                data.metadata.episode,
                data.path.display()
            );
        }
        Err(e) => log::info!("No checkpoint found ({e}), starting fresh"),
    }
    Ok(())
}
