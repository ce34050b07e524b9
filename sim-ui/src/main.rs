use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use sim_core::{AmountField, TextField};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use sim_ui::config::DEFAULT_CONFIG_FILE;
use sim_ui::export::TextPdfRasterizer;
use sim_ui::session::{FileTokenStore, LoginOutcome};
use sim_ui::state::Tab;
use sim_ui::surface::ConsoleSurface;
use sim_ui::{ClientConfig, Simulator, app, logging};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// PF vs PJ tax simulator client.
///
/// Sends the given inputs to the calculation service and prints the
/// individual vs corporate breakdown.
#[derive(Debug, Parser)]
struct Cli {
    /// Client configuration file.
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Overrides `base_url` from the config file.
    #[arg(long)]
    base_url: Option<String>,

    /// Also append log records to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `info,sim_http=trace`.
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check that the service answers.
    Health,
    Login {
        user: String,
        password: String,
    },
    Logout,
    /// Calculate once with the given inputs.
    Calculate {
        /// `field=value`, e.g. `rendimento_mensal=8.000,00`. Repeatable.
        #[arg(long = "set", value_name = "FIELD=VALUE")]
        inputs: Vec<String>,
    },
    /// Save the given inputs as a new simulation.
    Save {
        #[arg(long = "set", value_name = "FIELD=VALUE")]
        inputs: Vec<String>,
    },
    History,
    Analysis,
    /// Load a saved simulation and recalculate it.
    Load {
        id: String,
    },
    Delete {
        id: String,
    },
    /// Show or replace the service's calculation parameters.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Write the PDF report for the given inputs.
    Export {
        #[arg(long = "set", value_name = "FIELD=VALUE")]
        inputs: Vec<String>,
    },
    /// Read `field=value` edits and `:commands` from stdin.
    Interactive,
}

#[derive(Debug, Subcommand)]
enum ConfigCommand {
    Get,
    /// Upload JSON read from `file`, or stdin when omitted.
    Set {
        file: Option<PathBuf>,
    },
}

// ─── input helpers ───────────────────────────────────────────────────────────

fn apply_input(
    sim: &Simulator,
    assignment: &str,
) -> Result<()> {
    let Some((name, value)) = assignment.split_once('=') else {
        bail!("expected FIELD=VALUE, got '{assignment}'");
    };
    let name = name.trim();
    if let Some(field) = AmountField::parse(name) {
        sim.input_amount(field, value);
    } else if let Some(field) = TextField::parse(name) {
        sim.input_text(field, value);
    } else {
        bail!("unknown field '{name}'");
    }
    Ok(())
}

fn apply_inputs(
    sim: &Simulator,
    inputs: &[String],
) -> Result<()> {
    for assignment in inputs {
        apply_input(sim, assignment)?;
    }
    // One-shot commands calculate explicitly.
    sim.cancel_pending();
    Ok(())
}

async fn read_json_source(file: Option<PathBuf>) -> Result<String> {
    match file {
        Some(path) => tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("cannot read '{}'", path.display())),
        None => {
            let mut text = String::new();
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Some(line) = lines.next_line().await? {
                text.push_str(&line);
                text.push('\n');
            }
            Ok(text)
        }
    }
}

// ─── interactive mode ────────────────────────────────────────────────────────

async fn run_line(
    sim: &Simulator,
    line: &str,
) -> Result<bool> {
    let Some(command) = line.strip_prefix(':') else {
        apply_input(sim, line)?;
        return Ok(true);
    };

    let mut words = command.split_whitespace();
    match (words.next(), words.next(), words.next()) {
        (Some("quit"), ..) => return Ok(false),
        (Some("calc"), ..) => {
            sim.calculate().await;
        }
        (Some("reset"), ..) => sim.reset(),
        (Some("save"), ..) => {
            sim.save().await;
        }
        (Some("history"), ..) => {
            sim.load_history().await;
        }
        (Some("analysis"), ..) => {
            sim.load_analysis().await;
        }
        (Some("load"), Some(id), _) => {
            sim.load_simulation(id).await;
        }
        (Some("delete"), Some(id), _) => {
            sim.delete_simulation(id).await;
        }
        (Some("focus"), Some(name), _) | (Some("blur"), Some(name), _) => {
            let Some(field) = AmountField::parse(name) else {
                bail!("unknown field '{name}'");
            };
            if command.starts_with("focus") {
                sim.focus(field);
            } else {
                sim.blur(field);
            }
        }
        (Some("tab"), Some(id), _) => match Tab::parse(id) {
            Some(tab) => sim.switch_tab(tab),
            None => bail!("unknown tab '{id}'"),
        },
        (Some("login"), Some(user), Some(password)) => {
            sim.login(user, password).await;
        }
        (Some("logout"), ..) => sim.logout(),
        (Some("export"), ..) => {
            sim.export().await?;
        }
        _ => bail!("unknown command ':{command}'"),
    }
    Ok(true)
}

async fn run_interactive(sim: &Simulator) -> Result<()> {
    sim.enforce_login().await;
    sim.render_inputs();
    sim.render_summary();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match run_line(sim, line).await {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => logging::log_task_error("interactive command", Err(e)),
        }
    }
    sim.settled().await;
    Ok(())
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_logging();

    let cli = Cli::parse();
    if let Some(level) = &cli.log_level {
        logging::set_log_level(level)?;
    }
    if let Some(path) = &cli.log_file {
        logging::enable_file_logging(path)?;
    }

    let mut config = ClientConfig::load(&cli.config)?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }

    let service = app::connect(&config)?;

    if let Command::Health = cli.command {
        service.health().await.context("service is not healthy")?;
        info!(base_url = %config.base_url, "service is up");
        return Ok(());
    }

    let sim = Simulator::new(
        service,
        Arc::new(ConsoleSurface::stdout()),
        Arc::new(FileTokenStore::new(&config.session_file)),
        Arc::new(TextPdfRasterizer),
        &config,
    );

    match cli.command {
        Command::Health => {}
        Command::Login { user, password } => {
            if sim.login(&user, &password).await != LoginOutcome::LoggedIn {
                bail!("login failed");
            }
        }
        Command::Logout => sim.logout(),
        Command::Calculate { inputs } => {
            apply_inputs(&sim, &inputs)?;
            sim.render_summary();
            if sim.calculate().await.is_none() {
                bail!("calculation failed");
            }
        }
        Command::Save { inputs } => {
            apply_inputs(&sim, &inputs)?;
            let id = sim.save().await.context("simulation not saved")?;
            println!("{}", id.id);
        }
        Command::History => {
            sim.load_history().await.context("cannot list simulations")?;
        }
        Command::Analysis => {
            sim.load_analysis().await.context("cannot load analysis")?;
        }
        Command::Load { id } => {
            sim.load_simulation(&id)
                .await
                .with_context(|| format!("cannot load simulation '{id}'"))?;
        }
        Command::Delete { id } => {
            if !sim.delete_simulation(&id).await {
                bail!("cannot delete simulation '{id}'");
            }
        }
        Command::Config(ConfigCommand::Get) => {
            sim.load_config().await.context("cannot load parameters")?;
        }
        Command::Config(ConfigCommand::Set { file }) => {
            let text = read_json_source(file).await?;
            sim.save_config(&text).await?;
        }
        Command::Export { inputs } => {
            apply_inputs(&sim, &inputs)?;
            let path = sim.export().await?;
            println!("{}", path.display());
        }
        Command::Interactive => run_interactive(&sim).await?,
    }

    Ok(())
}
