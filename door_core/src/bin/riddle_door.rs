//! Terminal front-end for the riddle door.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use door_core::{
    build_backend, DoorConfig, NullTranscript, Presenter, RiddleGameController, TracingTranscript,
    TranscriptSink, TurnOutcome,
};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

#[derive(Debug, Parser)]
#[command(name = "riddle_door", about = "Talk your way past an enchanted door")]
struct Cli {
    /// TOML config file; built-in defaults are used when omitted
    #[arg(long)]
    config: Option<PathBuf>,
    /// Use the OpenAI backend
    #[arg(long, conflicts_with = "vllm")]
    open_ai: bool,
    /// Use the vLLM backend
    #[arg(long)]
    vllm: bool,
    #[arg(long)]
    verbose: bool,
    /// Do not log the session transcript
    #[arg(long)]
    no_transcript: bool,
}

/// Writes the chat to stdout and status lines to stderr.
#[derive(Debug, Default)]
struct TerminalPresenter;

impl Presenter for TerminalPresenter {
    fn append_text(&self, delta: &str) {
        let mut out = std::io::stdout().lock();
        let _ = out.write_all(delta.as_bytes());
        let _ = out.flush();
    }

    fn set_full_text(&self, text: &str) {
        println!("\n{}", text.trim_end());
    }

    fn set_status(&self, status: &str) {
        eprintln!("  [{}]", status);
    }

    fn set_attempts(&self, remaining: u32) {
        eprintln!("  [Attempts: {}]", remaining);
    }

    fn show_round_result(&self, won: bool) {
        println!("\n\n*** {} ***", if won { "You won!" } else { "Game Over" });
    }
}

fn init_tracing(level: &str, verbose: bool) {
    let fallback = if verbose { "debug" } else { level };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(cli: &Cli) -> anyhow::Result<DoorConfig> {
    let config = match &cli.config {
        Some(path) => DoorConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => DoorConfig::default(),
    };
    let mut config = config.with_env_overrides();
    if cli.open_ai {
        config.backend.set_use_open_ai(true);
    } else if cli.vllm {
        config.backend.set_use_open_ai(false);
    }
    config.validate()?;
    Ok(config)
}

async fn read_line(lines: &mut Lines<BufReader<Stdin>>) -> anyhow::Result<Option<String>> {
    print!("\n> ");
    std::io::stdout().flush()?;
    Ok(lines.next_line().await?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_tracing(&config.logging.level, cli.verbose);

    let backend = build_backend(&config.backend)?;
    let transcript: Arc<dyn TranscriptSink> = if cli.no_transcript {
        Arc::new(NullTranscript)
    } else {
        Arc::new(TracingTranscript)
    };
    let controller = RiddleGameController::new(
        backend,
        config.game.clone(),
        Arc::new(TerminalPresenter),
        transcript,
    );
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    'rounds: loop {
        if controller.begin_conversation().await.is_ok() {
            loop {
                let Some(line) = read_line(&mut lines).await? else {
                    break 'rounds;
                };
                if line.trim() == "/quit" {
                    break 'rounds;
                }
                if let TurnOutcome::RoundOver { .. } =
                    controller.submit_player_message(&line).await
                {
                    break;
                }
            }
        }

        println!("\nPlay again? [y/N]");
        let again = read_line(&mut lines).await?.unwrap_or_default();
        if !again.trim().eq_ignore_ascii_case("y") {
            break;
        }
        controller.reset_round();
    }

    println!("\nThe door falls silent.");
    Ok(())
}
