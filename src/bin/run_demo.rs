//! CLI: run the demo step flow in either driving mode.
//!
//! - `run_demo sequence`: plays a script on a timer (built-in trust ceremony unless
//!   `--scenario` is given). Lines on stdin control the run: `pause`, `resume`,
//!   `toggle`, `reset`, `start`, `quit`. Exits when the run completes.
//! - `run_demo track`: feeds pushed `step_update` events (stdin, `--input` file or
//!   `--connect` TCP peer) into the tracker and prints each change. `--trigger` asks
//!   the backend to start a flow; `--log-file` writes the accumulated results.
//!
//! Set RUST_LOG=stepweave_demo=trace for TRACE-level span enter/exit and events.

use std::io::BufRead;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use stepweave_demo::driver::{SequencerHandle, spawn_sequencer, spawn_tracker};
use stepweave_demo::event_source::{file_events, stdin_events, tcp_events};
use stepweave_demo::payload_summary::summary_line;
use stepweave_demo::run_log_io::{write_run_log_final, write_run_log_partial};
use stepweave_demo::{
  DemoConfig, DemoController, DemoError, HttpBackend, SequencerEvent, StepTracker,
  TrackerNotification, TriggerAction, TriggerOutcome, load_scenario, trust_ceremony,
};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

/// Run the demo step flow.
#[derive(Parser, Debug)]
#[command(name = "run_demo")]
#[command(
  after_help = r#"Environment variables (applied after --config, before flags):
  STEPWEAVE_API_URL        Backend base URL for triggers (default: http://localhost:5000).
  STEPWEAVE_STEP_DELAY_MS  Pause between two steps of `sequence` (default: 1500).

Examples:
  run_demo sequence --step-delay-ms 200
  run_demo track --input events.ndjson --log-file results.log.json
  run_demo track --connect 127.0.0.1:7000 --trigger all"#
)]
struct Args {
  /// JSON config file; missing fields take their defaults.
  #[arg(long, value_name = "FILE", global = true)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Play a script on a timer.
  Sequence {
    /// Scenario JSON file (`{"name": ..., "steps": [...]}`). Default: trust ceremony.
    #[arg(long, value_name = "FILE")]
    scenario: Option<PathBuf>,

    /// Pause between two steps, in milliseconds.
    #[arg(long, value_name = "N")]
    step_delay_ms: Option<u64>,
  },
  /// Track pushed step events.
  Track {
    /// Newline-delimited JSON events file. Default: stdin.
    #[arg(long, value_name = "FILE", conflicts_with = "connect")]
    input: Option<PathBuf>,

    /// Read events from a TCP peer at ADDR (host:port).
    #[arg(long, value_name = "ADDR")]
    connect: Option<String>,

    /// Ask the backend to start a flow.
    #[arg(long, value_enum)]
    trigger: Option<TriggerArg>,

    /// Backend base URL for triggers.
    #[arg(long, value_name = "URL")]
    api_url: Option<String>,

    /// Result log: rewritten after each result, finalized when the event stream ends.
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
  },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum TriggerArg {
  Setup,
  Delegate,
  Purchase,
  All,
}

#[tokio::main]
async fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_span_events(FmtSpan::ENTER | FmtSpan::EXIT)
    .with_writer(std::io::stderr)
    .init();

  info!("run_demo starting");
  let args = Args::parse();

  let mut config = match load_config(args.config.as_ref()) {
    Ok(c) => c,
    Err(e) => {
      eprintln!("Error loading config: {}", e);
      process::exit(1);
    }
  };

  let result = match args.command {
    Command::Sequence {
      scenario,
      step_delay_ms,
    } => {
      if let Some(ms) = step_delay_ms {
        config.step_delay_ms = ms;
      }
      run_sequence(config, scenario).await
    }
    Command::Track {
      input,
      connect,
      trigger,
      api_url,
      log_file,
    } => {
      if let Some(url) = api_url {
        config.api_url = url;
      }
      run_track(config, input, connect, trigger, log_file).await
    }
  };

  if let Err(e) = result {
    eprintln!("Error: {}", e);
    process::exit(1);
  }
}

fn load_config(path: Option<&PathBuf>) -> Result<DemoConfig, DemoError> {
  let mut config = match path {
    Some(p) => DemoConfig::load(p)?,
    None => DemoConfig::default(),
  };
  config.apply_env()?;
  Ok(config)
}

async fn run_sequence(config: DemoConfig, scenario: Option<PathBuf>) -> Result<(), DemoError> {
  config.validate()?;
  let scenario = match scenario {
    Some(path) => load_scenario(&path)?,
    None => trust_ceremony(),
  };
  info!(name = %scenario.name, steps = scenario.steps.len(), step_delay_ms = config.step_delay_ms, "sequence");
  let total = scenario.steps.len();
  let sequencer = scenario.into_sequencer(config.step_delay())?;

  let (tx, mut events) = mpsc::channel(64);
  let (handle, _join) = spawn_sequencer(sequencer, tx);
  let mut controls = stdin_lines();
  handle.start().await?;

  loop {
    tokio::select! {
      event = events.recv() => match event {
        Some(SequencerEvent::Completed) => {
          println!("Sequence completed.");
          break;
        }
        Some(event) => print_sequencer_event(&event, total),
        None => break,
      },
      Some(line) = controls.recv() => {
        if !apply_control(&handle, line.trim()).await? {
          println!("Stopped.");
          break;
        }
      }
    }
  }
  Ok(())
}

/// Lines typed on stdin. Read on a plain thread so a pending read never holds up exit.
fn stdin_lines() -> mpsc::Receiver<String> {
  let (tx, rx) = mpsc::channel(8);
  std::thread::spawn(move || {
    for line in std::io::stdin().lock().lines() {
      let Ok(line) = line else { break };
      if tx.blocking_send(line).is_err() {
        break;
      }
    }
  });
  rx
}

/// Applies one control line. Returns false on `quit`.
async fn apply_control(handle: &SequencerHandle, line: &str) -> Result<bool, DemoError> {
  match line {
    "pause" => handle.pause().await?,
    "resume" => handle.resume().await?,
    "toggle" => handle.toggle_pause().await?,
    "reset" => handle.reset().await?,
    "start" => handle.start().await?,
    "quit" => return Ok(false),
    "" => {}
    other => eprintln!("Unknown command: {} (pause, resume, toggle, reset, start, quit)", other),
  }
  Ok(true)
}

fn print_sequencer_event(event: &SequencerEvent, total: usize) {
  match event {
    SequencerEvent::GroupEntered { group } => println!("== {} ==", group),
    SequencerEvent::StepActivated { index, step } => {
      let who = step
        .participant
        .as_deref()
        .map(|p| format!(" [{}]", p))
        .unwrap_or_default();
      println!("[{}/{}] {}{}: {}", index + 1, total, step.title, who, step.description);
      println!("    {}", step.payload);
    }
    SequencerEvent::PhaseChanged { from, to } => println!("({} -> {})", from, to),
    SequencerEvent::StepCompleted { .. } | SequencerEvent::Progress(_) | SequencerEvent::Completed => {}
  }
}

async fn run_track(
  config: DemoConfig,
  input: Option<PathBuf>,
  connect: Option<String>,
  trigger: Option<TriggerArg>,
  log_file: Option<PathBuf>,
) -> Result<(), DemoError> {
  config.validate()?;
  let inbound = match (&input, &connect) {
    (Some(path), _) => file_events(path).await?,
    (None, Some(addr)) => tcp_events(addr).await?,
    (None, None) => stdin_events(),
  };

  let tracker = StepTracker::new(config.initial_balance);
  let mut partial = tracker.run_log();
  let (tx, mut notifications) = mpsc::channel(64);
  let (handle, join) = spawn_tracker(tracker, inbound, tx);

  let triggers = trigger.map(|which| {
    let mut controller = DemoController::new(HttpBackend::new(&config.api_url), config.clone());
    // Only a live peer is cleared before setup.
    if connect.is_some() {
      controller = controller.with_tracker(handle.clone());
    }
    tokio::spawn(async move {
      match which {
        TriggerArg::Setup => vec![controller.run(TriggerAction::Setup).await],
        TriggerArg::Delegate => vec![controller.run(TriggerAction::Delegation).await],
        TriggerArg::Purchase => vec![controller.run(TriggerAction::Purchase).await],
        TriggerArg::All => controller.run_all().await,
      }
    })
  });
  drop(handle);

  while let Some(n) = notifications.recv().await {
    print_notification(&n);
    if let Some(path) = &log_file
      && partial.follow(&n)
    {
      write_run_log_partial(path, &partial)?;
    }
  }

  if let Some(task) = triggers
    && let Ok(outcomes) = task.await
  {
    for outcome in outcomes {
      match outcome {
        TriggerOutcome::Sent { action, .. } => println!("Triggered {}.", action),
        TriggerOutcome::Failed { notice, .. } => eprintln!("{}", notice),
      }
    }
  }

  let tracker = join
    .await
    .map_err(|e| DemoError::Io(std::io::Error::other(e)))?;
  println!(
    "Tracked {} steps, {} results. Balance: ${:.2}",
    tracker.len(),
    tracker.results().len(),
    tracker.balance()
  );
  if let Some(path) = log_file {
    write_run_log_final(&path, &tracker.run_log())?;
    info!(path = %path.display(), "result log written");
  }
  Ok(())
}

fn print_notification(n: &TrackerNotification) {
  match n {
    TrackerNotification::StepUpdated { step, .. } => {
      println!("[{}] {}", step.latest_status.label(), step.label);
      let summary = summary_line(&step.latest_payload);
      if !summary.is_empty() {
        println!("    {}", summary);
      }
    }
    TrackerNotification::ProductsListed { merchant, products } => {
      println!("Products from {}:", merchant);
      for p in products {
        println!("    {} ${:.2} {}", p.name, p.price, p.stars());
      }
    }
    TrackerNotification::PurchaseCompleted(s) => {
      println!(
        "Purchase complete: {} ${:.2}, order {}, delivery {}",
        s.product_name, s.amount, s.order_id, s.estimated_delivery
      );
    }
    TrackerNotification::BalanceChanged { balance } => println!("Balance: ${:.2}", balance),
    TrackerNotification::RunFailed { reason } => eprintln!("Run failed: {}", reason),
    TrackerNotification::Connection { state } => println!("({:?})", state),
    TrackerNotification::Cleared { balance } => println!("Cleared. Balance: ${:.2}", balance),
    TrackerNotification::Highlight { .. } | TrackerNotification::ResultAccumulated(_) => {}
  }
}
