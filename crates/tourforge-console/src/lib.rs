//! Colorful console output for tour optimization runs.
//!
//! Provides a custom `tracing` layer that formats orchestrator events with
//! colors.
//!
//! ## Log Levels
//!
//! - **INFO**: Lifecycle events (run/phase start and end, new best tours)
//! - **WARN**: Phase timeouts and failed workers
//! - **DEBUG**: Per-worker results

use num_format::{Locale, ToFormattedString};
use owo_colors::OwoColorize;
use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::Instant;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

static INIT: OnceLock<()> = OnceLock::new();
static EPOCH: OnceLock<Instant> = OnceLock::new();
static RUN_START_NANOS: AtomicU64 = AtomicU64::new(0);

/// Package version for banner display.
const VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_FILTER: &str = "tourforge_solver=info";

/// Where console lines are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Output {
    #[default]
    Stdout,
    /// Keeps stdout free for machine-readable output. No banner is printed.
    Stderr,
}

/// Initializes the console output on stdout.
///
/// Safe to call multiple times - only the first call has effect.
/// Prints the TourForge banner and sets up tracing. `RUST_LOG` overrides the
/// default `tourforge_solver=info` filter.
pub fn init() {
    init_with(Output::Stdout);
}

/// Initializes the console output on the given stream.
pub fn init_with(output: Output) {
    INIT.get_or_init(|| {
        if output == Output::Stdout {
            print_banner();
        }

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(TourConsoleLayer::new(output))
            .try_init();
    });
}

// Marks the start of a run for elapsed time tracking.
fn mark_run_start() {
    let epoch = EPOCH.get_or_init(Instant::now);
    let nanos = epoch.elapsed().as_nanos() as u64;
    RUN_START_NANOS.store(nanos, Ordering::Relaxed);
}

fn elapsed_secs() -> f64 {
    let Some(epoch) = EPOCH.get() else {
        return 0.0;
    };
    let start_nanos = RUN_START_NANOS.load(Ordering::Relaxed);
    let now_nanos = epoch.elapsed().as_nanos() as u64;
    now_nanos.saturating_sub(start_nanos) as f64 / 1_000_000_000.0
}

fn print_banner() {
    let banner = r#"
 _____                 _____
|_   _|__  _   _ _ __ |  ___|__  _ __ __ _  ___
  | |/ _ \| | | | '__|| |_ / _ \| '__/ _` |/ _ \
  | | (_) | |_| | |   |  _| (_) | | | (_| |  __/
  |_|\___/ \__,_|_|   |_|  \___/|_|  \__, |\___|
                                     |___/
"#;

    let version_line = format!(
        "               v{} - Parallel PMX / 3-opt Tour Optimizer\n",
        VERSION
    );

    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{}", banner.bright_cyan());
    let _ = writeln!(stdout, "{}", version_line.bright_white().bold());
    let _ = stdout.flush();
}

/// A tracing layer that formats run events with colors.
#[derive(Debug, Clone, Copy, Default)]
pub struct TourConsoleLayer {
    output: Output,
}

impl TourConsoleLayer {
    pub fn new(output: Output) -> Self {
        Self { output }
    }
}

impl<S: Subscriber> Layer<S> for TourConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let target = metadata.target();

        if !target.starts_with("tourforge_solver")
            && !target.starts_with("tourforge_cli")
            && !target.starts_with("tourforge::")
        {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let output = format_event(&visitor, *metadata.level());
        if output.is_empty() {
            return;
        }
        match self.output {
            Output::Stdout => {
                let _ = writeln!(io::stdout(), "{}", output);
            }
            Output::Stderr => {
                let _ = writeln!(io::stderr(), "{}", output);
            }
        }
    }
}

#[derive(Debug, Default)]
struct EventVisitor {
    event: Option<String>,
    message: Option<String>,
    phase_name: Option<String>,
    mechanism: Option<String>,
    outcome: Option<String>,
    phase: Option<u64>,
    epoch: Option<u64>,
    start_epoch: Option<u64>,
    max_epochs: Option<u64>,
    epochs: Option<u64>,
    points: Option<u64>,
    workers: Option<u64>,
    worker: Option<u64>,
    contributors: Option<u64>,
    solutions: Option<u64>,
    timeout_ms: Option<u64>,
    duration_ms: Option<u64>,
    first_phase_ms: Option<u64>,
    second_phase_ms: Option<u64>,
    distance: Option<f64>,
    cancelled: Option<bool>,
}

impl Visit for EventVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let s = format!("{:?}", value);
        let s = s.trim_matches('"').to_string();
        match field.name() {
            "event" => self.event = Some(s),
            "message" => self.message = Some(s),
            "phase_name" => self.phase_name = Some(s),
            "mechanism" => self.mechanism = Some(s),
            "outcome" => self.outcome = Some(s),
            _ => {}
        }
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        match field.name() {
            "phase" => self.phase = Some(value),
            "epoch" => self.epoch = Some(value),
            "start_epoch" => self.start_epoch = Some(value),
            "max_epochs" => self.max_epochs = Some(value),
            "epochs" => self.epochs = Some(value),
            "points" => self.points = Some(value),
            "workers" => self.workers = Some(value),
            "worker" => self.worker = Some(value),
            "contributors" => self.contributors = Some(value),
            "solutions" => self.solutions = Some(value),
            "timeout_ms" => self.timeout_ms = Some(value),
            "duration_ms" => self.duration_ms = Some(value),
            "first_phase_ms" => self.first_phase_ms = Some(value),
            "second_phase_ms" => self.second_phase_ms = Some(value),
            _ => {}
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record_u64(field, value as u64);
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        if field.name() == "distance" {
            self.distance = Some(value);
        }
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        if field.name() == "cancelled" {
            self.cancelled = Some(value);
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "event" => self.event = Some(value.to_string()),
            "message" => self.message = Some(value.to_string()),
            "phase_name" => self.phase_name = Some(value.to_string()),
            "mechanism" => self.mechanism = Some(value.to_string()),
            "outcome" => self.outcome = Some(value.to_string()),
            _ => {}
        }
    }
}

fn format_event(v: &EventVisitor, level: Level) -> String {
    let event = v.event.as_deref().unwrap_or("");

    match event {
        "run_start" => format_run_start(v),
        "run_end" => format_run_end(v),
        "run_cancelled" => format_run_cancelled(v),
        "phase_start" => format_phase_start(v),
        "phase_end" => format_phase_end(v),
        "phase_timeout" => format_phase_timeout(v),
        "new_best" => format_new_best(v),
        "worker_failure" => format_worker_failure(v),
        "timeouts_updated" => format_timeouts_updated(v),
        "worker_result" if level == Level::DEBUG => format_worker_result(v),
        _ => String::new(),
    }
}

fn format_elapsed() -> String {
    format!("{:>7.3}s", elapsed_secs())
        .bright_black()
        .to_string()
}

fn format_run_start(v: &EventVisitor) -> String {
    mark_run_start();
    let points = v.points.unwrap_or(0);
    let workers = v.workers.unwrap_or(0);
    let mechanism = v.mechanism.as_deref().unwrap_or("?");

    format!(
        "{} {} Solving │ {} points │ {} workers ({}) │ epochs {}..={} │ {}",
        format_elapsed(),
        "▶".bright_green().bold(),
        points.to_formatted_string(&Locale::en).bright_yellow(),
        workers.to_formatted_string(&Locale::en).bright_yellow(),
        mechanism.bright_magenta(),
        v.start_epoch.unwrap_or(1),
        v.max_epochs.unwrap_or(0),
        format_distance(v.distance).white()
    )
}

fn format_run_end(v: &EventVisitor) -> String {
    let distance = format_distance(v.distance);
    let cancelled = v.cancelled.unwrap_or(false);
    let duration = v.duration_ms.unwrap_or(0);

    let mut output = format!(
        "{} {} Solving complete │ {} epochs │ {} solutions │ {} │ {}",
        format_elapsed(),
        "■".bright_cyan().bold(),
        v.epochs
            .unwrap_or(0)
            .to_formatted_string(&Locale::en)
            .white(),
        v.solutions
            .unwrap_or(0)
            .to_formatted_string(&Locale::en)
            .bright_magenta(),
        format_duration_ms(duration).yellow(),
        distance.bright_green().bold()
    );

    // Summary box
    output.push_str("\n\n");
    output.push_str(
        &"╔══════════════════════════════════════════════════════════╗"
            .bright_cyan()
            .to_string(),
    );
    output.push('\n');

    let status_text = if cancelled {
        "RUN INTERRUPTED"
    } else {
        "OPTIMIZATION FINISHED"
    };
    let inner_width: usize = 58;
    let total_pad = inner_width.saturating_sub(status_text.len());
    let left_pad = total_pad / 2;
    let right_pad = total_pad - left_pad;
    let status_colored = if cancelled {
        status_text.bright_red().bold().to_string()
    } else {
        status_text.bright_green().bold().to_string()
    };
    output.push_str(&format!(
        "{}{}{}{}{}",
        "║".bright_cyan(),
        " ".repeat(left_pad),
        status_colored,
        " ".repeat(right_pad),
        "║".bright_cyan()
    ));
    output.push('\n');

    output.push_str(
        &"╠══════════════════════════════════════════════════════════╣"
            .bright_cyan()
            .to_string(),
    );
    output.push('\n');

    output.push_str(&format!(
        "{}  {:<18}{:>36}  {}",
        "║".bright_cyan(),
        "Best distance:",
        distance,
        "║".bright_cyan()
    ));
    output.push('\n');

    output.push_str(
        &"╚══════════════════════════════════════════════════════════╝"
            .bright_cyan()
            .to_string(),
    );
    output.push('\n');

    output
}

fn format_run_cancelled(v: &EventVisitor) -> String {
    let message = v.message.as_deref().unwrap_or("Run cancelled");
    format!(
        "{} {} {}",
        format_elapsed(),
        "■".bright_red().bold(),
        message.bright_red()
    )
}

fn format_phase_start(v: &EventVisitor) -> String {
    let phase = v.phase_name.as_deref().unwrap_or("Unknown");
    let timeout = v.timeout_ms.unwrap_or(0);

    format!(
        "{} {} Epoch {} │ {} started │ {} limit",
        format_elapsed(),
        "▶".bright_blue(),
        v.epoch.unwrap_or(0).to_formatted_string(&Locale::en),
        phase.white().bold(),
        format_duration_ms(timeout).yellow()
    )
}

fn format_phase_end(v: &EventVisitor) -> String {
    let phase = v.phase_name.as_deref().unwrap_or("Unknown");
    let duration = v.duration_ms.unwrap_or(0);
    let outcome = match v.outcome.as_deref() {
        Some("timed_out") => "timed out".yellow().to_string(),
        Some(other) => other.bright_black().to_string(),
        None => String::new(),
    };

    format!(
        "{} {} Epoch {} │ {} ended │ {} │ {} │ {} workers │ {} solutions │ {}",
        format_elapsed(),
        "◀".bright_blue(),
        v.epoch.unwrap_or(0).to_formatted_string(&Locale::en),
        phase.white().bold(),
        format_duration_ms(duration).yellow(),
        outcome,
        v.contributors.unwrap_or(0).to_formatted_string(&Locale::en).white(),
        v.solutions
            .unwrap_or(0)
            .to_formatted_string(&Locale::en)
            .bright_magenta()
            .bold(),
        format_distance(v.distance).white()
    )
}

fn format_phase_timeout(v: &EventVisitor) -> String {
    let message = match (&v.message, v.phase) {
        (Some(message), _) => message.clone(),
        (None, Some(phase)) => format!("Phase {} timeout", phase),
        (None, None) => "Phase timeout".to_string(),
    };
    format!("{} {} {}", format_elapsed(), "⏱".yellow(), message.yellow())
}

fn format_new_best(v: &EventVisitor) -> String {
    format!(
        "{} {} New best │ epoch {} phase {} │ {}",
        format_elapsed(),
        "★".bright_yellow().bold(),
        v.epoch.unwrap_or(0),
        v.phase.unwrap_or(0),
        format_distance(v.distance).bright_green().bold()
    )
}

fn format_worker_failure(v: &EventVisitor) -> String {
    format!(
        "{} {} Worker {} failed │ {}",
        format_elapsed(),
        "✗".bright_red(),
        v.worker.unwrap_or(0),
        v.message.as_deref().unwrap_or("unknown").bright_red()
    )
}

fn format_timeouts_updated(v: &EventVisitor) -> String {
    format!(
        "{} {} Timeouts │ phase 1 {} │ phase 2 {}",
        format_elapsed(),
        "⚙".bright_cyan(),
        format_duration_ms(v.first_phase_ms.unwrap_or(0)).yellow(),
        format_duration_ms(v.second_phase_ms.unwrap_or(0)).yellow()
    )
}

fn format_worker_result(v: &EventVisitor) -> String {
    format!(
        "{} {} worker {:>4} │ {}",
        format_elapsed(),
        "·".bright_black(),
        v.worker.unwrap_or(0),
        format_distance(v.distance).bright_black()
    )
}

fn format_duration_ms(ms: u64) -> String {
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{:.2}s", ms as f64 / 1000.0)
    } else {
        let mins = ms / 60_000;
        let secs = (ms % 60_000) / 1000;
        format!("{}m {}s", mins, secs)
    }
}

fn format_distance(distance: Option<f64>) -> String {
    let Some(distance) = distance.filter(|d| d.is_finite()) else {
        return "N/A".to_string();
    };
    let fixed = format!("{:.2}", distance.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let whole = whole
        .parse::<u64>()
        .map(|w| w.to_formatted_string(&Locale::en))
        .unwrap_or_else(|_| whole.to_string());
    let sign = if distance < 0.0 { "-" } else { "" };
    format!("{}{}.{}", sign, whole, fraction)
}
