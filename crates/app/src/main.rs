use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use light_show_core::{
    export_show, parse_event_list, AppConfig, BudgetReport, Command, Event,
    FrameMatrix, Part,
};
use tracing_subscriber::EnvFilter;

fn main() -> light_show_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Compile {
            events,
            duration_ms,
            output,
            config,
        } => run_compile(&events, duration_ms, output, config.as_deref()),
        Commands::Inspect { input } => run_inspect(&input),
        Commands::Budget { events } => run_budget(&events),
    }
}

fn load_events(path: &Path) -> light_show_core::Result<Vec<Event>> {
    let raw = std::fs::read_to_string(path)?;
    parse_event_list(&raw)
}

fn run_compile(
    events_path: &Path,
    duration_ms: u64,
    output: Option<PathBuf>,
    config_path: Option<&Path>,
) -> light_show_core::Result<()> {
    let config = match config_path {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    tracing::info!(events = ?events_path, duration_ms, "compiling show");

    let events = load_events(events_path)?;
    let exported = export_show(&events, duration_ms, config.export.resolve_unique_id())?;
    let output = output.unwrap_or_else(|| PathBuf::from(&config.export.file_name));
    exported.write_to(&output)?;

    println!("wrote {}", output.display());
    println!("  frames:   {}", exported.frame_count);
    println!("  channels: {}", exported.channel_count);
    println!("  bytes:    {}", exported.byte_len());
    print_budget(&BudgetReport::tally(&events));
    Ok(())
}

fn run_inspect(input: &Path) -> light_show_core::Result<()> {
    let bytes = std::fs::read(input)?;
    let (header, matrix) = FrameMatrix::from_fseq(&bytes)?;

    println!(
        "PSEQ v{}.{}: {} channels, {} frames @ {} ms ({:.1} s), id {:#x}",
        header.version_major,
        header.version_minor,
        header.channel_count,
        header.frame_count,
        header.step_time_ms,
        header.duration_ms() as f64 / 1000.0,
        header.unique_id
    );

    for part in Part::ALL.into_iter().filter(|part| part.category().is_closure()) {
        let channel = part.spec().channels[0];
        let transitions = matrix.transitions(channel);
        if transitions.is_empty() {
            println!("ch {channel:>2} ({part}): no activity");
            continue;
        }
        println!("ch {channel:>2} ({part}):");
        for transition in transitions {
            println!(
                "  {:>8.2}s (frame {}): {} -> {}",
                transition.time_ms as f64 / 1000.0,
                transition.frame,
                command_label(transition.from),
                command_label(transition.to)
            );
        }
    }

    let strays = matrix.unmapped_channels();
    if strays.is_empty() {
        println!("all active channels belong to known parts");
    }
    for channel in strays {
        tracing::warn!(channel, "channel carries data but is not mapped to any part");
    }
    Ok(())
}

fn run_budget(events_path: &Path) -> light_show_core::Result<()> {
    let events = load_events(events_path)?;
    print_budget(&BudgetReport::tally(&events));
    Ok(())
}

fn print_budget(report: &BudgetReport) {
    if report.usage.is_empty() {
        println!("no closure commands");
        return;
    }
    println!("closure commands:");
    for usage in &report.usage {
        let marker = if usage.is_over_limit() { "  OVER" } else { "" };
        println!("  {:<20} {:>3}/{:<3}{marker}", usage.part.to_string(), usage.used, usage.limit);
    }
    for dance in &report.long_dances {
        println!(
            "  {} dances for {:.1} s from {:.1} s (30 s recommended max)",
            dance.part,
            dance.duration_ms as f64 / 1000.0,
            dance.start_ms as f64 / 1000.0
        );
    }
}

fn command_label(byte: u8) -> String {
    match Command::from_byte(byte) {
        Some(command) => format!("{command}({byte})"),
        None => byte.to_string(),
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Compile vehicle light shows to FSEQ", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compile an event list into an FSEQ v2 file.
    Compile {
        /// Share document or JSON array of events.
        events: PathBuf,
        /// Length of the audio track in milliseconds.
        #[arg(short, long)]
        duration_ms: u64,
        /// Output path; defaults to the configured file name.
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Optional JSON configuration file.
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Print the header and closure activity of an FSEQ file.
    Inspect {
        input: PathBuf,
    },
    /// Report closure command usage against the per-part limits.
    Budget {
        events: PathBuf,
    },
}
