//! Orrery information tool
//!
//! Opens an ephemeris (from a JSON config, a JPL DE binary file or a list of
//! SPK kernels), prints its coverage and the position of every catalog body at
//! one instant, together with each body's orbital normal.
//!
//! Usage:
//!   cargo run --bin orrery_info -- --ephemeris lnxp1900p2053.421 --date 2024-03-20T03:06:00Z
//!   cargo run --bin orrery_info -- --kernel de432s.bsp --kernel de440.bsp
//!   cargo run --bin orrery_info -- --config orrery.json --spk-details

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{ArgAction, Parser};
use orrery::jplephem::{calendar, names};
use orrery::{Loader, ModelConfig, SystemModel, Time};

/// Type alias for the error type used throughout this module
type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Orrery information tool
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Prints ephemeris coverage and body positions for the solar-system model",
    long_about = None
)]
struct Args {
    /// JSON model configuration
    #[arg(short, long, conflicts_with_all = ["ephemeris", "kernel"])]
    config: Option<PathBuf>,

    /// JPL DE binary ephemeris file
    #[arg(short, long, conflicts_with = "kernel")]
    ephemeris: Option<PathBuf>,

    /// SPK kernel file; repeat to load several, later ones take priority
    #[arg(short, long)]
    kernel: Vec<PathBuf>,

    /// UTC instant in RFC 3339 form; defaults to now
    #[arg(short, long)]
    date: Option<String>,

    /// Also list the SPK segments of every loaded kernel
    #[arg(long, action = ArgAction::SetTrue)]
    spk_details: bool,
}

/// Prints a section header with a title and separator line
fn print_section_header(title: &str) {
    println!("\n{}:", title);
    println!("-------------------------------------------------------");
}

/// Helper to print named values in a formatted way
fn print_named_value(name: &str, value: impl std::fmt::Display) {
    println!("{}: {}", name, value);
}

fn parse_instant(date: Option<&str>) -> Result<Time> {
    match date {
        Some(text) => {
            let utc: DateTime<Utc> = DateTime::parse_from_rfc3339(text)?.with_timezone(&Utc);
            Ok(Time::new(utc))
        }
        None => Ok(Time::now()),
    }
}

fn build_config(args: &Args) -> Result<ModelConfig> {
    if let Some(path) = &args.config {
        return Ok(ModelConfig::from_file(path)?);
    }
    if let Some(path) = &args.ephemeris {
        return Ok(ModelConfig::chebyshev(path.clone()));
    }
    if !args.kernel.is_empty() {
        return Ok(ModelConfig::kernels(args.kernel.iter().cloned()));
    }
    Err("one of --config, --ephemeris or --kernel is required".into())
}

fn display_spk_details(config: &ModelConfig) -> Result<()> {
    if let orrery::Backend::Kernels { paths } = &config.backend {
        for path in paths {
            let spk = orrery::jplephem::SPK::open(config.resolve(path))?;
            print_section_header(&format!("Segments of {}", path.display()));
            for segment in &spk.segments {
                let target = names::target_name(segment.target).unwrap_or("Unknown");
                let center = names::target_name(segment.center).unwrap_or("Unknown");
                println!(
                    "{:<24} {:<24} {} .. {}  type {}",
                    target,
                    center,
                    calendar::format_date(segment.start_jd),
                    calendar::format_date(segment.end_jd),
                    segment.data_type
                );
            }
        }
    }
    Ok(())
}

fn display_positions(model: &SystemModel, sampler: &orrery::OrbitSampler, time: &Time) -> Result<()> {
    print_section_header(&format!("Positions at {} (Earth radii)", time));
    println!(
        "{:<10} {:>34} {:>34}",
        "Body", "Sun-relative", "Parent-relative"
    );
    model.catalog().for_each_body(|body| -> Result<()> {
        let fmt = |v: nalgebra::Vector3<f64>| format!("({:>10.1}, {:>10.1}, {:>10.1})", v.x, v.y, v.z);
        match (
            model.sun_relative_position(body, time),
            model.parent_relative_position(body, time),
        ) {
            (Ok(sun), Ok(parent)) => println!("{:<10} {:>34} {:>34}", body.name, fmt(sun), fmt(parent)),
            (Err(e), _) | (_, Err(e)) => println!("{:<10} unavailable: {}", body.name, e),
        }
        Ok(())
    })?;

    print_section_header("Orbital normals");
    for body in model.catalog().iter() {
        match sampler.up_vector(model, body, time) {
            Ok(Some(n)) => println!("{:<10} ({:.1}, {:.1}, {:.1})", body.name, n.x, n.y, n.z),
            Ok(None) => println!("{:<10} (does not orbit)", body.name),
            Err(e) => println!("{:<10} unavailable: {}", body.name, e),
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = build_config(&args)?;
    let time = parse_instant(args.date.as_deref())?;
    let model = Loader::new().load(&config)?;

    print_section_header("Ephemeris");
    print_named_value("Provider", model.provider().name());
    print_named_value("Origin", format!("{:?}", model.provider().frame().origin));
    print_named_value("Unit", model.provider().frame().unit);
    print_named_value("Coverage", model.coverage());
    if !model.coverage().contains(&time) {
        println!("warning: {} lies outside the loaded coverage", time);
    }

    if args.spk_details {
        display_spk_details(&config)?;
    }

    display_positions(&model, &config.orbit, &time)
}
