//! Command-line front end for the fieldnav crates.
//!
//! Every subcommand prints one JSON document to stdout.
//!
//! ```bash
//! fieldnav arc --x 0 --y 0 --heading 0 --target-x 40 --target-y 20
//! fieldnav blob --contours frame.json --width 640 --height 480
//! fieldnav field --lat 39.4854 --lon -87.3251 --bearing 120 --team red
//! fieldnav mission --events run.json --config mission.json
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use serde::Serialize;

use fieldnav::arc::{ArcParams, ArcSteeringSolver};
use fieldnav::blob::{BlobParams, MomentBlobLocator, Viewport};
use fieldnav::core::{Point2D, Pose2D};
use fieldnav::field::{FieldFrame, GeoPoint, Team};
use fieldnav::mission::{Mission, MissionConfig};
use fieldnav::{load_json, replay, TimedEvent};

#[derive(Parser)]
#[command(name = "fieldnav", version)]
#[command(about = "Blob location, arc steering, GPS field frames and mission replay")]
struct Cli {
    /// Log level (off, error, warn, info, debug, trace); overrides FIELDNAV_LOG
    #[arg(long, global = true, value_parser = parse_level)]
    log_level: Option<LevelFilter>,

    /// Emit tracing output as JSON lines
    #[cfg(feature = "tracing")]
    #[arg(long, global = true)]
    json_log: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Solve the tangent arc from a robot pose to a target point
    #[command(allow_negative_numbers = true)]
    Arc {
        /// Robot x, feet
        #[arg(long, default_value = "0")]
        x: f64,
        /// Robot y, feet
        #[arg(long, default_value = "0")]
        y: f64,
        /// Robot heading, degrees counter-clockwise from +X
        #[arg(long, default_value = "0")]
        heading: f64,
        /// Target x, feet
        #[arg(long)]
        target_x: f64,
        /// Target y, feet
        #[arg(long)]
        target_y: f64,
        /// JSON file with solver parameters
        #[arg(long)]
        params: Option<PathBuf>,
    },
    /// Locate the dominant blob in a JSON list of contours (`[[[x, y], ...], ...]`)
    Blob {
        /// Contours file
        #[arg(long)]
        contours: PathBuf,
        /// Frame width, pixels
        #[arg(long)]
        width: f64,
        /// Frame height, pixels
        #[arg(long)]
        height: f64,
        /// JSON file with locator parameters
        #[arg(long)]
        params: Option<PathBuf>,
    },
    /// Project a GPS fix into field feet
    #[command(allow_negative_numbers = true)]
    Field {
        /// Latitude, degrees
        #[arg(long)]
        lat: f64,
        /// Longitude, degrees
        #[arg(long)]
        lon: f64,
        /// Course over ground, degrees east of north
        #[arg(long)]
        bearing: Option<f64>,
        /// Use the match frame for this team
        #[arg(long, value_enum, conflicts_with = "frame")]
        team: Option<TeamArg>,
        /// JSON file with a custom frame (`origin`, `on_x_axis`)
        #[arg(long)]
        frame: Option<PathBuf>,
    },
    /// Replay a JSON list of timed mission events
    Mission {
        /// Events file (`[{"t_ms": 0, "event": {"type": "go"}}, ...]`)
        #[arg(long)]
        events: PathBuf,
        /// JSON file with mission configuration
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum TeamArg {
    Red,
    Blue,
}

impl From<TeamArg> for Team {
    fn from(t: TeamArg) -> Self {
        match t {
            TeamArg::Red => Team::Red,
            TeamArg::Blue => Team::Blue,
        }
    }
}

#[derive(Serialize)]
struct FieldOutput {
    field_bearing_deg: f64,
    x_ft: f64,
    y_ft: f64,
    heading_deg: Option<f64>,
}

fn parse_level(s: &str) -> Result<LevelFilter, String> {
    s.parse().map_err(|_| format!("unknown log level {s:?}"))
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(feature = "tracing")]
fn init_logging(cli: &Cli) {
    fieldnav::core::init_tracing(cli.json_log);
    if cli.log_level.is_some() {
        log::warn!("--log-level is ignored with tracing output; set FIELDNAV_LOG instead");
    }
}

#[cfg(not(feature = "tracing"))]
fn init_logging(cli: &Cli) {
    let level = cli
        .log_level
        .unwrap_or_else(|| fieldnav::core::level_from_env(LevelFilter::Warn));
    let _ = fieldnav::core::init_with_level(level);
}

fn optional_params<T: Default + serde::de::DeserializeOwned>(
    path: Option<&PathBuf>,
) -> Result<T, fieldnav::LoadError> {
    match path {
        Some(p) => load_json(p),
        None => Ok(T::default()),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    match &cli.command {
        Command::Arc {
            x,
            y,
            heading,
            target_x,
            target_y,
            params,
        } => {
            let params: ArcParams = optional_params(params.as_ref())?;
            let solver = ArcSteeringSolver::new(params)?;
            let solution = solver.solve(
                Pose2D::new(*x, *y, *heading),
                Point2D::new(*target_x, *target_y),
            )?;
            print_json(&solution)
        }
        Command::Blob {
            contours,
            width,
            height,
            params,
        } => {
            let params: BlobParams = optional_params(params.as_ref())?;
            let raw: Vec<Vec<[f64; 2]>> = load_json(contours)?;
            let contours: Vec<Vec<Point2D>> = raw
                .into_iter()
                .map(|c| c.into_iter().map(|[x, y]| Point2D::new(x, y)).collect())
                .collect();
            log::info!("loaded {} contours", contours.len());
            let result =
                MomentBlobLocator::new(params).locate(&contours, Viewport::new(*width, *height))?;
            print_json(&result)
        }
        Command::Field {
            lat,
            lon,
            bearing,
            team,
            frame,
        } => {
            let frame = match (team, frame) {
                (Some(t), _) => FieldFrame::for_team((*t).into()),
                (None, Some(path)) => load_json(path)?,
                (None, None) => FieldFrame::default(),
            };
            let fix = frame.to_field(GeoPoint::new(*lat, *lon), *bearing)?;
            print_json(&FieldOutput {
                field_bearing_deg: frame.field_bearing_deg(),
                x_ft: fix.x_ft,
                y_ft: fix.y_ft,
                heading_deg: fix.heading_deg,
            })
        }
        Command::Mission { events, config } => {
            let config: MissionConfig = optional_params(config.as_ref())?;
            let events: Vec<TimedEvent> = load_json(events)?;
            let mut mission = Mission::new(config)?;
            let steps = replay(&mut mission, &events)?;
            print_json(&steps)
        }
    }
}
