use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::mpsc;
use std::time::Duration;

use clap::builder::{PossibleValuesParser, TypedValueParser};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use tracing::{info, Level};

use gifblocks::crop::DEFAULT_ALPHA_THRESHOLD;
use gifblocks::render::DEFAULT_WIDTH;
use gifblocks::{FilterType, Player, RenderOptions, StopReason};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// Still or animated image (GIF, APNG, WebP, ...)
    path: PathBuf,

    /// Output width in terminal columns
    #[arg(default_value_t = DEFAULT_WIDTH)]
    width: u32,

    /// Keep transparent padding instead of trimming it
    #[arg(long)]
    no_crop: bool,

    /// Alpha above which a pixel counts as content when trimming
    #[arg(long, default_value_t = DEFAULT_ALPHA_THRESHOLD)]
    alpha_threshold: u8,

    #[arg(long, value_parser(PossibleValuesParser::new(["nearest", "triangle", "catmullrom", "gaussian", "lanczos3"]).try_map(|s| FilterType::from_str(&s))), default_value = "nearest")]
    resize_mode: FilterType,

    /// Stop after this many seconds instead of looping until Ctrl-C
    #[arg(long)]
    duration: Option<f64>,

    /// Log progress to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if e.kind() == ErrorKind::MissingRequiredArgument => {
            println!("{}", Args::command().render_usage());
            return ExitCode::FAILURE;
        }
        Err(e) => e.exit(),
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::WARN })
        .init();

    match run(args) {
        Ok(reason) => {
            info!(?reason, "exiting");
            println!("bye~");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> gifblocks::Result<StopReason> {
    let options = RenderOptions {
        width: args.width,
        crop: !args.no_crop,
        alpha_threshold: args.alpha_threshold,
        filter: args.resize_mode,
    };
    let frames = gifblocks::prepare_frames(&args.path, &options)?;

    // Until here Ctrl-C keeps its default behaviour; nothing has been drawn yet.
    let (tx, rx) = mpsc::channel();
    ctrlc::set_handler(move || {
        let _ = tx.send(());
    })?;

    let limit = args.duration.filter(|s| s.is_finite() && *s > 0.0).map(Duration::from_secs_f64);
    let mut player = Player::new(std::io::stdout().lock(), frames);
    player.play(&rx, limit)
}
