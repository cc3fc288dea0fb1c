//! Plinko Sim entry point
//!
//! Headless runner: builds a session from a prize history, drops the ball and
//! drives the fixed-step loop with a simulated 60 Hz display clock.
//!
//! Usage: `plinko [history.json] [--config cfg.json] [--seed N] [--column C]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    if let Err(e) = native::run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;

    use serde::Serialize;

    use plinko_sim::sim::{PrizeTimeline, SessionPhase};
    use plinko_sim::{PlinkoConfig, PlinkoError, PrizeHistory, Result, Session, SessionSnapshot};

    /// Display refresh interval for the simulated clock
    const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Give up after this many display frames (10 minutes)
    const MAX_FRAMES: u32 = 60 * 60 * 10;

    #[derive(Debug, Default)]
    struct Args {
        history: Option<PathBuf>,
        config: Option<PathBuf>,
        seed: Option<u64>,
        column: Option<usize>,
    }

    #[derive(Serialize)]
    struct Summary<'a> {
        seed: u64,
        column: usize,
        frames: u64,
        result: SessionSnapshot,
        timeline: &'a PrizeTimeline,
    }

    fn parse_args() -> Result<Args> {
        let mut args = Args::default();
        let mut iter = std::env::args().skip(1);
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--config" => args.config = iter.next().map(PathBuf::from),
                "--seed" => {
                    args.seed = iter.next().and_then(|s| s.parse().ok());
                    if args.seed.is_none() {
                        return Err(PlinkoError::InvalidConfig("--seed expects an integer"));
                    }
                }
                "--column" => {
                    args.column = iter.next().and_then(|s| s.parse().ok());
                    if args.column.is_none() {
                        return Err(PlinkoError::InvalidConfig("--column expects an integer"));
                    }
                }
                _ => args.history = Some(PathBuf::from(arg)),
            }
        }
        Ok(args)
    }

    fn time_seed() -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }

    pub fn run() -> Result<()> {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
        log::info!("Plinko Sim (native) starting...");

        let args = parse_args()?;
        let config = PlinkoConfig::load_or_default(args.config.as_deref())?;
        let history = match &args.history {
            Some(path) => PrizeHistory::load(path)?,
            None => {
                log::info!("No history file given, using sample history");
                PrizeHistory::sample()
            }
        };

        let seed = args.seed.unwrap_or_else(time_seed);
        let column = args.column.unwrap_or(config.columns / 2);

        let mut session = Session::start(&config, &history, seed)?;
        session.launch(column)?;

        let mut now = 0.0;
        session.advance(now);
        let mut frames = 0;
        while session.snapshot().phase != SessionPhase::Done && frames < MAX_FRAMES {
            now += FRAME_MS;
            session.advance(now);
            frames += 1;
        }

        if frames >= MAX_FRAMES {
            log::warn!("Session did not finish within {} display frames", MAX_FRAMES);
        }

        let summary = Summary {
            seed,
            column,
            frames: session.current_frame().frame,
            result: session.snapshot(),
            timeline: session.timeline(),
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
        Ok(())
    }
}
