//! Sprig CLI - load an L-system definition and print its generations.
//!
//! ```text
//! sprig [SYSTEM.toml] [GENERATIONS]
//! ```
//!
//! The system path falls back to `$SPRIG_SYSTEM`, then `~/.sprig/system.toml`.
//! The generation count falls back to the definition's `generations`, then 1.
//!
//! Each generation is written to stdout as `<generation>\t<axiom>`, starting
//! with the initial axiom. Logs go to stderr so stdout stays pipeable.

use anyhow::{Context, Result, bail};
use std::{
    env,
    io::{self, Write},
    path::PathBuf,
};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use sprig_config::SystemConfig;

const USAGE: &str = "usage: sprig [SYSTEM.toml] [GENERATIONS]";

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::try_new("warn").expect("warn filter is valid"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(env_filter)
        .init();
}

#[derive(Debug, PartialEq, Eq)]
struct Args {
    path: PathBuf,
    generations: Option<usize>,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Option<Self>> {
        let first = args.next();
        if matches!(first.as_deref(), Some("-h" | "--help")) {
            return Ok(None);
        }

        let path = first
            .map(PathBuf::from)
            .or_else(|| env::var_os("SPRIG_SYSTEM").map(PathBuf::from))
            .or_else(SystemConfig::default_path)
            .context("no system file given and no home directory to look in")?;
        let generations = args
            .next()
            .map(|raw| {
                raw.parse::<usize>()
                    .with_context(|| format!("invalid generation count {raw:?}"))
            })
            .transpose()?;
        if args.next().is_some() {
            bail!("too many arguments\n{USAGE}");
        }
        Ok(Some(Self { path, generations }))
    }
}

fn run(args: &Args, out: &mut impl Write) -> Result<()> {
    let config = SystemConfig::load(&args.path)
        .with_context(|| format!("loading {}", args.path.display()))?;
    let generations = args.generations.or(config.generations()).unwrap_or(1);
    let mut engine = config.engine((), ())?;
    tracing::info!(
        path = %args.path.display(),
        seed = engine.seed(),
        rules = engine.rules().len(),
        generations,
        "loaded system"
    );

    writeln!(out, "{}\t{}", engine.generation(), engine.axiom())?;
    for _ in 0..generations {
        engine
            .advance(None)
            .with_context(|| format!("deriving generation {}", engine.generation() + 1))?;
        if let Some(max) = config.max_axiom_len()
            && engine.axiom().len() > max
        {
            bail!(
                "generation {} has {} tokens, over the limit of {max}",
                engine.generation(),
                engine.axiom().len()
            );
        }
        writeln!(out, "{}\t{}", engine.generation(), engine.axiom())?;
    }
    out.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    init_tracing();

    let Some(args) = Args::parse(env::args().skip(1))? else {
        println!("{USAGE}");
        return Ok(());
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    run(&args, &mut out)
}
