use std::io::IsTerminal;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anstream::ColorChoice;
use anstream::eprintln;
use anstream::println;
use clap::Parser;
use owo_colors::OwoColorize;

use astar::map::DefaultArena;
use astar::map::FileMap;
use astar::map::MapLayout;
use astar::map::MapSource;
use astar::map::RandomArena;
use astar::renderer::NullRenderer;
use astar::renderer::Renderer;
use astar::renderer::TerminalRenderer;
use astar::search::SearchError;
use astar::search::SearchOutcome;
use astar::search::SearchSession;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

/// Animates an A* search over a grid map.
#[derive(Parser, Debug)]
#[clap(long_version = astar::build::CLAP_LONG_VERSION)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Text map: `#` walls, `.` free, `S` start, `G` target.
    #[arg(short, long, env = "ASTAR_MAP", conflicts_with = "seed")]
    pub map: Option<PathBuf>,

    /// Searches a random arena generated from this seed.
    #[arg(long)]
    pub seed: Option<u64>,
    #[arg(long, default_value_t = DefaultArena::WIDTH)]
    pub width: u32,
    #[arg(long, default_value_t = DefaultArena::HEIGHT)]
    pub height: u32,
    /// Probability of a random arena cell being a wall.
    #[arg(long, default_value_t = 0.25)]
    pub density: f64,

    #[arg(long, env = "ASTAR_STEP_DELAY_MS", default_value_t = 20u64)]
    pub step_delay_ms: u64,
    #[arg(long, env = "ASTAR_PATH_DELAY_MS", default_value_t = 10u64)]
    pub path_delay_ms: u64,
    /// Only prints the result.
    #[arg(long)]
    pub no_animation: bool,

    #[command(flatten)]
    color: colorchoice_clap::Color,
}

impl Args {
    fn source(&self) -> Box<dyn MapSource> {
        match (&self.map, self.seed) {
            (Some(p), _) => Box::new(FileMap::new(p)),
            (None, Some(seed)) => Box::new(RandomArena::new(
                self.width,
                self.height,
                self.density,
                seed,
            )),
            (None, None) => Box::new(DefaultArena),
        }
    }
}

fn search<R: Renderer>(layout: &MapLayout, renderer: &mut R) -> Result<SearchOutcome, SearchError> {
    renderer.setup(layout)?;
    let mut session = SearchSession::from_layout(layout);
    let outcome = session.run(renderer)?;

    let mut err = std::io::stderr().lock();
    session.stats().write_stats(&mut err)?;
    err.flush()?;

    Ok(outcome)
}

fn colored_stdout() -> bool {
    match ColorChoice::global() {
        ColorChoice::Never => false,
        ColorChoice::Always | ColorChoice::AlwaysAnsi => true,
        ColorChoice::Auto => std::io::stdout().is_terminal(),
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();
    args.color.write_global();

    let source = args.source();
    let layout = match source.load() {
        Ok(layout) => layout,
        Err(e) => {
            eprintln!("{} {e}", "Can't load map:".red());
            return ExitCode::from(2);
        }
    };
    log::info!("Loaded {source:?}\n{layout}");

    let outcome = if args.no_animation {
        search(&layout, &mut NullRenderer)
    } else {
        let mut renderer = TerminalRenderer::new(std::io::stdout().lock())
            .colored(colored_stdout())
            .delays(
                Duration::from_millis(args.step_delay_ms),
                Duration::from_millis(args.path_delay_ms),
            );
        search(&layout, &mut renderer)
    };

    match outcome {
        Ok(SearchOutcome::Found(path)) => {
            if args.no_animation {
                println!("{}", "search success".green());
            }
            println!("{path}");
            ExitCode::SUCCESS
        }
        Ok(SearchOutcome::Exhausted) => {
            if args.no_animation {
                println!("{}", "search failed".yellow());
            }
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("{} {e}", "Search aborted:".red());
            ExitCode::from(2)
        }
    }
}
