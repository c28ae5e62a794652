/// Report tool
///
/// Searches a batch of seeded random arenas and writes an org-mode log with
/// every map, outcome, path and statistics.
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anstream::println;
use clap::Parser;
use owo_colors::OwoColorize;

use astar::map::DefaultArena;
use astar::map::MapLayout;
use astar::map::MapSource;
use astar::map::RandomArena;
use astar::renderer::NullRenderer;
use astar::search::SearchOutcome;
use astar::search::SearchSession;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

/// Command line arguments
#[derive(Parser, Debug)]
#[clap(long_version = astar::build::CLAP_LONG_VERSION)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[arg(short, long, env = "LOGS_REPORT", default_value = "logs/report.org")]
    pub output: PathBuf,

    #[arg(long, default_value_t = 20u64)]
    pub num_instances: u64,
    #[arg(long, default_value_t = DefaultArena::WIDTH)]
    pub width: u32,
    #[arg(long, default_value_t = DefaultArena::HEIGHT)]
    pub height: u32,
    #[arg(long, default_value_t = 0.3)]
    pub density: f64,

    #[command(flatten)]
    color: colorchoice_clap::Color,
}

fn write_instance<W: Write>(out: &mut BufWriter<W>, layout: &MapLayout) -> std::io::Result<bool> {
    writeln!(out, "***** Map\n#+begin_quote\n{layout}#+end_quote")?;

    let mut session = SearchSession::from_layout(layout);
    let outcome = session
        .run(&mut NullRenderer)
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    writeln!(out, "***** Solution")?;
    let found = match &outcome {
        SearchOutcome::Found(path) => {
            writeln!(out, "- Path: {path}")?;
            writeln!(out, "- Cost: {}", path.cost)?;
            true
        }
        SearchOutcome::Exhausted => {
            writeln!(out, "- Exhausted, the target can't be reached")?;
            false
        }
    };
    writeln!(out, "#+begin_example")?;
    session.stats().write_stats(&mut *out)?;
    writeln!(out, "#+end_example")?;

    Ok(found)
}

fn write_report<W: Write>(out: &mut BufWriter<W>, args: &Args) -> std::io::Result<(u64, u64)> {
    writeln!(out, ":PROPERTIES:")?;
    writeln!(out, ":VERSION: {:?}", astar::build::PKG_VERSION)?;
    writeln!(out, ":GIT_BRANCH: {:?}", shadow_rs::branch())?;
    writeln!(out, ":BUILD_IS_DEBUG: {}", shadow_rs::is_debug())?;
    if astar::build::GIT_CLEAN {
        writeln!(out, ":GIT_STATUS: CLEAN")?;
    } else {
        writeln!(out, ":GIT_STATUS: DIRTY")?;
    }
    writeln!(out, ":END:")?;
    writeln!(out, "#+title: Grid A* runs")?;
    writeln!(out)?;

    writeln!(out, "* Runs")?;
    writeln!(out, "** Default arena")?;
    match DefaultArena.load() {
        Ok(layout) => {
            write_instance(out, &layout)?;
        }
        Err(e) => writeln!(out, "FIXME Failed to load the default arena: {e}")?,
    }

    writeln!(
        out,
        "** Random arenas ({}x{}, density {})",
        args.width, args.height, args.density
    )?;
    let mut solved = 0u64;
    let mut exhausted = 0u64;
    for seed in 0..args.num_instances {
        writeln!(out, "**** Instance {seed}")?;
        match RandomArena::new(args.width, args.height, args.density, seed).load() {
            Ok(layout) => {
                if write_instance(out, &layout)? {
                    solved += 1;
                } else {
                    exhausted += 1;
                }
            }
            Err(e) => {
                log::warn!("Skipping instance {seed}: {e}");
                writeln!(out, "FIXME Failed to generate instance with seed {seed}: {e}")?;
            }
        }
    }

    out.flush()?;
    Ok((solved, exhausted))
}

fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    args.color.write_global();
    println!("Writing report to {:?}", args.output.yellow());

    if let Some(dir) = args.output.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let file = File::create(&args.output)?;
    let mut out = BufWriter::new(file);
    let (solved, exhausted) = write_report(&mut out, &args)?;

    println!(
        "{} solved, {} exhausted",
        solved.green(),
        exhausted.yellow()
    );

    Ok(())
}
