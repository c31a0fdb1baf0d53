use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::fmt::SubscriberBuilder;

mod scene;

use scene::SolverSpec;

#[derive(Parser)]
#[command(name = "linkage-cli")]
#[command(about = "Solve planar linkage scenes")]
struct Cmd {
    /// Log every Newton step and free-variable selection
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Solve a scene and print (or write) the resulting poses
    Solve {
        #[arg(long)]
        scene: PathBuf,
        #[arg(long)]
        out: Option<PathBuf>,
        #[arg(long)]
        max_iterations: Option<usize>,
        #[arg(long)]
        stop_error: Option<f64>,
        #[arg(long)]
        timeout_ms: Option<u64>,
    },
    /// Validate a scene and print its degrees of freedom and residual
    Check {
        #[arg(long)]
        scene: PathBuf,
    },
    /// Print a small version JSON block
    Report,
}

fn main() -> Result<()> {
    let cmd = Cmd::parse();
    let level = if cmd.verbose { Level::DEBUG } else { Level::INFO };
    SubscriberBuilder::default()
        .with_target(false)
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
    match cmd.action {
        Action::Solve {
            scene,
            out,
            max_iterations,
            stop_error,
            timeout_ms,
        } => {
            let overrides = SolverSpec {
                stop_error,
                max_iterations,
                timeout_ms,
                ..SolverSpec::default()
            };
            solve(&scene, out.as_deref(), &overrides)
        }
        Action::Check { scene } => check(&scene),
        Action::Report => report(),
    }
}

fn solve(path: &Path, out: Option<&Path>, overrides: &SolverSpec) -> Result<()> {
    tracing::info!(scene = %path.display(), "solve");
    let mut built = scene::load(path)?.build(overrides)?;
    built
        .world
        .solve()
        .with_context(|| format!("solving {}", path.display()))?;
    let obj = serde_json::json!({
        "dof": built.world.dof(),
        "max_residual": built.world.max_residual(),
        "bodies": built.poses(),
    });
    let text = serde_json::to_string_pretty(&obj)?;
    match out {
        Some(out) => {
            if let Some(parent) = out.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            std::fs::write(out, text).with_context(|| format!("writing {}", out.display()))?;
            tracing::info!(out = %out.display(), "wrote poses");
        }
        None => println!("{text}"),
    }
    Ok(())
}

fn check(path: &Path) -> Result<()> {
    let built = scene::load(path)?.build(&SolverSpec::default())?;
    let world = &built.world;
    let obj = serde_json::json!({
        "bodies": world.bodies().len(),
        "variables": world.variable_count(),
        "equations": world.equation_count(),
        "dof": world.dof(),
        "max_residual": world.max_residual(),
    });
    println!("{}", serde_json::to_string_pretty(&obj)?);
    Ok(())
}

fn report() -> Result<()> {
    let rev = option_env!("GIT_COMMIT").unwrap_or("unknown");
    let obj = serde_json::json!({
        "code_rev": rev,
        "linkage": linkage::VERSION,
    });
    println!("{}", serde_json::to_string_pretty(&obj)?);
    Ok(())
}
