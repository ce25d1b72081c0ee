use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "camera-recorder", version)]
struct Cli {
    /// Log debug diagnostics to stderr.
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run every recorder of a scene and write the produced files.
    Record(RecordArgs),
    /// Dry-run the camera path and print it without encoding.
    Preview(PreviewArgs),
}

#[derive(Parser, Debug)]
struct RecordArgs {
    /// Input scene JSON.
    #[arg(long)]
    scene: PathBuf,

    /// Directory receiving the recordings.
    #[arg(long)]
    out_dir: PathBuf,

    /// Simulated frame interval in milliseconds.
    #[arg(long, default_value_t = 1000.0 / 60.0)]
    tick_ms: f64,

    /// Give up if recordings have not finished after this many ticks.
    #[arg(long, default_value_t = 100_000)]
    max_ticks: u64,
}

#[derive(Parser, Debug)]
struct PreviewArgs {
    /// Input scene JSON.
    #[arg(long)]
    scene: PathBuf,

    /// Simulated frame interval in milliseconds.
    #[arg(long, default_value_t = 1000.0 / 60.0)]
    tick_ms: f64,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();

    match cli.cmd {
        Command::Record(args) => cmd_record(args),
        Command::Preview(args) => cmd_preview(args),
    }
}

fn check_tick(tick_ms: f64) -> anyhow::Result<()> {
    if !(tick_ms.is_finite() && tick_ms > 0.0) {
        anyhow::bail!("--tick-ms must be a positive number, got {tick_ms}");
    }
    Ok(())
}

fn cmd_record(args: RecordArgs) -> anyhow::Result<()> {
    check_tick(args.tick_ms)?;
    let file = camera_recorder::SceneFile::load(&args.scene)?;
    if file.recorders.is_empty() {
        anyhow::bail!("scene '{}' has no recorders", args.scene.display());
    }
    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;

    let camera_recorder::LoadedScene {
        mut scene, camera, ..
    } = file.build(&args.out_dir)?;

    for (id, started) in scene.emit(camera, camera_recorder::TriggerEvent::RecordStart) {
        started.with_context(|| format!("start {id}"))?;
    }

    let mut failures = 0usize;
    let mut ticks = 0u64;
    while scene.is_recording() {
        if ticks >= args.max_ticks {
            anyhow::bail!("recordings did not finish within {} ticks", args.max_ticks);
        }
        ticks += 1;
        let report = scene.tick(args.tick_ms);
        for (id, finished) in report.finished() {
            match &finished.output {
                Some(path) => println!("{}", path.display()),
                None => eprintln!("{id}: finished without output ({} frames)", finished.frames),
            }
        }
        for (id, err) in report.errors() {
            eprintln!("{id}: {err}");
            failures += 1;
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} recording(s) failed");
    }
    tracing::info!(ticks, "all recordings finished");
    Ok(())
}

fn cmd_preview(args: PreviewArgs) -> anyhow::Result<()> {
    check_tick(args.tick_ms)?;
    let file = camera_recorder::SceneFile::load(&args.scene)?;
    let camera_recorder::LoadedScene {
        mut scene,
        camera,
        recorders,
    } = file.build(std::env::temp_dir())?;

    let window_ms = recorders
        .iter()
        .filter_map(|id| scene.recorder(*id))
        .map(|r| r.config().window_ms())
        .fold(0.0_f64, f64::max);

    for (id, started) in scene.emit(camera, camera_recorder::TriggerEvent::DryRunStart) {
        started.with_context(|| format!("start {id}"))?;
    }

    println!("t_ms\tx\ty\tz\trx\try\trz");
    let mut elapsed = 0.0;
    while elapsed <= window_ms {
        scene.tick(args.tick_ms);
        elapsed += args.tick_ms;
        let Some(entity) = scene.entity(camera) else {
            anyhow::bail!("camera entity disappeared");
        };
        let p = entity.transform.position;
        let r = entity.transform.rotation_deg();
        println!(
            "{elapsed:.1}\t{:.4}\t{:.4}\t{:.4}\t{:.2}\t{:.2}\t{:.2}",
            p.x, p.y, p.z, r.x, r.y, r.z
        );
    }
    Ok(())
}
