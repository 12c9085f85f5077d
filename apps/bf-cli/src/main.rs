use bf_core::timing;
use bf_path::{HatchPattern, Path as ScanPath, SegmentMode, write_scan_path};
use bf_project::{ProjectResult, RunOptions, build_source, load_case, run_case, validate_case};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Instant;
use uom::si::energy::joule;

#[derive(Parser)]
#[command(name = "bf-cli")]
#[command(about = "beamflow CLI - moving heat source deposition for additive manufacturing", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate case file syntax and structure
    Validate {
        /// Path to the case YAML or JSON file
        case_path: PathBuf,
    },
    /// Summarize a scan path file
    Path {
        /// Path to the scan path file
        scan_path: PathBuf,
        /// Simulation end time in seconds (clips the path end time)
        #[arg(long)]
        end_time: Option<f64>,
    },
    /// Generate rectangular hatch scan paths, one file per rotation
    CreatePath {
        /// Lower corner of the rectangle (m)
        #[arg(long, num_args = 2, value_names = ["X", "Y"])]
        min: Vec<f64>,
        /// Upper corner of the rectangle (m)
        #[arg(long, num_args = 2, value_names = ["X", "Y"])]
        max: Vec<f64>,
        /// Hatch spacing (m)
        #[arg(long)]
        hatch: f64,
        /// Rotation added per pattern (deg)
        #[arg(long, default_value_t = 67.0)]
        angle: f64,
        /// Number of rotated patterns to write
        #[arg(long, default_value_t = 1)]
        rotations: usize,
        /// Beam power (W)
        #[arg(long)]
        power: f64,
        /// Scan speed (m/s)
        #[arg(long)]
        speed: f64,
        /// Dwell between hatch lines (s)
        #[arg(long, default_value_t = 0.0)]
        dwell: f64,
        /// Scan every line in the same direction
        #[arg(long)]
        unidirectional: bool,
        /// Output directory
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Run a case over a static temperature field
    Run {
        /// Path to the case YAML or JSON file
        case_path: PathBuf,
        /// Time step in seconds (overrides the case)
        #[arg(long)]
        dt: Option<f64>,
        /// End time in seconds (overrides the case)
        #[arg(long)]
        t_end: Option<f64>,
        /// Collect and print deposition timings
        #[arg(long)]
        timing: bool,
    },
}

fn main() -> ProjectResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { case_path } => cmd_validate(&case_path),
        Commands::Path {
            scan_path,
            end_time,
        } => cmd_path(&scan_path, end_time),
        Commands::CreatePath {
            min,
            max,
            hatch,
            angle,
            rotations,
            power,
            speed,
            dwell,
            unidirectional,
            out_dir,
        } => {
            let pattern = HatchPattern {
                min: [min[0], min[1]],
                max: [max[0], max[1]],
                hatch,
                angle_deg: angle,
                rotations,
                power,
                speed,
                dwell_time: dwell,
                bidirectional: !unidirectional,
            };
            cmd_create_path(&pattern, &out_dir)
        }
        Commands::Run {
            case_path,
            dt,
            t_end,
            timing,
        } => cmd_run(&case_path, RunOptions { dt_s: dt, t_end_s: t_end }, timing),
    }
}

fn cmd_validate(case_path: &Path) -> ProjectResult<()> {
    println!("Validating case: {}", case_path.display());
    let case = load_case(case_path)?;
    validate_case(&case)?;
    let case_dir = case_path.parent().unwrap_or(Path::new("."));
    println!("✓ Case is valid");
    println!("  Sources: {}", case.sources.len());
    for def in &case.sources {
        let source = build_source(&case, def, case_dir)?;
        println!(
            "    {} - {} / {}, {} segments, end time {:.4e} s",
            source.name(),
            def.heat_source.model,
            def.absorption.model,
            source.beam().path().len(),
            source.beam().end_time()
        );
    }
    Ok(())
}

fn cmd_path(scan_path: &Path, end_time: Option<f64>) -> ProjectResult<()> {
    let path = ScanPath::read(scan_path, end_time.unwrap_or(f64::MAX))?;

    let mut scanned = 0.0;
    let mut previous = path.segments()[0].position;
    println!("Scan path: {}", scan_path.display());
    println!(
        "  {:>4}  {:<6} {:>12} {:>12} {:>12} {:>9} {:>12} {:>12}",
        "#", "mode", "x (m)", "y (m)", "z (m)", "power (W)", "parameter", "end (s)"
    );
    for (i, seg) in path.segments().iter().enumerate() {
        let mode = match seg.mode {
            SegmentMode::LineScan => {
                scanned += (seg.position - previous).norm();
                "line"
            }
            SegmentMode::PointDwell => "dwell",
        };
        println!(
            "  {:>4}  {:<6} {:>12.4e} {:>12.4e} {:>12.4e} {:>9.1} {:>12.4e} {:>12.4e}",
            i,
            mode,
            seg.position.x,
            seg.position.y,
            seg.position.z,
            seg.power,
            seg.parameter,
            seg.time()
        );
        previous = seg.position;
    }
    println!("\n  Segments:     {}", path.len());
    println!("  Scan length:  {:.4e} m", scanned);
    println!("  End time:     {:.4e} s", path.end_time());
    Ok(())
}

fn cmd_create_path(pattern: &HatchPattern, out_dir: &Path) -> ProjectResult<()> {
    let written = write_scan_path(out_dir, pattern)?;
    for file in &written {
        println!("✓ Wrote {}", file.display());
    }
    Ok(())
}

fn cmd_run(case_path: &Path, options: RunOptions, collect_timing: bool) -> ProjectResult<()> {
    if collect_timing {
        timing::enable_timing();
    }
    let case = load_case(case_path)?;
    let case_dir = case_path.parent().unwrap_or(Path::new("."));
    println!("Running case: {}", case.name);

    let started = Instant::now();
    let summary = run_case(&case, case_dir, &options)?;
    let wall = started.elapsed().as_secs_f64();

    println!("✓ Run completed: t = {:.4e} s", summary.end_time_s);
    println!("  Steps:              {}", summary.steps);
    println!("  Beam substeps:      {}", summary.substeps);
    println!("  Refinement updates: {}", summary.refinement_updates);
    println!("\nEnergy summary:");
    for source in &summary.sources {
        let absorbed = source.absorbed.get::<joule>();
        let deposited = source.deposited.get::<joule>();
        let share = if absorbed > 0.0 {
            100.0 * deposited / absorbed
        } else {
            0.0
        };
        println!(
            "  {:<12} absorbed {:.4e} J, deposited {:.4e} J ({:.1}%)",
            source.name, absorbed, deposited, share
        );
    }
    println!(
        "  Total deposited: {:.4e} J",
        summary.deposited().get::<joule>()
    );
    println!("  Wall time:       {:.3} s", wall);
    Ok(())
}
