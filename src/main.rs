//! Landform CLI - heightmap erosion and drainage analysis.
//!
//! Import a greyscale heightmap, erode it, route water over it and export
//! elevation, flux, soil, sink and river rasters plus an OBJ mesh.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::time::Instant;

use landform::erosion::ThermalMode;
use landform::export::{Palette, PngExportOptions, RasterDepth};
use landform::hydrology::OutletModel;
use landform::pipeline::{Pipeline, TerrainOptions, TerrainOutputs, TerrainState};
use landform::terrain::load_heightmap;

/// Heightmap erosion and drainage analysis.
#[derive(Parser)]
#[command(name = "landform")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Erode a heightmap and export its drainage fields.
    Process {
        /// Input greyscale or RGB heightmap.
        input: PathBuf,

        /// Output directory for generated files.
        #[arg(short, long, default_value = "./output")]
        output: PathBuf,

        /// Base name for output files.
        #[arg(short, long, default_value = "terrain")]
        name: String,

        /// TOML options file; flags below override its values.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Multiplier for elevation values.
        #[arg(long)]
        vertical_scale: Option<f64>,

        /// Number of thermal erosion steps.
        #[arg(long)]
        erosion_iterations: Option<u32>,

        /// Mass moved per step when the repose threshold is exceeded.
        #[arg(long)]
        amplitude: Option<f64>,

        /// Angle of repose in degrees (overrides the tangent threshold).
        #[arg(long)]
        angle_of_repose_deg: Option<f64>,

        /// Use the mass-conserving pairwise thermal operator.
        #[arg(long)]
        pairwise: bool,

        /// Route over the 4 cardinal neighbours only.
        #[arg(long)]
        no_diagonals: bool,

        /// Treat every border cell as a sink.
        #[arg(long)]
        border_sinks: bool,

        /// Fill depressions before routing.
        #[arg(long)]
        fill_depressions: bool,

        /// Drain filled depressions to cells at or below this level instead of the border.
        #[arg(long)]
        sea_level: Option<f64>,

        /// Minimum flux for a cell to count as river.
        #[arg(long)]
        river_threshold: Option<f64>,

        /// Colour palette for scalar rasters.
        #[arg(long, default_value = "grey")]
        palette: PaletteArg,

        /// Write 16-bit greyscale rasters.
        #[arg(long)]
        sixteen_bit: bool,

        /// Skip triangulation and OBJ export.
        #[arg(long)]
        no_mesh: bool,
    },

    /// Show heightmap dimensions and elevation range.
    Info {
        /// Input greyscale or RGB heightmap.
        input: PathBuf,

        /// TOML options file (for vertical scale and import convention).
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PaletteArg {
    /// Single-channel greyscale.
    Grey,
    /// Green-to-snow hypsometric tint.
    Terrain,
    /// White-to-blue.
    Water,
}

impl From<PaletteArg> for Palette {
    fn from(arg: PaletteArg) -> Self {
        match arg {
            PaletteArg::Grey => Palette::Grey,
            PaletteArg::Terrain => Palette::Terrain,
            PaletteArg::Water => Palette::Water,
        }
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Process {
            input,
            output,
            name,
            config,
            vertical_scale,
            erosion_iterations,
            amplitude,
            angle_of_repose_deg,
            pairwise,
            no_diagonals,
            border_sinks,
            fill_depressions,
            sea_level,
            river_threshold,
            palette,
            sixteen_bit,
            no_mesh,
        } => {
            let mut options = load_options(config.as_deref());
            if let Some(v) = vertical_scale {
                options.vertical_scale = v;
            }
            if let Some(n) = erosion_iterations {
                options.erosion.erosion_iterations = n;
            }
            if let Some(a) = amplitude {
                options.erosion.amplitude = a;
            }
            if let Some(deg) = angle_of_repose_deg {
                options.erosion.tan_threshold = deg.to_radians().tan();
            }
            if pairwise {
                options.erosion.thermal_mode = ThermalMode::Pairwise;
            }
            if no_diagonals {
                options.hydrology.allow_diagonals = false;
            }
            if border_sinks {
                options.hydrology.border_is_sink = true;
            }
            if fill_depressions {
                options.hydrology.fill_depressions = true;
            }
            if let Some(level) = sea_level {
                options.hydrology.outlet = OutletModel::SeaLevel(level);
            }
            if let Some(t) = river_threshold {
                options.hydrology.river_threshold = t;
            }

            let png = PngExportOptions {
                palette: palette.into(),
                depth: if sixteen_bit { RasterDepth::Sixteen } else { RasterDepth::Eight },
                ..Default::default()
            };

            run_process(&input, &output, &name, options, &png, !no_mesh);
        }
        Commands::Info { input, config } => {
            run_info(&input, &load_options(config.as_deref()));
        }
    }
}

fn load_options(path: Option<&Path>) -> TerrainOptions {
    match path {
        Some(p) => TerrainOptions::load(p).unwrap_or_else(|e| {
            eprintln!("Error reading options {}: {}", p.display(), e);
            std::process::exit(1);
        }),
        None => TerrainOptions::default(),
    }
}

fn run_process(input: &Path, output: &Path, name: &str, options: TerrainOptions, png: &PngExportOptions, mesh: bool) {
    if !(options.vertical_scale > 0.0) {
        eprintln!("Error: vertical scale must be positive");
        std::process::exit(1);
    }
    if !(options.erosion.cell_size > 0.0) {
        eprintln!("Error: cell size must be positive");
        std::process::exit(1);
    }

    println!("Landform - Heightmap Erosion and Drainage");
    println!("=========================================");
    println!("Input: {}", input.display());
    println!("Output: {}", output.display());

    let start = Instant::now();

    let grid = load_heightmap(input, options.vertical_scale, options.import_scale).unwrap_or_else(|e| {
        eprintln!("Error loading heightmap: {}", e);
        std::process::exit(1);
    });
    println!("Grid: {}x{} ({} cells)", grid.width(), grid.height(), grid.len());

    if options.erosion.erosion_iterations > 0 {
        println!(
            "Thermal erosion enabled: iterations={}, tan_threshold={:.3}",
            options.erosion.erosion_iterations, options.erosion.tan_threshold
        );
    } else {
        println!("Thermal erosion: SKIPPED");
    }
    if options.hydrology.fill_depressions {
        println!("Depression filling enabled: outlet={:?}", options.hydrology.outlet);
    }

    println!("\nRunning pipeline...");
    let pipeline = if mesh {
        Pipeline::standard(options)
    } else {
        Pipeline::hydrology(options)
    };
    let mut state = TerrainState::new(grid);
    pipeline
        .run_with_callbacks(
            &mut state,
            |name, i, total| {
                println!("  [{}/{}] Starting: {}", i + 1, total, name);
            },
            |name, i, total| {
                println!("  [{}/{}] Completed: {}", i + 1, total, name);
            },
        )
        .unwrap_or_else(|e| {
            eprintln!("Error during processing: {}", e);
            std::process::exit(1);
        });

    let outputs = TerrainOutputs::from_state(state).unwrap_or_else(|e| {
        eprintln!("Error during processing: {}", e);
        std::process::exit(1);
    });

    println!("Processing completed in {:.2?}", start.elapsed());

    let (min_h, max_h) = outputs.grid.height_range();
    let sinks = outputs.sink_mask.iter().filter(|&&s| s).count();
    let rivers = outputs.river_mask.iter().filter(|&&r| r).count();
    println!("Height range: [{:.4}, {:.4}]", min_h, max_h);
    println!("Sinks: {}", sinks);
    println!("River cells: {}", rivers);

    println!("\nExporting...");
    let export_start = Instant::now();
    let written = outputs.export_to_dir(output, name, png).unwrap_or_else(|e| {
        eprintln!("Error exporting: {}", e);
        std::process::exit(1);
    });
    for path in &written {
        println!("  Exported {}", path.display());
    }

    println!("Export completed in {:.2?}", export_start.elapsed());
    println!("\nTotal time: {:.2?}", start.elapsed());
    println!("Done!");
}

fn run_info(input: &Path, options: &TerrainOptions) {
    let grid = load_heightmap(input, options.vertical_scale, options.import_scale).unwrap_or_else(|e| {
        eprintln!("Error loading heightmap: {}", e);
        std::process::exit(1);
    });

    let (min_h, max_h) = grid.height_range();
    let cells = grid.len();
    let bytes_field = cells * std::mem::size_of::<f64>();

    println!("Landform - Heightmap Info");
    println!("=========================");
    println!();
    println!("Input: {}", input.display());
    println!("Dimensions: {}x{}", grid.width(), grid.height());
    println!("Cells: {}", cells);
    println!("Vertical scale: {}", options.vertical_scale);
    println!("Height range: [{:.4}, {:.4}]", min_h, max_h);
    println!();
    println!("Memory usage (in-memory):");
    println!("  Elevation:       {:>12} bytes ({:.2} MB)", bytes_field, bytes_field as f64 / 1024.0 / 1024.0);
    println!("  Erosion scratch: {:>12} bytes ({:.2} MB)", bytes_field, bytes_field as f64 / 1024.0 / 1024.0);
    println!("  Flux + soil:     {:>12} bytes ({:.2} MB)", 2 * bytes_field, 2.0 * bytes_field as f64 / 1024.0 / 1024.0);
}
