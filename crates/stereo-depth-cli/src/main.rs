//! Command-line driver for disparity-to-depth conversion.

use clap::{Args, Parser, Subcommand};
use log::info;
use std::path::PathBuf;
use stereo_depth_core::{
    convert_file, init_logger, run_batch, BatchOptions, DepthError, DepthMethod, HeatmapOptions,
    StereoRigCalibration,
};

#[derive(Parser)]
#[command(
    name = "stereo-depth",
    about = "Convert stereo disparity maps to metric depth maps",
    version
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct CommonArgs {
    /// Rectification artifact (JSON with P_l, P_r and Q).
    #[arg(short, long)]
    calib: PathBuf,

    /// Use the Q-matrix reprojection instead of the projection matrices.
    #[arg(short = 'q', long)]
    use_q: bool,

    /// Lower bound of the heatmap display range, in calibration units.
    #[arg(long, default_value_t = 0.0)]
    vmin: f32,

    /// Upper bound of the heatmap display range, in calibration units.
    #[arg(long, default_value_t = 3.0)]
    vmax: f32,
}

#[derive(Subcommand)]
enum Command {
    /// Convert a single disparity .npy file. Fails if the input is missing.
    Convert {
        #[command(flatten)]
        common: CommonArgs,

        /// Disparity .npy file.
        #[arg(short, long)]
        input: PathBuf,

        /// Output path for the float32 depth TIFF.
        #[arg(short = 'o', long)]
        depth: Option<PathBuf>,

        /// Output path for the heatmap PNG.
        #[arg(long)]
        heatmap: Option<PathBuf>,
    },
    /// Convert "{prefix}{index}.npy" for index 0, 1, ... until the next
    /// file is missing. The first gap ends the run normally.
    Batch {
        #[command(flatten)]
        common: CommonArgs,

        /// Directory holding the disparity .npy sequence.
        #[arg(short, long)]
        input: PathBuf,

        /// Directory for the depth and heatmap outputs (created if absent).
        #[arg(short, long)]
        output: PathBuf,

        /// Filename prefix of the disparity sequence.
        #[arg(long, default_value = "rectified_left_")]
        prefix: String,

        /// Skip heatmap rendering, writing only depth TIFFs.
        #[arg(long)]
        no_heatmap: bool,
    },
}

impl CommonArgs {
    fn method(&self) -> DepthMethod {
        if self.use_q {
            DepthMethod::QMatrix
        } else {
            DepthMethod::Projection
        }
    }

    fn heatmap_opts(&self) -> HeatmapOptions {
        HeatmapOptions {
            vmin: self.vmin,
            vmax: self.vmax,
        }
    }
}

fn run(cli: Cli) -> Result<(), DepthError> {
    match cli.command {
        Command::Convert {
            common,
            input,
            depth,
            heatmap,
        } => {
            let calib = StereoRigCalibration::load_json(&common.calib)?;
            let result = convert_file(
                &calib,
                common.method(),
                &input,
                depth.as_deref(),
                heatmap.as_deref(),
                &common.heatmap_opts(),
            )?;
            info!(
                "converted {} ({}x{})",
                input.display(),
                result.width,
                result.height
            );
            Ok(())
        }
        Command::Batch {
            common,
            input,
            output,
            prefix,
            no_heatmap,
        } => {
            let calib = StereoRigCalibration::load_json(&common.calib)?;
            let opts = BatchOptions {
                method: common.method(),
                prefix,
                write_heatmap: !no_heatmap,
                heatmap: common.heatmap_opts(),
            };
            let count = run_batch(&calib, &input, &output, &opts)?;
            println!("converted {count} disparity maps");
            Ok(())
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let _ = init_logger(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
