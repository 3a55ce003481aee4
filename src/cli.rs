use crate::config::BenchConfig;
use crate::constants::{DEFAULT_INPUT, DEFAULT_OUTPUT_DIR};
use crate::error::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "img-bench",
    about = "Benchmark image compression strategies on JPEG, PNG and GIF files",
    long_about = "img-bench runs every registered compression strategy (fixed-quality JPEG re-encode, \
                  Lanczos and linear downscaling, lossless PNG optimization) against a file or directory \
                  of images and reports the output size, compression ratio and time taken by each.",
    version = "0.1.0",
    after_help = "EXAMPLES:\n  \
    img-bench run\n  \
    img-bench run ./photos -o ./out -s quality-60-jpeg -s resize-90pct\n  \
    img-bench run photo.jpg -p resize-90pct.scale=0.5 -p quality-60-jpeg.quality=55\n  \
    img-bench run \"./images/*.jpg\" -j 4\n  \
    img-bench strategies\n  \
    img-bench info photo.jpg"
)]
pub struct Args {
    #[arg(short = 'q', long, global = true, help = "Only print results and errors")]
    pub quiet: bool,

    #[arg(short = 'v', long, global = true, help = "Print extra diagnostic output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(
        about = "Benchmark strategies against a file, directory or glob",
        long_about = "Run the selected strategies against every recognized image under INPUT. \
                      Each output is written to OUTPUT as <name>_compressed_<strategy>.<ext>, \
                      mirroring subdirectories of INPUT. Files sharing a name (a.jpg, a.png) \
                      keep their extension in it (a_jpg, a_png). \
                      A failing strategy is logged and skipped; the run continues."
    )]
    Run(RunArgs),

    #[command(about = "List registered strategies, their defaults and accepted parameters")]
    Strategies,

    #[command(
        about = "Display image information and EXIF metadata",
        long_about = "Decode an image and print its dimensions, format, color type, file size \
                      and any EXIF fields from the primary IFD."
    )]
    Info {
        #[arg(help = "Image file path to analyze")]
        input: PathBuf,
    },
}

#[derive(clap::Args, Debug)]
pub struct RunArgs {
    #[arg(
        default_value = DEFAULT_INPUT,
        help = "Input file, directory or glob pattern",
        long_help = "Input can be a single image, a directory, or a glob expression. \
                     Examples: './in_images', 'photo.jpg', './images/*.png'"
    )]
    pub input: String,

    #[arg(
        short = 'o',
        long,
        default_value = DEFAULT_OUTPUT_DIR,
        help = "Output directory (created if missing)"
    )]
    pub output: PathBuf,

    #[arg(
        short = 's',
        long = "strategy",
        value_name = "STRATEGY",
        help = "Strategy to run, repeatable (default: all)",
        long_help = "Restrict the run to the named strategies, in the given order. \
                     Use `img-bench strategies` to list them."
    )]
    pub strategies: Vec<String>,

    #[arg(
        short = 'p',
        long = "param",
        value_name = "STRATEGY.KEY=VALUE",
        help = "Override a strategy parameter, repeatable",
        long_help = "Override one parameter of one strategy, e.g. resize-90pct.scale=0.5. \
                     Keys: quality (1-100), level (0-6, PNG), scale (0-1], width, height, \
                     filter (lanczos3, triangle, catmullrom, gaussian, nearest). \
                     Each strategy accepts only the keys listed by `img-bench strategies`."
    )]
    pub params: Vec<String>,

    #[arg(
        short = 'e',
        long = "ext",
        value_name = "EXT",
        value_delimiter = ',',
        help = "Recognized extensions (default: jpg,jpeg,png,gif)"
    )]
    pub extensions: Vec<String>,

    #[arg(
        short = 'r',
        long,
        help = "Process subdirectories recursively"
    )]
    pub recursive: bool,

    #[arg(
        short = 'j',
        long,
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..),
        help = "Number of files processed in parallel (default: auto)"
    )]
    pub threads: Option<usize>,
}

impl RunArgs {
    pub fn into_config(self) -> Result<BenchConfig> {
        let config = BenchConfig::new(self.input, self.output)
            .with_strategies(&self.strategies)?
            .with_params(&self.params)?
            .with_extensions(&self.extensions)?
            .with_recursive(self.recursive)
            .with_threads(self.threads);
        config.validate()?;
        Ok(config)
    }
}
