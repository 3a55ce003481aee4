pub mod logger;

pub mod batch;
pub mod cli;
pub mod collect;
pub mod config;
pub mod constants;
pub mod error;
pub mod info;
pub mod processing;
pub mod report;
pub mod strategy;

pub use batch::{
    generate_output_path, plan_targets, run_benchmarks, run_file, run_strategy, BenchmarkResult,
    FileTally, ImageTarget, RunSummary,
};
pub use collect::{collect_image_files, ExtensionSet};
pub use config::{BenchConfig, SelectedStrategy};
pub use error::{BenchError, Result};
pub use info::{print_image_info, read_exif, read_image_info, ImageInfo};
pub use processing::{
    decode_image, encode_image, resize_image, transform, write_output, Transformed,
};
pub use strategy::{Codec, ResizeRule, StrategyConfig, StrategyId};
