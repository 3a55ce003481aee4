use crate::collect::collect_image_files;
use crate::config::{BenchConfig, SelectedStrategy};
use crate::constants::{OUTPUT_INFIX, PROGRESS_BAR_TEMPLATE};
use crate::error::{BenchError, Result};
use crate::processing::{decode_image, transform, write_output};
use crate::report::format_result;
use crate::strategy::{Codec, StrategyId};
use image::GenericImageView;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::collections::{BTreeSet, HashMap};
use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Timing and size measurement for one (input, strategy) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkResult {
    pub strategy: StrategyId,
    pub input: PathBuf,
    pub output: PathBuf,
    pub duration: Duration,
    pub original_size: u64,
    pub compressed_size: u64,
    pub source_dimensions: (u32, u32),
    /// Read back from the written output, not from the in-memory image.
    pub output_dimensions: (u32, u32),
}

impl BenchmarkResult {
    /// Positive when the output is smaller than the input.
    pub fn compression_ratio(&self) -> f64 {
        crate::report::calculate_compression_ratio(self.original_size, self.compressed_size)
    }

    pub fn dimensions_preserved(&self) -> bool {
        self.source_dimensions == self.output_dimensions
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTally {
    pub path: PathBuf,
    pub succeeded: usize,
    pub failed: usize,
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub results: Vec<BenchmarkResult>,
    /// One entry per enumerated file, in enumeration order.
    pub tallies: Vec<FileTally>,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn total_succeeded(&self) -> usize {
        self.tallies.iter().map(|t| t.succeeded).sum()
    }

    pub fn total_failed(&self) -> usize {
        self.tallies.iter().map(|t| t.failed).sum()
    }
}

/// An input file and the prefix every one of its outputs shares.
///
/// Each strategy appends `_compressed_<strategy>.<ext>` to `output_base`,
/// so distinct bases guarantee distinct output files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageTarget {
    pub input: PathBuf,
    pub output_base: PathBuf,
}

impl ImageTarget {
    /// Target directly under `output_dir`, named after the input's stem.
    pub fn new(input: &Path, output_dir: &Path) -> Result<Self> {
        Ok(Self {
            input: input.to_path_buf(),
            output_base: output_dir.join(file_stem(input)?),
        })
    }

    pub fn output_path(&self, strategy: StrategyId, codec: Codec) -> PathBuf {
        let mut name = OsString::from(self.output_base.as_os_str());
        name.push(format!(
            "{}{}.{}",
            OUTPUT_INFIX,
            strategy.name(),
            codec.extension()
        ));
        PathBuf::from(name)
    }
}

fn file_stem(path: &Path) -> Result<&OsStr> {
    path.file_stem()
        .ok_or_else(|| BenchError::UnsupportedFormat("Invalid file name".to_string()))
}

/// `<output_dir>/<stem>_compressed_<strategy>.<codec extension>`
pub fn generate_output_path(
    input_path: &Path,
    output_dir: &Path,
    strategy: StrategyId,
    codec: Codec,
) -> Result<PathBuf> {
    Ok(ImageTarget::new(input_path, output_dir)?.output_path(strategy, codec))
}

/// Maps enumerated files to output bases under `output_dir`.
///
/// Subdirectories below the input root are mirrored. Files in the same
/// directory that share a stem (`a.jpg`, `a.png`) keep their source
/// extension in the name: `a_jpg`, `a_png`.
///
/// # Errors
/// * `BenchError::OutputCollision` if two inputs still map to one base
pub fn plan_targets(
    input: &str,
    files: &[PathBuf],
    output_dir: &Path,
) -> Result<Vec<ImageTarget>> {
    let root = Path::new(input);
    let base = if root.is_dir() {
        root.to_path_buf()
    } else {
        common_parent(files)
    };

    let mut stems: HashMap<(PathBuf, OsString), usize> = HashMap::new();
    let mut relative = Vec::with_capacity(files.len());
    for file in files {
        let parent = file.parent().unwrap_or_else(|| Path::new(""));
        let rel_dir = parent.strip_prefix(&base).unwrap_or(parent).to_path_buf();
        let stem = file_stem(file)?.to_os_string();
        *stems.entry((rel_dir.clone(), stem.clone())).or_insert(0) += 1;
        relative.push((file, rel_dir, stem));
    }

    let mut claimed: HashMap<PathBuf, &PathBuf> = HashMap::new();
    let mut targets = Vec::with_capacity(files.len());
    for (file, rel_dir, stem) in relative {
        let mut name = stem.clone();
        if stems[&(rel_dir.clone(), stem)] > 1 {
            if let Some(ext) = file.extension() {
                name.push("_");
                name.push(ext);
            }
        }

        let output_base = output_dir.join(&rel_dir).join(name);
        if let Some(first) = claimed.insert(output_base.clone(), file) {
            return Err(BenchError::OutputCollision {
                first: first.clone(),
                second: file.clone(),
                output: output_base,
            });
        }
        targets.push(ImageTarget {
            input: file.clone(),
            output_base,
        });
    }

    Ok(targets)
}

/// Deepest directory containing every file.
fn common_parent(files: &[PathBuf]) -> PathBuf {
    let mut parents = files.iter().filter_map(|f| f.parent());
    let Some(first) = parents.next() else {
        return PathBuf::new();
    };

    let mut base = first.to_path_buf();
    for parent in parents {
        while !parent.starts_with(&base) {
            if !base.pop() {
                return PathBuf::new();
            }
        }
    }
    base
}

/// Runs one strategy on one file: read, transform, write. The measured
/// duration covers read through write. Afterwards both files are stat'ed
/// and the output is decoded again to record its dimensions.
pub fn run_strategy(target: &ImageTarget, strategy: &SelectedStrategy) -> Result<BenchmarkResult> {
    let output_path = target.output_path(strategy.id, strategy.config.codec);

    let start = Instant::now();
    let input = fs::read(&target.input)?;
    let transformed = transform(&input, &strategy.config)?;
    write_output(&transformed.bytes, &output_path)?;
    let duration = start.elapsed();

    let original_size = file_size(&target.input)?;
    let compressed_size = file_size(&output_path)?;
    if compressed_size != transformed.bytes.len() as u64 {
        return Err(BenchError::Metadata(format!(
            "{:?} changed after writing: wrote {} bytes, found {}",
            output_path,
            transformed.bytes.len(),
            compressed_size
        )));
    }

    let output_dimensions = decode_image(&fs::read(&output_path)?)?.dimensions();

    Ok(BenchmarkResult {
        strategy: strategy.id,
        input: target.input.clone(),
        output: output_path,
        duration,
        original_size,
        compressed_size,
        source_dimensions: transformed.source_dimensions,
        output_dimensions,
    })
}

fn file_size(path: &Path) -> Result<u64> {
    fs::metadata(path)
        .map(|m| m.len())
        .map_err(|e| BenchError::Metadata(format!("cannot stat {:?}: {}", path, e)))
}

/// Runs every strategy on one target in order. A failing strategy is
/// logged and counted; the remaining strategies still run.
pub fn run_file(
    target: &ImageTarget,
    strategies: &[SelectedStrategy],
    progress: &ProgressBar,
) -> (Vec<BenchmarkResult>, FileTally) {
    let mut results = Vec::with_capacity(strategies.len());
    let mut tally = FileTally {
        path: target.input.clone(),
        succeeded: 0,
        failed: 0,
    };

    for strategy in strategies {
        match run_strategy(target, strategy) {
            Ok(result) => {
                let line = format_result(&result);
                progress.suspend(|| {
                    crate::report!("{}", line);
                });
                tally.succeeded += 1;
                results.push(result);
            }
            Err(e) => {
                progress.suspend(|| {
                    crate::error!(
                        "[{}] {} failed for {:?}: {}",
                        strategy.id,
                        e.class(),
                        target.input,
                        e
                    );
                });
                tally.failed += 1;
            }
        }
        progress.inc(1);
    }

    (results, tally)
}

/// Enumerates the input, prepares the output tree and benchmarks every
/// selected strategy against every file.
///
/// # Errors
/// Only setup failures are returned: an unlistable input root, an invalid
/// configuration, colliding output names, or an output directory that
/// cannot be created. Per-strategy failures are logged and reported through
/// [`RunSummary::tallies`].
pub fn run_benchmarks(config: &BenchConfig) -> Result<RunSummary> {
    config.validate()?;

    crate::info!("🚀 Starting compression benchmark...");
    crate::info!("📁 Input: {}", config.input);
    crate::info!("📁 Output: {:?}", config.output_dir);

    let start_time = Instant::now();

    let image_files = collect_image_files(&config.input, &config.extensions, config.recursive)?;
    if image_files.is_empty() {
        crate::warn!("No image files found in the input path");
        return Ok(RunSummary::default());
    }

    crate::info!(
        "📊 Found {} image files, {} strategies each",
        image_files.len(),
        config.strategies.len()
    );

    let targets = plan_targets(&config.input, &image_files, &config.output_dir)?;
    let output_dirs: BTreeSet<&Path> = targets
        .iter()
        .filter_map(|t| t.output_base.parent())
        .collect();
    for dir in output_dirs {
        fs::create_dir_all(dir)
            .map_err(|_| BenchError::DirectoryCreationFailed(dir.to_path_buf()))?;
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads.unwrap_or(0))
        .build()
        .map_err(|e| BenchError::Io(io::Error::new(io::ErrorKind::Other, e)))?;
    crate::verbose!("Using {} worker threads", pool.current_num_threads());

    let progress = if crate::logger::is_quiet() {
        ProgressBar::hidden()
    } else {
        ProgressBar::new((targets.len() * config.strategies.len()) as u64)
    };
    progress.set_style(
        ProgressStyle::default_bar()
            .template(PROGRESS_BAR_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    let outcomes: Vec<(Vec<BenchmarkResult>, FileTally)> = pool.install(|| {
        targets
            .par_iter()
            .map(|target| run_file(target, &config.strategies, &progress))
            .collect()
    });

    progress.finish_and_clear();

    let mut summary = RunSummary::default();
    for (results, tally) in outcomes {
        summary.results.extend(results);
        summary.tallies.push(tally);
    }
    summary.elapsed = start_time.elapsed();

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::ResizeRule;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use tempfile::TempDir;

    fn write_jpeg(path: &Path, width: u32, height: u32) {
        let img = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 5 ^ y * 3) as u8, (x + y) as u8, (x * y) as u8])
        });
        DynamicImage::ImageRgb8(img)
            .save_with_format(path, ImageFormat::Jpeg)
            .unwrap();
    }

    fn write_png(path: &Path, width: u32, height: u32) {
        let img = RgbImage::from_fn(width, height, |x, y| Rgb([x as u8, y as u8, 90]));
        DynamicImage::ImageRgb8(img)
            .save_with_format(path, ImageFormat::Png)
            .unwrap();
    }

    #[test]
    fn test_generate_output_path() {
        let result = generate_output_path(
            Path::new("in_images/a.jpeg"),
            Path::new("out_images"),
            StrategyId::Quality60Jpeg,
            Codec::Jpeg,
        )
        .unwrap();
        assert_eq!(
            result,
            PathBuf::from("out_images/a_compressed_quality-60-jpeg.jpg")
        );

        let result = generate_output_path(
            Path::new("photo.JPG"),
            Path::new("/tmp/out"),
            StrategyId::PngLossless,
            Codec::Png,
        )
        .unwrap();
        assert_eq!(
            result,
            PathBuf::from("/tmp/out/photo_compressed_png-lossless.png")
        );
    }

    #[test]
    fn test_generate_output_path_invalid_name() {
        let result = generate_output_path(
            Path::new("/"),
            Path::new("out"),
            StrategyId::Quality60Jpeg,
            Codec::Jpeg,
        );
        assert!(matches!(result, Err(BenchError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_plan_targets_keeps_extension_for_shared_stems() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let files = vec![root.join("a.jpg"), root.join("a.png"), root.join("b.gif")];
        for file in &files {
            std::fs::write(file, b"x").unwrap();
        }
        let out = Path::new("out");

        let targets = plan_targets(&root.to_string_lossy(), &files, out).unwrap();
        let bases: Vec<_> = targets.iter().map(|t| t.output_base.clone()).collect();
        assert_eq!(
            bases,
            vec![out.join("a_jpg"), out.join("a_png"), out.join("b")]
        );
        assert_eq!(
            targets[0].output_path(StrategyId::Quality60Jpeg, Codec::Jpeg),
            out.join("a_jpg_compressed_quality-60-jpeg.jpg")
        );
    }

    #[test]
    fn test_plan_targets_mirrors_subdirectories() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        std::fs::create_dir(root.join("sub")).unwrap();
        let files = vec![root.join("a.jpg"), root.join("sub").join("a.jpg")];

        let targets = plan_targets(&root.to_string_lossy(), &files, Path::new("out")).unwrap();
        assert_eq!(targets[0].output_base, Path::new("out").join("a"));
        assert_eq!(targets[1].output_base, Path::new("out").join("sub").join("a"));
    }

    #[test]
    fn test_plan_targets_glob_uses_common_parent() {
        let files = vec![
            PathBuf::from("shots/day1/a.jpg"),
            PathBuf::from("shots/day2/a.jpg"),
        ];
        let targets = plan_targets("shots/*/*.jpg", &files, Path::new("out")).unwrap();
        assert_eq!(targets[0].output_base, Path::new("out").join("day1").join("a"));
        assert_eq!(targets[1].output_base, Path::new("out").join("day2").join("a"));
    }

    #[test]
    fn test_plan_targets_single_file() {
        let files = vec![PathBuf::from("photos/a.jpeg")];
        let targets = plan_targets("photos/a.jpeg", &files, Path::new("out")).unwrap();
        assert_eq!(targets[0].output_base, Path::new("out").join("a"));
    }

    #[test]
    fn test_plan_targets_reports_collision() {
        let files = vec![
            PathBuf::from("in/a.jpg"),
            PathBuf::from("in/a.png"),
            PathBuf::from("in/a_jpg.gif"),
        ];
        let result = plan_targets("in/*", &files, Path::new("out"));
        match result {
            Err(BenchError::OutputCollision { first, second, .. }) => {
                assert_eq!(first, PathBuf::from("in/a.jpg"));
                assert_eq!(second, PathBuf::from("in/a_jpg.gif"));
            }
            other => panic!("expected collision, got {:?}", other),
        }
    }

    #[test]
    fn test_run_strategy_every_registry_entry() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("a.jpeg");
        write_jpeg(&input, 100, 60);
        let target = ImageTarget::new(&input, temp_dir.path()).unwrap();

        for id in StrategyId::ALL {
            let result = run_strategy(&target, &SelectedStrategy::new(id)).unwrap();
            assert_eq!(result.strategy, id);
            assert!(result.original_size > 0);
            assert!(result.compressed_size > 0);
            assert_eq!(result.source_dimensions, (100, 60));
            assert!(image::open(&result.output).is_ok(), "{} output undecodable", id);
        }
    }

    #[test]
    fn test_run_strategy_quality_keeps_dimensions() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("a.jpeg");
        write_jpeg(&input, 120, 80);
        let target = ImageTarget::new(&input, temp_dir.path()).unwrap();

        let result = run_strategy(&target, &SelectedStrategy::new(StrategyId::Quality85Jpeg)).unwrap();
        assert_eq!(result.output_dimensions, (120, 80));
        assert!(result.dimensions_preserved());
    }

    #[test]
    fn test_run_strategy_resize_90pct() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("big.jpeg");
        write_jpeg(&input, 1000, 1000);
        let target = ImageTarget::new(&input, temp_dir.path()).unwrap();

        let result = run_strategy(&target, &SelectedStrategy::new(StrategyId::Resize90Pct)).unwrap();
        assert_eq!(result.source_dimensions, (1000, 1000));
        assert_eq!(result.output_dimensions, (900, 900));
        assert!(!result.dimensions_preserved());
        assert_eq!(image::open(&result.output).unwrap().dimensions(), (900, 900));
    }

    #[test]
    fn test_run_strategy_corrupt_input_leaves_no_output() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("broken.jpg");
        std::fs::write(&input, b"not really a jpeg").unwrap();
        let out_dir = temp_dir.path().join("out");
        std::fs::create_dir(&out_dir).unwrap();
        let target = ImageTarget::new(&input, &out_dir).unwrap();

        let result = run_strategy(&target, &SelectedStrategy::new(StrategyId::Quality60Jpeg));
        assert!(matches!(result, Err(BenchError::Decode(_))));
        assert_eq!(std::fs::read_dir(&out_dir).unwrap().count(), 0);
    }

    #[test]
    fn test_run_file_continues_after_failure() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("a.jpeg");
        write_jpeg(&input, 40, 40);

        let mut half = SelectedStrategy::new(StrategyId::Resize90Pct);
        half.config.resize = ResizeRule::Scale(0.5);
        let strategies = vec![SelectedStrategy::new(StrategyId::Quality60Jpeg), half];

        // Every write fails when the output directory is missing
        let missing = ImageTarget::new(&input, &temp_dir.path().join("missing")).unwrap();
        let (results, tally) = run_file(&missing, &strategies, &ProgressBar::hidden());
        assert!(results.is_empty());
        assert_eq!(tally.failed, 2);

        let target = ImageTarget::new(&input, temp_dir.path()).unwrap();
        let (results, tally) = run_file(&target, &strategies, &ProgressBar::hidden());
        assert_eq!(results.len(), 2);
        assert_eq!(results[1].output_dimensions, (20, 20));
        assert_eq!(tally.succeeded, 2);
        assert_eq!(tally.failed, 0);
    }

    #[test]
    fn test_run_benchmarks_mixed_directory() {
        let temp_dir = TempDir::new().unwrap();
        let input_dir = temp_dir.path().join("in_images");
        std::fs::create_dir(&input_dir).unwrap();
        write_jpeg(&input_dir.join("a.jpeg"), 64, 64);
        std::fs::write(input_dir.join("b.txt"), b"notes").unwrap();
        std::fs::write(input_dir.join("c.jpg"), b"corrupt").unwrap();
        let output_dir = temp_dir.path().join("out_images");

        let config = BenchConfig::new(input_dir.to_string_lossy(), &output_dir)
            .with_strategies(&["quality-60-jpeg", "png-lossless"])
            .unwrap()
            .with_threads(Some(1));
        let summary = run_benchmarks(&config).unwrap();

        assert_eq!(summary.tallies.len(), 2);
        assert_eq!(summary.tallies[0].path, input_dir.join("a.jpeg"));
        assert_eq!(summary.tallies[0].succeeded, 2);
        assert_eq!(summary.tallies[1].path, input_dir.join("c.jpg"));
        assert_eq!(summary.tallies[1].failed, 2);
        assert_eq!(summary.total_succeeded(), 2);
        assert_eq!(summary.total_failed(), 2);

        assert!(output_dir.join("a_compressed_quality-60-jpeg.jpg").is_file());
        assert!(output_dir.join("a_compressed_png-lossless.png").is_file());
        assert!(!output_dir.join("c_compressed_quality-60-jpeg.jpg").exists());
    }

    #[test]
    fn test_run_benchmarks_same_stem_different_extensions() {
        let temp_dir = TempDir::new().unwrap();
        let input_dir = temp_dir.path().join("in_images");
        std::fs::create_dir(&input_dir).unwrap();
        write_jpeg(&input_dir.join("a.jpg"), 400, 400);
        write_png(&input_dir.join("a.png"), 16, 16);
        let output_dir = temp_dir.path().join("out");

        let config = BenchConfig::new(input_dir.to_string_lossy(), &output_dir)
            .with_strategies(&["quality-60-jpeg"])
            .unwrap()
            .with_threads(Some(1));
        let summary = run_benchmarks(&config).unwrap();

        assert_eq!(summary.results.len(), 2);
        assert_ne!(summary.results[0].output, summary.results[1].output);
        assert_eq!(
            summary.results[0].output,
            output_dir.join("a_jpg_compressed_quality-60-jpeg.jpg")
        );
        assert_eq!(
            summary.results[1].output,
            output_dir.join("a_png_compressed_quality-60-jpeg.jpg")
        );
        for result in &summary.results {
            let on_disk = std::fs::metadata(&result.output).unwrap().len();
            assert_eq!(result.compressed_size, on_disk);
        }
        assert_eq!(summary.results[0].output_dimensions, (400, 400));
        assert_eq!(summary.results[1].output_dimensions, (16, 16));
    }

    #[test]
    fn test_run_benchmarks_recursive_mirrors_tree() {
        let temp_dir = TempDir::new().unwrap();
        let input_dir = temp_dir.path().join("in_images");
        std::fs::create_dir_all(input_dir.join("sub")).unwrap();
        write_jpeg(&input_dir.join("a.jpg"), 32, 32);
        write_jpeg(&input_dir.join("sub").join("a.jpg"), 48, 48);
        let output_dir = temp_dir.path().join("out");

        let config = BenchConfig::new(input_dir.to_string_lossy(), &output_dir)
            .with_strategies(&["quality-70-jpeg"])
            .unwrap()
            .with_recursive(true);
        let summary = run_benchmarks(&config).unwrap();

        assert_eq!(summary.total_succeeded(), 2);
        let top = output_dir.join("a_compressed_quality-70-jpeg.jpg");
        let nested = output_dir.join("sub").join("a_compressed_quality-70-jpeg.jpg");
        assert_eq!(image::open(top).unwrap().dimensions(), (32, 32));
        assert_eq!(image::open(nested).unwrap().dimensions(), (48, 48));
    }

    #[test]
    fn test_run_benchmarks_missing_input_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let config = BenchConfig::new(
            temp_dir.path().join("nowhere").to_string_lossy(),
            temp_dir.path().join("out"),
        );
        assert!(matches!(run_benchmarks(&config), Err(BenchError::Io(_))));
    }

    #[test]
    fn test_run_benchmarks_empty_input() {
        let temp_dir = TempDir::new().unwrap();
        let config = BenchConfig::new(temp_dir.path().to_string_lossy(), temp_dir.path().join("out"));
        let summary = run_benchmarks(&config).unwrap();
        assert!(summary.results.is_empty());
        assert!(summary.tallies.is_empty());
    }
}
