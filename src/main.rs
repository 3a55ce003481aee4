use anyhow::Context;
use clap::Parser;
use img_bench::cli::{Args, Commands};
use img_bench::report::{print_result_details, print_strategies, print_summary};
use img_bench::{info, logger, print_image_info, read_image_info, run_benchmarks};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init(args.quiet, args.verbose);

    match args.command {
        Commands::Run(run) => {
            let config = run.into_config().context("Invalid benchmark configuration")?;
            let summary = run_benchmarks(&config)
                .with_context(|| format!("Failed to benchmark images from {}", config.input))?;

            if let [single] = summary.results.as_slice() {
                print_result_details(single);
            }
            print_summary(&summary);
        }
        Commands::Strategies => {
            print_strategies();
        }
        Commands::Info { input } => {
            info!("📋 Getting info for: {:?}", input);
            let image_info = read_image_info(&input)
                .with_context(|| format!("Failed to read image info for {:?}", input))?;
            print_image_info(&image_info);
        }
    }

    Ok(())
}
