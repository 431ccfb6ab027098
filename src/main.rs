use anyhow::Context;
use clap::Parser;
use img_preview::cli::{Args, Commands};
use img_preview::codec::Quality;
use img_preview::constants::INFO_PREFIX;
use img_preview::info::{get_image_info, print_image_info};
use img_preview::interactive::{compress_once, run_session};
use img_preview::logger;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    logger::set_verbosity(logger::Verbosity::from_flags(args.quiet, args.verbose));
    logger::init_tracing(args.verbose);

    match args.command {
        Commands::Open {
            input,
            quality,
            output_dir,
        } => {
            let quality = Quality::resolve(quality)?;
            run_session(input, quality, output_dir)
                .await
                .context("interactive session failed")?;
        }
        Commands::Compress {
            input,
            quality,
            output_dir,
        } => {
            let quality = Quality::resolve(quality)?;
            compress_once(&input, quality, &output_dir)
                .await
                .with_context(|| format!("failed to compress {:?}", input))?;
        }
        Commands::Info { input } => {
            img_preview::info!("{} Getting info for: {:?}", INFO_PREFIX, input);
            let info = get_image_info(&input)
                .await
                .with_context(|| format!("failed to read {:?}", input))?;
            print_image_info(&info);
        }
    }

    Ok(())
}
