use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "img-preview",
    about = "Re-encode an image at an adjustable quality and preview the savings",
    long_about = "img-preview loads a single image, re-encodes it in its own format at a \
                  quality you choose, and reports original size, compressed size, dimensions \
                  and compression ratio. Change the quality as often as you like, then save \
                  the result as compressed_<name>.",
    version,
    after_help = "EXAMPLES:\n  \
    img-preview open photo.jpg -q 70\n  \
    img-preview compress photo.jpg -q 50 -o ./out\n  \
    img-preview info photo.png"
)]
pub struct Args {
    #[arg(short = 'Q', long, global = true, help = "Only print errors")]
    pub quiet: bool,

    #[arg(
        short = 'v',
        long,
        global = true,
        help = "Print extra detail and debug diagnostics",
        long_help = "Print extra detail on stdout and enable debug diagnostics on stderr. \
                     RUST_LOG overrides the diagnostics filter."
    )]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(
        about = "Start an interactive preview session",
        long_about = "Start an interactive session that reads commands from stdin: \
                      open, drop, drag, quality, status, save, help, quit. \
                      Every quality change re-encodes the loaded image in the background."
    )]
    Open {
        #[arg(help = "Image to load right away")]
        input: Option<PathBuf>,

        #[arg(
            short = 'q',
            long,
            help = "Initial quality (1-100, default: 80)",
            long_help = "Initial position of the quality control, from 1 (smallest) to 100 (best). \
                         JPEG uses it as the lossy factor, PNG as optimizer effort, \
                         other formats ignore it."
        )]
        quality: Option<u8>,

        #[arg(
            short = 'o',
            long,
            default_value = ".",
            help = "Directory that `save` writes to"
        )]
        output_dir: PathBuf,
    },

    #[command(
        about = "Re-encode one image and save the result",
        long_about = "Load one image, re-encode it at the given quality in the same format, \
                      print the size fields and write compressed_<name> into the output directory."
    )]
    Compress {
        #[arg(help = "Input image file path")]
        input: PathBuf,

        #[arg(
            short = 'q',
            long,
            help = "Compression quality (1-100, default: 80)"
        )]
        quality: Option<u8>,

        #[arg(
            short = 'o',
            long,
            default_value = ".",
            help = "Directory for compressed_<name>"
        )]
        output_dir: PathBuf,
    },

    #[command(
        about = "Display image information",
        long_about = "Show media type, dimensions, file size and how the format's encoder \
                      treats the quality setting."
    )]
    Info {
        #[arg(help = "Image file path to analyze")]
        input: PathBuf,
    },
}
