use std::sync::atomic::{AtomicU8, Ordering};
use tracing_subscriber::EnvFilter;

/// How much console output the session prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Verbosity {
    /// Errors only
    Quiet = 0,
    Normal = 1,
    /// Adds drop target and download details
    Verbose = 2,
}

impl Verbosity {
    /// `--quiet` beats `--verbose` when both are given.
    pub fn from_flags(quiet: bool, verbose: bool) -> Self {
        match (quiet, verbose) {
            (true, _) => Verbosity::Quiet,
            (false, true) => Verbosity::Verbose,
            (false, false) => Verbosity::Normal,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => Verbosity::Quiet,
            2 => Verbosity::Verbose,
            _ => Verbosity::Normal,
        }
    }
}

static VERBOSITY: AtomicU8 = AtomicU8::new(Verbosity::Normal as u8);

pub fn set_verbosity(verbosity: Verbosity) {
    VERBOSITY.store(verbosity as u8, Ordering::Relaxed);
}

pub fn verbosity() -> Verbosity {
    Verbosity::from_u8(VERBOSITY.load(Ordering::Relaxed))
}

/// Whether console output at `level` is printed.
pub fn enabled(level: Verbosity) -> bool {
    verbosity() >= level
}

/// Installs the stderr diagnostics subscriber.
///
/// `RUST_LOG` wins when set; otherwise `--verbose` selects `debug` for this
/// crate and everything else stays at `warn`.
pub fn init_tracing(verbose: bool) {
    let default_directive = if verbose {
        "warn,img_preview=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    // A second init (e.g. in tests) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Status line on stdout.
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        if $crate::logger::enabled($crate::logger::Verbosity::Normal) {
            println!($($arg)*);
        }
    };
}

/// Detail line on stdout, shown with `--verbose`.
#[macro_export]
macro_rules! verbose {
    ($($arg:tt)*) => {
        if $crate::logger::enabled($crate::logger::Verbosity::Verbose) {
            println!("🔍 {}", format_args!($($arg)*));
        }
    };
}

/// Failure on stderr; printed even when quiet.
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        eprintln!("❌ {}", format_args!($($arg)*));
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        if $crate::logger::enabled($crate::logger::Verbosity::Normal) {
            eprintln!("⚠️  {}", format_args!($($arg)*));
        }
    };
}
