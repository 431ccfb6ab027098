use crate::codec::{ImageCodec, Quality};
use crate::constants::{
    COMPRESSED_SIZE_PREFIX, COMPRESSION_RATIO_PREFIX, DIMENSIONS_PREFIX, ORIGINAL_SIZE_PREFIX,
    QUALITY_PREFIX, SUCCESS_PREFIX,
};
use crate::controller::{Completions, Controller, Event, Screen, View};
use crate::error::{CompressionError, Result};
use crate::session::SourceFile;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "Commands:
  open <path>          pick a file
  drop <path>...       drop files (only the first is used)
  drag enter|over|leave
  quality <1-100>      set the quality slider
  status               show the current fields
  save [dir]           write compressed_<name> (default: output dir)
  help                 show this help
  quit                 leave the session";

/// Prints whatever changed since the previous render.
#[derive(Debug, Default)]
pub struct TerminalScreen {
    last: Option<View>,
}

impl TerminalScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn print_status(view: &View) {
        crate::info!("{} {}", QUALITY_PREFIX, view.quality_label);
        match &view.original {
            Some(original) => {
                crate::info!("{} {}", ORIGINAL_SIZE_PREFIX, original.size);
                crate::info!("{} {}", DIMENSIONS_PREFIX, original.dimensions);
            }
            None => crate::info!("📂 No file loaded"),
        }
        match &view.output {
            Some(output) => {
                crate::info!("{} {}", COMPRESSED_SIZE_PREFIX, output.metrics.compressed_size);
                crate::info!("{} {}", COMPRESSION_RATIO_PREFIX, output.metrics.ratio);
                crate::info!("💾 Download: {}", output.download.file_name);
            }
            None if view.original.is_some() => crate::info!("⏳ Re-encoding..."),
            None => {}
        }
    }
}

impl Screen for TerminalScreen {
    fn render(&mut self, view: &View) {
        let last = self.last.take();
        let last = last.as_ref();

        if last.map(|l| l.drop_highlight) != Some(view.drop_highlight) && view.drop_highlight {
            crate::verbose!("Drop target highlighted");
        }
        if last.map(|l| &l.quality_label) != Some(&view.quality_label) {
            crate::info!("{} {}", QUALITY_PREFIX, view.quality_label);
        }
        if last.map(|l| &l.original) != Some(&view.original) {
            if let Some(original) = &view.original {
                crate::info!("{} {}", ORIGINAL_SIZE_PREFIX, original.size);
                crate::info!("{} {}", DIMENSIONS_PREFIX, original.dimensions);
            }
        }
        if last.map(|l| &l.output) != Some(&view.output) {
            if let Some(output) = &view.output {
                crate::info!("{} {}", COMPRESSED_SIZE_PREFIX, output.metrics.compressed_size);
                crate::info!("{} {}", COMPRESSION_RATIO_PREFIX, output.metrics.ratio);
                crate::verbose!(
                    "Download ready: {} ({})",
                    output.download.file_name,
                    output.download.media_type
                );
            }
        }

        self.last = Some(view.clone());
    }

    fn notify_error(&mut self, error: &CompressionError) {
        crate::error!("{}", error);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragGesture {
    Enter,
    Over,
    Leave,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Open(PathBuf),
    Drop(Vec<PathBuf>),
    Drag(DragGesture),
    Quality(u8),
    Status,
    Save(Option<PathBuf>),
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> std::result::Result<Command, String> {
    let mut parts = line.split_whitespace();
    let Some(verb) = parts.next() else {
        return Err("empty command".to_string());
    };
    let args: Vec<&str> = parts.collect();

    match (verb.to_lowercase().as_str(), args.as_slice()) {
        ("open", [path]) => Ok(Command::Open(PathBuf::from(path))),
        ("open", _) => Err("usage: open <path>".to_string()),
        ("drop", []) => Err("usage: drop <path>...".to_string()),
        ("drop", paths) => Ok(Command::Drop(paths.iter().map(PathBuf::from).collect())),
        ("drag", ["enter"]) => Ok(Command::Drag(DragGesture::Enter)),
        ("drag", ["over"]) => Ok(Command::Drag(DragGesture::Over)),
        ("drag", ["leave"]) => Ok(Command::Drag(DragGesture::Leave)),
        ("drag", _) => Err("usage: drag enter|over|leave".to_string()),
        ("quality" | "q", [value]) => value
            .parse::<u8>()
            .map(Command::Quality)
            .map_err(|_| format!("invalid quality: {}", value)),
        ("quality" | "q", _) => Err("usage: quality <1-100>".to_string()),
        ("status", []) => Ok(Command::Status),
        ("save", []) => Ok(Command::Save(None)),
        ("save", [dir]) => Ok(Command::Save(Some(PathBuf::from(dir)))),
        ("help" | "?", _) => Ok(Command::Help),
        ("quit" | "exit", _) => Ok(Command::Quit),
        (other, _) => Err(format!("unknown command: {} (try `help`)", other)),
    }
}

async fn pick_file(controller: &mut Controller<TerminalScreen>, path: &Path) {
    match SourceFile::open(path).await {
        Ok(file) => {
            crate::verbose!("Opened {:?} as {}", path, file.media_type);
            controller.handle(Event::FilePicked(file)).await;
        }
        Err(err) => controller.screen_mut().notify_error(&err),
    }
}

async fn drop_files(controller: &mut Controller<TerminalScreen>, paths: &[PathBuf]) {
    let mut files = Vec::new();
    if let Some(first) = paths.first() {
        match SourceFile::open(first).await {
            Ok(file) => files.push(file),
            Err(err) => controller.screen_mut().notify_error(&err),
        }
    }
    controller.handle(Event::FilesDropped(files)).await;
}

/// Write the latest re-encode, waiting for anything still in flight.
pub async fn save_download(
    controller: &mut Controller<TerminalScreen>,
    completions: &mut Completions,
    dir: &Path,
) -> Result<PathBuf> {
    controller.settle(completions).await;
    let download = controller
        .download()
        .ok_or(CompressionError::NothingToDownload)?;
    download.save_into(dir).await
}

/// Interactive session on stdin. Re-encodes finish in the background and
/// are shown as they arrive.
pub async fn run_session(initial: Option<PathBuf>, quality: Quality, out_dir: PathBuf) -> Result<()> {
    let (mut controller, mut completions) =
        Controller::new(Arc::new(ImageCodec), TerminalScreen::new(), quality);

    crate::info!("🖼️  img-preview session. Type `help` for commands.");
    if let Some(path) = initial {
        pick_file(&mut controller, &path).await;
    }

    // Split on raw bytes so a line that is not UTF-8 is reported, not fatal.
    let mut lines = BufReader::new(tokio::io::stdin()).split(b'\n');
    loop {
        tokio::select! {
            segment = lines.next_segment() => {
                let Some(segment) = segment? else {
                    break;
                };
                let line = match String::from_utf8(segment) {
                    Ok(line) => line,
                    Err(err) => {
                        let lossy = String::from_utf8_lossy(err.as_bytes()).into_owned();
                        crate::warn!("input is not valid UTF-8: {}", lossy.trim());
                        lossy
                    }
                };
                if line.trim().is_empty() {
                    continue;
                }
                let command = match parse_command(&line) {
                    Ok(command) => command,
                    Err(message) => {
                        crate::warn!("{}", message);
                        continue;
                    }
                };
                match command {
                    Command::Open(path) => pick_file(&mut controller, &path).await,
                    Command::Drop(paths) => drop_files(&mut controller, &paths).await,
                    Command::Drag(gesture) => {
                        let event = match gesture {
                            DragGesture::Enter => Event::DragEnter,
                            DragGesture::Over => Event::DragOver,
                            DragGesture::Leave => Event::DragLeave,
                        };
                        controller.handle(event).await;
                    }
                    Command::Quality(value) => {
                        controller.handle(Event::QualityChanged(value)).await;
                    }
                    Command::Status => TerminalScreen::print_status(controller.view()),
                    Command::Save(dir) => {
                        let dir = dir.unwrap_or_else(|| out_dir.clone());
                        match save_download(&mut controller, &mut completions, &dir).await {
                            Ok(path) => crate::info!("{} Saved {:?}", SUCCESS_PREFIX, path),
                            Err(err) => controller.screen_mut().notify_error(&err),
                        }
                    }
                    Command::Help => crate::info!("{}", HELP),
                    Command::Quit => break,
                }
            }
            Some(completion) = completions.recv() => controller.apply(completion),
        }
    }

    Ok(())
}

/// Load one file, re-encode it once and write the download.
pub async fn compress_once(input: &Path, quality: Quality, out_dir: &Path) -> Result<PathBuf> {
    let (mut controller, mut completions) =
        Controller::new(Arc::new(ImageCodec), TerminalScreen::new(), quality);

    crate::info!("🗜️  Compressing image: {:?}", input);
    let file = SourceFile::open(input).await?;
    controller.handle(Event::FilePicked(file)).await;
    controller.settle(&mut completions).await;

    // Surface the load or re-encode failure instead of the empty download.
    if controller.download().is_none() {
        if let Some(err) = controller.take_failure() {
            return Err(err);
        }
    }

    let path = save_download(&mut controller, &mut completions, out_dir).await?;
    crate::info!("{} Saved {:?}", SUCCESS_PREFIX, path);
    Ok(path)
}
