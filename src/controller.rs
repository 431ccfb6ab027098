//! Interaction controller
//!
//! Turns user events (file picked, file dropped, drag gestures, quality
//! changes) into session loads and re-encodes, and keeps a [`View`] that a
//! [`Screen`] renders.
//!
//! Re-encodes run as spawned tasks and report back through a channel. The
//! owner of the receiver hands each [`Completion`] to [`Controller::apply`].
//! A completion is shown only when it belongs to the current source and is
//! newer than the result on screen, so a slow early request can never
//! overwrite a later one.

use crate::codec::{self, Codec, EncodedResult, Quality};
use crate::error::{CompressionError, Result};
use crate::session::{DecodedImage, SessionState, SourceFile};
use crate::utils::{
    calculate_compression_ratio, compressed_file_name, format_dimensions, format_file_size,
    format_ratio,
};
use crate::validation::prepare_output_path;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Debug, Clone)]
pub enum Event {
    /// File chosen through the picker
    FilePicked(SourceFile),
    /// Files released over the drop target; only the first is used
    FilesDropped(Vec<SourceFile>),
    DragEnter,
    DragOver,
    DragLeave,
    QualityChanged(u8),
}

/// Whether the platform's default handling of an event should still run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handled {
    /// Default handling suppressed
    Consumed,
    PassThrough,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Loaded,
}

/// Display strings derived from one source and one re-encode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metrics {
    pub original_size: String,
    pub compressed_size: String,
    pub dimensions: String,
    pub ratio: String,
}

impl Metrics {
    pub fn derive(source: &SourceFile, image: &DecodedImage, result: &EncodedResult) -> Self {
        Self {
            original_size: format_file_size(source.len()),
            compressed_size: format_file_size(result.len()),
            dimensions: format_dimensions(image.width, image.height),
            ratio: format_ratio(calculate_compression_ratio(source.len(), result.len())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub file_name: String,
    pub media_type: String,
    pub bytes: Arc<[u8]>,
}

impl Download {
    /// Writes the bytes as `dir/<file_name>`, creating `dir` when missing.
    pub async fn save_into(&self, dir: &Path) -> Result<PathBuf> {
        let path = prepare_output_path(dir, &self.file_name)?;
        tokio::fs::write(&path, &self.bytes).await?;
        tracing::debug!(path = %path.display(), bytes = self.bytes.len(), "saved download");
        Ok(path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginalPanel {
    pub preview: Arc<[u8]>,
    pub media_type: String,
    pub size: String,
    pub dimensions: String,
}

/// Compressed preview, metrics and download, always built from the same
/// [`EncodedResult`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPanel {
    pub result: EncodedResult,
    pub metrics: Metrics,
    pub download: Download,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    pub phase: Phase,
    pub quality_label: String,
    pub drop_highlight: bool,
    pub original: Option<OriginalPanel>,
    pub output: Option<OutputPanel>,
}

impl View {
    fn new(quality: Quality) -> Self {
        Self {
            phase: Phase::Idle,
            quality_label: quality.to_string(),
            drop_highlight: false,
            original: None,
            output: None,
        }
    }
}

/// Where the view ends up: a terminal, a window, a test recorder.
pub trait Screen {
    fn render(&mut self, view: &View);

    /// Blocking notification of a failed action.
    fn notify_error(&mut self, error: &CompressionError);
}

#[derive(Debug)]
pub struct Completion {
    ticket: u64,
    generation: u64,
    result: Result<EncodedResult>,
}

pub type Completions = mpsc::UnboundedReceiver<Completion>;

pub struct Controller<S: Screen> {
    session: SessionState,
    codec: Arc<dyn Codec>,
    quality: Quality,
    view: View,
    screen: S,
    completions: mpsc::UnboundedSender<Completion>,
    next_ticket: u64,
    shown_ticket: u64,
    in_flight: usize,
    last_failure: Option<CompressionError>,
}

impl<S: Screen> Controller<S> {
    pub fn new(codec: Arc<dyn Codec>, screen: S, quality: Quality) -> (Self, Completions) {
        let (tx, rx) = mpsc::unbounded_channel();
        let controller = Self {
            session: SessionState::new(),
            codec,
            quality,
            view: View::new(quality),
            screen,
            completions: tx,
            next_ticket: 0,
            shown_ticket: 0,
            in_flight: 0,
            last_failure: None,
        };
        (controller, rx)
    }

    pub async fn handle(&mut self, event: Event) -> Handled {
        match event {
            Event::FilePicked(file) => {
                self.load(file).await;
                Handled::PassThrough
            }
            Event::FilesDropped(files) => {
                self.view.drop_highlight = false;
                match files.into_iter().next() {
                    Some(file) => self.load(file).await,
                    None => self.render(),
                }
                Handled::Consumed
            }
            Event::DragEnter => {
                self.set_highlight(true);
                Handled::PassThrough
            }
            Event::DragOver => {
                self.set_highlight(true);
                Handled::Consumed
            }
            Event::DragLeave => {
                self.set_highlight(false);
                Handled::Consumed
            }
            Event::QualityChanged(value) => {
                self.change_quality(value);
                Handled::PassThrough
            }
        }
    }

    /// Apply a finished re-encode if it is still the most recent one for
    /// the current source.
    pub fn apply(&mut self, completion: Completion) {
        self.in_flight = self.in_flight.saturating_sub(1);

        let Completion {
            ticket,
            generation,
            result,
        } = completion;

        if generation != self.session.generation() || ticket <= self.shown_ticket {
            tracing::debug!(ticket, generation, "dropped superseded re-encode");
            return;
        }

        let encoded = match result {
            Ok(encoded) => encoded,
            Err(err) => {
                tracing::warn!(ticket, error = %err, "re-encode failed");
                self.report(err);
                return;
            }
        };

        let Some(loaded) = self.session.current() else {
            return;
        };

        let metrics = Metrics::derive(&loaded.source, &loaded.image, &encoded);
        let download = Download {
            file_name: compressed_file_name(&loaded.source.name),
            media_type: encoded.media_type.clone(),
            bytes: Arc::clone(&encoded.bytes),
        };

        // The previous panel, and with it the previous buffer, is released here.
        self.view.output = Some(OutputPanel {
            result: encoded,
            metrics,
            download,
        });
        self.shown_ticket = ticket;
        self.last_failure = None;
        self.render();
    }

    /// Wait for every re-encode started so far and apply it.
    pub async fn settle(&mut self, completions: &mut Completions) {
        while self.in_flight > 0 {
            match completions.recv().await {
                Some(completion) => self.apply(completion),
                None => break,
            }
        }
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn phase(&self) -> Phase {
        self.view.phase
    }

    pub fn quality(&self) -> Quality {
        self.quality
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn screen(&self) -> &S {
        &self.screen
    }

    pub fn screen_mut(&mut self) -> &mut S {
        &mut self.screen
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Most recent load or re-encode failure not yet followed by a success.
    pub fn take_failure(&mut self) -> Option<CompressionError> {
        self.last_failure.take()
    }

    /// Bound only once a re-encode has succeeded.
    pub fn download(&self) -> Option<&Download> {
        self.view.output.as_ref().map(|output| &output.download)
    }

    async fn load(&mut self, file: SourceFile) {
        let codec = Arc::clone(&self.codec);
        match self.session.load(file, codec).await {
            Ok(_) => {
                if let Some(loaded) = self.session.current() {
                    self.view.original = Some(OriginalPanel {
                        preview: Arc::clone(&loaded.source.bytes),
                        media_type: loaded.source.media_type.clone(),
                        size: format_file_size(loaded.source.len()),
                        dimensions: format_dimensions(loaded.image.width, loaded.image.height),
                    });
                }
                self.view.phase = Phase::Loaded;
                self.view.output = None;
                self.last_failure = None;
                self.start_reencode();
            }
            Err(err) => {
                tracing::debug!(error = %err, "load failed");
                self.report(err);
            }
        }
        self.render();
    }

    fn change_quality(&mut self, value: u8) {
        let quality = match Quality::new(value) {
            Ok(quality) => quality,
            Err(err) => {
                self.report(err);
                return;
            }
        };

        self.quality = quality;
        self.view.quality_label = quality.to_string();
        if self.view.phase == Phase::Loaded {
            self.start_reencode();
        }
        self.render();
    }

    fn start_reencode(&mut self) {
        let Some(loaded) = self.session.current() else {
            return;
        };

        self.next_ticket += 1;
        let ticket = self.next_ticket;
        let generation = self.session.generation();
        let codec = Arc::clone(&self.codec);
        let bytes = Arc::clone(&loaded.source.bytes);
        let media_type = loaded.source.media_type.clone();
        let quality = self.quality;
        let tx = self.completions.clone();

        tracing::debug!(ticket, generation, quality = quality.value(), "starting re-encode");
        self.in_flight += 1;
        tokio::spawn(async move {
            let result = codec::reencode(codec, bytes, media_type, quality).await;
            // The receiver is gone only when the session has ended.
            let _ = tx.send(Completion {
                ticket,
                generation,
                result,
            });
        });
    }

    fn report(&mut self, err: CompressionError) {
        self.screen.notify_error(&err);
        if err.is_user_facing() {
            self.last_failure = Some(err);
        }
    }

    fn set_highlight(&mut self, on: bool) {
        if self.view.drop_highlight != on {
            self.view.drop_highlight = on;
            self.render();
        }
    }

    fn render(&mut self) {
        self.screen.render(&self.view);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::ImageCodec;

    #[derive(Default)]
    struct Recorder {
        renders: Vec<View>,
        errors: Vec<String>,
    }

    impl Screen for Recorder {
        fn render(&mut self, view: &View) {
            self.renders.push(view.clone());
        }

        fn notify_error(&mut self, error: &CompressionError) {
            self.errors.push(error.to_string());
        }
    }

    fn controller() -> (Controller<Recorder>, Completions) {
        Controller::new(Arc::new(ImageCodec), Recorder::default(), Quality::default())
    }

    #[tokio::test]
    async fn test_starts_idle_with_default_label() {
        let (controller, _rx) = controller();
        assert_eq!(controller.phase(), Phase::Idle);
        assert_eq!(controller.view().quality_label, "80%");
        assert!(controller.download().is_none());
    }

    #[tokio::test]
    async fn test_drag_events_toggle_highlight() {
        let (mut controller, _rx) = controller();

        assert_eq!(controller.handle(Event::DragEnter).await, Handled::PassThrough);
        assert!(controller.view().drop_highlight);

        assert_eq!(controller.handle(Event::DragOver).await, Handled::Consumed);
        assert!(controller.view().drop_highlight);

        assert_eq!(controller.handle(Event::DragLeave).await, Handled::Consumed);
        assert!(!controller.view().drop_highlight);
    }

    #[tokio::test]
    async fn test_empty_drop_is_consumed_and_clears_highlight() {
        let (mut controller, _rx) = controller();
        controller.handle(Event::DragOver).await;

        let handled = controller.handle(Event::FilesDropped(Vec::new())).await;

        assert_eq!(handled, Handled::Consumed);
        assert!(!controller.view().drop_highlight);
        assert_eq!(controller.phase(), Phase::Idle);
    }

    #[tokio::test]
    async fn test_quality_change_while_idle_updates_label_only() {
        let (mut controller, _rx) = controller();

        controller.handle(Event::QualityChanged(35)).await;

        assert_eq!(controller.view().quality_label, "35%");
        assert_eq!(controller.quality().value(), 35);
        assert_eq!(controller.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_out_of_range_quality_is_reported() {
        let (mut controller, _rx) = controller();

        controller.handle(Event::QualityChanged(0)).await;

        assert_eq!(controller.quality().value(), 80);
        assert_eq!(controller.screen().errors.len(), 1);
        // Slider misuse is reported but never kept as a failure.
        assert!(controller.take_failure().is_none());
    }

    #[tokio::test]
    async fn test_non_image_pick_stays_idle() {
        let (mut controller, _rx) = controller();
        let text = SourceFile::new("notes.txt", "text/plain", b"hi".to_vec());

        controller.handle(Event::FilePicked(text)).await;

        assert_eq!(controller.phase(), Phase::Idle);
        assert!(controller.screen().errors[0].contains("text/plain"));
        assert!(!controller.session().is_loaded());
        assert!(matches!(
            controller.take_failure(),
            Some(CompressionError::UnsupportedType(_))
        ));
        assert!(controller.take_failure().is_none());
    }

    #[test]
    fn test_metrics_derive() {
        let source = SourceFile::new("a.jpg", "image/jpeg", vec![0; 100_000]);
        let image = DecodedImage {
            width: 2000,
            height: 1000,
        };
        let result = EncodedResult {
            bytes: vec![0; 40_000].into(),
            media_type: "image/jpeg".to_string(),
            quality: Quality::new(50).unwrap(),
        };

        let metrics = Metrics::derive(&source, &image, &result);

        assert_eq!(metrics.original_size, "97.66 KB");
        assert_eq!(metrics.compressed_size, "39.06 KB");
        assert_eq!(metrics.dimensions, "2000 x 1000");
        assert_eq!(metrics.ratio, "60.0%");
    }
}
