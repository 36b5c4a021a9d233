// SPDX-License-Identifier: MPL-2.0
//! Fake collaborators and a ready-made host for bridge tests.
#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use zenconvert::app::persisted_state::AppState;
use zenconvert::application::port::{
    DialogError, DialogRequest, DownloadJob, ExtractError, FileDialog, ImageError, ImageJob,
    ImageMetadata, ImageProcessor, MediaProbe, TranscodeError, TranscodeJob, VideoExtractor,
    VideoTranscoder,
};
use zenconvert::bridge::{BridgeClient, BridgeContext, Collaborators, Dispatcher};
use zenconvert::config::Config;
use zenconvert::domain::youtube::{StreamFormat, VideoInfo};
use zenconvert::infrastructure::{ImageRsProcessor, TrackedWindow};

// =============================================================================
// Dialog
// =============================================================================

#[derive(Default)]
pub struct FakeDialog {
    pub picks: Mutex<Option<Vec<PathBuf>>>,
    pub calls: AtomicUsize,
    pub last_request: Mutex<Option<DialogRequest>>,
}

impl FakeDialog {
    pub fn picking(paths: Vec<PathBuf>) -> Self {
        Self {
            picks: Mutex::new(Some(paths)),
            ..Self::default()
        }
    }
}

impl FileDialog for FakeDialog {
    fn pick_files(
        &self,
        request: DialogRequest,
    ) -> BoxFuture<'_, Result<Option<Vec<PathBuf>>, DialogError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request);
        let picks = self.picks.lock().unwrap().clone();
        async move { Ok(picks) }.boxed()
    }
}

// =============================================================================
// Images
// =============================================================================

static REAL_IMAGES: ImageRsProcessor = ImageRsProcessor;

/// Either fakes conversions or forwards them to the real `image` adapter.
#[derive(Default)]
pub struct CountingImages {
    pub real: bool,
    pub calls: AtomicUsize,
    pub jobs: Mutex<Vec<ImageJob>>,
    /// Inputs whose name contains this fail with an encode error.
    pub fail_matching: Option<String>,
}

impl ImageProcessor for CountingImages {
    fn metadata(&self, path: PathBuf) -> BoxFuture<'_, Result<ImageMetadata, ImageError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.real {
            return REAL_IMAGES.metadata(path);
        }
        async move {
            Ok(ImageMetadata {
                width: Some(4),
                height: Some(3),
                format: Some("png".into()),
                size: 48,
            })
        }
        .boxed()
    }

    fn convert(&self, job: ImageJob) -> BoxFuture<'_, Result<PathBuf, ImageError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.jobs.lock().unwrap().push(job.clone());
        if let Some(needle) = &self.fail_matching {
            if job.input.to_string_lossy().contains(needle.as_str()) {
                let err = ImageError::Encode("unsupported pixel layout".into());
                return async move { Err(err) }.boxed();
            }
        }
        if self.real {
            return REAL_IMAGES.convert(job);
        }
        async move { Ok(job.output) }.boxed()
    }
}

// =============================================================================
// Transcoder
// =============================================================================

#[derive(Default)]
pub struct FakeTranscoder {
    pub calls: AtomicUsize,
    pub jobs: Mutex<Vec<TranscodeJob>>,
}

impl VideoTranscoder for FakeTranscoder {
    fn transcode(&self, job: TranscodeJob) -> BoxFuture<'_, Result<PathBuf, TranscodeError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.jobs.lock().unwrap().push(job.clone());
        async move { Ok(job.output) }.boxed()
    }

    fn probe(&self, _path: PathBuf) -> BoxFuture<'_, Result<MediaProbe, TranscodeError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        async move {
            Ok(MediaProbe {
                width: Some(1920),
                height: Some(1080),
                duration: Some(12.5),
                bitrate: Some(4_000_000),
                format: Some("mov,mp4,m4a,3gp,3g2,mj2".into()),
            })
        }
        .boxed()
    }
}

// =============================================================================
// Extractor
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractorMode {
    #[default]
    Working,
    BotBlocked,
    Panics,
}

#[derive(Default)]
pub struct FakeExtractor {
    pub mode: ExtractorMode,
    pub calls: AtomicUsize,
    pub downloads: Mutex<Vec<DownloadJob>>,
}

impl FakeExtractor {
    pub fn with_mode(mode: ExtractorMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }
}

pub fn sample_info() -> VideoInfo {
    VideoInfo {
        id: "dQw4w9WgXcQ".into(),
        title: "Sample".into(),
        duration: 212.0,
        thumbnail: "https://i.ytimg.com/vi/dQw4w9WgXcQ/hq.jpg".into(),
        uploader: "Uploader".into(),
        views: Some(42),
        description: None,
        formats: vec![StreamFormat {
            format_id: "18".into(),
            extension: "mp4".into(),
            resolution: Some("640x360".into()),
            filesize: None,
            has_video: true,
            has_audio: true,
        }],
    }
}

impl VideoExtractor for FakeExtractor {
    fn info(&self, url: String) -> BoxFuture<'_, Result<VideoInfo, ExtractError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.mode {
            ExtractorMode::Working => async move {
                let mut info = sample_info();
                info.description = Some(url);
                Ok(info)
            }
            .boxed(),
            ExtractorMode::BotBlocked => async { Err(ExtractError::BotDetected) }.boxed(),
            ExtractorMode::Panics => panic!("extractor exploded"),
        }
    }

    fn download(&self, job: DownloadJob) -> BoxFuture<'_, Result<PathBuf, ExtractError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.downloads.lock().unwrap().push(job.clone());
        match self.mode {
            ExtractorMode::Working => async move { Ok(job.output) }.boxed(),
            ExtractorMode::BotBlocked => async { Err(ExtractError::BotDetected) }.boxed(),
            ExtractorMode::Panics => panic!("extractor exploded"),
        }
    }
}

// =============================================================================
// Harness
// =============================================================================

pub struct Harness {
    pub dispatcher: Dispatcher,
    pub client: BridgeClient,
    pub dialog: Arc<FakeDialog>,
    pub images: Arc<CountingImages>,
    pub transcoder: Arc<FakeTranscoder>,
    pub extractor: Arc<FakeExtractor>,
    pub window: Arc<TrackedWindow>,
}

pub struct HarnessBuilder {
    dialog: FakeDialog,
    images: CountingImages,
    extractor: FakeExtractor,
    config: Config,
    state: AppState,
}

impl HarnessBuilder {
    pub fn dialog(mut self, dialog: FakeDialog) -> Self {
        self.dialog = dialog;
        self
    }

    pub fn images(mut self, images: CountingImages) -> Self {
        self.images = images;
        self
    }

    pub fn extractor(mut self, extractor: FakeExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn state(mut self, state: AppState) -> Self {
        self.state = state;
        self
    }

    pub fn build(self) -> Harness {
        let dialog = Arc::new(self.dialog);
        let images = Arc::new(self.images);
        let transcoder = Arc::new(FakeTranscoder::default());
        let extractor = Arc::new(self.extractor);
        let window = Arc::new(TrackedWindow::new(self.state.window_state));

        let collaborators = Collaborators {
            dialog: dialog.clone(),
            window: window.clone(),
            images: images.clone(),
            transcoder: transcoder.clone(),
            extractor: extractor.clone(),
        };
        let ctx = Arc::new(BridgeContext::new(collaborators, self.config, &self.state));
        let dispatcher = Dispatcher::new(ctx);
        Harness {
            client: BridgeClient::in_process(dispatcher.clone()),
            dispatcher,
            dialog,
            images,
            transcoder,
            extractor,
            window,
        }
    }
}

impl Harness {
    pub fn builder() -> HarnessBuilder {
        HarnessBuilder {
            dialog: FakeDialog::default(),
            images: CountingImages::default(),
            extractor: FakeExtractor::default(),
            config: Config::default(),
            state: AppState::default(),
        }
    }

    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Total collaborator invocations so far.
    pub fn collaborator_calls(&self) -> usize {
        self.dialog.calls.load(Ordering::SeqCst)
            + self.images.calls.load(Ordering::SeqCst)
            + self.transcoder.calls.load(Ordering::SeqCst)
            + self.extractor.calls.load(Ordering::SeqCst)
    }
}

/// Writes a small RGB PNG and returns its path.
pub fn write_png(dir: &std::path::Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    let img = image_rs::RgbImage::from_fn(4, 3, |x, y| image_rs::Rgb([x as u8 * 60, y as u8 * 80, 128]));
    img.save(&path).unwrap();
    path
}
