//! Screenshot capture via the UIAutomation bridge
//!
//! `au.capture()` is asynchronous on the device side: the bridge acknowledges
//! the command and Instruments writes the PNG to a run directory some time
//! later. Acquisition therefore polls the filesystem for the artifact,
//! corrects orientation, and wraps the whole attempt in a bounded retry.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use image::GenericImageView;
use log::debug;
use uuid::Uuid;

use crate::client::{Orientation, UiAutoClient};
use crate::content_size::Dimensions;
use crate::error::DriverError;
use crate::retry::{RetryPolicy, Sleeper, TokioSleeper};

/// Filesystem and image operations the acquirer needs, injected so tests run
/// without a real Instruments run directory.
#[async_trait]
pub trait ScreenshotIo: Send + Sync {
    async fn exists(&self, path: &Path) -> bool;
    async fn create_dir_all(&self, path: &Path) -> Result<()>;
    async fn read_file(&self, path: &Path) -> Result<Vec<u8>>;
    async fn rotate_image(&self, path: &Path, degrees: i32) -> Result<()>;
}

/// Production implementation on tokio's filesystem and the image crate
pub struct LocalScreenshotIo;

#[async_trait]
impl ScreenshotIo for LocalScreenshotIo {
    async fn exists(&self, path: &Path) -> bool {
        tokio::fs::try_exists(path).await.unwrap_or(false)
    }

    async fn create_dir_all(&self, path: &Path) -> Result<()> {
        tokio::fs::create_dir_all(path)
            .await
            .with_context(|| format!("failed to create folder '{}'", path.display()))
    }

    async fn read_file(&self, path: &Path) -> Result<Vec<u8>> {
        tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read screenshot '{}'", path.display()))
    }

    async fn rotate_image(&self, path: &Path, degrees: i32) -> Result<()> {
        let img = image::open(path)
            .with_context(|| format!("failed to open image '{}'", path.display()))?;
        let rotated = match degrees.rem_euclid(360) {
            0 => img,
            90 => img.rotate90(),
            180 => img.rotate180(),
            270 => img.rotate270(),
            other => anyhow::bail!("unsupported rotation angle: {other}"),
        };
        rotated
            .save(path)
            .with_context(|| format!("failed to save rotated image '{}'", path.display()))
    }
}

/// Tunables for the capture state machine
#[derive(Debug, Clone)]
pub struct ScreenshotConfig {
    /// Session temp directory the Instruments run folder lives under
    pub tmp_dir: PathBuf,
    /// How long to wait for the artifact before a capture attempt fails
    pub wait_timeout: Duration,
    /// Delay between artifact existence checks
    pub poll_interval: Duration,
    /// Retry policy for the whole capture attempt
    pub retry: RetryPolicy,
}

impl Default for ScreenshotConfig {
    fn default() -> Self {
        Self {
            tmp_dir: std::env::temp_dir(),
            wait_timeout: Duration::from_millis(10_000),
            poll_interval: Duration::from_millis(300),
            retry: RetryPolicy::default(),
        }
    }
}

/// Crop rectangle in device pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Screenshot commands against the native automation target
pub struct ScreenshotCommands<C, Io = LocalScreenshotIo, S = TokioSleeper> {
    client: Arc<C>,
    io: Io,
    sleeper: S,
    config: ScreenshotConfig,
}

impl<C: UiAutoClient> ScreenshotCommands<C> {
    pub fn new(client: Arc<C>, config: ScreenshotConfig) -> Self {
        Self {
            client,
            io: LocalScreenshotIo,
            sleeper: TokioSleeper,
            config,
        }
    }
}

impl<C, Io, S> ScreenshotCommands<C, Io, S>
where
    C: UiAutoClient,
    Io: ScreenshotIo,
    S: Sleeper,
{
    /// Build with explicit collaborators. Tests use this to swap in fake
    /// filesystems and sleepers.
    pub fn with_io(client: Arc<C>, io: Io, sleeper: S, config: ScreenshotConfig) -> Self {
        Self {
            client,
            io,
            sleeper,
            config,
        }
    }

    /// Take a full-screen screenshot, returned as base64-encoded PNG bytes.
    pub async fn get_screenshot(&self) -> Result<String> {
        let shot_file = format!("screenshot{}", Uuid::new_v4());

        let shot_folder = self.config.tmp_dir.join("uiauto-instruments").join("Run 1");
        if !self.io.exists(&shot_folder).await {
            debug!("Creating folder '{}'", shot_folder.display());
            self.io.create_dir_all(&shot_folder).await?;
        }

        let shot_path = shot_folder.join(format!("{shot_file}.png"));
        debug!("Taking screenshot: '{}'", shot_path.display());

        let data = self
            .config
            .retry
            .run(&self.sleeper, || {
                let shot_file = shot_file.clone();
                let shot_path = shot_path.clone();
                async move { self.capture_once(&shot_file, &shot_path).await }
            })
            .await?;

        Ok(BASE64.encode(data))
    }

    /// One full capture attempt: command, poll, rotate, read.
    async fn capture_once(&self, shot_file: &str, shot_path: &Path) -> Result<Vec<u8>> {
        self.client
            .send_command(&format!("au.capture('{shot_file}')"))
            .await?;

        let timeout = self.config.wait_timeout;
        debug!(
            "Waiting {} ms for screenshot to be generated",
            timeout.as_millis()
        );
        let start = Instant::now();
        let mut appeared = false;
        while start.elapsed() < timeout {
            if self.io.exists(shot_path).await {
                appeared = true;
                break;
            }
            self.sleeper.sleep(self.config.poll_interval).await;
        }
        if !appeared {
            return Err(DriverError::CaptureTimeout {
                timeout_ms: timeout.as_millis() as u64,
            }
            .into());
        }

        if self.get_orientation().await?.is_landscape() {
            debug!("Rotating landscape screenshot");
            self.io.rotate_image(shot_path, -90).await?;
        }

        self.io.read_file(shot_path).await
    }

    /// Screenshot of the visible viewport: the full capture with the status
    /// bar cropped off, in device pixels.
    pub async fn get_viewport_screenshot(&self) -> Result<String> {
        let window = self.get_window_size().await?;
        let screen_height = self.get_screen_height().await?;
        let scale = device_scale(screen_height);

        let status_bar_height = self.get_status_bar_height().await? * scale;
        let screenshot = self.get_screenshot().await?;

        let rect = CropRect {
            left: 0.0,
            top: status_bar_height,
            width: window.width * scale,
            height: window.height * scale - status_bar_height,
        };
        crop_base64_image(&screenshot, rect)
    }

    pub async fn get_orientation(&self) -> Result<Orientation> {
        let value = self.client.send_command("au.getScreenOrientation()").await?;
        let name = value
            .as_str()
            .with_context(|| format!("unexpected orientation reply: {value}"))?;
        Ok(Orientation::from_bridge(name))
    }

    pub async fn get_window_size(&self) -> Result<Dimensions> {
        let value = self.client.send_command("au.getWindowSize()").await?;
        serde_json::from_value(value).context("failed to decode window size")
    }

    pub async fn get_status_bar_height(&self) -> Result<f64> {
        let value = self
            .client
            .send_command("UIATarget.localTarget().frontMostApp().statusBar().rect().size.height;")
            .await?;
        value
            .as_f64()
            .with_context(|| format!("unexpected status bar height reply: {value}"))
    }

    pub async fn get_screen_height(&self) -> Result<f64> {
        let value = self
            .client
            .send_command("UIATarget.localTarget().rect().size.height;")
            .await?;
        value
            .as_f64()
            .with_context(|| format!("unexpected screen height reply: {value}"))
    }
}

/// Device pixel scale from the logical screen height.
///
/// UIAutomation has no scale query. Every supported device is 2x except the
/// 736-point Plus models, which are 3x.
pub fn device_scale(screen_height: f64) -> f64 {
    if screen_height == 736.0 {
        3.0
    } else {
        2.0
    }
}

/// Crop a base64-encoded PNG to `rect`, clamped to the image bounds.
pub fn crop_base64_image(data: &str, rect: CropRect) -> Result<String> {
    let bytes = BASE64
        .decode(data)
        .context("failed to decode base64 screenshot")?;
    let img = image::load_from_memory(&bytes).context("failed to decode screenshot image")?;

    let left = (rect.left.max(0.0) as u32).min(img.width());
    let top = (rect.top.max(0.0) as u32).min(img.height());
    let width = (rect.width.max(0.0) as u32).min(img.width() - left);
    let height = (rect.height.max(0.0) as u32).min(img.height() - top);

    let cropped = img.crop_imm(left, top, width, height);
    let mut out = Cursor::new(Vec::new());
    cropped
        .write_to(&mut out, image::ImageOutputFormat::Png)
        .context("failed to encode cropped screenshot")?;
    Ok(BASE64.encode(out.into_inner()))
}
