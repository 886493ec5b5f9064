//! In-memory simulated display stack for the `reschain` library.
//!
//! This crate provides stand-ins for the acquisition and release primitives
//! of a windowing/multimedia toolkit - video runtime, window, canvas, pixel
//! surface, GPU texture - useful for testing and demonstration scenarios
//! where no real display is available.
//!
//! The simulated primitives mirror the shape of the real thing: each
//! constructor either returns a handle or a diagnostic string, each handle
//! has exactly one matching release operation, and a [`FaultPlan`] can rig
//! any single stage to fail so that unwind behavior can be exercised
//! deterministically. Every invocation and release is recorded into a
//! [`ProbeLog`] for assertions.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::cell::Cell;
use std::path::{Path, PathBuf};

use tracing::debug;

use reschain::testing::fixtures::ProbeLog;
use reschain::{Diagnostic, StepName};

/// One stage of the simulated display stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// The video subsystem itself.
    Video,
    /// A top-level window.
    Window,
    /// A rendering canvas bound to a window.
    Canvas,
    /// An image decoded into host memory.
    Surface,
    /// A GPU-backed texture uploaded from a surface.
    Texture,
}

impl Stage {
    /// The stage's conventional step name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Window => "window",
            Self::Canvas => "canvas",
            Self::Surface => "surface",
            Self::Texture => "texture",
        }
    }

    /// The stage's step name as a [`StepName`].
    pub fn step_name(self) -> StepName {
        StepName::of(self.name())
    }

    /// Parses a stage from its conventional name.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "video" => Some(Self::Video),
            "window" => Some(Self::Window),
            "canvas" => Some(Self::Canvas),
            "surface" => Some(Self::Surface),
            "texture" => Some(Self::Texture),
            _ => None,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Scripted failure for one stage of the stack.
#[derive(Debug, Clone, Default)]
pub struct FaultPlan {
    fail_at: Option<(Stage, Diagnostic)>,
}

impl FaultPlan {
    /// A plan where nothing fails.
    pub fn none() -> Self {
        Self::default()
    }

    /// A plan where `stage` fails with `diagnostic`.
    pub fn fail_at(stage: Stage, diagnostic: &str) -> Self {
        Self {
            fail_at: Some((stage, diagnostic.to_string())),
        }
    }

    fn check(&self, stage: Stage) -> Result<(), Diagnostic> {
        match &self.fail_at {
            Some((failing, diagnostic)) if *failing == stage => Err(diagnostic.clone()),
            _ => Ok(()),
        }
    }
}

/// Factory for one simulated display stack.
///
/// Cloning shares the underlying fault plan and probe log, so a display can
/// be handed to chain steps while the test keeps a handle for assertions.
#[derive(Debug, Clone, Default)]
pub struct SimulatedDisplay {
    faults: FaultPlan,
    trace: ProbeLog,
}

impl SimulatedDisplay {
    /// A display where every stage succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// A display rigged so that `stage` fails with `diagnostic`.
    pub fn with_fault(stage: Stage, diagnostic: &str) -> Self {
        Self {
            faults: FaultPlan::fail_at(stage, diagnostic),
            trace: ProbeLog::new(),
        }
    }

    /// The log recording every invocation and release on this display.
    pub const fn trace(&self) -> &ProbeLog {
        &self.trace
    }

    /// Starts the video subsystem.
    pub fn init_video(&self) -> Result<VideoRuntime, Diagnostic> {
        self.trace.record_invocation(&Stage::Video.step_name());
        self.faults.check(Stage::Video)?;
        debug!("video subsystem initialized");
        Ok(VideoRuntime {
            faults: self.faults.clone(),
            trace: self.trace.clone(),
        })
    }
}

/// Handle to the running video subsystem.
#[derive(Debug)]
pub struct VideoRuntime {
    faults: FaultPlan,
    trace: ProbeLog,
}

impl VideoRuntime {
    /// Opens a window.
    pub fn open_window(&self, title: &str, width: u32, height: u32) -> Result<Window, Diagnostic> {
        self.trace.record_invocation(&Stage::Window.step_name());
        self.faults.check(Stage::Window)?;
        debug!(title, width, height, "window opened");
        Ok(Window {
            title: title.to_string(),
            width,
            height,
            faults: self.faults.clone(),
            trace: self.trace.clone(),
        })
    }

    /// Decodes an image file into a host-memory surface.
    ///
    /// Only `.bmp` paths decode; anything else reports an unsupported
    /// format, the way a real loader would.
    pub fn load_surface(&self, path: &Path) -> Result<PixelSurface, Diagnostic> {
        self.trace.record_invocation(&Stage::Surface.step_name());
        self.faults.check(Stage::Surface)?;
        if path.extension().map_or(true, |ext| ext != "bmp") {
            return Err(format!("unsupported image format: {}", path.display()));
        }
        debug!(path = %path.display(), "surface loaded");
        Ok(PixelSurface {
            path: path.to_path_buf(),
            width: 320,
            height: 240,
            trace: self.trace.clone(),
        })
    }

    /// Shuts the video subsystem down.
    pub fn quit(self) {
        debug!("video subsystem shut down");
        self.trace.record_release(&Stage::Video.step_name());
    }
}

/// Options for creating a canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasOptions {
    /// Prefer hardware-accelerated rendering.
    pub accelerated: bool,
    /// Synchronize presentation with the display's refresh rate.
    pub vsync: bool,
}

impl Default for CanvasOptions {
    fn default() -> Self {
        Self {
            accelerated: true,
            vsync: true,
        }
    }
}

/// Handle to an open window.
#[derive(Debug)]
pub struct Window {
    title: String,
    width: u32,
    height: u32,
    faults: FaultPlan,
    trace: ProbeLog,
}

impl Window {
    /// The window title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The window size as `(width, height)`.
    pub const fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Creates a rendering canvas bound to this window.
    pub fn create_canvas(&self, options: CanvasOptions) -> Result<Canvas, Diagnostic> {
        self.trace.record_invocation(&Stage::Canvas.step_name());
        self.faults.check(Stage::Canvas)?;
        debug!(
            accelerated = options.accelerated,
            vsync = options.vsync,
            "canvas created"
        );
        Ok(Canvas {
            options,
            frames_presented: Cell::new(0),
            faults: self.faults.clone(),
            trace: self.trace.clone(),
        })
    }

    /// Destroys the window.
    pub fn destroy(self) {
        debug!(title = %self.title, "window destroyed");
        self.trace.record_release(&Stage::Window.step_name());
    }
}

/// Handle to a rendering canvas.
#[derive(Debug)]
pub struct Canvas {
    options: CanvasOptions,
    frames_presented: Cell<u32>,
    faults: FaultPlan,
    trace: ProbeLog,
}

impl Canvas {
    /// The options the canvas was created with.
    pub const fn options(&self) -> CanvasOptions {
        self.options
    }

    /// Uploads a surface to a GPU-backed texture.
    pub fn upload_texture(&self, surface: &PixelSurface) -> Result<Texture, Diagnostic> {
        self.trace.record_invocation(&Stage::Texture.step_name());
        self.faults.check(Stage::Texture)?;
        debug!(width = surface.width, height = surface.height, "texture uploaded");
        Ok(Texture {
            width: surface.width,
            height: surface.height,
            trace: self.trace.clone(),
        })
    }

    /// Clears the canvas.
    pub fn clear(&self) {
        debug!("canvas cleared");
    }

    /// Draws a texture over the full canvas.
    pub fn copy(&self, texture: &Texture) {
        debug!(width = texture.width, height = texture.height, "texture drawn");
    }

    /// Presents the current frame.
    pub fn present(&self) {
        self.frames_presented.set(self.frames_presented.get() + 1);
        debug!(frame = self.frames_presented.get(), "frame presented");
    }

    /// Number of frames presented so far.
    pub fn frames_presented(&self) -> u32 {
        self.frames_presented.get()
    }

    /// Destroys the canvas.
    pub fn destroy(self) {
        debug!(frames = self.frames_presented.get(), "canvas destroyed");
        self.trace.record_release(&Stage::Canvas.step_name());
    }
}

/// An image decoded into host memory.
#[derive(Debug)]
pub struct PixelSurface {
    path: PathBuf,
    width: u32,
    height: u32,
    trace: ProbeLog,
}

impl PixelSurface {
    /// The path the surface was decoded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The surface size as `(width, height)`.
    pub const fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Frees the surface.
    pub fn free(self) {
        debug!(path = %self.path.display(), "surface freed");
        self.trace.record_release(&Stage::Surface.step_name());
    }
}

/// A GPU-backed texture.
#[derive(Debug)]
pub struct Texture {
    width: u32,
    height: u32,
    trace: ProbeLog,
}

impl Texture {
    /// The texture size as `(width, height)`.
    pub const fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Destroys the texture.
    pub fn destroy(self) {
        debug!("texture destroyed");
        self.trace.record_release(&Stage::Texture.step_name());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_full_stack_comes_up_when_nothing_fails() {
        let display = SimulatedDisplay::new();
        let video = display.init_video().unwrap();
        let window = video.open_window("Hello World!", 500, 150).unwrap();
        let canvas = window.create_canvas(CanvasOptions::default()).unwrap();
        let surface = video.load_surface(Path::new("hello.bmp")).unwrap();
        let texture = canvas.upload_texture(&surface).unwrap();

        assert_eq!(window.size(), (500, 150));
        assert_eq!(texture.size(), surface.size());

        texture.destroy();
        surface.free();
        canvas.destroy();
        window.destroy();
        video.quit();

        assert_eq!(display.trace().total_releases(), 5);
    }

    #[test]
    fn a_rigged_stage_fails_with_its_diagnostic() {
        let display = SimulatedDisplay::with_fault(Stage::Canvas, "no suitable video driver");
        let video = display.init_video().unwrap();
        let window = video.open_window("Hello World!", 500, 150).unwrap();

        let err = window.create_canvas(CanvasOptions::default()).unwrap_err();
        assert_eq!(err, "no suitable video driver");

        window.destroy();
        video.quit();
    }

    #[test]
    fn non_bmp_paths_fail_to_decode() {
        let display = SimulatedDisplay::new();
        let video = display.init_video().unwrap();

        let err = video.load_surface(Path::new("hello.png")).unwrap_err();
        assert!(err.starts_with("unsupported image format"));

        video.quit();
    }

    #[test]
    fn presenting_counts_frames() {
        let display = SimulatedDisplay::new();
        let video = display.init_video().unwrap();
        let window = video.open_window("Hello World!", 500, 150).unwrap();
        let canvas = window.create_canvas(CanvasOptions::default()).unwrap();

        for _ in 0..3 {
            canvas.clear();
            canvas.present();
        }
        assert_eq!(canvas.frames_presented(), 3);

        canvas.destroy();
        window.destroy();
        video.quit();
    }

    #[test]
    fn stage_names_round_trip() {
        for stage in [
            Stage::Video,
            Stage::Window,
            Stage::Canvas,
            Stage::Surface,
            Stage::Texture,
        ] {
            assert_eq!(Stage::parse(stage.name()), Some(stage));
        }
        assert_eq!(Stage::parse("audio"), None);
    }
}
