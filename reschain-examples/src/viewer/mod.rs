//! The image-viewer acquisition chain.
//!
//! Brings up a display stack in five strictly ordered steps - video
//! subsystem, window, canvas, image surface, texture - each depending on
//! resources from earlier steps. Any failure unwinds whatever was already
//! acquired, in reverse order, before the error reaches the caller.

use std::path::PathBuf;

use reschain::{Acquired, Chain, ChainState};
use reschain_memory::{
    Canvas, CanvasOptions, PixelSurface, SimulatedDisplay, Stage, Texture, VideoRuntime, Window,
};
use tracing::info;

/// Window title, matching what the viewer shows on screen.
pub const WINDOW_TITLE: &str = "Hello World!";

/// Window size in pixels.
pub const WINDOW_SIZE: (u32, u32) = (500, 150);

/// Builds the five-step display chain for `image` on `display`.
pub fn build_display_chain(display: &SimulatedDisplay, image: PathBuf) -> Chain {
    let display = display.clone();
    Chain::new()
        .step(Stage::Video.step_name(), move |_: &mut ChainState| {
            let video = display.init_video()?;
            Ok(Acquired::released_by(video, VideoRuntime::quit))
        })
        .step(Stage::Window.step_name(), |state: &mut ChainState| {
            let video = state.resource::<VideoRuntime>();
            let window = video.open_window(WINDOW_TITLE, WINDOW_SIZE.0, WINDOW_SIZE.1)?;
            Ok(Acquired::released_by(window, Window::destroy))
        })
        .step(Stage::Canvas.step_name(), |state: &mut ChainState| {
            let canvas = state
                .resource::<Window>()
                .create_canvas(CanvasOptions::default())?;
            Ok(Acquired::released_by(canvas, Canvas::destroy))
        })
        .step(Stage::Surface.step_name(), move |state: &mut ChainState| {
            let surface = state.resource::<VideoRuntime>().load_surface(&image)?;
            Ok(Acquired::released_by(surface, PixelSurface::free))
        })
        .step(Stage::Texture.step_name(), |state: &mut ChainState| {
            let texture = state
                .resource::<Canvas>()
                .upload_texture(state.resource::<PixelSurface>())?;
            Ok(Acquired::released_by(texture, Texture::destroy))
        })
}

/// Presents `frames` frames of the uploaded texture on the acquired stack.
pub fn present_frames(state: &ChainState, frames: u32) {
    let canvas = state.resource::<Canvas>();
    let texture = state.resource::<Texture>();
    for frame in 1..=frames {
        canvas.clear();
        canvas.copy(texture);
        canvas.present();
        info!(frame, "presented");
    }
}
