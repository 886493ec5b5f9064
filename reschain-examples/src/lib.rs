//! Example programs for the `reschain` acquisition-chain library.
//!
//! Two small, self-contained demonstrations:
//!
//! - [`viewer`]: an image-display program that brings up a simulated
//!   display stack (video subsystem, window, canvas, image surface, GPU
//!   texture) through one acquisition chain, presents a few frames, and
//!   tears down in reverse - or unwinds and exits non-zero when a stage
//!   fails.
//! - [`counter`]: a toggle-button click counter modeled as a pure state
//!   machine, driven by a scripted event loop instead of a toolkit.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod counter;
pub mod viewer;
