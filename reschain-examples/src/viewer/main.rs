//! Image viewer example.
//!
//! Brings up the simulated display stack through one acquisition chain,
//! presents three frames of the image, and tears everything down in reverse
//! order. When any stage fails - rig one with `VIEWER_FAIL_AT=canvas` (or
//! `video`, `window`, `surface`, `texture`) - the chain releases whatever it
//! had already acquired, the failing step's diagnostic is reported together
//! with a JSON failure report, and the process exits with a non-zero status.

use std::path::PathBuf;
use std::process::ExitCode;

use reschain::FailureReport;
use reschain_examples::viewer::{build_display_chain, present_frames};
use reschain_memory::{SimulatedDisplay, Stage};
use tracing::{error, info};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let display = match std::env::var("VIEWER_FAIL_AT") {
        Ok(name) => match Stage::parse(&name) {
            Some(stage) => {
                info!(%stage, "rigging stage to fail");
                SimulatedDisplay::with_fault(stage, &format!("simulated {stage} failure"))
            }
            None => {
                error!(name = %name, "unknown stage in VIEWER_FAIL_AT");
                return ExitCode::FAILURE;
            }
        },
        Err(_) => SimulatedDisplay::new(),
    };

    let image = PathBuf::from(
        std::env::var("VIEWER_IMAGE").unwrap_or_else(|_| "hello.bmp".to_string()),
    );

    match build_display_chain(&display, image).run() {
        Ok(state) => {
            info!(held = state.len(), "display stack acquired");
            present_frames(&state, 3);
            if let Err(err) = state.release() {
                error!(%err, "teardown reported failures");
                return ExitCode::FAILURE;
            }
            info!("display stack released");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(step = %err.step(), diagnostic = err.diagnostic(), "viewer failed");
            let report = FailureReport::from_error(&err);
            match serde_json::to_string_pretty(&report) {
                Ok(json) => eprintln!("{json}"),
                Err(_) => eprintln!("{}", report.to_json()),
            }
            ExitCode::FAILURE
        }
    }
}
