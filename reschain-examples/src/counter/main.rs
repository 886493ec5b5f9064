//! Click-counter example.
//!
//! Drives the pure button state machine with a scripted stream of clicks,
//! applying its effects the way a toolkit event loop would: label updates
//! are logged, and the quit effect ends the loop.

use anyhow::Result;
use reschain_examples::counter::{on_event, ButtonEvent, CounterState, Effect};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut state = CounterState::new();
    info!(label = state.label(), "button created");

    loop {
        let (next, effects) = on_event(state, ButtonEvent::Clicked);
        state = next;

        let mut quit = false;
        for effect in effects {
            match effect {
                Effect::SetLabel(label) => info!(clicks = state.clicks, label, "label updated"),
                Effect::Quit => quit = true,
            }
        }

        if quit {
            info!(clicks = state.clicks, "counter reached, quitting");
            break;
        }
    }

    Ok(())
}
