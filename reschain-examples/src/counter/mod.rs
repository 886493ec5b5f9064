//! A toggle-button click counter as a pure state machine.
//!
//! The widget it models is a checkable button that toggles its label on
//! every click and asks the application to quit after the tenth click.
//! Modeled as `(state, event) -> (state, effects)` so any event dispatch
//! mechanism can drive it; nothing here touches a toolkit.

/// Label shown while the button is unchecked.
pub const LABEL_UNCHECKED: &str = "Hello World";

/// Label shown while the button is checked.
pub const LABEL_CHECKED: &str = "Checked";

/// Number of clicks after which the counter asks to quit.
pub const CLICK_TARGET: u32 = 10;

/// The button's state: toggle position plus total click count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CounterState {
    /// Whether the button is currently checked.
    pub checked: bool,
    /// Total clicks seen so far.
    pub clicks: u32,
}

impl CounterState {
    /// The initial state: unchecked, zero clicks.
    pub fn new() -> Self {
        Self::default()
    }

    /// The label the button should currently show.
    pub const fn label(self) -> &'static str {
        if self.checked {
            LABEL_CHECKED
        } else {
            LABEL_UNCHECKED
        }
    }
}

/// Events the button reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    /// The button was clicked.
    Clicked,
}

/// Effects the state machine asks its host to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Update the button's label.
    SetLabel(&'static str),
    /// Quit the application.
    Quit,
}

/// Advances the state machine by one event.
///
/// Every click toggles the checked state (emitting the matching label) and
/// increments the counter; the quit effect fires exactly when the counter
/// reaches [`CLICK_TARGET`].
pub fn on_event(state: CounterState, event: ButtonEvent) -> (CounterState, Vec<Effect>) {
    match event {
        ButtonEvent::Clicked => {
            let next = CounterState {
                checked: !state.checked,
                clicks: state.clicks + 1,
            };
            let mut effects = vec![Effect::SetLabel(next.label())];
            if next.clicks == CLICK_TARGET {
                effects.push(Effect::Quit);
            }
            (next, effects)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clicking_toggles_the_label() {
        let state = CounterState::new();
        assert_eq!(state.label(), LABEL_UNCHECKED);

        let (state, effects) = on_event(state, ButtonEvent::Clicked);
        assert!(state.checked);
        assert_eq!(effects, vec![Effect::SetLabel(LABEL_CHECKED)]);

        let (state, effects) = on_event(state, ButtonEvent::Clicked);
        assert!(!state.checked);
        assert_eq!(effects, vec![Effect::SetLabel(LABEL_UNCHECKED)]);
    }

    #[test]
    fn the_tenth_click_asks_to_quit() {
        let mut state = CounterState::new();
        for click in 1..CLICK_TARGET {
            let (next, effects) = on_event(state, ButtonEvent::Clicked);
            state = next;
            assert_eq!(state.clicks, click);
            assert!(
                !effects.contains(&Effect::Quit),
                "quit fired early on click {click}"
            );
        }

        let (state, effects) = on_event(state, ButtonEvent::Clicked);
        assert_eq!(state.clicks, CLICK_TARGET);
        assert_eq!(
            effects,
            vec![Effect::SetLabel(state.label()), Effect::Quit]
        );
    }

    #[test]
    fn quit_fires_exactly_once() {
        let mut state = CounterState::new();
        let mut quits = 0;
        for _ in 0..CLICK_TARGET * 2 {
            let (next, effects) = on_event(state, ButtonEvent::Clicked);
            state = next;
            quits += effects.iter().filter(|e| **e == Effect::Quit).count();
        }
        assert_eq!(quits, 1);
        assert_eq!(state.clicks, CLICK_TARGET * 2);
    }
}
