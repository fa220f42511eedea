//! Toggle state machine for the floating panel.
//!
//! Transitions are pure: they map the current state and an input to the next
//! state plus a list of effects. The renderer applies visual effects and the
//! runtime turns `Schedule` into timers. Nothing here touches the document.

use std::fmt;

/// Delay between attaching the panel and starting its enter transition, so the
/// host engine paints the `display: block` state first.
pub const FRAME_DELAY_MS: u64 = 10;

/// Duration of the opacity/position transition in either direction.
pub const TRANSITION_MS: u64 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToggleState {
    #[default]
    Closed,
    Opening,
    Open,
    Closing,
}

impl ToggleState {
    /// Whether the button shows the "close" glyph in this state.
    pub fn shows_close_glyph(&self) -> bool {
        matches!(self, ToggleState::Opening | ToggleState::Open)
    }

    pub fn is_transitioning(&self) -> bool {
        matches!(self, ToggleState::Opening | ToggleState::Closing)
    }

    /// Whether the panel is meant to be part of visible layout.
    pub fn panel_attached(&self) -> bool {
        !matches!(self, ToggleState::Closed)
    }
}

impl fmt::Display for ToggleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToggleState::Closed => write!(f, "closed"),
            ToggleState::Opening => write!(f, "opening"),
            ToggleState::Open => write!(f, "open"),
            ToggleState::Closing => write!(f, "closing"),
        }
    }
}

/// Timer-driven continuation of a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionStep {
    /// Start the enter transition one frame after attaching the panel.
    BeginEnter,
    /// Enter transition has run its course.
    FinishOpening,
    /// Exit transition has run its course; detach the panel from layout.
    FinishClosing,
}

/// Side effect requested by a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Cancel the timer of the transition being abandoned.
    CancelPending,
    /// Attach the panel to layout in its hidden starting pose.
    AttachPanel,
    /// Move the panel to its visible pose (opacity 1, no offset).
    EnterPose,
    /// Move the panel back to its hidden pose (opacity 0, offset down).
    ExitPose,
    /// Take the panel out of layout entirely.
    DetachPanel,
    Schedule { step: TransitionStep, delay_ms: u64 },
}

/// Result of applying an input to a state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub next: ToggleState,
    pub effects: Vec<Effect>,
}

/// Apply a toggle (button click).
///
/// A toggle mid-transition reverses it: the pending timer is cancelled and the
/// opposite transition starts from the panel's current pose, so the panel
/// always ends up fully open or fully closed.
pub fn toggle(state: ToggleState) -> Transition {
    use Effect::*;
    match state {
        ToggleState::Closed => Transition {
            next: ToggleState::Opening,
            effects: vec![
                AttachPanel,
                Schedule {
                    step: TransitionStep::BeginEnter,
                    delay_ms: FRAME_DELAY_MS,
                },
            ],
        },
        ToggleState::Open => Transition {
            next: ToggleState::Closing,
            effects: vec![
                ExitPose,
                Schedule {
                    step: TransitionStep::FinishClosing,
                    delay_ms: TRANSITION_MS,
                },
            ],
        },
        ToggleState::Opening => Transition {
            next: ToggleState::Closing,
            effects: vec![
                CancelPending,
                ExitPose,
                Schedule {
                    step: TransitionStep::FinishClosing,
                    delay_ms: TRANSITION_MS,
                },
            ],
        },
        // Panel is still attached while closing, so no frame tick is needed.
        ToggleState::Closing => Transition {
            next: ToggleState::Opening,
            effects: vec![
                CancelPending,
                EnterPose,
                Schedule {
                    step: TransitionStep::FinishOpening,
                    delay_ms: TRANSITION_MS,
                },
            ],
        },
    }
}

/// Apply a fired timer step. Returns `None` when the step does not belong to
/// the current state, in which case it must be ignored.
pub fn advance(state: ToggleState, step: TransitionStep) -> Option<Transition> {
    match (state, step) {
        (ToggleState::Opening, TransitionStep::BeginEnter) => Some(Transition {
            next: ToggleState::Opening,
            effects: vec![
                Effect::EnterPose,
                Effect::Schedule {
                    step: TransitionStep::FinishOpening,
                    delay_ms: TRANSITION_MS,
                },
            ],
        }),
        (ToggleState::Opening, TransitionStep::FinishOpening) => Some(Transition {
            next: ToggleState::Open,
            effects: Vec::new(),
        }),
        (ToggleState::Closing, TransitionStep::FinishClosing) => Some(Transition {
            next: ToggleState::Closed,
            effects: vec![Effect::DetachPanel],
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Drive a state through toggle and every scheduled step it produces.
    fn settle(mut transition: Transition) -> ToggleState {
        loop {
            let step = transition.effects.iter().find_map(|e| match e {
                Effect::Schedule { step, .. } => Some(*step),
                _ => None,
            });
            let Some(step) = step else {
                return transition.next;
            };
            transition = advance(transition.next, step).unwrap();
        }
    }

    #[test]
    fn test_full_cycle_returns_to_closed() {
        let opened = settle(toggle(ToggleState::Closed));
        assert_eq!(opened, ToggleState::Open);
        let closed = settle(toggle(opened));
        assert_eq!(closed, ToggleState::Closed);
    }

    #[test]
    fn test_open_attaches_then_schedules_frame_tick() {
        let t = toggle(ToggleState::Closed);
        assert_eq!(t.next, ToggleState::Opening);
        assert_eq!(
            t.effects,
            vec![
                Effect::AttachPanel,
                Effect::Schedule {
                    step: TransitionStep::BeginEnter,
                    delay_ms: FRAME_DELAY_MS
                }
            ]
        );
    }

    #[test]
    fn test_close_detaches_only_after_settle() {
        let t = toggle(ToggleState::Open);
        assert_eq!(t.next, ToggleState::Closing);
        assert!(!t.effects.contains(&Effect::DetachPanel));

        let done = advance(ToggleState::Closing, TransitionStep::FinishClosing).unwrap();
        assert_eq!(done.next, ToggleState::Closed);
        assert_eq!(done.effects, vec![Effect::DetachPanel]);
    }

    #[test]
    fn test_mid_transition_toggle_reverses_and_cancels() {
        let t = toggle(ToggleState::Opening);
        assert_eq!(t.next, ToggleState::Closing);
        assert_eq!(t.effects[0], Effect::CancelPending);

        let t = toggle(ToggleState::Closing);
        assert_eq!(t.next, ToggleState::Opening);
        assert_eq!(t.effects[0], Effect::CancelPending);
        assert!(t.effects.contains(&Effect::EnterPose));
    }

    #[test]
    fn test_stale_steps_are_rejected() {
        assert!(advance(ToggleState::Closed, TransitionStep::FinishClosing).is_none());
        assert!(advance(ToggleState::Open, TransitionStep::FinishOpening).is_none());
        assert!(advance(ToggleState::Closing, TransitionStep::BeginEnter).is_none());
        assert!(advance(ToggleState::Closing, TransitionStep::FinishOpening).is_none());
    }

    #[test]
    fn test_glyph_follows_state() {
        assert!(!ToggleState::Closed.shows_close_glyph());
        assert!(ToggleState::Opening.shows_close_glyph());
        assert!(ToggleState::Open.shows_close_glyph());
        assert!(!ToggleState::Closing.shows_close_glyph());
    }
}
