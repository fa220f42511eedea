//! Per-instance widget state.

use formchat_types::embed::EffectiveCustomization;

use super::frame::SessionFrame;
use super::renderer::Chrome;
use super::state::ToggleState;
use super::timer::TimerId;

/// One running widget on the host page.
///
/// Owns its render-tree handles, toggle state and pending timer. Nothing in
/// here is shared with any other instance.
#[derive(Debug, Clone)]
pub struct WidgetInstance {
    pub(crate) chatbot_id: String,
    pub(crate) api_base_url: String,
    pub(crate) customization: EffectiveCustomization,
    pub(crate) state: ToggleState,
    pub(crate) chrome: Chrome,
    pub(crate) frame: SessionFrame,
    /// Bumped on every toggle; timers scheduled under an older generation are
    /// discarded when they fire.
    pub(crate) generation: u64,
    pub(crate) pending: Option<TimerId>,
}

impl WidgetInstance {
    pub fn chatbot_id(&self) -> &str {
        &self.chatbot_id
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    pub fn customization(&self) -> &EffectiveCustomization {
        &self.customization
    }

    pub fn state(&self) -> ToggleState {
        self.state
    }

    pub fn chrome(&self) -> &Chrome {
        &self.chrome
    }

    pub fn frame(&self) -> &SessionFrame {
        &self.frame
    }

    /// Whether a transition timer is waiting to fire.
    pub fn has_pending_timer(&self) -> bool {
        self.pending.is_some()
    }
}
