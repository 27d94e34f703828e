use crate::config::TransitionConfig;
use crate::dom::{OPACITY, TRANSFORM, TransitionRule};
use crate::modal::{CONTAINER_CLASS, SHOW_CLASS};

/// Transitions the renderer animates when a backdrop's show class toggles:
/// the backdrop fades and its container slides.
pub fn transition_rules(config: &TransitionConfig) -> Vec<TransitionRule> {
    vec![
        TransitionRule::new(SHOW_CLASS, OPACITY, config.opacity()),
        TransitionRule::new(SHOW_CLASS, TRANSFORM, config.transform()).on_descendant(CONTAINER_CLASS),
    ]
}
