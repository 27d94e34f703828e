#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalAction {
    Quit,
    Help,
}

/// Scrolling the page underneath the modals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageAction {
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoAction {
    Open,
    OpenStacked,
    CloseTop,
    AddButton,
    ToggleFooterContent,
}
