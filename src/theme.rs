use catppuccin::PALETTE;
use ratatui::style::Color;
use ratatui::widgets::BorderType;
use tracing::warn;

/// Convert a catppuccin color to a ratatui color.
const fn catppuccin_to_color(c: &catppuccin::Color) -> Color {
    Color::Rgb(c.rgb.r, c.rgb.g, c.rgb.b)
}

/// Colors used to draw the page and its modals.
///
/// Fields hold raw palette colors. The accessors below map them onto the
/// pieces of a modal (backdrop, container, footer buttons), so the renderer
/// never picks palette entries itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub base: Color,
    pub mantle: Color,
    pub crust: Color,

    pub surface0: Color,
    pub surface1: Color,
    pub surface2: Color,

    pub overlay0: Color,
    pub overlay1: Color,

    pub text: Color,
    pub subtext0: Color,

    pub mauve: Color,
    pub red: Color,
    pub peach: Color,
    pub yellow: Color,
    pub green: Color,
    pub blue: Color,
    pub lavender: Color,

    pub border_type: BorderType,
}

impl Theme {
    const fn from_catppuccin(flavor: &catppuccin::Flavor) -> Self {
        let c = &flavor.colors;
        Self {
            base: catppuccin_to_color(&c.base),
            mantle: catppuccin_to_color(&c.mantle),
            crust: catppuccin_to_color(&c.crust),
            surface0: catppuccin_to_color(&c.surface0),
            surface1: catppuccin_to_color(&c.surface1),
            surface2: catppuccin_to_color(&c.surface2),
            overlay0: catppuccin_to_color(&c.overlay0),
            overlay1: catppuccin_to_color(&c.overlay1),
            text: catppuccin_to_color(&c.text),
            subtext0: catppuccin_to_color(&c.subtext0),
            mauve: catppuccin_to_color(&c.mauve),
            red: catppuccin_to_color(&c.red),
            peach: catppuccin_to_color(&c.peach),
            yellow: catppuccin_to_color(&c.yellow),
            green: catppuccin_to_color(&c.green),
            blue: catppuccin_to_color(&c.blue),
            lavender: catppuccin_to_color(&c.lavender),
            border_type: BorderType::Rounded,
        }
    }

    #[must_use]
    pub fn catppuccin_mocha() -> Self {
        Self::from_catppuccin(&PALETTE.mocha)
    }

    #[must_use]
    pub fn catppuccin_latte() -> Self {
        Self::from_catppuccin(&PALETTE.latte)
    }

    #[must_use]
    pub fn catppuccin_frappe() -> Self {
        Self::from_catppuccin(&PALETTE.frappe)
    }

    #[must_use]
    pub fn catppuccin_macchiato() -> Self {
        Self::from_catppuccin(&PALETTE.macchiato)
    }

    // Page

    #[must_use]
    pub const fn page_bg(&self) -> Color {
        self.base
    }

    #[must_use]
    pub const fn page_fg(&self) -> Color {
        self.text
    }

    #[must_use]
    pub const fn scrollbar(&self) -> Color {
        self.surface2
    }

    // Modal

    /// Fill behind every shown modal.
    #[must_use]
    pub const fn backdrop(&self) -> Color {
        self.crust
    }

    /// Text of the page as seen through a backdrop.
    #[must_use]
    pub const fn backdrop_fg(&self) -> Color {
        self.overlay0
    }

    #[must_use]
    pub const fn container_bg(&self) -> Color {
        self.mantle
    }

    #[must_use]
    pub const fn border(&self) -> Color {
        self.surface1
    }

    /// Border of the topmost modal.
    #[must_use]
    pub const fn border_focused(&self) -> Color {
        self.lavender
    }

    #[must_use]
    pub const fn close_button(&self) -> Color {
        self.red
    }

    #[must_use]
    pub const fn footer_fg(&self) -> Color {
        self.subtext0
    }

    #[must_use]
    pub const fn button_bg(&self) -> Color {
        self.surface0
    }

    #[must_use]
    pub const fn button_fg(&self) -> Color {
        self.mauve
    }

    // Chrome

    #[must_use]
    pub const fn key_hint(&self) -> Color {
        self.peach
    }

    #[must_use]
    pub const fn muted(&self) -> Color {
        self.overlay1
    }

    #[must_use]
    pub const fn success(&self) -> Color {
        self.green
    }

    #[must_use]
    pub const fn info(&self) -> Color {
        self.blue
    }

    #[must_use]
    pub const fn warning(&self) -> Color {
        self.yellow
    }

    #[must_use]
    pub const fn error(&self) -> Color {
        self.red
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::catppuccin_mocha()
    }
}

/// A built-in theme and its display name.
#[derive(Debug, Clone)]
pub struct ThemeInfo {
    pub name: &'static str,
    pub theme: Theme,
}

impl ThemeInfo {
    const fn new(name: &'static str, theme: Theme) -> Self {
        Self { name, theme }
    }
}

impl std::fmt::Display for ThemeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

pub fn available_themes() -> Vec<ThemeInfo> {
    vec![
        ThemeInfo::new("Catppuccin Mocha", Theme::catppuccin_mocha()),
        ThemeInfo::new("Catppuccin Macchiato", Theme::catppuccin_macchiato()),
        ThemeInfo::new("Catppuccin Frappé", Theme::catppuccin_frappe()),
        ThemeInfo::new("Catppuccin Latte", Theme::catppuccin_latte()),
    ]
}

/// Look up a theme by name, ignoring case. Unknown names fall back to the
/// default theme.
pub fn theme_from_name(name: &str) -> Theme {
    available_themes()
        .into_iter()
        .find(|t| t.name.eq_ignore_ascii_case(name))
        .map_or_else(
            || {
                warn!(name, "Unknown theme, using default");
                Theme::default()
            },
            |t| t.theme,
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_lookup_ignores_case() {
        assert_eq!(theme_from_name("catppuccin latte"), Theme::catppuccin_latte());
        assert_eq!(theme_from_name("Catppuccin Frappé"), Theme::catppuccin_frappe());
    }

    #[test]
    fn test_unknown_theme_falls_back_to_default() {
        assert_eq!(theme_from_name("solarized"), Theme::default());
    }

    #[test]
    fn test_backdrop_differs_from_container() {
        for info in available_themes() {
            assert_ne!(info.theme.backdrop(), info.theme.container_bg(), "{info}");
        }
    }
}
