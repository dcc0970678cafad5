//! # Theme System
//!
//! Provides the color themes used by the dashboard.
//!
//! ## Overview
//!
//! The [`Theme`] struct defines all colors used when drawing panes and page
//! content. A theme is picked once at startup (from the config file or
//! `--theme`) and handed out as a `&'static Theme`; sessions read it but never
//! change it, so every connection sees the same palette.
//!
//! ## Built-in Themes
//!
//! - **Ocean** (default) - sky blue accent with an indigo banner
//! - **Catppuccin Mocha** - warm, dark pastel theme
//! - **Dracula** - dark theme with vivid colors
//! - **Nord** - arctic, north-bluish color palette
//! - **Gruvbox Dark** - retro groove color scheme

use ratatui::style::Color;

/// All colors used by the dashboard, grouped by semantic role.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    /// Human-readable name, matched by `--theme` and the config file.
    pub name: &'static str,

    // -- Foreground / text colors --
    /// Primary text color.
    pub fg: Color,
    /// Muted text (help lines, hints, unfocused borders).
    pub fg_dim: Color,

    // -- Accent / brand colors --
    /// Focused borders, list selection, headings.
    pub accent: Color,
    /// Landing banner, project card borders, technology labels.
    pub banner: Color,
    /// Secondary highlight for inline emphasis.
    pub highlight: Color,
    /// Hyperlink targets.
    pub link: Color,
}

impl Theme {
    /// Return the list of all built-in themes.
    pub fn all() -> &'static [Theme] {
        &BUILT_IN_THEMES
    }

    /// Find a built-in theme by name (case-insensitive).
    pub fn by_name(name: &str) -> Option<&'static Theme> {
        BUILT_IN_THEMES
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
    }

    /// Return the default theme (Ocean).
    pub fn default_theme() -> &'static Theme {
        &BUILT_IN_THEMES[0]
    }
}

// ---------------------------------------------------------------------------
// Built-in theme definitions
// ---------------------------------------------------------------------------

static BUILT_IN_THEMES: [Theme; 5] = [
    // 0 - Ocean (default)
    Theme {
        name: "Ocean",
        fg: Color::Reset,
        fg_dim: Color::Indexed(241),
        accent: Color::Rgb(0, 175, 255),    // #00AFFF
        banner: Color::Rgb(95, 95, 215),    // #5F5FD7
        highlight: Color::Rgb(138, 0, 255), // #8A00FF
        link: Color::Blue,
    },
    // 1 - Catppuccin Mocha
    Theme {
        name: "Catppuccin Mocha",
        fg: Color::Rgb(205, 214, 244),        // text
        fg_dim: Color::Rgb(108, 112, 134),    // overlay0
        accent: Color::Rgb(137, 180, 250),    // blue
        banner: Color::Rgb(180, 190, 254),    // lavender
        highlight: Color::Rgb(203, 166, 247), // mauve
        link: Color::Rgb(116, 199, 236),      // sapphire
    },
    // 2 - Dracula
    Theme {
        name: "Dracula",
        fg: Color::Rgb(248, 248, 242),
        fg_dim: Color::Rgb(98, 114, 164),
        accent: Color::Rgb(139, 233, 253), // cyan
        banner: Color::Rgb(189, 147, 249), // purple
        highlight: Color::Rgb(255, 121, 198),
        link: Color::Rgb(80, 250, 123),
    },
    // 3 - Nord
    Theme {
        name: "Nord",
        fg: Color::Rgb(216, 222, 233),
        fg_dim: Color::Rgb(76, 86, 106),
        accent: Color::Rgb(136, 192, 208), // frost
        banner: Color::Rgb(129, 161, 193),
        highlight: Color::Rgb(180, 142, 173),
        link: Color::Rgb(143, 188, 187),
    },
    // 4 - Gruvbox Dark
    Theme {
        name: "Gruvbox Dark",
        fg: Color::Rgb(235, 219, 178),
        fg_dim: Color::Rgb(146, 131, 116),
        accent: Color::Rgb(131, 165, 152), // aqua
        banner: Color::Rgb(250, 189, 47),  // yellow
        highlight: Color::Rgb(211, 134, 155),
        link: Color::Rgb(142, 192, 124),
    },
];
