use ratatui::style::Color;

use crate::types::{AnalysisColor, GradeStatus};
use crate::ui::format::Tier;

#[derive(Debug, Clone)]
pub struct Theme {
    pub fg: Color,
    pub bg: Color,
    pub dim: Color,
    pub border: Color,
    pub highlight_bg: Color,
    pub highlight_fg: Color,
    pub ok: Color,
    pub warn: Color,
    pub critical: Color,
    pub accent: Color,
    pub title: Color,
}

impl Default for Theme {
    fn default() -> Self {
        dark()
    }
}

impl Theme {
    pub fn tier_color(&self, tier: Tier) -> Color {
        match tier {
            Tier::Ok => self.ok,
            Tier::Warn => self.warn,
            Tier::Critical => self.critical,
        }
    }

    pub fn analysis_color(&self, color: AnalysisColor) -> Color {
        match color {
            AnalysisColor::Green => self.ok,
            AnalysisColor::Yellow => self.warn,
            AnalysisColor::Red => self.critical,
        }
    }

    pub fn grade_status_color(&self, status: Option<GradeStatus>) -> Color {
        match status {
            Some(GradeStatus::Good) => self.ok,
            Some(GradeStatus::Warn) => self.warn,
            Some(GradeStatus::Bad) => self.critical,
            None => self.dim,
        }
    }
}

pub fn by_name(name: &str) -> Theme {
    match name {
        "dark" => dark(),
        "dark-orange" => dark_orange(),
        "solarized-dark" => solarized_dark(),
        "light" => light(),
        "no-color" => no_color(),
        _ => dark(),
    }
}

pub const THEME_NAMES: &[&str] = &["dark", "dark-orange", "solarized-dark", "light", "no-color"];

// -- Themes --

pub fn dark() -> Theme {
    Theme {
        fg: Color::Indexed(253),
        bg: Color::Reset,
        dim: Color::Indexed(243),
        border: Color::Indexed(240),
        highlight_bg: Color::Indexed(237),
        highlight_fg: Color::Indexed(255),
        ok: Color::Indexed(46),        // vivid green
        warn: Color::Indexed(220),     // gold
        critical: Color::Indexed(196), // vivid red
        accent: Color::Indexed(81),    // sky cyan
        title: Color::Indexed(255),
    }
}

pub fn dark_orange() -> Theme {
    Theme {
        fg: Color::Indexed(224),
        bg: Color::Reset,
        dim: Color::Indexed(95),
        border: Color::Indexed(94),    // dark orange-brown
        highlight_bg: Color::Indexed(52),
        highlight_fg: Color::Indexed(255),
        ok: Color::Indexed(107),       // olive green
        warn: Color::Indexed(214),     // orange
        critical: Color::Indexed(197), // deep pink
        accent: Color::Indexed(208),   // pump-sign orange
        title: Color::Indexed(214),
    }
}

pub fn solarized_dark() -> Theme {
    // base0=#839496 base01=#586e75 base02=#073642
    // green=#859900 yellow=#b58900 red=#dc322f cyan=#2aa198 blue=#268bd2
    Theme {
        fg: Color::Indexed(246),
        bg: Color::Reset,
        dim: Color::Indexed(240),
        border: Color::Indexed(23),
        highlight_bg: Color::Indexed(23),
        highlight_fg: Color::Indexed(230),
        ok: Color::Indexed(64),
        warn: Color::Indexed(136),
        critical: Color::Indexed(160),
        accent: Color::Indexed(37),
        title: Color::Indexed(33),
    }
}

pub fn light() -> Theme {
    Theme {
        fg: Color::Indexed(234),
        bg: Color::Indexed(231),
        dim: Color::Indexed(246),
        border: Color::Indexed(251),
        highlight_bg: Color::Indexed(253),
        highlight_fg: Color::Indexed(232),
        ok: Color::Indexed(28),
        warn: Color::Indexed(130),
        critical: Color::Indexed(124),
        accent: Color::Indexed(25),
        title: Color::Indexed(232),
    }
}

pub fn no_color() -> Theme {
    Theme {
        fg: Color::Reset,
        bg: Color::Reset,
        dim: Color::Reset,
        border: Color::Reset,
        highlight_bg: Color::Reset,
        highlight_fg: Color::Reset,
        ok: Color::Reset,
        warn: Color::Reset,
        critical: Color::Reset,
        accent: Color::Reset,
        title: Color::Reset,
    }
}
