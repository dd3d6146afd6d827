//! Named terminal styles, applied from templates through the `style` filter.

use console::Style;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Prepended to text whose style name is not registered, so template typos show.
pub const MISSING_STYLE_INDICATOR: &str = "(!?)";

pub mod names {
    pub const TITLE: &str = "title";
    pub const SLUG: &str = "slug";
    pub const COMPOSER: &str = "composer";
    pub const TIME: &str = "time";
    pub const LABEL: &str = "label";
    pub const CODE: &str = "code";
    pub const PRIVATE: &str = "private";
    pub const DIM: &str = "dim";
    pub const COUNT: &str = "count";
    pub const SUCCESS: &str = "success";
    pub const WARNING: &str = "warning";
    pub const ERROR: &str = "error";
}

#[derive(Clone, Default)]
pub struct Theme {
    styles: HashMap<String, Style>,
}

impl Theme {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, name: &str, style: Style) -> Self {
        self.styles.insert(name.to_string(), style);
        self
    }

    pub fn has(&self, name: &str) -> bool {
        self.styles.contains_key(name)
    }

    /// Styles `text`, or only checks the name when `use_color` is off.
    pub fn apply(&self, name: &str, text: &str, use_color: bool) -> String {
        match self.styles.get(name) {
            Some(style) if use_color => style
                .clone()
                .force_styling(true)
                .apply_to(text)
                .to_string(),
            Some(_) => text.to_string(),
            None => format!("{} {}", MISSING_STYLE_INDICATOR, text),
        }
    }
}

pub static SCOREBOOK_THEME: Lazy<Theme> = Lazy::new(|| {
    Theme::new()
        .add(names::TITLE, Style::new().bold())
        .add(names::SLUG, Style::new().cyan())
        .add(names::COMPOSER, Style::new())
        .add(names::TIME, Style::new().color256(247).italic())
        .add(names::LABEL, Style::new().dim())
        .add(names::CODE, Style::new().yellow())
        .add(names::PRIVATE, Style::new().magenta())
        .add(names::DIM, Style::new().dim())
        .add(names::COUNT, Style::new().cyan())
        .add(names::SUCCESS, Style::new().green())
        .add(names::WARNING, Style::new().yellow())
        .add(names::ERROR, Style::new().red().bold())
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_mode_leaves_text_alone() {
        assert_eq!(SCOREBOOK_THEME.apply(names::TITLE, "Ave Maria", false), "Ave Maria");
    }

    #[test]
    fn unknown_style_is_flagged() {
        assert_eq!(
            SCOREBOOK_THEME.apply("titel", "Ave Maria", false),
            "(!?) Ave Maria"
        );
    }

    #[test]
    fn color_mode_wraps_in_escape_codes() {
        let styled = SCOREBOOK_THEME.apply(names::ERROR, "boom", true);
        assert!(styled.contains("boom"));
        assert_ne!(styled, "boom");
    }

    #[test]
    fn every_message_level_has_a_style() {
        for name in [names::SUCCESS, names::WARNING, names::ERROR] {
            assert!(SCOREBOOK_THEME.has(name));
        }
    }
}
