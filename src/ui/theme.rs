use colored::{Color, Colorize};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    pub colors: HashMap<String, ColorConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorConfig {
    pub foreground: Option<String>,
    pub background: Option<String>,
    pub style: Vec<String>,
}

impl ColorConfig {
    fn new(foreground: &str, background: Option<&str>, style: &[&str]) -> Self {
        Self {
            foreground: Some(foreground.to_string()),
            background: background.map(str::to_string),
            style: style.iter().map(|s| s.to_string()).collect(),
        }
    }
}

pub struct ThemeManager {
    themes: HashMap<String, Theme>,
    current_theme: String,
}

impl ThemeManager {
    pub fn new() -> Self {
        let mut manager = Self {
            themes: HashMap::new(),
            current_theme: "default".to_string(),
        };

        manager.load_default_themes();
        manager
    }

    pub fn set_theme(&mut self, theme_name: &str) -> bool {
        if self.themes.contains_key(theme_name) {
            self.current_theme = theme_name.to_string();
            true
        } else {
            false
        }
    }

    pub fn current_theme_name(&self) -> &str {
        &self.current_theme
    }

    fn current_colors(&self) -> Option<&HashMap<String, ColorConfig>> {
        self.themes
            .get(&self.current_theme)
            .or_else(|| self.themes.get("default"))
            .map(|theme| &theme.colors)
    }

    pub fn apply_style(&self, text: &str, style_name: &str) -> String {
        let Some(color_config) = self.current_colors().and_then(|colors| colors.get(style_name)) else {
            return text.to_string();
        };

        let mut styled = text.normal();

        if let Some(color) = color_config.foreground.as_deref().and_then(parse_color) {
            styled = styled.color(color);
        }
        if let Some(color) = color_config.background.as_deref().and_then(parse_color) {
            styled = styled.on_color(color);
        }

        for style in &color_config.style {
            styled = match style.as_str() {
                "bold" => styled.bold(),
                "italic" => styled.italic(),
                "underline" => styled.underline(),
                "dimmed" => styled.dimmed(),
                "reversed" => styled.reversed(),
                _ => styled,
            };
        }

        styled.to_string()
    }

    pub fn list_themes(&self) -> Vec<String> {
        let mut names: Vec<String> = self.themes.keys().cloned().collect();
        names.sort();
        names
    }

    fn insert_theme(&mut self, name: &str, colors: Vec<(&str, ColorConfig)>) {
        self.themes.insert(name.to_string(), Theme {
            name: name.to_string(),
            colors: colors
                .into_iter()
                .map(|(style, config)| (style.to_string(), config))
                .collect(),
        });
    }

    fn load_default_themes(&mut self) {
        self.insert_theme("default", vec![
            ("title", ColorConfig::new("cyan", None, &["bold"])),
            ("house_idle", ColorConfig::new("white", None, &[])),
            ("house_lit", ColorConfig::new("black", Some("yellow"), &["bold"])),
            ("player1", ColorConfig::new("red", None, &["bold"])),
            ("player2", ColorConfig::new("blue", None, &["bold"])),
            ("combination", ColorConfig::new("yellow", None, &["bold"])),
            ("countdown", ColorConfig::new("green", None, &["bold"])),
            ("countdown_low", ColorConfig::new("red", None, &["bold"])),
            ("error", ColorConfig::new("red", None, &["bold"])),
            ("success", ColorConfig::new("green", None, &["bold"])),
            ("warning", ColorConfig::new("yellow", None, &["bold"])),
            ("info", ColorConfig::new("blue", None, &[])),
            ("separator", ColorConfig::new("bright_black", None, &["dimmed"])),
        ]);

        self.insert_theme("dark", vec![
            ("title", ColorConfig::new("bright_cyan", None, &["bold"])),
            ("house_idle", ColorConfig::new("bright_black", None, &[])),
            ("house_lit", ColorConfig::new("black", Some("bright_yellow"), &["bold"])),
            ("player1", ColorConfig::new("bright_red", None, &["bold"])),
            ("player2", ColorConfig::new("bright_blue", None, &["bold"])),
            ("combination", ColorConfig::new("bright_yellow", None, &["bold"])),
            ("countdown", ColorConfig::new("bright_green", None, &["bold"])),
            ("countdown_low", ColorConfig::new("bright_red", None, &["bold"])),
            ("error", ColorConfig::new("bright_red", None, &["bold"])),
            ("success", ColorConfig::new("bright_green", None, &["bold"])),
            ("info", ColorConfig::new("bright_white", None, &[])),
        ]);

        self.insert_theme("light", vec![
            ("title", ColorConfig::new("blue", None, &["bold"])),
            ("house_idle", ColorConfig::new("black", None, &[])),
            ("house_lit", ColorConfig::new("white", Some("magenta"), &["bold"])),
            ("player1", ColorConfig::new("red", None, &[])),
            ("player2", ColorConfig::new("blue", None, &[])),
            ("combination", ColorConfig::new("magenta", None, &["bold"])),
            ("countdown", ColorConfig::new("black", None, &["bold"])),
            ("countdown_low", ColorConfig::new("red", None, &["bold", "underline"])),
            ("info", ColorConfig::new("black", None, &[])),
        ]);
    }
}

impl Default for ThemeManager {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_color(color_name: &str) -> Option<Color> {
    match color_name.to_lowercase().as_str() {
        "black" => Some(Color::Black),
        "red" => Some(Color::Red),
        "green" => Some(Color::Green),
        "yellow" => Some(Color::Yellow),
        "blue" => Some(Color::Blue),
        "magenta" => Some(Color::Magenta),
        "cyan" => Some(Color::Cyan),
        "white" => Some(Color::White),
        "bright_black" => Some(Color::BrightBlack),
        "bright_red" => Some(Color::BrightRed),
        "bright_green" => Some(Color::BrightGreen),
        "bright_yellow" => Some(Color::BrightYellow),
        "bright_blue" => Some(Color::BrightBlue),
        "bright_magenta" => Some(Color::BrightMagenta),
        "bright_cyan" => Some(Color::BrightCyan),
        "bright_white" => Some(Color::BrightWhite),
        _ => None,
    }
}
