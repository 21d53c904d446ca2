use serde::{Deserialize, Serialize};

/// Color scheme preference carried in the `theme` cookie. Parsed once per
/// request and handed to the render layer as plain data; nothing in the
/// core reads it ambiently.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl Theme {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            "system" => Some(Self::System),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::System => "system",
        }
    }

    /// Pulls the `theme` cookie out of a raw `Cookie:` header. Missing
    /// header, missing cookie, or an unrecognized value all fall back to
    /// `default`.
    pub fn from_cookie_header(header: Option<&str>, default: Theme) -> Theme {
        let Some(header) = header else {
            return default;
        };

        header
            .split(';')
            .filter_map(|pair| pair.split_once('='))
            .find(|(name, _)| name.trim() == "theme")
            .and_then(|(_, value)| Theme::parse(value))
            .unwrap_or(default)
    }
}
