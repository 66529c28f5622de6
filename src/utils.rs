use chrono::{NaiveDate, TimeDelta};
use crossterm::event::{KeyCode, KeyModifiers};
use directories::{BaseDirs, ProjectDirs};
use std::path::PathBuf;

use crate::models::DATE_FORMAT;

/// Profile mode for the application (dev or prod)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Dev,
    Prod,
}

impl Profile {
    fn app_name(&self) -> &'static str {
        match self {
            Profile::Dev => "traker-dev",
            Profile::Prod => "traker",
        }
    }
}

/// Get the configuration directory path.
/// The dev profile uses "traker-dev" so it never touches real data.
pub fn get_config_dir(profile: Profile) -> Option<PathBuf> {
    ProjectDirs::from("com", "traker", profile.app_name())
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the data directory path (task record and log file)
pub fn get_data_dir(profile: Profile) -> Option<PathBuf> {
    ProjectDirs::from("com", "traker", profile.app_name())
        .map(|dirs| dirs.data_dir().to_path_buf())
}

/// Expand `~` in a path string to the user's home directory
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = BaseDirs::new().map(|d| d.home_dir().to_path_buf()) {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Parse a date string in ISO 8601 format (YYYY-MM-DD)
pub fn parse_date(date_str: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(date_str, DATE_FORMAT)
}

/// Today's date in local time
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Date `days` after today, formatted for a form field.
/// None when the offset leaves chrono's date range.
pub fn date_in_days(days: i64) -> Option<String> {
    let date = today().checked_add_signed(TimeDelta::try_days(days)?)?;
    Some(date.format(DATE_FORMAT).to_string())
}

/// Default due date for a new task, falling back to today for an unusable offset
pub fn default_due_date(days: i64) -> String {
    date_in_days(days).unwrap_or_else(|| today().format(DATE_FORMAT).to_string())
}

/// Parsed key binding information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedKeyBinding {
    pub key_code: KeyCode,
    pub requires_ctrl: bool,
}

/// Check if a key event has the primary modifier (Ctrl on Windows/Linux, Option/Alt on macOS)
pub fn has_primary_modifier(modifiers: KeyModifiers) -> bool {
    #[cfg(target_os = "macos")]
    {
        modifiers.contains(KeyModifiers::CONTROL) || modifiers.contains(KeyModifiers::ALT)
    }

    #[cfg(not(target_os = "macos"))]
    {
        modifiers.contains(KeyModifiers::CONTROL)
    }
}

/// Format a key binding string for display, showing the platform-appropriate modifier
pub fn format_key_binding_for_display(key_binding: &str) -> String {
    #[cfg(target_os = "macos")]
    {
        key_binding.replace("Ctrl+", "Opt+")
    }

    #[cfg(not(target_os = "macos"))]
    {
        key_binding.to_string()
    }
}

/// Parse a key binding string from config into a ParsedKeyBinding
/// Supports: single keys ("q", "n"), special keys ("Enter", "Space", "F1"),
/// and the Ctrl modifier ("Ctrl+s")
pub fn parse_key_binding(key_str: &str) -> Result<ParsedKeyBinding, String> {
    let key_str = key_str.trim();

    if let Some(key_part) = key_str.strip_prefix("Ctrl+") {
        return Ok(ParsedKeyBinding {
            key_code: parse_key_code(key_part)?,
            requires_ctrl: true,
        });
    }

    Ok(ParsedKeyBinding {
        key_code: parse_key_code(key_str)?,
        requires_ctrl: false,
    })
}

fn parse_key_code(key_str: &str) -> Result<KeyCode, String> {
    match key_str {
        "Enter" => Ok(KeyCode::Enter),
        "Esc" | "Escape" => Ok(KeyCode::Esc),
        "Backspace" => Ok(KeyCode::Backspace),
        "Tab" => Ok(KeyCode::Tab),
        "Space" | " " => Ok(KeyCode::Char(' ')),
        "Left" => Ok(KeyCode::Left),
        "Right" => Ok(KeyCode::Right),
        "Up" => Ok(KeyCode::Up),
        "Down" => Ok(KeyCode::Down),
        "Home" => Ok(KeyCode::Home),
        "End" => Ok(KeyCode::End),
        "PageUp" => Ok(KeyCode::PageUp),
        "PageDown" => Ok(KeyCode::PageDown),
        "Delete" => Ok(KeyCode::Delete),
        "Insert" => Ok(KeyCode::Insert),
        _ => {
            if let Some(n) = key_str.strip_prefix('F').and_then(|n| n.parse::<u8>().ok()) {
                if (1..=12).contains(&n) {
                    return Ok(KeyCode::F(n));
                }
            }
            let mut chars = key_str.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(KeyCode::Char(c)),
                _ => Err(format!("Unknown key binding: {}", key_str)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_special_keys() {
        assert_eq!(parse_key_binding("q").unwrap().key_code, KeyCode::Char('q'));
        assert_eq!(parse_key_binding("Space").unwrap().key_code, KeyCode::Char(' '));
        assert_eq!(parse_key_binding("F1").unwrap().key_code, KeyCode::F(1));
        assert_eq!(parse_key_binding(" Enter ").unwrap().key_code, KeyCode::Enter);
    }

    #[test]
    fn parses_ctrl_modifier() {
        let binding = parse_key_binding("Ctrl+s").unwrap();
        assert!(binding.requires_ctrl);
        assert_eq!(binding.key_code, KeyCode::Char('s'));
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(parse_key_binding("Hyper").is_err());
        assert!(parse_key_binding("F13").is_err());
        assert!(parse_key_binding("").is_err());
    }

    #[test]
    fn parse_date_is_strict() {
        assert!(parse_date("2024-02-29").is_ok());
        assert!(parse_date("2023-02-29").is_err());
        assert!(parse_date("2024/01/01").is_err());
    }

    #[test]
    fn expand_path_leaves_plain_paths() {
        assert_eq!(expand_path("/tmp/tasks.json"), PathBuf::from("/tmp/tasks.json"));
        assert_eq!(expand_path("tasks.json"), PathBuf::from("tasks.json"));
    }

    #[test]
    fn date_in_days_is_parseable() {
        let tomorrow = parse_date(&date_in_days(1).unwrap()).unwrap();
        assert_eq!(tomorrow, today() + chrono::Duration::days(1));
    }

    #[test]
    fn huge_offsets_do_not_panic() {
        assert_eq!(date_in_days(i64::MAX / 1000), None);
        assert_eq!(date_in_days(i64::MIN), None);
        assert_eq!(default_due_date(i64::MAX / 1000), today().to_string());
    }

    #[test]
    fn expand_path_replaces_home_prefix() {
        let home = BaseDirs::new().unwrap().home_dir().to_path_buf();
        assert_eq!(expand_path("~/x/tasks.json"), home.join("x/tasks.json"));
    }
}
