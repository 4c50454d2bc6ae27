//! Extension classifier: picks a temp-file extension for the editor.
//!
//! The extension only steers the editor's syntax mode. Rules are plain
//! case-sensitive substring matches on the executable name and window
//! title, evaluated top-to-bottom; the first rule whose present
//! conditions all hold wins.

use std::str::FromStr;

/// Extension used when no rule matches.
pub const DEFAULT_EXTENSION: &str = ".txt";

/// One row of the matching table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionRule {
    /// Substring the executable name must contain, if any.
    pub executable: Option<String>,
    /// Substring the window title must contain, if any.
    pub title: Option<String>,
    pub extension: String,
}

impl ExtensionRule {
    pub fn for_executable(executable: &str, extension: &str) -> Self {
        Self {
            executable: Some(executable.to_string()),
            title: None,
            extension: extension.to_string(),
        }
    }

    pub fn matches(&self, executable: &str, title: &str) -> bool {
        let exe_ok = self
            .executable
            .as_deref()
            .is_none_or(|needle| executable.contains(needle));
        let title_ok = self
            .title
            .as_deref()
            .is_none_or(|needle| title.contains(needle));
        exe_ok && title_ok
    }
}

/// Parses `EXE:TITLE:EXT`.
///
/// EXE and TITLE may be empty (no constraint). TITLE may contain `:`;
/// EXE ends at the first colon and EXT starts after the last one.
impl FromStr for ExtensionRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (executable, rest) = s
            .split_once(':')
            .ok_or_else(|| format!("expected EXE:TITLE:EXT, got {s:?}"))?;
        let (title, extension) = rest
            .rsplit_once(':')
            .ok_or_else(|| format!("expected EXE:TITLE:EXT, got {s:?}"))?;

        if extension.is_empty() {
            return Err(format!("empty extension in rule {s:?}"));
        }
        if extension.contains('/') {
            return Err(format!("extension must not contain '/': {extension:?}"));
        }

        let non_empty = |v: &str| (!v.is_empty()).then(|| v.to_string());
        Ok(Self {
            executable: non_empty(executable),
            title: non_empty(title),
            extension: extension.to_string(),
        })
    }
}

/// The built-in table: browsers get Markdown.
pub fn builtin_rules() -> Vec<ExtensionRule> {
    vec![
        ExtensionRule::for_executable("chromium", ".md"),
        ExtensionRule::for_executable("firefox", ".md"),
    ]
}

/// Pick the extension for a window. Total: falls back to [`DEFAULT_EXTENSION`].
pub fn classify<'a>(executable: &str, title: &str, rules: &'a [ExtensionRule]) -> &'a str {
    rules
        .iter()
        .find(|rule| rule.matches(executable, title))
        .map_or(DEFAULT_EXTENSION, |rule| rule.extension.as_str())
}
