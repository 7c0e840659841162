//! Sectioned key/value configuration document.
//!
//! The on-disk format is INI-style text:
//!
//! ```text
//! [core]
//! repositoryformatversion = 0
//! filemode = false
//! bare = false
//! ```
//!
//! Unknown sections and keys survive a parse/render round trip; the core
//! only interprets the `core` section.

use crate::error::{Error, Result};
use std::collections::BTreeMap;

/// The section holding the keys this core reads and validates.
pub const CORE_SECTION: &str = "core";

/// The format-version key; must parse to `0` for a non-forced open.
pub const FORMAT_VERSION_KEY: &str = "repositoryformatversion";

/// A sectioned key/value configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    sections: BTreeMap<String, BTreeMap<String, String>>,
}

impl Config {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// The configuration written at repository-create time.
    pub fn repository_default() -> Self {
        let mut config = Self::new();
        config.set(CORE_SECTION, FORMAT_VERSION_KEY, "0");
        config.set(CORE_SECTION, "filemode", "false");
        config.set(CORE_SECTION, "bare", "false");
        config
    }

    /// Parse a configuration document from its textual form.
    pub fn parse(text: &str) -> Result<Self> {
        let mut sections: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
        let mut current: Option<String> = None;

        for (lineno, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if let Some(name) = line.strip_prefix('[') {
                let name = name.strip_suffix(']').ok_or_else(|| {
                    Error::invalid_config(format!("unterminated section header on line {}", lineno + 1))
                })?;
                let name = name.trim().to_string();
                sections.entry(name.clone()).or_default();
                current = Some(name);
                continue;
            }

            let (key, value) = line.split_once('=').ok_or_else(|| {
                Error::invalid_config(format!("expected 'key = value' on line {}", lineno + 1))
            })?;
            let section = current.as_ref().ok_or_else(|| {
                Error::invalid_config(format!("key outside any section on line {}", lineno + 1))
            })?;
            sections
                .entry(section.clone())
                .or_default()
                .insert(key.trim().to_string(), value.trim().to_string());
        }

        Ok(Self { sections })
    }

    /// Render the document to its textual form.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (name, entries) in &self.sections {
            out.push('[');
            out.push_str(name);
            out.push_str("]\n");
            for (key, value) in entries {
                out.push_str(key);
                out.push_str(" = ");
                out.push_str(value);
                out.push('\n');
            }
        }
        out
    }

    /// Look up a value.
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|entries| entries.get(key))
            .map(String::as_str)
    }

    /// Insert or replace a value.
    pub fn set(&mut self, section: &str, key: &str, value: &str) {
        self.sections
            .entry(section.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());
    }

    /// Parse `core.repositoryformatversion` as a base-10 integer.
    ///
    /// A missing key or a non-integer value counts as an unsupported
    /// version, not a separate error kind.
    pub fn repository_format_version(&self) -> Result<u32> {
        let raw = self
            .get(CORE_SECTION, FORMAT_VERSION_KEY)
            .ok_or_else(|| Error::unsupported_format_version("(missing)"))?;
        raw.parse::<u32>()
            .map_err(|_| Error::unsupported_format_version(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_keys() {
        let config = Config::repository_default();
        assert_eq!(config.get("core", "repositoryformatversion"), Some("0"));
        assert_eq!(config.get("core", "filemode"), Some("false"));
        assert_eq!(config.get("core", "bare"), Some("false"));
        assert_eq!(config.repository_format_version().unwrap(), 0);
    }

    #[test]
    fn test_parse_render_roundtrip() {
        let config = Config::repository_default();
        let text = config.render();
        let parsed = Config::parse(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_parse_with_comments_and_spacing() {
        let text = "# created by hand\n[core]\n; comment\nrepositoryformatversion=0\nbare = true\n\n";
        let config = Config::parse(text).unwrap();
        assert_eq!(config.get("core", "repositoryformatversion"), Some("0"));
        assert_eq!(config.get("core", "bare"), Some("true"));
    }

    #[test]
    fn test_parse_preserves_unknown_sections() {
        let text = "[core]\nrepositoryformatversion = 0\n[remote]\nurl = somewhere\n";
        let config = Config::parse(text).unwrap();
        assert_eq!(config.get("remote", "url"), Some("somewhere"));

        // Unknown keys survive a render
        let again = Config::parse(&config.render()).unwrap();
        assert_eq!(again.get("remote", "url"), Some("somewhere"));
    }

    #[test]
    fn test_parse_key_outside_section() {
        assert!(Config::parse("repositoryformatversion = 0\n").is_err());
    }

    #[test]
    fn test_parse_unterminated_section() {
        assert!(Config::parse("[core\nbare = false\n").is_err());
    }

    #[test]
    fn test_parse_missing_equals() {
        assert!(Config::parse("[core]\njust a line\n").is_err());
    }

    #[test]
    fn test_format_version_missing() {
        let config = Config::new();
        assert!(matches!(
            config.repository_format_version(),
            Err(Error::UnsupportedFormatVersion { .. })
        ));
    }

    #[test]
    fn test_format_version_non_integer() {
        let mut config = Config::new();
        config.set("core", "repositoryformatversion", "zero");
        assert!(matches!(
            config.repository_format_version(),
            Err(Error::UnsupportedFormatVersion { .. })
        ));
    }

    #[test]
    fn test_format_version_nonzero_parses() {
        let mut config = Config::new();
        config.set("core", "repositoryformatversion", "1");
        assert_eq!(config.repository_format_version().unwrap(), 1);
    }
}
