//! Merge options
//!
//! Options can be built in code or loaded from a JSON file. A file that
//! cannot be parsed is reported and replaced by the defaults, so a broken
//! options file never blocks a merge.

use crate::Result;
use chrono::{Locale, NaiveDateTime};
use mail_merge::{parse_locale, DateContext};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Locale used when none is configured
pub const DEFAULT_LOCALE: &str = "en_US";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MergeOptions {
    /// Point in time shown by DATE fields; DATE fields keep their result without it
    pub date: Option<NaiveDateTime>,
    /// Picture that overrides the `\@` switch of every DATE field
    pub date_format: Option<String>,
    /// Locale for month and day names, e.g. `en_US` or `fr_FR`
    pub locale: String,
    /// Also merge headers, footers, footnotes and endnotes
    pub include_headers_footers: bool,
    /// Fail the merge when any field is malformed instead of reporting it
    pub fail_on_malformed: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self { date: None, date_format: None, locale: DEFAULT_LOCALE.to_string(),
               include_headers_footers: true, fail_on_malformed: true }
    }
}

impl MergeOptions {
    pub fn with_date(mut self, date: NaiveDateTime) -> Self { self.date = Some(date); self }
    pub fn with_date_format(mut self, picture: impl Into<String>) -> Self { self.date_format = Some(picture.into()); self }
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self { self.locale = locale.into(); self }
    pub fn with_headers_footers(mut self, include: bool) -> Self { self.include_headers_footers = include; self }
    pub fn with_fail_on_malformed(mut self, fail: bool) -> Self { self.fail_on_malformed = fail; self }

    /// The configured locale, or `en_US` with a warning when it is unknown
    pub fn chrono_locale(&self) -> Locale {
        parse_locale(&self.locale).unwrap_or_else(|| {
            tracing::warn!(locale = %self.locale, "Unknown locale, using {}", DEFAULT_LOCALE);
            Locale::en_US
        })
    }

    /// Date context handed to the merge passes
    pub fn date_context(&self) -> DateContext<'_> {
        DateContext {
            now: self.date,
            picture: self.date_format.as_deref(),
            locale: self.chrono_locale(),
        }
    }

    /// Load options from a JSON file.
    ///
    /// A missing file yields the defaults. A file that is not valid JSON for
    /// these options logs a warning and also yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        match serde_json::from_str::<MergeOptions>(&content) {
            Ok(options) => Ok(options),
            Err(e) => {
                tracing::warn!(
                    "Failed to parse merge options file {}, using defaults: {}",
                    path.display(),
                    e
                );
                Ok(Self::default())
            }
        }
    }

    /// Save options as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
