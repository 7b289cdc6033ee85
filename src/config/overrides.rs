//! Per-activity geometry overrides
//!
//! Each activity (named desktop) may override the detected sidebar and the
//! bounds of maximized windows. Activities without their own entry use the
//! `Fallback` entry, if one is configured.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::constants::config::FALLBACK_PROFILE;
use crate::geometry::Side;

/// Optional overrides for one activity
///
/// Every field is independent: `None` means "use the computed default".
/// An explicit `0` is a real value, not a missing one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OverrideEntry {
    /// Whether the sidebar is on the left or right
    pub side: Option<Side>,
    /// Width of the sidebar
    pub width: Option<u32>,
    /// Padding to adjust for theme borders
    pub padding: Option<u32>,
    /// X coordinate of a maximized window
    pub xpos: Option<i32>,
    /// Y coordinate of a maximized window
    pub ypos: Option<i32>,
    /// Width of a maximized window
    pub max_width: Option<i32>,
    /// Height of a maximized window
    pub max_height: Option<i32>,
}

impl OverrideEntry {
    /// Padding with a missing value counted as zero
    pub fn padding_or_zero(&self) -> u32 {
        self.padding.unwrap_or(0)
    }
}

/// Activity name → overrides, plus the reserved `Fallback` key
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OverrideRegistry {
    entries: HashMap<String, OverrideEntry>,
}

impl OverrideRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, profile: impl Into<String>, entry: OverrideEntry) {
        self.entries.insert(profile.into(), entry);
    }

    pub fn get(&self, profile: &str) -> Option<&OverrideEntry> {
        self.entries.get(profile)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Effective overrides for `profile`
    /// Priority: exact entry > `Fallback` entry > nothing overridden
    pub fn resolve(&self, profile: &str) -> OverrideEntry {
        if let Some(entry) = self.get(profile) {
            debug!(profile = %profile, "using activity overrides");
            *entry
        } else if let Some(entry) = self.get(FALLBACK_PROFILE) {
            debug!(profile = %profile, "no overrides for activity, using fallback entry");
            *entry
        } else {
            OverrideEntry::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(entries: &[(&str, OverrideEntry)]) -> OverrideRegistry {
        let mut registry = OverrideRegistry::new();
        for (name, entry) in entries {
            registry.insert(*name, *entry);
        }
        registry
    }

    #[test]
    fn test_resolve_exact_match_wins_over_fallback() {
        let registry = registry(&[
            ("Work", OverrideEntry { side: Some(Side::Right), width: Some(200), ..Default::default() }),
            (FALLBACK_PROFILE, OverrideEntry { padding: Some(12), ..Default::default() }),
        ]);

        let resolved = registry.resolve("Work");
        assert_eq!(resolved.side, Some(Side::Right));
        assert_eq!(resolved.width, Some(200));
        // Fields are not merged with the fallback entry
        assert_eq!(resolved.padding, None);
    }

    #[test]
    fn test_resolve_uses_fallback_for_unknown_profile() {
        let registry = registry(&[
            ("Default", OverrideEntry::default()),
            (FALLBACK_PROFILE, OverrideEntry { padding: Some(12), ..Default::default() }),
        ]);

        assert_eq!(registry.resolve("Gaming").padding, Some(12));
        assert_eq!(registry.resolve("Default").padding, None);
    }

    #[test]
    fn test_resolve_without_any_entry_is_all_none() {
        let resolved = OverrideRegistry::new().resolve("Anything");
        assert_eq!(resolved, OverrideEntry::default());
        assert_eq!(resolved.padding_or_zero(), 0);
    }

    #[test]
    fn test_explicit_zero_is_a_value() {
        let registry = registry(&[(
            "Default",
            OverrideEntry { width: Some(0), xpos: Some(0), ..Default::default() },
        )]);

        let resolved = registry.resolve("Default");
        assert_eq!(resolved.width, Some(0));
        assert_eq!(resolved.xpos, Some(0));
    }

    #[test]
    fn test_entry_deserializes_camel_case_keys() {
        let json = r#"{"side": "left", "maxWidth": 1600, "maxHeight": 900, "ypos": 30}"#;
        let entry: OverrideEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.side, Some(Side::Left));
        assert_eq!(entry.max_width, Some(1600));
        assert_eq!(entry.max_height, Some(900));
        assert_eq!(entry.ypos, Some(30));
        assert_eq!(entry.width, None);
    }

    #[test]
    fn test_registry_deserializes_as_plain_map() {
        let json = r#"{"Default": {}, "Fallback": {"padding": 12}}"#;
        let registry: OverrideRegistry = serde_json::from_str(json).unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("Fallback").and_then(|e| e.padding), Some(12));
    }
}
