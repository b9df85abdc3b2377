//! Severity levels and the ordered level gate
//!
//! Levels are declared from most verbose to least verbose. Setting an active
//! level shows that level and every level declared after it.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LoggerError;
use crate::style::{StyleName, Styler};

/// Built-in log levels, in declaration (gating) order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Detail,
    Sql,
    Info,
    Sess,
    Warn,
    Module,
    Error,
}

impl Level {
    /// All levels, most verbose first
    pub const ALL: [Level; 7] = [
        Level::Detail,
        Level::Sql,
        Level::Info,
        Level::Sess,
        Level::Warn,
        Level::Module,
        Level::Error,
    ];

    /// Identifier used in config files and by name lookups
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Detail => "detail",
            Level::Sql => "sql",
            Level::Info => "info",
            Level::Sess => "sess",
            Level::Warn => "warn",
            Level::Module => "module",
            Level::Error => "error",
        }
    }

    /// Text shown between the brackets of the line header
    pub fn label(&self) -> &'static str {
        match self {
            Level::Detail => "detail",
            Level::Sql => " PSQL ",
            Level::Info => " INFO ",
            Level::Sess => " SESS ",
            Level::Warn => " WARN ",
            Level::Module => "MODULE",
            Level::Error => " ERROR ",
        }
    }

    /// Styles applied to the label
    pub fn label_styles(&self) -> &'static [StyleName] {
        match self {
            Level::Detail => &[StyleName::Gray],
            Level::Sql => &[StyleName::Cyan],
            Level::Info => &[StyleName::Green],
            Level::Sess => &[StyleName::Green, StyleName::Bold],
            Level::Warn => &[StyleName::Yellow, StyleName::Bold],
            Level::Module => &[StyleName::Green, StyleName::Bold],
            Level::Error => &[StyleName::Red, StyleName::Bold],
        }
    }

    /// Styles applied to the scope label and message body
    pub fn body_styles(&self) -> &'static [StyleName] {
        match self {
            Level::Sql => &[StyleName::Gray],
            Level::Module => &[StyleName::Bold],
            _ => &[],
        }
    }

    /// Static definition of this level for a [`LevelRegistry`]
    pub fn def(&self) -> LevelDef {
        LevelDef {
            id: self.as_str().to_string(),
            label: self.label().to_string(),
            label_styles: self.label_styles().to_vec(),
            body_styles: self.body_styles().to_vec(),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Level::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| LoggerError::UnknownLevel(s.to_string()))
    }
}

/// Definition of one level in a registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelDef {
    /// Unique identifier
    pub id: String,
    /// Unstyled label text
    pub label: String,
    /// Styles for the label
    pub label_styles: Vec<StyleName>,
    /// Styles for the scope label and message body
    pub body_styles: Vec<StyleName>,
}

impl LevelDef {
    /// A level with a plain label equal to its identifier
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            id,
            label_styles: Vec::new(),
            body_styles: Vec::new(),
        }
    }

    /// Label with its styles applied
    pub fn styled_label(&self, styler: &dyn Styler) -> String {
        styler.apply(&self.label, &self.label_styles)
    }
}

/// Ordered, immutable list of level definitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelRegistry {
    levels: Vec<LevelDef>,
}

impl LevelRegistry {
    /// Build a registry from definitions in declaration order
    pub fn new(levels: Vec<LevelDef>) -> Result<Self, LoggerError> {
        let mut seen = HashSet::new();
        for level in &levels {
            if !seen.insert(level.id.as_str()) {
                return Err(LoggerError::DuplicateLevel(level.id.clone()));
            }
        }
        Ok(Self { levels })
    }

    /// Registry of the built-in [`Level`] set
    pub fn builtin() -> Self {
        Self {
            levels: Level::ALL.iter().map(Level::def).collect(),
        }
    }

    /// Look up a definition by identifier
    pub fn get(&self, id: &str) -> Option<&LevelDef> {
        self.levels.iter().find(|level| level.id == id)
    }

    /// Whether `candidate` is shown while `active` is the active level
    ///
    /// Walks the declaration order, switching on once `active` is passed.
    /// Fails closed: an unknown candidate, or an unknown active level,
    /// suppresses the message.
    pub fn is_active(&self, active: &str, candidate: &str) -> bool {
        let mut reached = false;
        for level in &self.levels {
            if level.id == active {
                reached = true;
            }
            if level.id == candidate {
                return reached;
            }
        }
        false
    }
}

impl Default for LevelRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc() -> LevelRegistry {
        LevelRegistry::new(vec![LevelDef::new("a"), LevelDef::new("b"), LevelDef::new("c")]).unwrap()
    }

    #[test]
    fn test_level_order_matches_declaration() {
        for pair in Level::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
        }
        assert_eq!(Level::Detail, Level::ALL[0]);
        assert_eq!(Level::Error, Level::ALL[6]);
    }

    #[test]
    fn test_level_from_str() {
        assert_eq!("sql".parse::<Level>().unwrap(), Level::Sql);
        assert_eq!("module".parse::<Level>().unwrap(), Level::Module);
        assert_eq!(
            "verbose".parse::<Level>().unwrap_err(),
            LoggerError::UnknownLevel("verbose".to_string())
        );
    }

    #[test]
    fn test_level_metadata() {
        assert_eq!(Level::Sql.label(), " PSQL ");
        assert_eq!(Level::Sql.body_styles(), &[StyleName::Gray]);
        assert_eq!(Level::Module.body_styles(), &[StyleName::Bold]);
        assert!(Level::Info.body_styles().is_empty());
        assert_eq!(Level::Error.label_styles(), &[StyleName::Red, StyleName::Bold]);
    }

    #[test]
    fn test_registry_gate_threshold() {
        let registry = abc();
        assert!(!registry.is_active("b", "a"));
        assert!(registry.is_active("b", "b"));
        assert!(registry.is_active("b", "c"));
    }

    #[test]
    fn test_registry_gate_unknown_candidate() {
        assert!(!abc().is_active("a", "z"));
    }

    #[test]
    fn test_registry_gate_unknown_active_suppresses_all() {
        let registry = abc();
        for id in ["a", "b", "c"] {
            assert!(!registry.is_active("missing", id));
        }
    }

    #[test]
    fn test_registry_rejects_duplicates() {
        let err = LevelRegistry::new(vec![LevelDef::new("a"), LevelDef::new("a")]).unwrap_err();
        assert_eq!(err, LoggerError::DuplicateLevel("a".to_string()));
    }

    #[test]
    fn test_builtin_registry_agrees_with_ordinal_gate() {
        let registry = LevelRegistry::builtin();
        for active in Level::ALL {
            for candidate in Level::ALL {
                assert_eq!(
                    registry.is_active(active.as_str(), candidate.as_str()),
                    candidate >= active,
                    "active={} candidate={}",
                    active,
                    candidate
                );
            }
        }
    }

    #[test]
    fn test_styled_label_keeps_text() {
        use crate::style::{strip_ansi, AnsiStyler, PlainStyler};

        let def = Level::Warn.def();
        assert_eq!(def.styled_label(&PlainStyler), " WARN ");
        assert_eq!(strip_ansi(&def.styled_label(&AnsiStyler)), " WARN ");
        assert_eq!(LevelDef::new("custom").styled_label(&AnsiStyler), "custom");
    }

    #[test]
    fn test_registry_lookup() {
        let registry = LevelRegistry::builtin();
        assert_eq!(registry.get("warn").map(|d| d.label.as_str()), Some(" WARN "));
        assert_eq!(registry.get("sql").map(|d| d.body_styles.clone()), Some(vec![StyleName::Gray]));
        assert!(registry.get("trace").is_none());
    }
}
