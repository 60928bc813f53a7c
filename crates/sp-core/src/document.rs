//! Documents and the typed filename parse.
//!
//! Filenames carry two pieces of dispatch state: an outcome-tag substring
//! selecting the overlay image, and a 4-digit routing identifier after the
//! first underscore. Both are parsed exactly once, at discovery, into
//! [`ParsedName`]; later stages consume the typed result instead of
//! re-deriving it from the string.

use crate::config::OverlayRule;
use crate::error::{Result, SpError};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};

/// First underscore, then exactly a 4-digit run.
static ROUTING_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^_]*_(\d{4})").expect("routing id pattern"));

/// The dispatch state parsed from a filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedName {
    /// Overlay selector; always resolved (last rule is the fallback).
    pub outcome_tag: String,
    /// Routing identifier, `None` when the filename does not match the
    /// `<prefix>_<4 digits>` contract. Surfaced as a parse error only at
    /// the routing stage — malformed files are still stamped.
    pub routing_id: Option<u32>,
}

/// Parse the routing identifier from a filename.
pub fn routing_id(name: &str) -> Option<u32> {
    ROUTING_ID_RE
        .captures(name)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Resolve the outcome-tag: first rule whose marker is contained in the
/// filename, falling back to the last rule.
fn outcome_tag(name: &str, overlays: &[OverlayRule]) -> Option<String> {
    overlays
        .iter()
        .find(|rule| name.contains(&rule.marker))
        .or_else(|| overlays.last())
        .map(|rule| rule.tag.clone())
}

/// Parse a filename into its typed dispatch state.
pub fn parse_filename(name: &str, overlays: &[OverlayRule]) -> Result<ParsedName> {
    let outcome_tag = outcome_tag(name, overlays)
        .ok_or_else(|| SpError::Config("no overlay rules configured".into()))?;
    Ok(ParsedName {
        outcome_tag,
        routing_id: routing_id(name),
    })
}

/// A single file discovered in the watched directory, owned by the pipeline
/// for the duration of one processing attempt.
#[derive(Debug, Clone)]
pub struct Document {
    pub path: PathBuf,
    pub name: String,
    pub parsed: ParsedName,
}

impl Document {
    pub fn discover(path: PathBuf, overlays: &[OverlayRule]) -> Result<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| SpError::Parse(format!("no filename in {}", path.display())))?;
        let parsed = parse_filename(&name, overlays)?;
        Ok(Self { path, name, parsed })
    }

    /// The routing identifier, or the parse error the routing stage reports.
    pub fn require_routing_id(&self) -> Result<u32> {
        self.parsed.routing_id.ok_or_else(|| {
            SpError::Parse(format!(
                "{}: no 4-digit identifier after the first underscore",
                self.name
            ))
        })
    }

    pub fn directory(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }
}
