//! Dependency manifest parsing.
//!
//! A manifest is a plain-text list of `package>=version` lines. `#` starts a
//! comment. A commented-out line that still carries a version constraint
//! (`# openai>=1.0.0`) is kept as a disabled entry so tooling can show which
//! optional dependencies exist.

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::ManifestError;

/// Version comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VersionOp {
    #[serde(rename = ">=")]
    AtLeast,
    #[serde(rename = "<=")]
    AtMost,
    #[serde(rename = "==")]
    Exact,
    #[serde(rename = "~=")]
    Compatible,
    #[serde(rename = "!=")]
    Not,
    #[serde(rename = ">")]
    Greater,
    #[serde(rename = "<")]
    Less,
}

impl VersionOp {
    // Two-character operators first so `>=` is not read as `>`.
    const ALL: [(&'static str, VersionOp); 7] = [
        (">=", VersionOp::AtLeast),
        ("<=", VersionOp::AtMost),
        ("==", VersionOp::Exact),
        ("~=", VersionOp::Compatible),
        ("!=", VersionOp::Not),
        (">", VersionOp::Greater),
        ("<", VersionOp::Less),
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VersionOp::AtLeast => ">=",
            VersionOp::AtMost => "<=",
            VersionOp::Exact => "==",
            VersionOp::Compatible => "~=",
            VersionOp::Not => "!=",
            VersionOp::Greater => ">",
            VersionOp::Less => "<",
        }
    }
}

impl fmt::Display for VersionOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single `op version` clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionConstraint {
    pub op: VersionOp,
    pub version: String,
}

/// One package requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    pub name: String,
    /// Extras in brackets, e.g. `httpx[http2]`.
    #[serde(default)]
    pub extras: Vec<String>,
    #[serde(default)]
    pub constraints: Vec<VersionConstraint>,
    /// `false` for commented-out entries.
    pub enabled: bool,
    /// 1-based line number in the manifest.
    pub line: usize,
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.extras.is_empty() {
            write!(f, "[{}]", self.extras.join(","))?;
        }
        let clauses: Vec<String> = self
            .constraints
            .iter()
            .map(|c| format!("{}{}", c.op, c.version))
            .collect();
        f.write_str(&clauses.join(","))
    }
}

/// A parsed manifest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    pub requirements: Vec<Requirement>,
}

impl Manifest {
    pub fn enabled(&self) -> impl Iterator<Item = &Requirement> {
        self.requirements.iter().filter(|r| r.enabled)
    }

    pub fn disabled(&self) -> impl Iterator<Item = &Requirement> {
        self.requirements.iter().filter(|r| !r.enabled)
    }

    pub fn get(&self, name: &str) -> Option<&Requirement> {
        self.requirements
            .iter()
            .find(|r| r.name.eq_ignore_ascii_case(name))
    }
}

/// Parse manifest text.
pub fn parse_manifest(content: &str) -> Result<Manifest, ManifestError> {
    let mut requirements = Vec::new();

    for (idx, raw) in content.lines().enumerate() {
        let line = idx + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            continue;
        }

        if let Some(body) = trimmed.strip_prefix('#') {
            let body = body.trim_start_matches('#').trim();
            // Only constrained entries count as disabled requirements; prose
            // comments like "# Core dependencies" are skipped.
            if let Some(req) = parse_requirement(body, line, false) {
                if !req.constraints.is_empty() {
                    requirements.push(req);
                }
            }
            continue;
        }

        let body = strip_inline_comment(trimmed);
        match parse_requirement(body, line, true) {
            Some(req) => requirements.push(req),
            None => {
                return Err(ManifestError::Malformed {
                    line,
                    content: raw.to_string(),
                })
            }
        }
    }

    Ok(Manifest { requirements })
}

/// Read and parse a manifest file.
pub fn load_manifest(path: &Path) -> Result<Manifest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read manifest: {}", path.display()))?;
    parse_manifest(&content).with_context(|| format!("invalid manifest: {}", path.display()))
}

fn strip_inline_comment(line: &str) -> &str {
    match line.find(" #").or_else(|| line.find("\t#")) {
        Some(pos) => line[..pos].trim_end(),
        None => line,
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')
}

fn is_version_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '*' | '+' | '!' | '-' | '_')
}

fn parse_requirement(body: &str, line: usize, enabled: bool) -> Option<Requirement> {
    let body = body.trim();
    let name_end = body.find(|c: char| !is_name_char(c)).unwrap_or(body.len());
    let name = &body[..name_end];
    if name.is_empty() || !name.starts_with(|c: char| c.is_ascii_alphanumeric()) {
        return None;
    }

    let mut rest = body[name_end..].trim_start();
    let mut extras = Vec::new();
    if let Some(after) = rest.strip_prefix('[') {
        let close = after.find(']')?;
        extras = after[..close]
            .split(',')
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .collect();
        if extras.iter().any(|e| !e.chars().all(is_name_char)) {
            return None;
        }
        rest = after[close + 1..].trim_start();
    }

    let mut constraints = Vec::new();
    if !rest.is_empty() {
        for clause in rest.split(',') {
            constraints.push(parse_constraint(clause.trim())?);
        }
    }

    Some(Requirement {
        name: name.to_string(),
        extras,
        constraints,
        enabled,
        line,
    })
}

fn parse_constraint(clause: &str) -> Option<VersionConstraint> {
    let (op, version) = VersionOp::ALL
        .iter()
        .find_map(|&(sym, op)| clause.strip_prefix(sym).map(|v| (op, v.trim())))?;
    if version.is_empty() || !version.chars().all(is_version_char) {
        return None;
    }
    Some(VersionConstraint {
        op,
        version: version.to_string(),
    })
}
