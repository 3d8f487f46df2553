//! SQL database project (`.sqlproj`) manifest
//!
//! Only item registration is modelled: every `<X Include="...">` element is
//! indexed for lookups, and new items are written as fresh `<ItemGroup>`
//! blocks in front of the closing `</Project>`. The rest of the file is kept
//! byte-for-byte.

use regex::Regex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use dbsync_fs::{NormalizedPath, io};

use super::{ItemKind, ProjectManifest};
use crate::{Error, Result};

const PROJECT_OPEN: &str = "<Project";
const PROJECT_CLOSE: &str = "</Project>";
const DEFAULT_INDENT: &str = "  ";

static ITEM_INCLUDE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<([A-Za-z_][\w.-]*)\s+Include\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap()
});

static XML_COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());

/// A `.sqlproj` file loaded into memory.
#[derive(Debug, Clone)]
pub struct SqlProject {
    path: PathBuf,
    directory: PathBuf,
    content: String,
    keys: HashSet<String>,
    pending: Vec<(ItemKind, NormalizedPath)>,
}

impl SqlProject {
    /// Load a project file from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let content = io::read_text(path)?;
        Self::parse(path, content)
    }

    /// Parse project file content that was read from `path`.
    pub fn parse(path: &Path, content: String) -> Result<Self> {
        if !content.contains(PROJECT_OPEN) || !content.contains(PROJECT_CLOSE) {
            return Err(Error::Manifest {
                path: path.to_path_buf(),
                message: "missing <Project> element".to_string(),
            });
        }

        let without_comments = XML_COMMENT.replace_all(&content, "");
        let keys = ITEM_INCLUDE
            .captures_iter(&without_comments)
            .filter_map(|caps| caps.get(2).or_else(|| caps.get(3)))
            .map(|include| include_key(include.as_str()))
            .collect();

        let directory = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        Ok(Self {
            path: path.to_path_buf(),
            directory,
            content,
            keys,
            pending: Vec::new(),
        })
    }

    /// Path of the project file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of distinct registered item paths, including unsaved ones.
    pub fn item_count(&self) -> usize {
        self.keys.len()
    }

    /// Items added since the last save.
    pub fn pending(&self) -> &[(ItemKind, NormalizedPath)] {
        &self.pending
    }

    /// Current file content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Render the project file with pending items applied.
    pub fn render(&self) -> String {
        if self.pending.is_empty() {
            return self.content.clone();
        }

        let newline = if self.content.contains("\r\n") {
            "\r\n"
        } else {
            "\n"
        };
        let indent = detect_indent(&self.content);

        let mut groups = String::new();
        for kind in [ItemKind::Folder, ItemKind::Build] {
            let mut includes: Vec<String> = self
                .pending
                .iter()
                .filter(|(k, _)| *k == kind)
                .map(|(_, path)| render_include(kind, path))
                .collect();
            if includes.is_empty() {
                continue;
            }
            includes.sort_by_key(|include| include.to_lowercase());

            groups.push_str(&format!("{indent}<ItemGroup>{newline}"));
            for include in includes {
                groups.push_str(&format!(
                    "{indent}{indent}<{} Include=\"{}\" />{newline}",
                    kind.element(),
                    include
                ));
            }
            groups.push_str(&format!("{indent}</ItemGroup>{newline}"));
        }

        // `parse` guarantees the closing tag exists.
        let close = self.content.rfind(PROJECT_CLOSE).unwrap_or(self.content.len());
        let line_start = self.content[..close].rfind('\n').map_or(0, |i| i + 1);
        let (insert_at, prefix) = if self.content[line_start..close].trim().is_empty() {
            (line_start, "")
        } else {
            (close, newline)
        };

        let mut rendered = String::with_capacity(self.content.len() + groups.len());
        rendered.push_str(&self.content[..insert_at]);
        rendered.push_str(prefix);
        rendered.push_str(&groups);
        rendered.push_str(&self.content[insert_at..]);
        rendered
    }
}

impl ProjectManifest for SqlProject {
    fn directory(&self) -> &Path {
        &self.directory
    }

    fn has_path(&self, path: &NormalizedPath) -> bool {
        self.keys.contains(&path.item_key())
    }

    fn add_item(&mut self, kind: ItemKind, path: &NormalizedPath) -> Result<()> {
        self.keys.insert(path.item_key());
        self.pending.push((kind, path.clone()));
        Ok(())
    }

    fn save(&mut self) -> Result<()> {
        if self.pending.is_empty() {
            tracing::debug!(path = %self.path.display(), "project unchanged, skipping save");
            return Ok(());
        }

        let rendered = self.render();
        io::write_text(&self.path, &rendered).map_err(|e| Error::ManifestPersist {
            path: self.path.clone(),
            message: e.to_string(),
        })?;

        tracing::info!(
            path = %self.path.display(),
            added = self.pending.len(),
            "saved project"
        );
        self.content = rendered;
        self.pending.clear();
        Ok(())
    }
}

fn include_key(raw: &str) -> String {
    NormalizedPath::new(msbuild_unescape(&xml_unescape(raw))).item_key()
}

fn render_include(kind: ItemKind, path: &NormalizedPath) -> String {
    let mut include = path.to_windows();
    if kind == ItemKind::Folder && !include.ends_with('\\') {
        include.push('\\');
    }
    xml_escape(&msbuild_escape(&include))
}

fn detect_indent(content: &str) -> String {
    content
        .lines()
        .find_map(|line| {
            let trimmed = line.trim_start();
            let is_group =
                trimmed.starts_with("<PropertyGroup") || trimmed.starts_with("<ItemGroup");
            (is_group && trimmed.len() < line.len())
                .then(|| line[..line.len() - trimmed.len()].to_string())
        })
        .unwrap_or_else(|| DEFAULT_INDENT.to_string())
}

/// Characters MSBuild treats specially inside item specs.
fn is_msbuild_special(c: char) -> bool {
    matches!(c, '%' | '$' | '@' | '\'' | '(' | ')' | ';' | '?' | '*')
}

fn msbuild_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if is_msbuild_special(c) {
            out.push_str(&format!("%{:02X}", c as u32));
        } else {
            out.push(c);
        }
    }
    out
}

fn msbuild_unescape(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%'
            && i + 2 < bytes.len()
            && let (Some(hi), Some(lo)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2]))
        {
            out.push(hi * 16 + lo);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).unwrap_or_else(|_| s.to_string())
}

fn hex_value(byte: u8) -> Option<u8> {
    (byte as char).to_digit(16).map(|d| d as u8)
}

fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
    out
}

fn xml_unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let Some(semi) = tail.find(';') else {
            out.push_str(tail);
            return out;
        };
        let entity = &tail[1..semi];
        let decoded = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
                .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                .and_then(char::from_u32),
        };
        match decoded {
            Some(c) => {
                out.push(c);
                rest = &tail[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
