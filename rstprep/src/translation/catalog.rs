//! Gettext `.po` message catalogs

use std::collections::HashMap;

/// Source phrase to translated phrase mapping, in catalog order
///
/// A source phrase defined twice keeps the position of its first definition
/// and the text of its last one.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

/// Which string of a message block continuation lines belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OpenString {
    Source,
    Target,
}

impl Catalog {
    /// Parse the contents of a `.po` file
    ///
    /// The first message block is the file header and is skipped. Entries with
    /// an empty source or an empty translation are dropped.
    pub fn parse(content: &str) -> Self {
        let mut catalog = Self::default();
        for block in message_blocks(content).into_iter().skip(1) {
            if let Some((source, target)) = parse_block(&block) {
                catalog.insert(source, target);
            }
        }
        catalog
    }

    /// Add or replace a translation
    pub fn insert(&mut self, source: String, target: String) {
        match self.index.get(&source) {
            Some(&position) => {
                log::debug!("Duplicate catalog entry for {:?}, keeping the last one", source);
                self.entries[position].1 = target;
            }
            None => {
                self.index.insert(source.clone(), self.entries.len());
                self.entries.push((source, target));
            }
        }
    }

    /// Look up the translation of an exact source phrase
    pub fn get(&self, source: &str) -> Option<&str> {
        self.index
            .get(source)
            .map(|&position| self.entries[position].1.as_str())
    }

    /// Number of usable entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog has no usable entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(source, target)` pairs in catalog order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(s, t)| (s.as_str(), t.as_str()))
    }

    /// Find the longest source phrase contained in `line`
    ///
    /// Among equally long phrases the one defined first wins.
    pub fn longest_match(&self, line: &str) -> Option<(&str, &str)> {
        let mut best: Option<(&str, &str)> = None;
        for (source, target) in self.iter() {
            if !line.contains(source) {
                continue;
            }
            let longer = match best {
                Some((current, _)) => source.chars().count() > current.chars().count(),
                None => true,
            };
            if longer {
                best = Some((source, target));
            }
        }
        best
    }
}

/// Split catalog text into blocks of non-blank lines
fn message_blocks(content: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();
    for line in content.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

/// Extract the `msgid`/`msgstr` pair of one message block
fn parse_block(lines: &[&str]) -> Option<(String, String)> {
    let mut source = Vec::new();
    let mut target = Vec::new();
    let mut open: Option<OpenString> = None;

    for line in lines.iter().map(|l| l.trim()) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(rest) = line.strip_prefix("msgid ") {
            open = Some(OpenString::Source);
            source.extend(quoted(rest));
        } else if let Some(rest) = line.strip_prefix("msgstr ") {
            open = Some(OpenString::Target);
            target.extend(quoted(rest));
        } else if line.starts_with('"') {
            match open {
                Some(OpenString::Source) => source.extend(quoted(line)),
                Some(OpenString::Target) => target.extend(quoted(line)),
                None => {}
            }
        } else {
            // msgctxt, msgid_plural, msgstr[n]
            open = None;
        }
    }

    let source = unescape(&source.concat());
    let target = unescape(&target.concat());
    (!source.is_empty() && !target.is_empty()).then_some((source, target))
}

/// Text between the first and the last double quote
fn quoted(text: &str) -> Option<&str> {
    let start = text.find('"')?;
    let end = text.rfind('"')?;
    (end > start).then(|| &text[start + 1..end])
}

/// Resolve `\"` and `\\`; other escapes are kept verbatim
fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next) = chars.peek() {
                if next == '"' || next == '\\' {
                    out.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        out.push(c);
    }
    out
}
