//! Manifest sources and spans into them.

use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(u32);

/// Byte range inside one registered source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Span {
    pub source: SourceId,
    pub range: Range<usize>,
}

impl Span {
    pub fn new(source: SourceId, range: Range<usize>) -> Self {
        Self { source, range }
    }
}

#[derive(Debug, Clone)]
pub struct Source {
    pub name: String,
    pub text: String,
}

/// Owns the text of every manifest loaded during a session.
#[derive(Debug, Clone, Default)]
pub struct SourceMap {
    sources: Vec<Source>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: impl Into<String>, text: impl Into<String>) -> SourceId {
        let id = SourceId(self.sources.len() as u32);
        self.sources.push(Source {
            name: name.into(),
            text: text.into(),
        });
        id
    }

    pub fn get(&self, id: SourceId) -> Option<&Source> {
        self.sources.get(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// 1-based line number of a byte offset.
    pub fn line_of(&self, id: SourceId, offset: usize) -> usize {
        self.get(id).map_or(1, |s| {
            let end = offset.min(s.text.len());
            s.text.as_bytes()[..end].iter().filter(|&&b| b == b'\n').count() + 1
        })
    }
}
