use protobuf::Message;
use serde::Serialize;

use crate::roles::SymbolRoles;

/// Decoded index: every document in the order the indexer wrote them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScipIndex {
    pub documents: Vec<Document>,
}

/// One source file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    /// Path relative to the project root; the identity key for a file.
    pub relative_path: String,
    pub occurrences: Vec<Occurrence>,
}

/// One appearance of a symbol. Lines and characters are 0-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    pub symbol: String,
    pub line: u32,
    pub character: u32,
    pub roles: SymbolRoles,
}

/// Size summary of a loaded index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub documents: usize,
    pub occurrences: usize,
    pub definitions: usize,
}

impl ScipIndex {
    /// Decode a protobuf-encoded `scip.Index`.
    pub fn decode(bytes: &[u8]) -> Result<Self, protobuf::Error> {
        let raw = scip::types::Index::parse_from_bytes(bytes)?;
        Ok(Self::from(raw))
    }

    pub fn document(&self, relative_path: &str) -> Option<&Document> {
        self.documents
            .iter()
            .find(|d| d.relative_path == relative_path)
    }

    pub fn stats(&self) -> IndexStats {
        let mut stats = IndexStats {
            documents: self.documents.len(),
            ..IndexStats::default()
        };
        for occurrence in self.documents.iter().flat_map(|d| &d.occurrences) {
            stats.occurrences += 1;
            if occurrence.roles.is_definition() {
                stats.definitions += 1;
            }
        }
        stats
    }
}

impl From<scip::types::Index> for ScipIndex {
    fn from(raw: scip::types::Index) -> Self {
        Self {
            documents: raw.documents.into_iter().map(Document::from).collect(),
        }
    }
}

impl From<scip::types::Document> for Document {
    fn from(raw: scip::types::Document) -> Self {
        // Occurrences without a symbol carry no information for any query.
        let occurrences = raw
            .occurrences
            .into_iter()
            .filter(|o| !o.symbol.is_empty())
            .map(Occurrence::from)
            .collect();
        Self {
            relative_path: raw.relative_path,
            occurrences,
        }
    }
}

impl From<scip::types::Occurrence> for Occurrence {
    fn from(raw: scip::types::Occurrence) -> Self {
        // `range` is [start_line, start_char, ...]; end positions are unused.
        let position = |i: usize| {
            raw.range
                .get(i)
                .and_then(|&v| u32::try_from(v).ok())
                .unwrap_or(0)
        };
        Self {
            line: position(0),
            character: position(1),
            roles: SymbolRoles::from_bits(raw.symbol_roles),
            symbol: raw.symbol,
        }
    }
}
