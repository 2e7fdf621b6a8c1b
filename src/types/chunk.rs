//! Chunk and note type definitions.

use serde::{Deserialize, Serialize};

/// A whole unit or one fragment of an oversized unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkPiece {
    /// Label of the unit this piece came from
    pub label: String,

    /// Exact text of the piece
    pub text: String,

    /// Estimated cost of `text`
    pub cost: usize,

    /// `(part, of)` when the unit was fragmented, 1-indexed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fragment: Option<(usize, usize)>,
}

impl ChunkPiece {
    /// Display label including the fragment position, if any.
    pub fn display_label(&self) -> String {
        match self.fragment {
            Some((part, of)) => format!("{} (part {}/{})", self.label, part, of),
            None => self.label.clone(),
        }
    }
}

/// A budget-bounded group of pieces sent to the model together.
///
/// Chunks are produced in the same relative order as their input units and
/// `index` records that position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Order of this chunk within the run (0-indexed)
    pub index: usize,

    /// Pieces in input order
    pub pieces: Vec<ChunkPiece>,

    /// Sum of the pieces' costs
    pub cost: usize,
}

impl Chunk {
    /// Create an empty chunk at the given position.
    pub fn new(index: usize) -> Self {
        Self {
            index,
            pieces: Vec::new(),
            cost: 0,
        }
    }

    /// Append a piece, updating the running cost.
    pub fn push(&mut self, piece: ChunkPiece) {
        self.cost += piece.cost;
        self.pieces.push(piece);
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// Concatenated text of all pieces.
    pub fn content(&self) -> String {
        self.pieces.iter().map(|p| p.text.as_str()).collect()
    }

    /// Labels of the pieces, fragments annotated.
    pub fn labels(&self) -> Vec<String> {
        self.pieces.iter().map(ChunkPiece::display_label).collect()
    }
}

/// Summarised output of exactly one chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Index of the chunk this note summarises
    pub chunk_index: usize,

    /// Trimmed model output
    pub text: String,
}

impl Note {
    pub fn new(chunk_index: usize, text: impl Into<String>) -> Self {
        Self {
            chunk_index,
            text: text.into(),
        }
    }
}

/// Join notes in chunk order under numbered headings.
pub fn join_notes(notes: &[Note]) -> String {
    let mut sorted: Vec<&Note> = notes.iter().collect();
    sorted.sort_by_key(|n| n.chunk_index);
    sorted
        .iter()
        .map(|n| format!("### Notes {}\n{}\n", n.chunk_index + 1, n.text))
        .collect::<Vec<_>>()
        .join("\n")
}
