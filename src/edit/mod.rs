//! Constraint-preserving edits. Every operation takes a snapshot and returns
//! a new one; on error the input is the state to keep.

pub mod boundary;
pub mod gaps;
pub mod split;

pub use boundary::{DragOrigin, DragSession, Handle, adjust_word_boundary, drag_word};
pub use gaps::{fill_sentence_gaps, fill_word_gaps};
pub use split::{split_word, split_word_in};
