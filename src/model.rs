use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, TimingError};

/// Smallest time-aligned text unit.
///
/// `absolute_*` are seconds on the global timeline. `start`/`end` are the
/// same instants relative to the owning sentence's `absolute_start` and are
/// recomputed by [`Sentence::refresh`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Word {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub start: f64,
    #[serde(default)]
    pub end: f64,
    pub absolute_start: f64,
    pub absolute_end: f64,
    #[serde(default)]
    pub duration: f64,
    /// Fields this crate does not interpret (confidence, speaker, ...).
    /// Carried through edits and written back unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Word {
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        absolute_start: f64,
        absolute_end: f64,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            start: 0.0,
            end: 0.0,
            absolute_start,
            absolute_end,
            duration: absolute_end - absolute_start,
            extra: Map::new(),
        }
    }

    /// Copy of this word moved to new absolute bounds, with the relative
    /// fields taken against `sentence_start`.
    pub fn retimed(&self, absolute_start: f64, absolute_end: f64, sentence_start: f64) -> Self {
        let mut w = self.clone();
        w.absolute_start = absolute_start;
        w.absolute_end = absolute_end;
        w.sync_relative(sentence_start);
        w
    }

    pub(crate) fn sync_relative(&mut self, sentence_start: f64) {
        self.start = self.absolute_start - sentence_start;
        self.end = self.absolute_end - sentence_start;
        self.duration = self.absolute_end - self.absolute_start;
    }

    pub fn span(&self) -> f64 {
        self.absolute_end - self.absolute_start
    }
}

/// One caption: a contiguous, time-bounded group of words.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sentence {
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub absolute_start: f64,
    #[serde(default)]
    pub absolute_end: f64,
    pub words: Vec<Word>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Sentence {
    pub fn new(id: impl Into<String>, words: Vec<Word>) -> Self {
        let mut s = Self {
            id: id.into(),
            text: String::new(),
            absolute_start: 0.0,
            absolute_end: 0.0,
            words,
            extra: Map::new(),
        };
        s.refresh();
        s
    }

    /// Recompute everything derived from the words: text, bounds and each
    /// word's sentence-relative timing. A sentence without words keeps its
    /// stored bounds.
    pub fn refresh(&mut self) {
        self.text = self
            .words
            .iter()
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        if let (Some(first), Some(last)) = (self.words.first(), self.words.last()) {
            self.absolute_start = first.absolute_start;
            self.absolute_end = last.absolute_end;
        }

        let origin = self.absolute_start;
        for w in &mut self.words {
            w.sync_relative(origin);
        }
    }

    pub fn word_index(&self, word_id: &str) -> Result<usize> {
        self.words
            .iter()
            .position(|w| w.id == word_id)
            .ok_or_else(|| TimingError::word(word_id))
    }

    pub fn word(&self, word_id: &str) -> Option<&Word> {
        self.words.iter().find(|w| w.id == word_id)
    }

    pub fn duration(&self) -> f64 {
        (self.absolute_end - self.absolute_start).max(0.0)
    }
}

/// Ordered caption sequence. Serializes as a bare array of sentences.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timeline {
    pub sentences: Vec<Sentence>,
}

impl Timeline {
    pub fn new(sentences: Vec<Sentence>) -> Self {
        Self { sentences }
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    pub fn duration(&self) -> f64 {
        self.sentences
            .last()
            .map(|s| s.absolute_end)
            .unwrap_or(0.0)
            .max(0.0)
    }

    pub fn word_count(&self) -> usize {
        self.sentences.iter().map(|s| s.words.len()).sum()
    }

    /// Copy with all derived fields recomputed. Timing itself is kept as-is,
    /// gaps and rounding artifacts included.
    pub fn refreshed(&self) -> Self {
        let mut t = self.clone();
        t.sentences.iter_mut().for_each(Sentence::refresh);
        t
    }

    pub fn find_sentence(&self, sentence_id: &str) -> Result<(usize, &Sentence)> {
        self.sentences
            .iter()
            .enumerate()
            .find(|(_, s)| s.id == sentence_id)
            .ok_or_else(|| TimingError::sentence(sentence_id))
    }

    pub fn find_word(&self, sentence_id: &str, word_id: &str) -> Result<&Word> {
        let (_, sentence) = self.find_sentence(sentence_id)?;
        sentence.word(word_id).ok_or_else(|| TimingError::word(word_id))
    }

    /// End of the previous sentence and start of the next one. The first
    /// sentence is bounded by the timeline origin, the last one is unbounded.
    pub fn neighbor_bounds(&self, index: usize) -> (f64, f64) {
        let prev_end = index
            .checked_sub(1)
            .and_then(|i| self.sentences.get(i))
            .map(|s| s.absolute_end)
            .unwrap_or(0.0);
        let next_start = self
            .sentences
            .get(index + 1)
            .map(|s| s.absolute_start)
            .unwrap_or(f64::INFINITY);
        (prev_end, next_start)
    }

    /// New timeline with the word of the same id replaced in `sentence_id`.
    pub fn with_word(&self, sentence_id: &str, word: Word) -> Result<Self> {
        let (si, sentence) = self.find_sentence(sentence_id)?;
        let wi = sentence.word_index(&word.id)?;

        let mut t = self.clone();
        let target = &mut t.sentences[si];
        target.words[wi] = word;
        target.refresh();
        Ok(t)
    }

    /// New timeline with `word_id` replaced by the two halves of a split.
    pub fn with_split(
        &self,
        sentence_id: &str,
        word_id: &str,
        halves: (Word, Word),
    ) -> Result<Self> {
        let (si, sentence) = self.find_sentence(sentence_id)?;
        let wi = sentence.word_index(word_id)?;

        let mut t = self.clone();
        let target = &mut t.sentences[si];
        let (first, second) = halves;
        target.words.splice(wi..=wi, [first, second]);
        target.refresh();
        Ok(t)
    }

    /// Every broken invariant in the sequence. Loading never rejects a
    /// timeline; this is for reporting and tests.
    pub fn violations(&self) -> Vec<Violation> {
        let mut out = Vec::new();

        for s in &self.sentences {
            for w in &s.words {
                if w.text.is_empty() {
                    out.push(Violation::EmptyText {
                        word_id: w.id.clone(),
                    });
                }
                if w.span() <= 0.0 {
                    out.push(Violation::NonPositiveDuration {
                        word_id: w.id.clone(),
                        duration: w.span(),
                    });
                }
            }
            for pair in s.words.windows(2) {
                if pair[0].absolute_end > pair[1].absolute_start {
                    out.push(Violation::WordOverlap {
                        sentence_id: s.id.clone(),
                        left: pair[0].id.clone(),
                        right: pair[1].id.clone(),
                        overlap: pair[0].absolute_end - pair[1].absolute_start,
                    });
                }
            }
        }

        for pair in self.sentences.windows(2) {
            if pair[0].absolute_start > pair[1].absolute_start {
                out.push(Violation::SentenceOrder {
                    left: pair[0].id.clone(),
                    right: pair[1].id.clone(),
                });
            }
        }

        out
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Violation {
    EmptyText {
        word_id: String,
    },
    NonPositiveDuration {
        word_id: String,
        duration: f64,
    },
    WordOverlap {
        sentence_id: String,
        left: String,
        right: String,
        overlap: f64,
    },
    SentenceOrder {
        left: String,
        right: String,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::EmptyText { word_id } => write!(f, "word {word_id} has empty text"),
            Violation::NonPositiveDuration { word_id, duration } => {
                write!(f, "word {word_id} has duration {duration:.3}s")
            }
            Violation::WordOverlap {
                sentence_id,
                left,
                right,
                overlap,
            } => write!(
                f,
                "sentence {sentence_id}: word {left} overlaps {right} by {overlap:.3}s"
            ),
            Violation::SentenceOrder { left, right } => {
                write!(f, "sentence {right} starts before {left}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Timeline {
        Timeline::new(vec![
            Sentence::new(
                "s1",
                vec![Word::new("w1", "hello", 1.0, 1.5), Word::new("w2", "world", 1.6, 2.0)],
            ),
            Sentence::new("s2", vec![Word::new("w3", "again", 2.5, 3.0)]),
        ])
    }

    #[test]
    fn test_sentence_refresh_derives_text_and_bounds() {
        let t = sample();
        let s = &t.sentences[0];

        assert_eq!(s.text, "hello world");
        assert_eq!(s.absolute_start, 1.0);
        assert_eq!(s.absolute_end, 2.0);
        assert!((s.words[1].start - 0.6).abs() < 1e-9);
        assert!((s.words[1].end - 1.0).abs() < 1e-9);
        assert!((s.words[1].duration - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_sentence_without_words_keeps_bounds() {
        let mut s = Sentence {
            id: "empty".into(),
            text: "stale".into(),
            absolute_start: 4.0,
            absolute_end: 5.0,
            words: vec![],
            extra: Map::new(),
        };
        s.refresh();

        assert_eq!(s.text, "");
        assert_eq!(s.absolute_start, 4.0);
        assert_eq!(s.absolute_end, 5.0);
    }

    #[test]
    fn test_neighbor_bounds() {
        let t = sample();

        assert_eq!(t.neighbor_bounds(0), (0.0, 2.5));
        assert_eq!(t.neighbor_bounds(1), (2.0, f64::INFINITY));
    }

    #[test]
    fn test_with_word_refreshes_sentence() {
        let t = sample();
        let moved = t.sentences[0].words[0].retimed(0.8, 1.5, 1.0);
        let t2 = t.with_word("s1", moved).unwrap();

        assert_eq!(t2.sentences[0].absolute_start, 0.8);
        assert!((t2.sentences[0].words[1].start - 0.8).abs() < 1e-9);
        // input snapshot untouched
        assert_eq!(t.sentences[0].absolute_start, 1.0);
    }

    #[test]
    fn test_with_word_unknown_ids() {
        let t = sample();
        let w = Word::new("nope", "x", 0.0, 1.0);

        assert!(matches!(
            t.with_word("s1", w.clone()),
            Err(TimingError::NotFound { kind: "word", .. })
        ));
        assert!(matches!(
            t.with_word("s9", w),
            Err(TimingError::NotFound { kind: "sentence", .. })
        ));
    }

    #[test]
    fn test_violations_detects_overlap_and_order() {
        let t = Timeline::new(vec![
            Sentence::new(
                "s1",
                vec![Word::new("a", "one", 3.0, 3.6), Word::new("b", "two", 3.5, 4.0)],
            ),
            Sentence::new("s2", vec![Word::new("c", "", 1.0, 1.0)]),
        ]);
        let v = t.violations();

        assert!(v.iter().any(|x| matches!(x, Violation::WordOverlap { .. })));
        assert!(v.iter().any(|x| matches!(x, Violation::SentenceOrder { .. })));
        assert!(v.iter().any(|x| matches!(x, Violation::EmptyText { .. })));
        assert!(v.iter().any(|x| matches!(x, Violation::NonPositiveDuration { .. })));
        assert!(sample().violations().is_empty());
    }

    #[test]
    fn test_timeline_serializes_as_camel_case_array() {
        let json = serde_json::to_value(sample()).unwrap();

        assert!(json.is_array());
        assert_eq!(json[0]["absoluteStart"], 1.0);
        assert_eq!(json[0]["words"][1]["absoluteEnd"], 2.0);
    }
}
