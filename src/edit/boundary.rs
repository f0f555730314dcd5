use serde::{Deserialize, Serialize};

use crate::{
    error::{Result, TimingError},
    model::{Sentence, Timeline, Word},
};

/// Shortest duration a drag may leave a word with, in seconds.
pub const MIN_WORD_DURATION: f64 = 0.01;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handle {
    Left,
    Right,
}

/// Everything a drag gesture needs, captured once when the gesture starts.
///
/// Deltas passed to [`DragOrigin::resolve`] are cumulative from this origin,
/// so the result of the last call is the result of the gesture regardless of
/// how many intermediate frames were evaluated.
#[derive(Clone, Debug, PartialEq)]
pub struct DragOrigin {
    pub word_id: String,
    pub handle: Handle,
    pub original_start: f64,
    pub original_end: f64,
    pub prev_boundary: f64,
    pub next_boundary: f64,
}

impl DragOrigin {
    pub fn capture(
        sentence: &Sentence,
        word_id: &str,
        handle: Handle,
        prev_sentence_end: f64,
        next_sentence_start: f64,
    ) -> Result<Self> {
        let idx = sentence.word_index(word_id)?;
        let word = &sentence.words[idx];

        let prev_boundary = idx
            .checked_sub(1)
            .map(|i| sentence.words[i].absolute_end)
            .unwrap_or(prev_sentence_end);
        let next_boundary = sentence
            .words
            .get(idx + 1)
            .map(|w| w.absolute_start)
            .unwrap_or(next_sentence_start);

        Ok(Self {
            word_id: word_id.to_string(),
            handle,
            original_start: word.absolute_start,
            original_end: word.absolute_end,
            prev_boundary,
            next_boundary,
        })
    }

    /// New absolute `(start, end)` for a drag of `delta` seconds.
    pub fn resolve(&self, delta: f64) -> (f64, f64) {
        match self.handle {
            Handle::Left => {
                let mut start = (self.original_start + delta)
                    .max(self.prev_boundary)
                    .min(self.original_end);
                if start >= self.original_end {
                    start = self.original_end - MIN_WORD_DURATION;
                    // only cross the neighbor when it leaves no room at all
                    if self.prev_boundary < self.original_end {
                        start = start.max(self.prev_boundary);
                    }
                }
                (start, self.original_end)
            }
            Handle::Right => {
                let mut end = (self.original_end + delta)
                    .min(self.next_boundary)
                    .max(self.original_start);
                if end <= self.original_start {
                    end = self.original_start + MIN_WORD_DURATION;
                    if self.next_boundary > self.original_start {
                        end = end.min(self.next_boundary);
                    }
                }
                (self.original_start, end)
            }
        }
    }
}

/// Move one edge of `word_id` by `delta` seconds, clamped between its
/// neighbors. The returned word still has to be folded back into the
/// sentence with [`Timeline::with_word`].
///
/// Its relative `start`/`end` are taken against the sentence start from
/// before the edit. A left drag on the first word can leave `start`
/// negative; the values are only final once the sentence is refreshed.
pub fn adjust_word_boundary(
    sentence: &Sentence,
    word_id: &str,
    handle: Handle,
    delta: f64,
    prev_sentence_end: f64,
    next_sentence_start: f64,
) -> Result<Word> {
    let origin = DragOrigin::capture(
        sentence,
        word_id,
        handle,
        prev_sentence_end,
        next_sentence_start,
    )?;
    let (start, end) = origin.resolve(delta);

    let (requested, landed) = match handle {
        Handle::Left => (origin.original_start + delta, start),
        Handle::Right => (origin.original_end + delta, end),
    };
    if requested != landed {
        tracing::debug!(word_id, ?handle, requested, landed, "drag clamped");
    }

    let word = sentence
        .word(word_id)
        .ok_or_else(|| TimingError::word(word_id))?;
    Ok(word.retimed(start, end, sentence.absolute_start))
}

/// A drag in progress on one word of one sentence.
#[derive(Clone, Debug)]
pub struct DragSession {
    sentence_id: String,
    origin: DragOrigin,
}

impl DragSession {
    pub fn begin(
        timeline: &Timeline,
        sentence_id: &str,
        word_id: &str,
        handle: Handle,
    ) -> Result<Self> {
        let (idx, sentence) = timeline.find_sentence(sentence_id)?;
        let (prev_end, next_start) = timeline.neighbor_bounds(idx);
        let origin = DragOrigin::capture(sentence, word_id, handle, prev_end, next_start)?;

        tracing::debug!(
            sentence_id,
            word_id,
            ?handle,
            prev = origin.prev_boundary,
            next = origin.next_boundary,
            "drag started"
        );

        Ok(Self {
            sentence_id: sentence_id.to_string(),
            origin,
        })
    }

    pub fn origin(&self) -> &DragOrigin {
        &self.origin
    }

    /// Bounds to draw for an intermediate frame of the gesture.
    pub fn preview(&self, delta: f64) -> (f64, f64) {
        self.origin.resolve(delta)
    }

    /// Apply the gesture to `timeline`, which must be the snapshot the drag
    /// began on.
    pub fn commit(&self, timeline: &Timeline, delta: f64) -> Result<Timeline> {
        let (_, sentence) = timeline.find_sentence(&self.sentence_id)?;
        let word = sentence
            .word(&self.origin.word_id)
            .ok_or_else(|| TimingError::word(&self.origin.word_id))?;
        let (start, end) = self.origin.resolve(delta);
        let moved = word.retimed(start, end, sentence.absolute_start);
        timeline.with_word(&self.sentence_id, moved)
    }
}

/// One-shot drag: resolve neighbor sentence bounds, adjust and fold back.
pub fn drag_word(
    timeline: &Timeline,
    sentence_id: &str,
    word_id: &str,
    handle: Handle,
    delta: f64,
) -> Result<Timeline> {
    DragSession::begin(timeline, sentence_id, word_id, handle)?.commit(timeline, delta)
}
