use crate::model::Timeline;

/// Gaps at or below this many seconds are treated as closed.
pub const GAP_TOLERANCE: f64 = 0.01;

/// Close every gap between adjacent words of the same sentence.
///
/// Of each pair, the word with the shorter input duration is stretched over
/// the gap; on a tie the left word is.
pub fn fill_word_gaps(timeline: &Timeline) -> Timeline {
    let mut out = timeline.clone();
    let mut filled = 0usize;

    for sentence in &mut out.sentences {
        let original: Vec<f64> = sentence.words.iter().map(|w| w.span()).collect();

        for i in 1..sentence.words.len() {
            let gap = sentence.words[i].absolute_start - sentence.words[i - 1].absolute_end;
            if gap <= GAP_TOLERANCE {
                continue;
            }

            if original[i - 1] <= original[i] {
                sentence.words[i - 1].absolute_end = sentence.words[i].absolute_start;
            } else {
                sentence.words[i].absolute_start = sentence.words[i - 1].absolute_end;
            }
            filled += 1;
        }

        sentence.refresh();
    }

    tracing::debug!(filled, "word gaps filled");
    out
}

/// Close gaps between adjacent sentences by stretching the earlier
/// sentence's last word.
///
/// Without `forced`, at most `max_gap_seconds` of each gap is filled and the
/// rest stays open.
pub fn fill_sentence_gaps(timeline: &Timeline, max_gap_seconds: f64, forced: bool) -> Timeline {
    let mut out = timeline.clone();
    let max_gap = max_gap_seconds.max(0.0);
    let mut filled = 0usize;
    let mut residual = 0.0f64;

    for i in 1..out.sentences.len() {
        let next_start = out.sentences[i].absolute_start;
        let current = &mut out.sentences[i - 1];
        let gap = next_start - current.absolute_end;
        if gap <= GAP_TOLERANCE {
            continue;
        }

        let new_end = if forced || gap <= max_gap {
            next_start
        } else {
            current.absolute_end + max_gap
        };
        residual += next_start - new_end;

        match current.words.last_mut() {
            Some(last) => {
                last.absolute_end = new_end;
                current.refresh();
            }
            None => current.absolute_end = new_end,
        }
        filled += 1;
    }

    tracing::debug!(filled, forced, residual, "sentence gaps filled");
    out
}
