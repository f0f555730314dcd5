use crate::{
    error::{Result, TimingError},
    id::IdGenerator,
    model::{Sentence, Timeline, Word},
};

/// Closest a split point may get to either edge of the word, in seconds.
pub const SPLIT_EDGE_MARGIN: f64 = 0.05;

/// Split `word_id` at `split_time` (absolute seconds) into two new words.
///
/// Text is divided in proportion to where the split falls in the word's
/// duration. Both halves get fresh ids; the original id is retired.
pub fn split_word(
    sentence: &Sentence,
    word_id: &str,
    split_time: f64,
    ids: &mut impl IdGenerator,
) -> Result<(Word, Word)> {
    let word = sentence
        .word(word_id)
        .ok_or_else(|| TimingError::word(word_id))?;

    let duration = word.span();
    if duration <= 0.0 {
        return Err(TimingError::DegenerateDuration {
            id: word.id.clone(),
        });
    }

    if split_time <= word.absolute_start + SPLIT_EDGE_MARGIN
        || split_time >= word.absolute_end - SPLIT_EDGE_MARGIN
    {
        return Err(TimingError::InvalidRange {
            time: split_time,
            start: word.absolute_start,
            end: word.absolute_end,
        });
    }

    let char_len = word.text.chars().count();
    let ratio = (split_time - word.absolute_start) / duration;
    let index = (ratio * char_len as f64).round() as usize;
    if index == 0 || index >= char_len {
        return Err(TimingError::EmptyPartition { index });
    }

    let byte_at = word
        .text
        .char_indices()
        .nth(index)
        .map(|(b, _)| b)
        .unwrap_or(word.text.len());
    let (left_text, right_text) = word.text.split_at(byte_at);

    let origin = sentence.absolute_start;

    let mut first = word.retimed(word.absolute_start, split_time, origin);
    first.id = ids.next_id();
    first.text = left_text.to_string();

    let mut second = word.retimed(split_time, word.absolute_end, origin);
    second.id = ids.next_id();
    second.text = right_text.to_string();

    tracing::debug!(
        word_id,
        split_time,
        index,
        first = first.id.as_str(),
        second = second.id.as_str(),
        "word split"
    );

    Ok((first, second))
}

/// Split a word inside `timeline` and return the updated snapshot.
pub fn split_word_in(
    timeline: &Timeline,
    sentence_id: &str,
    word_id: &str,
    split_time: f64,
    ids: &mut impl IdGenerator,
) -> Result<Timeline> {
    let (_, sentence) = timeline.find_sentence(sentence_id)?;
    let halves = split_word(sentence, word_id, split_time, ids)?;
    timeline.with_split(sentence_id, word_id, halves)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::SequentialIdGen;

    fn hello() -> Sentence {
        Sentence::new(
            "s1",
            vec![
                Word::new("w0", "say", 0.5, 1.0),
                Word::new("w1", "hello", 1.0, 2.0),
                Word::new("w2", "there", 2.0, 2.6),
            ],
        )
    }

    #[test]
    fn test_split_partitions_text_proportionally() {
        let mut ids = SequentialIdGen::default();
        let (a, b) = split_word(&hello(), "w1", 1.4, &mut ids).unwrap();

        assert_eq!(a.text, "he");
        assert_eq!(b.text, "llo");
        assert_eq!(a.absolute_start, 1.0);
        assert_eq!(a.absolute_end, 1.4);
        assert_eq!(b.absolute_start, 1.4);
        assert_eq!(b.absolute_end, 2.0);
        assert_eq!(format!("{}{}", a.text, b.text), "hello");
    }

    #[test]
    fn test_split_assigns_fresh_ids() {
        let mut ids = SequentialIdGen::new("n");
        let (a, b) = split_word(&hello(), "w1", 1.5, &mut ids).unwrap();

        assert_eq!(a.id, "n-0");
        assert_eq!(b.id, "n-1");
    }

    #[test]
    fn test_split_halves_keep_extra_fields() {
        let mut s = hello();
        s.words[1]
            .extra
            .insert("confidence".into(), serde_json::json!(0.93));
        let mut ids = SequentialIdGen::default();

        let (a, b) = split_word(&s, "w1", 1.4, &mut ids).unwrap();
        assert_eq!(a.extra["confidence"], 0.93);
        assert_eq!(b.extra["confidence"], 0.93);
    }

    #[test]
    fn test_split_too_close_to_edge() {
        let mut ids = SequentialIdGen::default();

        for t in [1.0, 1.03, 1.97, 2.0, 0.2, 3.0] {
            let err = split_word(&hello(), "w1", t, &mut ids).unwrap_err();
            assert!(matches!(err, TimingError::InvalidRange { .. }), "t={t}");
        }
    }

    #[test]
    fn test_split_empty_partition_is_rejected() {
        let s = Sentence::new("s", vec![Word::new("w", "ok", 0.0, 1.0)]);
        let mut ids = SequentialIdGen::default();

        // 0.2 * 2 chars rounds to 0
        let err = split_word(&s, "w", 0.2, &mut ids).unwrap_err();
        assert_eq!(err, TimingError::EmptyPartition { index: 0 });
        // 0.8 * 2 chars rounds to 2
        let err = split_word(&s, "w", 0.8, &mut ids).unwrap_err();
        assert_eq!(err, TimingError::EmptyPartition { index: 2 });
    }

    #[test]
    fn test_split_degenerate_word() {
        let s = Sentence {
            id: "s".into(),
            text: String::new(),
            absolute_start: 1.0,
            absolute_end: 1.0,
            words: vec![Word::new("w", "flat", 1.0, 1.0)],
            extra: Default::default(),
        };
        let mut ids = SequentialIdGen::default();

        let err = split_word(&s, "w", 1.0, &mut ids).unwrap_err();
        assert!(matches!(err, TimingError::DegenerateDuration { .. }));
    }

    #[test]
    fn test_split_handles_multibyte_text() {
        let s = Sentence::new("s", vec![Word::new("w", "héllo", 0.0, 1.0)]);
        let mut ids = SequentialIdGen::default();
        let (a, b) = split_word(&s, "w", 0.4, &mut ids).unwrap();

        assert_eq!(a.text, "hé");
        assert_eq!(b.text, "llo");
    }

    #[test]
    fn test_split_in_timeline_replaces_word_in_order() {
        let t = Timeline::new(vec![hello()]);
        let mut ids = SequentialIdGen::default();
        let t2 = split_word_in(&t, "s1", "w1", 1.4, &mut ids).unwrap();
        let s = &t2.sentences[0];

        let order: Vec<&str> = s.words.iter().map(|w| w.id.as_str()).collect();
        assert_eq!(order, ["w0", "w-0", "w-1", "w2"]);
        assert_eq!(s.text, "say he llo there");
        assert_eq!(s.absolute_start, 0.5);
        assert_eq!(s.absolute_end, 2.6);
        assert!(t2.violations().is_empty());
        assert_eq!(t.sentences[0].words.len(), 3);
    }
}
