//! Keeps a scrollable timeline viewport aligned with the playhead.
//!
//! The synchronizer is re-evaluated from scratch on every playback tick.
//! It never queues animations: a tick either produces one scroll command or
//! none, and the next tick supersedes whatever the previous one asked for.

use std::collections::HashMap;

use serde::Serialize;

use crate::{
    config::ViewportCfg,
    model::{Sentence, Timeline},
    zoom::Zoom,
};

/// The sentence to highlight at `time`.
///
/// Sentences are treated as half-open `[start, end)`. A time in a gap keeps
/// the preceding sentence, and a time before the first sentence selects the
/// first. On an exact shared boundary the later sentence wins.
pub fn active_sentence(timeline: &Timeline, time: f64) -> Option<&Sentence> {
    let sentences = &timeline.sentences;
    sentences
        .iter()
        .rposition(|s| s.absolute_start <= time)
        .map(|i| &sentences[i])
        .or_else(|| sentences.first())
}

/// Vertical placement of one sentence row, as laid out by the host.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RowGeometry {
    pub offset_top: f64,
    pub height: f64,
}

pub trait RowLayout {
    fn geometry_of(&self, sentence_id: &str) -> Option<RowGeometry>;
}

impl<F> RowLayout for F
where
    F: Fn(&str) -> Option<RowGeometry>,
{
    fn geometry_of(&self, sentence_id: &str) -> Option<RowGeometry> {
        self(sentence_id)
    }
}

/// Rows of equal height stacked in timeline order.
#[derive(Clone, Debug)]
pub struct UniformRows {
    row_height: f64,
    index: HashMap<String, usize>,
}

impl UniformRows {
    pub fn new(timeline: &Timeline, row_height: f64) -> Self {
        let index = timeline
            .sentences
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id.clone(), i))
            .collect();
        Self { row_height, index }
    }
}

impl RowLayout for UniformRows {
    fn geometry_of(&self, sentence_id: &str) -> Option<RowGeometry> {
        self.index.get(sentence_id).map(|&i| RowGeometry {
            offset_top: i as f64 * self.row_height,
            height: self.row_height,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaybackTick {
    pub current_time: f64,
    pub is_playing: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollBehavior {
    Instant,
    Smooth,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollCommand {
    pub left: f64,
    /// Only set when the active sentence changed.
    pub top: Option<f64>,
    pub behavior: ScrollBehavior,
    pub sentence_id: String,
}

#[derive(Clone, Debug)]
pub struct ViewportSync {
    zoom: Zoom,
    width: f64,
    height: f64,
    buffer_ratio: f64,
    scroll_left: f64,
    scroll_top: f64,
    active_sentence_id: Option<String>,
}

impl ViewportSync {
    pub fn new(zoom: Zoom, cfg: &ViewportCfg) -> Self {
        Self {
            zoom,
            width: cfg.width.max(0.0),
            height: cfg.height.max(0.0),
            buffer_ratio: cfg.safe_zone_buffer.clamp(0.0, 0.5),
            scroll_left: 0.0,
            scroll_top: 0.0,
            active_sentence_id: None,
        }
    }

    pub fn zoom(&self) -> &Zoom {
        &self.zoom
    }

    pub fn zoom_mut(&mut self) -> &mut Zoom {
        &mut self.zoom
    }

    pub fn scroll_left(&self) -> f64 {
        self.scroll_left
    }

    pub fn scroll_top(&self) -> f64 {
        self.scroll_top
    }

    pub fn active_sentence_id(&self) -> Option<&str> {
        self.active_sentence_id.as_deref()
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
    }

    /// Record a scroll the user made by hand.
    pub fn on_user_scroll(&mut self, left: f64, top: f64) {
        self.scroll_left = left.max(0.0);
        self.scroll_top = top.max(0.0);
    }

    /// Forget the active sentence so the next tick jumps again.
    pub fn reset(&mut self) {
        self.active_sentence_id = None;
    }

    /// Content-space pixel range the playhead may move in without scrolling.
    pub fn safe_zone(&self) -> (f64, f64) {
        let buffer = self.width * self.buffer_ratio;
        (
            self.scroll_left + buffer,
            self.scroll_left + self.width - buffer,
        )
    }

    pub fn on_tick(
        &mut self,
        timeline: &Timeline,
        tick: PlaybackTick,
        layout: &impl RowLayout,
    ) -> Option<ScrollCommand> {
        if !tick.current_time.is_finite() {
            return None;
        }

        let Some(active) = active_sentence(timeline, tick.current_time) else {
            self.active_sentence_id = None;
            return None;
        };

        let playhead_x = self.zoom.time_to_px(tick.current_time);

        if self.active_sentence_id.as_deref() != Some(active.id.as_str()) {
            let top = layout.geometry_of(&active.id).map(|g| {
                (g.offset_top + g.height / 2.0 - self.height / 2.0).max(0.0)
            });
            let left = self.centered_left(playhead_x);

            self.active_sentence_id = Some(active.id.clone());
            self.scroll_left = left;
            if let Some(top) = top {
                self.scroll_top = top;
            }

            tracing::debug!(
                sentence_id = active.id.as_str(),
                time = tick.current_time,
                left,
                ?top,
                "jump to sentence"
            );

            return Some(ScrollCommand {
                left,
                top,
                behavior: ScrollBehavior::Instant,
                sentence_id: active.id.clone(),
            });
        }

        if !tick.is_playing {
            return None;
        }

        let (lo, hi) = self.safe_zone();
        if playhead_x >= lo && playhead_x <= hi {
            return None;
        }

        let left = self.centered_left(playhead_x);
        if left == self.scroll_left {
            return None;
        }
        self.scroll_left = left;

        tracing::trace!(time = tick.current_time, left, "auto-scroll");

        Some(ScrollCommand {
            left,
            top: None,
            behavior: ScrollBehavior::Smooth,
            sentence_id: active.id.clone(),
        })
    }

    fn centered_left(&self, playhead_x: f64) -> f64 {
        (playhead_x - self.width / 2.0).max(0.0)
    }
}
