use anyhow::{Context, Result, anyhow};
use serde::Serialize;
use std::{fs, path::Path};

use caption_align::{
    PlaybackTick, ScrollCommand, SequentialIdGen, Timeline, UuidIdGen, ViewportSync, Zoom,
    config::Config,
    edit,
    formats::{
        json::{Shape, parse_captions, write_captions},
        time::{format_timestamp, parse_seconds},
    },
    viewport::UniformRows,
    zoom::MAX_TICKS,
};

use crate::cli::{
    CheckCmd, DragCmd, FillSentenceGapsCmd, FillWordGapsCmd, FollowCmd, Io, RulerCmd, SplitCmd,
};

pub fn run_check(cmd: CheckCmd, cfg: &Config) -> Result<()> {
    let span = tracing::info_span!("check", input = cmd.input.as_str());
    let _g = span.enter();

    let (timeline, _) = load(&cmd.input)?;
    log_timeline_summary(&timeline, cfg);

    for s in &timeline.sentences {
        println!(
            "[{} --> {}] {} {}",
            format_timestamp(s.absolute_start),
            format_timestamp(s.absolute_end),
            s.id,
            s.text
        );
    }

    let violations = timeline.violations();
    for v in &violations {
        println!("violation: {v}");
    }

    if !violations.is_empty() {
        return Err(anyhow!("{} timing violation(s) found", violations.len()));
    }
    tracing::info!("timeline is consistent");
    Ok(())
}

pub fn run_fill_word_gaps(cmd: FillWordGapsCmd, cfg: &Config) -> Result<()> {
    let span = tracing::info_span!("fill_word_gaps", input = cmd.io.input.as_str());
    let _g = span.enter();

    let (timeline, shape) = load(&cmd.io.input)?;
    let filled = edit::fill_word_gaps(&timeline);
    log_timeline_summary(&filled, cfg);

    emit(&cmd.io, &filled, &shape)
}

pub fn run_fill_sentence_gaps(cmd: FillSentenceGapsCmd, cfg: &Config) -> Result<()> {
    let span = tracing::info_span!("fill_sentence_gaps", input = cmd.io.input.as_str());
    let _g = span.enter();

    let max_gap = match cmd.max_gap.as_deref() {
        Some(s) => parse_seconds(s).context("invalid --max-gap")?,
        None => cfg.gaps.max_gap_seconds,
    };
    let forced = cmd.forced || cfg.gaps.forced;
    tracing::info!(max_gap, forced, "gap policy");

    let (timeline, shape) = load(&cmd.io.input)?;
    let filled = edit::fill_sentence_gaps(&timeline, max_gap, forced);
    log_timeline_summary(&filled, cfg);

    emit(&cmd.io, &filled, &shape)
}

pub fn run_split(cmd: SplitCmd, cfg: &Config) -> Result<()> {
    let span = tracing::info_span!(
        "split",
        sentence = cmd.sentence.as_str(),
        word = cmd.word.as_str()
    );
    let _g = span.enter();

    let at = parse_seconds(&cmd.at).context("invalid --at")?;
    let (timeline, shape) = load(&cmd.io.input)?;

    let updated = if cmd.sequential_ids {
        let mut ids = SequentialIdGen::new(format!("{}-split", cmd.word));
        edit::split_word_in(&timeline, &cmd.sentence, &cmd.word, at, &mut ids)
    } else {
        edit::split_word_in(&timeline, &cmd.sentence, &cmd.word, at, &mut UuidIdGen)
    }
    .with_context(|| format!("cannot split word {} at {}", cmd.word, format_timestamp(at)))?;
    log_timeline_summary(&updated, cfg);

    emit(&cmd.io, &updated, &shape)
}

pub fn run_drag(cmd: DragCmd, cfg: &Config) -> Result<()> {
    let span = tracing::info_span!(
        "drag",
        sentence = cmd.sentence.as_str(),
        word = cmd.word.as_str(),
        handle = ?cmd.handle
    );
    let _g = span.enter();

    let delta = drag_delta(&cmd, cfg)?;
    tracing::info!(delta, "drag delta in seconds");

    let (timeline, shape) = load(&cmd.io.input)?;
    let updated = edit::drag_word(
        &timeline,
        &cmd.sentence,
        &cmd.word,
        cmd.handle.into(),
        delta,
    )
    .with_context(|| format!("cannot drag word {}", cmd.word))?;
    log_timeline_summary(&updated, cfg);

    emit(&cmd.io, &updated, &shape)
}

fn drag_delta(cmd: &DragCmd, cfg: &Config) -> Result<f64> {
    if let Some(s) = cmd.delta.as_deref() {
        return parse_seconds(s).context("invalid --delta");
    }
    let px = cmd
        .delta_px
        .ok_or_else(|| anyhow!("either --delta or --delta-px is required"))?;
    Ok(zoom_for(cfg, cmd.zoom).px_delta_to_seconds(px))
}

#[derive(Debug, Serialize)]
struct FollowLine<'a> {
    time: f64,
    #[serde(flatten)]
    scroll: &'a ScrollCommand,
}

pub fn run_follow(cmd: FollowCmd, cfg: &Config) -> Result<()> {
    let span = tracing::info_span!("follow", input = cmd.input.as_str());
    let _g = span.enter();

    let from = parse_seconds(&cmd.from).context("invalid --from")?;
    let to = parse_seconds(&cmd.to).context("invalid --to")?;
    if !(cmd.step > 0.0) {
        return Err(anyhow!("--step must be positive"));
    }
    if to < from {
        return Err(anyhow!("--to must not be before --from"));
    }

    let (timeline, _) = load(&cmd.input)?;
    let rows = UniformRows::new(&timeline, cfg.viewport.row_height);
    let mut sync = ViewportSync::new(zoom_for(cfg, cmd.zoom), &cfg.viewport);

    let count = ((to - from) / cmd.step).floor() as usize;
    let mut issued = 0usize;
    for i in 0..=count {
        let tick = PlaybackTick {
            current_time: from + i as f64 * cmd.step,
            is_playing: !cmd.paused,
        };
        if let Some(scroll) = sync.on_tick(&timeline, tick, &rows) {
            let line = FollowLine {
                time: tick.current_time,
                scroll: &scroll,
            };
            println!("{}", serde_json::to_string(&line)?);
            issued += 1;
        }
    }

    tracing::info!(ticks = count + 1, issued, "playback simulated");
    Ok(())
}

pub fn run_ruler(cmd: RulerCmd, cfg: &Config) -> Result<()> {
    let duration = parse_seconds(&cmd.duration).context("invalid --duration")?;
    let zoom = zoom_for(cfg, cmd.zoom);
    let longest = zoom.tick_interval() * MAX_TICKS as f64;
    if duration > longest {
        return Err(anyhow!(
            "--duration {duration} needs more than {MAX_TICKS} ticks (longest is {longest}s)"
        ));
    }
    tracing::info!(
        pixels_per_second = zoom.pixels_per_second(),
        interval = zoom.tick_interval(),
        "ruler"
    );

    for t in zoom.ticks(duration) {
        println!("{}\t{:.0}", format_timestamp(t), zoom.time_to_px(t));
    }
    Ok(())
}

fn zoom_for(cfg: &Config, override_pps: Option<f64>) -> Zoom {
    let mut zoom = Zoom::from(&cfg.zoom);
    if let Some(pps) = override_pps {
        zoom.set(pps);
    }
    zoom
}

fn load(input: &str) -> Result<(Timeline, Shape)> {
    let raw = read_input_to_string(input)?;
    tracing::info!(bytes = raw.len(), "read input");
    parse_captions(&raw).with_context(|| format!("failed parsing captions from {input}"))
}

fn read_input_to_string(input: &str) -> Result<String> {
    if input == "-" {
        use std::io::Read;
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        fs::read_to_string(input).with_context(|| format!("failed reading {input}"))
    }
}

fn emit(io: &Io, timeline: &Timeline, shape: &Shape) -> Result<()> {
    let rendered = write_captions(timeline, shape)?;

    if io.stdout {
        println!("{rendered}");
        tracing::info!(mode = "stdout", "wrote output");
        return Ok(());
    }

    let out_path = derive_output_path(io)?;
    write_output(&out_path, &rendered, io.overwrite)?;
    tracing::info!(path = out_path.as_str(), "wrote output file");
    Ok(())
}

fn log_timeline_summary(t: &Timeline, cfg: &Config) {
    if t.is_empty() {
        tracing::warn!("timeline has no sentences");
        return;
    }
    tracing::info!(
        sentences = t.sentences.len(),
        words = t.word_count(),
        duration = t.duration(),
        "timeline summary"
    );

    if tracing::enabled!(tracing::Level::DEBUG) {
        let n = cfg.logging.debug_sentence_samples.min(t.sentences.len());
        for (i, s) in t.sentences.iter().take(n).enumerate() {
            tracing::debug!(
                idx = i,
                id = s.id.as_str(),
                start = s.absolute_start,
                end = s.absolute_end,
                duration = s.duration(),
                words = s.words.len(),
                "sentence sample"
            );
        }
    }
}

fn derive_output_path(io: &Io) -> Result<String> {
    if let Some(o) = &io.output {
        return Ok(o.clone());
    }

    if io.input == "-" {
        return Err(anyhow!(
            "output path required when input is stdin and --stdout is not set"
        ));
    }

    let p = Path::new(&io.input);
    let stem = p
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| anyhow!("bad input filename"))?;

    let parent = p.parent().unwrap_or_else(|| Path::new("."));
    let out = parent.join(format!("{stem}.aligned.json"));
    Ok(out.to_string_lossy().to_string())
}

fn write_output(path: &str, data: &str, overwrite: bool) -> Result<()> {
    if Path::new(path).exists() && !overwrite {
        return Err(anyhow!(
            "refusing to overwrite existing file (pass --overwrite): {path}"
        ));
    }
    fs::write(path, data).with_context(|| format!("failed writing {path}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::HandleArg;

    const INPUT: &str = r#"[
        { "id": "s1", "words": [
            { "id": "a", "text": "hello", "absoluteStart": 1.0, "absoluteEnd": 2.0 },
            { "id": "b", "text": "x", "absoluteStart": 2.5, "absoluteEnd": 2.7 }
        ] },
        { "id": "s2", "words": [
            { "id": "c", "text": "bye", "absoluteStart": 3.2, "absoluteEnd": 4.0 }
        ] }
    ]"#;

    fn io_in(dir: &tempfile::TempDir) -> Io {
        let input = dir.path().join("captions.json");
        fs::write(&input, INPUT).unwrap();
        Io {
            input: input.to_string_lossy().to_string(),
            output: None,
            stdout: false,
            overwrite: false,
        }
    }

    fn read_back(dir: &tempfile::TempDir) -> Timeline {
        let raw = fs::read_to_string(dir.path().join("captions.aligned.json")).unwrap();
        parse_captions(&raw).unwrap().0
    }

    #[test]
    fn test_fill_word_gaps_writes_default_output_path() {
        let dir = tempfile::tempdir().unwrap();
        let io = io_in(&dir);

        run_fill_word_gaps(FillWordGapsCmd { io }, &Config::default()).unwrap();
        let t = read_back(&dir);

        assert_eq!(t.sentences[0].words[1].absolute_start, 2.0);
    }

    #[test]
    fn test_fill_sentence_gaps_uses_cli_max_gap() {
        let dir = tempfile::tempdir().unwrap();
        let io = io_in(&dir);
        let cmd = FillSentenceGapsCmd {
            io,
            max_gap: Some("0.3".into()),
            forced: false,
        };

        run_fill_sentence_gaps(cmd, &Config::default()).unwrap();
        let t = read_back(&dir);

        assert!((t.sentences[0].absolute_end - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let io = io_in(&dir);

        run_fill_word_gaps(FillWordGapsCmd { io: io.clone() }, &Config::default()).unwrap();
        let err = run_fill_word_gaps(FillWordGapsCmd { io }, &Config::default()).unwrap_err();
        assert!(err.to_string().contains("refusing to overwrite"));
    }

    #[test]
    fn test_drag_in_pixels_goes_through_zoom() {
        let dir = tempfile::tempdir().unwrap();
        let io = io_in(&dir);
        let cmd = DragCmd {
            io,
            sentence: "s1".into(),
            word: "a".into(),
            handle: HandleArg::Right,
            delta: None,
            delta_px: Some(60.0),
            zoom: Some(200.0),
        };

        run_drag(cmd, &Config::default()).unwrap();
        let t = read_back(&dir);

        assert!((t.sentences[0].words[0].absolute_end - 2.3).abs() < 1e-9);
    }

    #[test]
    fn test_split_with_sequential_ids() {
        let dir = tempfile::tempdir().unwrap();
        let io = io_in(&dir);
        let cmd = SplitCmd {
            io,
            sentence: "s1".into(),
            word: "a".into(),
            at: "1.4".into(),
            sequential_ids: true,
        };

        run_split(cmd, &Config::default()).unwrap();
        let t = read_back(&dir);
        let ids: Vec<&str> = t.sentences[0].words.iter().map(|w| w.id.as_str()).collect();

        assert_eq!(ids, ["a-split-0", "a-split-1", "b"]);
        assert_eq!(t.sentences[0].text, "he llo x");
    }

    #[test]
    fn test_split_error_leaves_no_output() {
        let dir = tempfile::tempdir().unwrap();
        let io = io_in(&dir);
        let cmd = SplitCmd {
            io,
            sentence: "s1".into(),
            word: "a".into(),
            at: "1.01".into(),
            sequential_ids: true,
        };

        assert!(run_split(cmd, &Config::default()).is_err());
        assert!(!dir.path().join("captions.aligned.json").exists());
    }

    #[test]
    fn test_ruler_rejects_huge_duration() {
        let cmd = RulerCmd {
            duration: "1e308".into(),
            zoom: None,
        };
        let err = run_ruler(cmd, &Config::default()).unwrap_err();
        assert!(err.to_string().contains("ticks"));
    }

    #[test]
    fn test_wrapped_input_keeps_envelope_and_extra_fields() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("captions.json");
        fs::write(
            &input,
            r#"{ "language": "en", "sentences": [
                { "id": "s1", "speaker": "A", "words": [
                    { "id": "a", "text": "hello", "absoluteStart": 1.0, "absoluteEnd": 2.0, "confidence": 0.9 }
                ] }
            ] }"#,
        )
        .unwrap();
        let io = Io {
            input: input.to_string_lossy().to_string(),
            output: None,
            stdout: false,
            overwrite: false,
        };
        let cmd = SplitCmd {
            io,
            sentence: "s1".into(),
            word: "a".into(),
            at: "1.4".into(),
            sequential_ids: true,
        };

        run_split(cmd, &Config::default()).unwrap();
        let raw = fs::read_to_string(dir.path().join("captions.aligned.json")).unwrap();
        let v: serde_json::Value = serde_json::from_str(&raw).unwrap();

        assert_eq!(v["language"], "en");
        assert_eq!(v["sentences"][0]["speaker"], "A");
        assert_eq!(v["sentences"][0]["words"][1]["confidence"], 0.9);
    }

    #[test]
    fn test_stdin_requires_output() {
        let io = Io {
            input: "-".into(),
            output: None,
            stdout: false,
            overwrite: false,
        };
        assert!(derive_output_path(&io).is_err());
    }
}
