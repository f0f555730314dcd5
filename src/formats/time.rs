use anyhow::{Result, anyhow};

/// `hh:mm:ss.mmm`, negative input clamps to zero.
pub fn format_timestamp(seconds: f64) -> String {
    let ms = (seconds.max(0.0) * 1000.0).round() as i64;

    let total_seconds = ms / 1000;
    let milli = ms % 1000;

    let sec = total_seconds % 60;
    let total_minutes = total_seconds / 60;
    let min = total_minutes % 60;
    let hour = total_minutes / 60;

    format!("{hour:02}:{min:02}:{sec:02}.{milli:03}")
}

/// Seconds from `1.4`, `-0.25` (deltas) or `hh:mm:ss[.mmm]` / `mm:ss[.mmm]`.
pub fn parse_seconds(s: &str) -> Result<f64> {
    let t = s.trim();

    if let Ok(v) = t.parse::<f64>() {
        if !v.is_finite() {
            return Err(anyhow!("time must be finite: '{t}'"));
        }
        return Ok(v);
    }

    let parts: Vec<&str> = t.split(':').collect();
    let (h, m, sec) = match parts.as_slice() {
        [h, m, s] => (*h, *m, *s),
        [m, s] => ("0", *m, *s),
        _ => return Err(anyhow!("unrecognized time: '{t}'")),
    };

    let h: u64 = h.parse().map_err(|_| anyhow!("bad hours: '{t}'"))?;
    let m: u64 = m.parse().map_err(|_| anyhow!("bad minutes: '{t}'"))?;
    let sec: f64 = sec
        .replace(',', ".")
        .parse()
        .map_err(|_| anyhow!("bad seconds: '{t}'"))?;
    if !(0.0..60.0).contains(&sec) || m >= 60 {
        return Err(anyhow!("time component out of range: '{t}'"));
    }

    let whole = h
        .checked_mul(3600)
        .and_then(|hs| hs.checked_add(m * 60))
        .ok_or_else(|| anyhow!("time component out of range: '{t}'"))?;

    Ok(whole as f64 + sec)
}
