use anyhow::{Context, Result, anyhow};
use serde_json::{Map, Value};

use crate::model::{Sentence, Timeline};

/// Keys under which a wrapped caption file may carry its sentences.
pub const CAPTION_KEYS: [&str; 2] = ["captions", "sentences"];

/// Which top-level shape a caption file used, so output can mirror it.
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    Bare,
    /// An object with the sentences under `key`; every other top-level
    /// field is kept in `envelope` and written back as read.
    Wrapped {
        key: String,
        envelope: Map<String, Value>,
    },
}

pub fn write_captions(t: &Timeline, shape: &Shape) -> Result<String> {
    let captions = serde_json::to_value(t)?;
    let s = match shape {
        Shape::Wrapped { key, envelope } => {
            let mut obj = envelope.clone();
            obj.insert(key.clone(), captions);
            serde_json::to_string_pretty(&Value::Object(obj))?
        }
        Shape::Bare => serde_json::to_string_pretty(&captions)?,
    };
    Ok(s)
}

/// Parse a caption file: a bare array of sentences, or an object carrying
/// them under `captions` (or `sentences`). Derived fields are recomputed;
/// timing is taken as-is.
pub fn parse_captions(input: &str) -> Result<(Timeline, Shape)> {
    let v: Value = serde_json::from_str(input).context("input is not valid JSON")?;

    let (arr, shape) = match v {
        Value::Array(a) => (Value::Array(a), Shape::Bare),
        Value::Object(mut envelope) => {
            let key = CAPTION_KEYS
                .iter()
                .find(|k| envelope.contains_key(**k))
                .ok_or_else(|| anyhow!("unrecognized caption JSON shape"))?
                .to_string();
            let arr = envelope.remove(&key).unwrap_or(Value::Null);
            (arr, Shape::Wrapped { key, envelope })
        }
        _ => return Err(anyhow!("unrecognized caption JSON shape")),
    };

    let sentences: Vec<Sentence> =
        serde_json::from_value(arr).context("failed decoding caption sentences")?;

    Ok((Timeline::new(sentences).refreshed(), shape))
}
