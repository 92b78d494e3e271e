//! Shareable state codec (made by FontLab https://www.fontlab.com/)
//!
//! Render parameters travel in a URL fragment such as
//! `t=HI&f=Slant&w=80&aw=0&hl=default&vl=default&fs=12`. Decoding never
//! fails: every field that is missing or unusable falls back on its own.

use std::collections::HashMap;

use url::form_urlencoded;

use crate::error::AsciiLabError;
use crate::params::{
    clamp_preview_size, clamp_text, clamp_width, Layout, RenderParameters, DEFAULT_PREVIEW_SIZE,
    DEFAULT_TEXT, DEFAULT_TYPEFACE, DEFAULT_WIDTH,
};

pub const KEY_TEXT: &str = "t";
pub const KEY_TYPEFACE: &str = "f";
pub const KEY_WIDTH: &str = "w";
pub const KEY_AUTO_WIDTH: &str = "aw";
pub const KEY_HORIZONTAL: &str = "hl";
pub const KEY_VERTICAL: &str = "vl";
pub const KEY_PREVIEW_SIZE: &str = "fs";

/// Serialize parameters as an `application/x-www-form-urlencoded` string.
pub fn encode(params: &RenderParameters) -> String {
    form_urlencoded::Serializer::new(String::new())
        .append_pair(KEY_TEXT, &params.text)
        .append_pair(KEY_TYPEFACE, &params.typeface)
        .append_pair(KEY_WIDTH, &params.width.to_string())
        .append_pair(KEY_AUTO_WIDTH, if params.auto_width { "1" } else { "0" })
        .append_pair(KEY_HORIZONTAL, params.horizontal_layout.as_str())
        .append_pair(KEY_VERTICAL, params.vertical_layout.as_str())
        .append_pair(KEY_PREVIEW_SIZE, &params.preview_size.to_string())
        .finish()
}

/// Parse a fragment (with or without its leading `#`/`?`) into parameters.
pub fn decode(serialized: &str) -> RenderParameters {
    let raw = serialized
        .strip_prefix('#')
        .or_else(|| serialized.strip_prefix('?'))
        .unwrap_or(serialized);

    // First occurrence wins, matching URLSearchParams.get.
    let mut fields: HashMap<String, String> = HashMap::new();
    for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
        fields.entry(key.into_owned()).or_insert_with(|| value.into_owned());
    }
    let get = |key: &str| fields.get(key).map(String::as_str);

    let text = match get(KEY_TEXT) {
        Some(text) => {
            let clamped = clamp_text(text);
            if clamped.len() != text.len() {
                note_fallback(KEY_TEXT, text);
            }
            clamped
        }
        None => DEFAULT_TEXT.to_string(),
    };

    let typeface = match get(KEY_TYPEFACE) {
        Some(name) if !name.trim().is_empty() => name.to_string(),
        Some(name) => {
            note_fallback(KEY_TYPEFACE, name);
            DEFAULT_TYPEFACE.to_string()
        }
        None => DEFAULT_TYPEFACE.to_string(),
    };

    let width = decode_number(get(KEY_WIDTH), KEY_WIDTH, DEFAULT_WIDTH as i64, |n| {
        clamp_width(n) as i64
    }) as u16;

    let preview_size = decode_number(
        get(KEY_PREVIEW_SIZE),
        KEY_PREVIEW_SIZE,
        DEFAULT_PREVIEW_SIZE as i64,
        |n| clamp_preview_size(n) as i64,
    ) as u8;

    let auto_width = match get(KEY_AUTO_WIDTH) {
        Some("1") => true,
        Some("0") | None => false,
        Some(other) => {
            note_fallback(KEY_AUTO_WIDTH, other);
            false
        }
    };

    RenderParameters {
        text,
        typeface,
        width,
        auto_width,
        preview_size,
        horizontal_layout: decode_layout(get(KEY_HORIZONTAL), KEY_HORIZONTAL),
        vertical_layout: decode_layout(get(KEY_VERTICAL), KEY_VERTICAL),
    }
}

fn decode_number(
    raw: Option<&str>,
    key: &str,
    fallback: i64,
    clamp: impl Fn(i64) -> i64,
) -> i64 {
    let Some(raw) = raw else {
        return fallback;
    };
    match parse_leading_int(raw) {
        Some(n) => {
            let clamped = clamp(n);
            if clamped != n {
                note_fallback(key, raw);
            }
            clamped
        }
        None => {
            note_fallback(key, raw);
            fallback
        }
    }
}

fn decode_layout(raw: Option<&str>, key: &str) -> Layout {
    match raw {
        Some(value) => value.parse().unwrap_or_else(|_| {
            note_fallback(key, value);
            Layout::Default
        }),
        None => Layout::Default,
    }
}

/// Lenient integer parse: optional sign and leading digits, rest ignored (`"12px"` -> 12).
/// Overlong digit runs saturate instead of failing.
fn parse_leading_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let mut value: i64 = 0;
    let mut seen = false;
    for byte in digits.bytes().take_while(u8::is_ascii_digit) {
        seen = true;
        value = value
            .saturating_mul(10)
            .saturating_add(i64::from(byte - b'0'));
    }

    if !seen {
        return None;
    }
    Some(if negative { -value } else { value })
}

fn note_fallback(key: &str, value: &str) {
    let err = AsciiLabError::SerializedStateDecodeFailure {
        key: key.to_string(),
        value: value.to_string(),
    };
    tracing::debug!(error = %err, "shared state field recovered");
}
