//! JSON text encoding helpers
//!
//! String escaping shared by the tagged writer, plus the canonical textual
//! forms of floating-point payloads.

/// Encode a string with proper JSON escaping, quotes included
pub fn encode_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 2);
    write_string(&mut result, s);
    result
}

/// Append a quoted, escaped JSON string to `out`
pub fn write_string(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

/// Canonical `@double` payload
///
/// Special values use the invariant-culture spellings `NaN`, `Infinity` and
/// `-Infinity`; finite values always carry a decimal point or exponent.
pub fn format_double(f: f64) -> String {
    if f.is_nan() {
        "NaN".to_string()
    } else if f == f64::INFINITY {
        "Infinity".to_string()
    } else if f == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else {
        ensure_decimal_point(f.to_string())
    }
}

/// Canonical `@double` payload for a single-precision value
///
/// Formats at `f32` precision so `0.1f32` is written as `0.1`, not as its
/// widened `f64` expansion.
pub fn format_float(f: f32) -> String {
    if f.is_nan() {
        "NaN".to_string()
    } else if f == f32::INFINITY {
        "Infinity".to_string()
    } else if f == f32::NEG_INFINITY {
        "-Infinity".to_string()
    } else {
        ensure_decimal_point(f.to_string())
    }
}

fn ensure_decimal_point(s: String) -> String {
    if s.contains('.') || s.contains('e') || s.contains('E') {
        s
    } else {
        format!("{}.0", s)
    }
}
