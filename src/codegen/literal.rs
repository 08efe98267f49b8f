//! Script literal escaping

/// Quote `value` as a single-quoted script string literal.
///
/// Only what would otherwise end the literal early is escaped: backslashes,
/// single quotes and line terminators.
pub fn js_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            _ => out.push(ch),
        }
    }
    out.push('\'');
    out
}

/// Quote a list of values as a single-line array literal, e.g. `['a', 'b']`
pub fn js_string_array(values: &[String]) -> String {
    let items: Vec<String> = values.iter().map(|v| js_string(v)).collect();
    format!("[{}]", items.join(", "))
}

/// Flatten text for use inside a `//` line comment
pub fn comment_text(value: &str) -> String {
    value
        .chars()
        .map(|c| match c {
            '\n' | '\r' | '\u{2028}' | '\u{2029}' => ' ',
            _ => c,
        })
        .collect()
}
