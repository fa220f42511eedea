//! Escaping and validation for the two artifact output contexts.
//!
//! Identifiers and addresses are validated against a restricted alphabet
//! before they reach any output, so escaping cannot fail. Escaping is still
//! applied on top, because operator-controlled text (bot name, welcome
//! message) travels through the same contexts.

/// Escape text for a double- or single-quoted HTML attribute value.
pub fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Make serialized JSON safe to embed inside a `<script>` element.
///
/// JSON is already a valid script literal; the remaining hazards are `</script>`
/// and HTML comment openers inside string values, plus the two line separators
/// that older engines reject inside string literals. All of them can only
/// appear inside JSON strings, where a `\uXXXX` escape is equivalent.
pub fn escape_script_json(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        match c {
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            '&' => out.push_str("\\u0026"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            other => out.push(other),
        }
    }
    out
}

/// Characters allowed in an API base address.
fn is_address_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~' | ':' | '/' | '%')
}

/// Validate and normalize an API base address.
///
/// Accepts only `http://` or `https://` addresses built from a known-safe
/// alphabet (no quotes, no whitespace, no query string) and strips trailing
/// slashes so `{base}/embed/{id}` never doubles them.
pub fn normalize_api_base_url(raw: &str) -> Result<String, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("is required".to_string());
    }

    let rest = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .ok_or_else(|| "must start with http:// or https://".to_string())?;

    let host = rest.split('/').next().unwrap_or("");
    if host.is_empty() {
        return Err("must include a host".to_string());
    }

    if let Some(bad) = trimmed.chars().find(|c| !is_address_char(*c)) {
        return Err(format!("contains disallowed character '{}'", bad.escape_default()));
    }

    Ok(trimmed.trim_end_matches('/').to_string())
}

/// Whether `raw` is a minimally valid CSS color token.
///
/// Accepted forms: `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`; `rgb()`, `rgba()`,
/// `hsl()`, `hsla()` with a numeric body; or an alphabetic named color.
pub fn is_valid_color(raw: &str) -> bool {
    let value = raw.trim();
    if value.is_empty() {
        return false;
    }

    if let Some(hex) = value.strip_prefix('#') {
        return matches!(hex.len(), 3 | 4 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit());
    }

    let lower = value.to_ascii_lowercase();
    for func in ["rgba(", "rgb(", "hsla(", "hsl("] {
        if let Some(body) = lower.strip_prefix(func) {
            let Some(inner) = body.strip_suffix(')') else {
                return false;
            };
            return !inner.trim().is_empty()
                && inner
                    .chars()
                    .all(|c| c.is_ascii_digit() || matches!(c, ' ' | ',' | '.' | '%' | '/'));
        }
    }

    (3..=20).contains(&value.len()) && value.chars().all(|c| c.is_ascii_alphabetic())
}
