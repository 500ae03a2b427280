//! Contextual escaping for generated markup
//!
//! Every provider- or client-sourced string passes through one of these
//! before it reaches the page. HTML text and attributes use entity
//! encoding; inline script strings are emitted as complete JSON string
//! literals.

use serde_json::Value;

/// Escape text for HTML element content or a quoted attribute value
pub fn html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Quote text as a JavaScript string literal, including the quotes
///
/// The literal cannot close the string, the surrounding `<script>` element,
/// or start an HTML comment.
pub fn js_string(text: &str) -> String {
    let quoted = Value::String(text.to_string()).to_string();
    let mut out = String::with_capacity(quoted.len());
    for c in quoted.chars() {
        match c {
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            '&' => out.push_str("\\u0026"),
            '\'' => out.push_str("\\u0027"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            _ => out.push(c),
        }
    }
    out
}

/// Render a number for a script context
pub fn js_number(value: f64) -> String {
    if value.is_finite() {
        value.to_string()
    } else {
        "null".to_string()
    }
}

/// A popup label: Leaflet popups are HTML, so escape for HTML first
pub fn js_html_string(text: &str) -> String {
    js_string(&html(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html() {
        assert_eq!(
            html(r#"<b>Bob's "Motel" & Spa</b>"#),
            "&lt;b&gt;Bob&#x27;s &quot;Motel&quot; &amp; Spa&lt;/b&gt;"
        );
        assert_eq!(html("São Paulo"), "São Paulo");
    }

    #[test]
    fn test_js_string_escapes_quotes() {
        let literal = js_string(r#"Bob's "Motel""#);
        assert_eq!(literal, r#""Bob\u0027s \"Motel\"""#);
    }

    #[test]
    fn test_js_string_cannot_close_script() {
        let literal = js_string("</script><script>alert(1)</script>");
        assert!(!literal.contains("</script>"));
        assert!(!literal.contains('<'));
    }

    #[test]
    fn test_js_string_control_characters() {
        assert_eq!(js_string("a\nb\\c"), r#""a\nb\\c""#);
        assert_eq!(js_string("x\u{2028}y"), r#""x\u2028y""#);
    }

    #[test]
    fn test_js_html_string() {
        assert_eq!(
            js_html_string(r#"Bob's "Motel""#),
            r#""Bob\u0026#x27;s \u0026quot;Motel\u0026quot;""#
        );
    }

    #[test]
    fn test_js_number() {
        assert_eq!(js_number(-23.5505), "-23.5505");
        assert_eq!(js_number(f64::NAN), "null");
    }
}
