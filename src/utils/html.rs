/// Escapes text for interpolation into HTML email bodies.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            other => out.push(other),
        }
    }
    out
}

/// Escapes and turns line breaks into `<br>`.
pub fn escape_multiline(input: &str) -> String {
    escape_html(input).replace("\r\n", "\n").replace('\n', "<br>")
}
