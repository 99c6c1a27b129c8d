/// Escapes `& < > " '` so a display string can be dropped into markup.
pub fn escape_html(input: &str) -> String {
    html_escape::encode_quoted_attribute(input).into_owned()
}
