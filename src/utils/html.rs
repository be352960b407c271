/// Clean HTML content using the ammonia library.
///
/// Whitelist-based: safe tags (like <b>, <p>) survive, dangerous tags
/// (like <script>, <iframe>) and attributes (like onclick) are stripped.
/// Teacher-entered course and assignment descriptions pass through here
/// before they are stored and later rendered by the student UI.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}

/// Trims and sanitizes an optional free-text field; blank input becomes `None`.
pub fn clean_optional(input: Option<&str>) -> Option<String> {
    input
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(clean_html)
        .filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_script_tags() {
        assert_eq!(clean_html("<b>hola</b><script>alert(1)</script>"), "<b>hola</b>");
    }

    #[test]
    fn blank_optional_is_none() {
        assert_eq!(clean_optional(None), None);
        assert_eq!(clean_optional(Some("   ")), None);
        assert_eq!(clean_optional(Some("<script>x</script>")), None);
        assert_eq!(clean_optional(Some(" repaso ")), Some("repaso".to_string()));
    }
}
