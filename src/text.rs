//! Caption text normalization.

/// Normalize a paragraph's rendered text for display in a subtitle file.
///
/// Steps, in order:
/// 1. Newlines become single spaces.
/// 2. Double spaces collapse to one space in a single pass, so runs of three or more
///    spaces are only partially collapsed.
/// 3. HTML entities are decoded. The XML layer has already decoded one level, so this catches
///    double-encoded sources (`&amp;#39;` arrives here as `&#39;`).
///
/// Surrounding whitespace is kept; only the output encoder trims the end of the document.
pub fn normalize_caption_text(raw: &str) -> String {
    let flattened = raw.replace('\n', " ").replace("  ", " ");
    html_escape::decode_html_entities(&flattened).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_lines_with_spaces() {
        assert_eq!(normalize_caption_text("first\nsecond"), "first second");
    }

    #[test]
    fn collapses_double_spaces_once() {
        assert_eq!(normalize_caption_text(" Hello  world"), " Hello world");
        assert_eq!(normalize_caption_text("a   b"), "a  b");
        assert_eq!(normalize_caption_text("a    b"), "a  b");
        assert_eq!(normalize_caption_text("a \nb"), "a b");
    }

    #[test]
    fn decodes_html_entities() {
        assert_eq!(normalize_caption_text("Tom &amp; Jerry"), "Tom & Jerry");
        assert_eq!(normalize_caption_text("it&#39;s"), "it's");
        assert_eq!(normalize_caption_text("&lt;i&gt;"), "<i>");
        assert_eq!(normalize_caption_text("caf&eacute;"), "café");
    }

    #[test]
    fn keeps_surrounding_whitespace() {
        assert_eq!(normalize_caption_text(""), "");
        assert_eq!(normalize_caption_text("  hi  "), " hi ");
        assert_eq!(normalize_caption_text(" \n "), "  ");
    }
}
