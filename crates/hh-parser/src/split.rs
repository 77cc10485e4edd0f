/// A slice of an expression between top-level separators, with its byte span
/// in the original text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub text: &'a str,
    pub start: usize,
    pub end: usize,
}

/// Splits on `separator` outside double-quoted spans. Quote state carries
/// across the whole input, so an unterminated quote swallows the rest.
pub fn top_level_segments(text: &str, separator: char) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut in_quote = false;
    let mut start = 0usize;
    for (index, ch) in text.char_indices() {
        if ch == '"' {
            in_quote = !in_quote;
        } else if ch == separator && !in_quote {
            segments.push(Segment {
                text: &text[start..index],
                start,
                end: index,
            });
            start = index + ch.len_utf8();
        }
    }
    segments.push(Segment {
        text: &text[start..],
        start,
        end: text.len(),
    });
    segments
}

pub fn split_top_level(text: &str, separator: char) -> Vec<&str> {
    top_level_segments(text, separator)
        .into_iter()
        .map(|segment| segment.text)
        .collect()
}

/// Returns the contents of a single `"..."` literal. Text such as `"a" "b"`
/// is not one literal.
pub fn quoted_literal(text: &str) -> Option<&str> {
    let text = text.trim();
    if text.len() < 2 || !text.starts_with('"') || !text.ends_with('"') {
        return None;
    }
    let inner = &text[1..text.len() - 1];
    if inner.contains('"') {
        return None;
    }
    Some(inner)
}

#[cfg(test)]
mod split_tests {
    use super::*;

    #[test]
    fn plus_inside_quotes_does_not_split() {
        assert_eq!(
            split_top_level("x + \"a+b\" + y", '+'),
            vec!["x ", " \"a+b\" ", " y"]
        );
    }

    #[test]
    fn quote_state_spans_whole_expression() {
        assert_eq!(split_top_level("\"a + b", '+'), vec!["\"a + b"]);
        assert_eq!(
            split_top_level("\"x\" + \"+\" + \"y\"", '+'),
            vec!["\"x\" ", " \"+\" ", " \"y\""]
        );
    }

    #[test]
    fn segments_record_spans() {
        let text = "1+2+\"c\"";
        let segments = top_level_segments(text, '+');
        assert_eq!(segments.len(), 3);
        assert_eq!(&text[segments[0].start..segments[1].end], "1+2");
        assert_eq!(segments[2].text, "\"c\"");
    }

    #[test]
    fn quoted_literal_requires_one_closed_span() {
        assert_eq!(quoted_literal(" \"abc\" "), Some("abc"));
        assert_eq!(quoted_literal("\"\""), Some(""));
        assert_eq!(quoted_literal("\"a\" + \"b\""), None);
        assert_eq!(quoted_literal("\""), None);
        assert_eq!(quoted_literal("abc"), None);
    }
}
