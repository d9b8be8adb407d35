/// Percent-encode a value for use inside a BetterTouchTool query string.
///
/// Everything except ASCII letters, digits and `-_.~` is escaped, so `&`, `=` and `+` in event
/// titles cannot break the surrounding query.
pub fn encode_query_value(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_query_value(value: &str) -> Option<String> {
        urlencoding::decode(value).ok().map(|decoded| decoded.into_owned())
    }

    #[test]
    fn test_ampersand_is_escaped() {
        let encoded = encode_query_value("R&D sync");
        assert_eq!(encoded, "R%26D%20sync");
        assert!(!encoded.contains('&'));
        assert_eq!(decode_query_value(&encoded).as_deref(), Some("R&D sync"));
    }

    #[test]
    fn test_widget_text_survives_transport() {
        for text in [
            "◎ Lunch & Learn at 12:00",
            "Review\nending in 1.5 hrs",
            "a=b+c?d#e",
            "●",
            "",
        ] {
            let encoded = encode_query_value(text);
            assert!(encoded.is_ascii());
            assert_eq!(decode_query_value(&encoded).as_deref(), Some(text));
        }
    }

    #[test]
    fn test_newline_encoding() {
        assert_eq!(encode_query_value("a\nb"), "a%0Ab");
    }
}
