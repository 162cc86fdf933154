//! TwiML reply envelope for webhook responses.

const XML_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Render a `<Response>` with zero or one `<Message>`. Empty or absent text renders no message.
pub fn message_response(text: Option<&str>) -> String {
    match text.filter(|t| !t.is_empty()) {
        Some(t) => format!(
            "{}<Response><Message>{}</Message></Response>",
            XML_HEADER,
            escape(t)
        ),
        None => format!("{}<Response></Response>", XML_HEADER),
    }
}

/// Extract the first `<Message>` body from a TwiML response, unescaped.
///
/// Only meant for the single-message envelopes `message_response` renders; the body
/// is located by plain substring search, not parsed as XML.
pub fn first_message(twiml: &str) -> Option<String> {
    let start = twiml.find("<Message>")? + "<Message>".len();
    let end = twiml[start..].find("</Message>")? + start;
    Some(unescape(&twiml[start..end]))
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

fn unescape(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_reply_has_no_message() {
        let xml = message_response(None);
        assert_eq!(xml, format!("{}<Response></Response>", XML_HEADER));
        assert_eq!(message_response(Some("")), xml);
        assert_eq!(first_message(&xml), None);
    }

    #[test]
    fn text_is_escaped_and_recoverable() {
        let text = "Tom & Jerry <3 \"quotes\"";
        let xml = message_response(Some(text));
        assert!(xml.contains("Tom &amp; Jerry &lt;3 &quot;quotes&quot;"));
        assert_eq!(first_message(&xml).as_deref(), Some(text));
    }

    #[test]
    fn closing_tag_in_text_stays_escaped() {
        let text = "use </Message> literally";
        let xml = message_response(Some(text));
        assert_eq!(first_message(&xml).as_deref(), Some(text));
    }
}
