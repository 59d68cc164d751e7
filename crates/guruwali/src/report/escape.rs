//! Text escaping policies for report markup.

use std::borrow::Cow;

/// How free text is made safe before it is embedded in report markup.
pub trait Escaper: std::fmt::Debug {
    /// Escape `text` for use in element content or a quoted attribute.
    fn escape<'a>(&self, text: &'a str) -> Cow<'a, str>;
}

/// Escapes the five markup-significant characters `& < > " '`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HtmlEscaper;

/// Embeds text unchanged.
///
/// Reproduces documents written before escaping was introduced. Text containing
/// `<` or `&` can break the table structure under this policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Verbatim;

impl Escaper for HtmlEscaper {
    fn escape<'a>(&self, text: &'a str) -> Cow<'a, str> {
        if !text.contains(['&', '<', '>', '"', '\'']) {
            return Cow::Borrowed(text);
        }

        let mut out = String::with_capacity(text.len() + 16);
        for c in text.chars() {
            match c {
                '&' => out.push_str("&amp;"),
                '<' => out.push_str("&lt;"),
                '>' => out.push_str("&gt;"),
                '"' => out.push_str("&quot;"),
                '\'' => out.push_str("&#39;"),
                _ => out.push(c),
            }
        }
        Cow::Owned(out)
    }
}

impl Escaper for Verbatim {
    fn escape<'a>(&self, text: &'a str) -> Cow<'a, str> {
        Cow::Borrowed(text)
    }
}

/// The policy selected by the `report.escape_text` setting.
#[must_use]
pub fn policy(escape_text: bool) -> &'static dyn Escaper {
    if escape_text {
        &HtmlEscaper
    } else {
        &Verbatim
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_borrowed() {
        assert!(matches!(HtmlEscaper.escape("Budi Santoso"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_markup_is_escaped() {
        assert_eq!(
            HtmlEscaper.escape(r#"<b>nilai</b> & "sikap" 'baik'"#),
            "&lt;b&gt;nilai&lt;/b&gt; &amp; &quot;sikap&quot; &#39;baik&#39;"
        );
    }

    #[test]
    fn test_existing_entities_are_escaped_again() {
        assert_eq!(HtmlEscaper.escape("&amp;"), "&amp;amp;");
    }

    #[test]
    fn test_verbatim_leaves_text_alone() {
        assert_eq!(Verbatim.escape("<td>"), "<td>");
    }

    #[test]
    fn test_policy_selection() {
        assert_eq!(policy(true).escape("<"), "&lt;");
        assert_eq!(policy(false).escape("<"), "<");
    }
}
