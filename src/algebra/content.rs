use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

/// Markup inserted into the document by content actions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Content(Arc<str>);

impl Content {
    /// Wrap raw markup. The markup is used as-is.
    pub fn from_html(markup: impl AsRef<str>) -> Self {
        Self(Arc::from(markup.as_ref()))
    }

    /// Wrap plain text, escaping it so it renders literally.
    pub fn from_text(text: impl AsRef<str>) -> Self {
        Self(Arc::from(escape_html(text.as_ref())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for Content {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Escape the characters that are significant in HTML text and attribute
/// values: `&`, `<`, `>`, `"` and `'`.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&#34;x&#34;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(escape_html("hello, wörld"), "hello, wörld");
        assert_eq!(escape_html(""), "");
    }

    #[test]
    fn from_text_escapes_but_from_html_does_not() {
        assert_eq!(Content::from_text("<b>").as_str(), "&lt;b&gt;");
        assert_eq!(Content::from_html("<b>").as_str(), "<b>");
        assert_eq!(Content::from_text("<b>"), Content::from_html("&lt;b&gt;"));
    }
}
