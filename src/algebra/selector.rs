use crate::algebra::action::Action;
use crate::algebra::errors::AlgebraError;
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

/// A CSS-like query.
///
/// Construction never fails; the syntax is checked by [`Selector::validate`]
/// when the enclosing action is flattened into a delta.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Selector(Arc<str>);

impl Selector {
    pub fn new(query: impl AsRef<str>) -> Self {
        Self(Arc::from(query.as_ref().trim()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check the query for structural problems.
    ///
    /// This is a syntax check only: brackets, parentheses and quotes must
    /// balance, and the query must not be empty or end in a dangling
    /// combinator. Whether the query matches anything is not our concern.
    pub fn validate(&self) -> Result<(), AlgebraError> {
        let query = self.as_str();
        if query.is_empty() {
            return Err(self.invalid("empty selector"));
        }
        if query.starts_with(',') {
            return Err(self.invalid("selector list starts with ','"));
        }

        let mut brackets = 0usize;
        let mut parens = 0usize;
        let mut quote: Option<char> = None;
        let mut last_significant = '\0';
        let mut chars = query.chars();

        while let Some(ch) = chars.next() {
            if let Some(open) = quote {
                if ch == '\\' {
                    chars.next();
                } else if ch == open {
                    quote = None;
                }
                last_significant = ch;
                continue;
            }

            match ch {
                '\\' => {
                    // An escaped character is an identifier character, never a combinator.
                    chars.next();
                    last_significant = 'a';
                    continue;
                }
                '"' | '\'' => quote = Some(ch),
                '[' => brackets += 1,
                ']' => {
                    if brackets == 0 {
                        return Err(self.invalid("unexpected ']'"));
                    }
                    brackets -= 1;
                }
                '(' => parens += 1,
                ')' => {
                    if parens == 0 {
                        return Err(self.invalid("unexpected ')'"));
                    }
                    parens -= 1;
                }
                _ => {}
            }

            if !ch.is_whitespace() {
                last_significant = ch;
            }
        }

        if quote.is_some() {
            return Err(self.invalid("unterminated quoted string"));
        }
        if brackets > 0 {
            return Err(self.invalid("unclosed '['"));
        }
        if parens > 0 {
            return Err(self.invalid("unclosed '('"));
        }
        if matches!(last_significant, '>' | '+' | '~' | ',') {
            return Err(self.invalid(&format!(
                "selector ends with dangling '{last_significant}'"
            )));
        }

        Ok(())
    }

    fn invalid(&self, message: &str) -> AlgebraError {
        AlgebraError::InvalidSelector {
            query: self.0.to_string(),
            message: message.to_string(),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for Selector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl From<&str> for Selector {
    fn from(query: &str) -> Self {
        Selector::new(query)
    }
}

impl From<String> for Selector {
    fn from(query: String) -> Self {
        Selector::new(query)
    }
}

/// The part of the document an inner action applies to, relative to the
/// nodes matched by the enclosing scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "selector", rename_all = "kebab-case")]
pub enum Scope {
    /// Every match of the selector.
    All(Selector),
    /// Only the first match of the selector.
    One(Selector),
    Root,
    Parent,
    FirstChild,
    LastChild,
    PrevSibling,
    NextSibling,
}

impl Scope {
    /// Scope `action` to this part of the document.
    pub fn wrap(&self, action: Action) -> Action {
        Action::Scoped {
            scope: self.clone(),
            action: Box::new(action),
        }
    }

    pub fn selector(&self) -> Option<&Selector> {
        match self {
            Scope::All(selector) | Scope::One(selector) => Some(selector),
            _ => None,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), AlgebraError> {
        match self.selector() {
            Some(selector) => selector.validate(),
            None => Ok(()),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::All(selector) => write!(f, "all({selector})"),
            Scope::One(selector) => write!(f, "one({selector})"),
            Scope::Root => f.write_str("root"),
            Scope::Parent => f.write_str("parent"),
            Scope::FirstChild => f.write_str("first-child"),
            Scope::LastChild => f.write_str("last-child"),
            Scope::PrevSibling => f.write_str("prev-sibling"),
            Scope::NextSibling => f.write_str("next-sibling"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_is_trimmed() {
        assert_eq!(Selector::new("  ul > li ").as_str(), "ul > li");
    }

    #[test]
    fn accepts_common_selectors() {
        for query in [
            "div",
            "head > title",
            "ul li.active",
            "a[href$=\"+\"]",
            "input[type='text'], textarea",
            "li:nth-child(2n + 1)",
            "#main ~ p",
            "> li",
            "span.a\\+",
        ] {
            assert!(
                Selector::new(query).validate().is_ok(),
                "expected '{query}' to be valid"
            );
        }
    }

    #[test]
    fn rejects_empty_selector() {
        let err = Selector::new("   ").validate().unwrap_err();
        assert!(matches!(err, AlgebraError::InvalidSelector { .. }));
    }

    #[test]
    fn rejects_unbalanced_brackets() {
        assert!(Selector::new("a[href").validate().is_err());
        assert!(Selector::new("a]").validate().is_err());
        assert!(Selector::new("li:not(.x").validate().is_err());
        assert!(Selector::new("li)").validate().is_err());
    }

    #[test]
    fn rejects_unterminated_quote() {
        assert!(Selector::new("a[title=\"x]").validate().is_err());
    }

    #[test]
    fn rejects_dangling_combinators() {
        for query in ["ul >", "h1 +", "h1 ~ ", "a,", ", a"] {
            assert!(
                Selector::new(query).validate().is_err(),
                "expected '{query}' to be rejected"
            );
        }
    }

    #[test]
    fn wrap_builds_scoped_action() {
        let action = Scope::Parent.wrap(Action::Remove);
        assert_eq!(
            action,
            Action::Scoped {
                scope: Scope::Parent,
                action: Box::new(Action::Remove),
            }
        );
    }

    #[test]
    fn scope_serializes_with_kind_tag() {
        let json = serde_json::to_string(&Scope::All(Selector::new("li"))).unwrap();
        assert_eq!(json, r#"{"kind":"all","selector":"li"}"#);
        let json = serde_json::to_string(&Scope::NextSibling).unwrap();
        assert_eq!(json, r#"{"kind":"next-sibling"}"#);
    }
}
