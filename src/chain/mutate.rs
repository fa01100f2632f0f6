use crate::algebra::{Action, Content};
use crate::chain::node::Chain;

/// Terminal mutations. Each appends one action at the current scope.
///
/// Content mutations come in three forms: one taking a [`Content`] source,
/// a `_text` form that escapes its input, and an `_html` form that does not.
impl Chain {
    /// Remove the matched nodes.
    pub fn remove(&self) -> Chain {
        self.then(Action::Remove)
    }

    /// Remove the children of the matched nodes.
    pub fn clear(&self) -> Chain {
        self.then(Action::Clear)
    }

    /// Replace the contents of the matched nodes.
    pub fn set(&self, content: Content) -> Chain {
        self.then(Action::Html(content))
    }

    /// Replace the contents with escaped text.
    pub fn set_text(&self, text: impl AsRef<str>) -> Chain {
        self.set(Content::from_text(text))
    }

    /// Replace the contents with raw markup.
    pub fn set_html(&self, html: impl AsRef<str>) -> Chain {
        self.set(Content::from_html(html))
    }

    /// Replace the matched nodes themselves.
    pub fn replace(&self, content: Content) -> Chain {
        self.then(Action::Replace(content))
    }

    /// Replace the matched nodes with escaped text.
    pub fn replace_text(&self, text: impl AsRef<str>) -> Chain {
        self.replace(Content::from_text(text))
    }

    /// Replace the matched nodes with raw markup.
    pub fn replace_html(&self, html: impl AsRef<str>) -> Chain {
        self.replace(Content::from_html(html))
    }

    /// Insert content after the last child of the matched nodes.
    pub fn append(&self, content: Content) -> Chain {
        self.then(Action::Append(content))
    }

    /// Append escaped text.
    pub fn append_text(&self, text: impl AsRef<str>) -> Chain {
        self.append(Content::from_text(text))
    }

    /// Append raw markup.
    pub fn append_html(&self, html: impl AsRef<str>) -> Chain {
        self.append(Content::from_html(html))
    }

    /// Insert content before the first child of the matched nodes.
    pub fn prepend(&self, content: Content) -> Chain {
        self.then(Action::Prepend(content))
    }

    /// Prepend escaped text.
    pub fn prepend_text(&self, text: impl AsRef<str>) -> Chain {
        self.prepend(Content::from_text(text))
    }

    /// Prepend raw markup.
    pub fn prepend_html(&self, html: impl AsRef<str>) -> Chain {
        self.prepend(Content::from_html(html))
    }

    /// Insert content as the previous sibling of the matched nodes.
    pub fn insert_before(&self, content: Content) -> Chain {
        self.then(Action::InsertBefore(content))
    }

    /// Insert escaped text before the matched nodes.
    pub fn insert_text_before(&self, text: impl AsRef<str>) -> Chain {
        self.insert_before(Content::from_text(text))
    }

    /// Insert raw markup before the matched nodes.
    pub fn insert_html_before(&self, html: impl AsRef<str>) -> Chain {
        self.insert_before(Content::from_html(html))
    }

    /// Insert content as the next sibling of the matched nodes.
    pub fn insert_after(&self, content: Content) -> Chain {
        self.then(Action::InsertAfter(content))
    }

    /// Insert escaped text after the matched nodes.
    pub fn insert_text_after(&self, text: impl AsRef<str>) -> Chain {
        self.insert_after(Content::from_text(text))
    }

    /// Insert raw markup after the matched nodes.
    pub fn insert_html_after(&self, html: impl AsRef<str>) -> Chain {
        self.insert_after(Content::from_html(html))
    }

    /// Add attributes, keeping the ones already present.
    pub fn add_attr<K, V>(&self, attributes: impl IntoIterator<Item = (K, V)>) -> Chain
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.then(Action::add_attr(attributes))
    }

    /// Replace the whole attribute set.
    pub fn set_attr<K, V>(&self, attributes: impl IntoIterator<Item = (K, V)>) -> Chain
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.then(Action::set_attr(attributes))
    }

    /// Remove the named attributes.
    pub fn rm_attr<N: Into<String>>(&self, names: impl IntoIterator<Item = N>) -> Chain {
        self.then(Action::rm_attr(names))
    }

    /// Set inline style properties, keeping the others.
    pub fn add_styles<K, V>(&self, styles: impl IntoIterator<Item = (K, V)>) -> Chain
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.then(Action::add_styles(styles))
    }

    /// Remove the named inline style properties.
    pub fn rm_styles<N: Into<String>>(&self, names: impl IntoIterator<Item = N>) -> Chain {
        self.then(Action::rm_styles(names))
    }

    /// Add a class to the matched nodes.
    pub fn add_class(&self, class: impl Into<String>) -> Chain {
        self.then(Action::add_class(class))
    }

    /// Remove a class from the matched nodes.
    pub fn rm_class(&self, class: impl Into<String>) -> Chain {
        self.then(Action::rm_class(class))
    }
}
