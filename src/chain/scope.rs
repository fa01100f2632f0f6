use crate::algebra::{Scope, Selector};
use crate::chain::node::Chain;

impl Chain {
    /// Move to the document root.
    pub fn root(&self) -> Chain {
        self.within(Scope::Root)
    }

    /// Move to the parents of the matched nodes.
    pub fn parent(&self) -> Chain {
        self.within(Scope::Parent)
    }

    /// Move to the first child of each matched node.
    pub fn first_child(&self) -> Chain {
        self.within(Scope::FirstChild)
    }

    /// Move to the last child of each matched node.
    pub fn last_child(&self) -> Chain {
        self.within(Scope::LastChild)
    }

    /// Move to the previous sibling of each matched node.
    pub fn prev_sibling(&self) -> Chain {
        self.within(Scope::PrevSibling)
    }

    /// Move to the next sibling of each matched node.
    pub fn next_sibling(&self) -> Chain {
        self.within(Scope::NextSibling)
    }

    /// Move to every descendant matching `query`.
    pub fn select(&self, query: impl Into<Selector>) -> Chain {
        self.within(Scope::All(query.into()))
    }

    /// Move to the first descendant matching `query`.
    pub fn select_first(&self, query: impl Into<Selector>) -> Chain {
        self.within(Scope::One(query.into()))
    }
}

/// A reusable query handle with two ways in: every match, or the first.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Selection {
    selector: Selector,
}

impl Selection {
    pub fn new(query: impl Into<Selector>) -> Self {
        Self {
            selector: query.into(),
        }
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    /// A chain scoped to every match.
    pub fn all(&self) -> Chain {
        Chain::scoped(Scope::All(self.selector.clone()))
    }

    /// A chain scoped to the first match only.
    pub fn first(&self) -> Chain {
        Chain::scoped(Scope::One(self.selector.clone()))
    }
}

impl From<Selection> for Chain {
    fn from(selection: Selection) -> Chain {
        selection.all()
    }
}

/// Shorthand for [`Selection::new`].
pub fn s(query: impl Into<Selector>) -> Selection {
    Selection::new(query)
}

/// The document head.
pub fn head() -> Chain {
    s("head").first()
}

/// The document body.
pub fn body() -> Chain {
    s("body").first()
}

/// The document title.
pub fn title() -> Chain {
    s("head > title").first()
}
