use crate::algebra::{Action, AlgebraError, Delta, Scope};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// What a single link of a chain contributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Payload {
    /// Contributes nothing. Used for seeds.
    Empty,
    /// An action applied at the current scope.
    Terminal(Action),
    /// A scope applied to everything built after this link.
    Wrapper(Scope),
}

struct Node {
    parent: Option<Arc<Node>>,
    payload: Payload,
    cache: Mutex<Option<Arc<Delta>>>,
}

impl Node {
    fn new(parent: Option<Arc<Node>>, payload: Payload) -> Self {
        Self {
            parent,
            payload,
            cache: Mutex::new(None),
        }
    }
}

impl Drop for Node {
    // Release the ancestors iteratively; recursive drops of a long chain
    // would overflow the stack.
    fn drop(&mut self) {
        let mut parent = self.parent.take();
        while let Some(node) = parent {
            match Arc::try_unwrap(node) {
                Ok(mut node) => parent = node.parent.take(),
                Err(_) => break,
            }
        }
    }
}

/// An immutable, persistent chain of pending mutations.
///
/// Every builder method returns a new `Chain` linked to the receiver, which
/// is left untouched. Chains are cheap to clone and can be shared between
/// threads; any number of chains may grow from a common ancestor.
///
/// ```
/// use wq::s;
///
/// let chain = s("ul").all().select("li").rm_class("active").parent().add_class("done");
/// let delta = chain.delta().unwrap();
/// assert_eq!(delta.mutation_count(), 2);
/// ```
#[derive(Clone)]
#[must_use = "a Chain does nothing until it is resolved with delta()"]
pub struct Chain {
    node: Arc<Node>,
}

impl Chain {
    /// An empty seed. Resolves to [`Delta::Nil`].
    pub fn new() -> Self {
        Self::seed(Payload::Empty)
    }

    /// A seed whose scope encloses everything built on top of it.
    pub fn scoped(scope: Scope) -> Self {
        Self::seed(Payload::Wrapper(scope))
    }

    fn seed(payload: Payload) -> Self {
        Self {
            node: Arc::new(Node::new(None, payload)),
        }
    }

    pub(crate) fn push(&self, payload: Payload) -> Chain {
        Chain {
            node: Arc::new(Node::new(Some(Arc::clone(&self.node)), payload)),
        }
    }

    /// Narrow everything built after this link to `scope`.
    pub fn within(&self, scope: Scope) -> Chain {
        self.push(Payload::Wrapper(scope))
    }

    /// Append a single action at the current scope.
    pub fn then(&self, action: Action) -> Chain {
        self.push(Payload::Terminal(action))
    }

    /// Append the sequence of `actions` as one link at the current scope.
    ///
    /// Useful for grouping the folded [`action`](Chain::action) of another
    /// chain under this one.
    pub fn apply(&self, actions: impl IntoIterator<Item = Action>) -> Chain {
        self.then(Action::list(actions))
    }

    /// Number of links, the seed included.
    pub fn depth(&self) -> usize {
        self.links().count()
    }

    fn links(&self) -> impl Iterator<Item = &Node> {
        std::iter::successors(Some(&*self.node), |node| node.parent.as_deref())
    }

    /// Fold the chain into a single action.
    ///
    /// Walks from this link back to the seed. Actions collect at the front
    /// of the accumulator so that they end up in construction order; a scope
    /// link sequences what has been collected so far and wraps it, leaving
    /// the wrapped action as the only element. Earlier-built scopes therefore
    /// enclose later ones.
    ///
    /// `then(a).then(b)` plays `a` before `b`.
    ///
    /// This is not memoized; [`delta`](Chain::delta) is.
    pub fn action(&self) -> Action {
        let mut acc: VecDeque<Action> = VecDeque::new();
        let mut links = 0usize;

        for node in self.links() {
            match &node.payload {
                Payload::Empty => {}
                Payload::Terminal(action) => acc.push_front(action.clone()),
                Payload::Wrapper(scope) => {
                    let inner = Action::list(acc.drain(..));
                    acc.push_back(scope.wrap(inner));
                }
            }
            links += 1;
        }

        trace!(links, "folded chain");
        Action::list(acc)
    }

    /// Resolve the chain into a delta.
    ///
    /// The result is cached on this link. Concurrent callers on the same link
    /// wait for the first one and share its result. Errors from the algebra
    /// are returned as-is and leave the cache empty.
    pub fn delta(&self) -> Result<Arc<Delta>, AlgebraError> {
        let mut cache = self.node.cache.lock();
        if let Some(delta) = cache.as_ref() {
            debug!("delta cache hit");
            return Ok(Arc::clone(delta));
        }

        let delta = Arc::new(self.action().delta()?);
        debug!(mutations = delta.mutation_count(), "resolved delta");
        *cache = Some(Arc::clone(&delta));
        Ok(delta)
    }

    /// Whether [`delta`](Chain::delta) has already succeeded on this link.
    pub fn is_resolved(&self) -> bool {
        self.node.cache.lock().is_some()
    }

    /// Whether both handles point at the same link.
    pub fn ptr_eq(&self, other: &Chain) -> bool {
        Arc::ptr_eq(&self.node, &other.node)
    }
}

impl Default for Chain {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut payloads: Vec<&Payload> = self.links().map(|node| &node.payload).collect();
        payloads.reverse();
        f.debug_struct("Chain").field("links", &payloads).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::Selector;

    #[test]
    fn empty_seed_resolves_to_nil() {
        let chain = Chain::new();
        assert_eq!(chain.action(), Action::Nil);
        assert_eq!(*chain.delta().unwrap(), Delta::Nil);
    }

    #[test]
    fn building_leaves_receiver_untouched() {
        let base = Chain::new().then(Action::Clear);
        let _longer = base.then(Action::Remove);
        assert_eq!(base.depth(), 2);
        assert_eq!(base.action(), Action::Clear);
    }

    #[test]
    fn actions_keep_construction_order() {
        let chain = Chain::new()
            .then(Action::add_class("a"))
            .then(Action::add_class("b"))
            .then(Action::add_class("c"));
        assert_eq!(
            chain.action(),
            Action::List(vec![
                Action::add_class("a"),
                Action::add_class("b"),
                Action::add_class("c"),
            ])
        );
    }

    #[test]
    fn scope_wraps_later_links_only() {
        let chain = Chain::new()
            .then(Action::Clear)
            .within(Scope::Parent)
            .then(Action::Remove);
        assert_eq!(
            chain.action(),
            Action::List(vec![Action::Clear, Scope::Parent.wrap(Action::Remove)])
        );
    }

    #[test]
    fn scoped_seed_encloses_everything() {
        let li = Selector::new("li");
        let chain = Chain::scoped(Scope::All(li.clone()))
            .then(Action::Remove)
            .then(Action::Clear);
        assert_eq!(
            chain.action(),
            Scope::All(li).wrap(Action::List(vec![Action::Remove, Action::Clear]))
        );
    }

    #[test]
    fn delta_is_cached_on_the_link() {
        let chain = Chain::new().then(Action::Remove);
        assert!(!chain.is_resolved());
        let first = chain.delta().unwrap();
        assert!(chain.is_resolved());
        let second = chain.delta().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn clones_share_the_cache() {
        let chain = Chain::new().then(Action::Remove);
        let clone = chain.clone();
        assert!(chain.ptr_eq(&clone));
        let first = chain.delta().unwrap();
        assert!(Arc::ptr_eq(&first, &clone.delta().unwrap()));
    }

    #[test]
    fn failed_resolution_is_not_cached() {
        let chain = Chain::new().within(Scope::All(Selector::new("ul >")));
        assert!(chain.delta().is_err());
        assert!(!chain.is_resolved());
        assert!(chain.delta().is_err());
    }

    #[test]
    fn long_chains_drop_without_overflow() {
        let mut chain = Chain::new();
        for _ in 0..200_000 {
            chain = chain.then(Action::Nil);
        }
        assert_eq!(chain.depth(), 200_001);
        drop(chain);
    }

    #[test]
    fn shared_ancestor_survives_dropping_a_branch() {
        let base = Chain::new().then(Action::Clear);
        let branch = base.then(Action::Remove);
        drop(branch);
        assert_eq!(base.action(), Action::Clear);
    }
}
