//! The builder chain and its resolution.
//!
//! A [`Chain`] is a backward-linked list of immutable links. Each link is an
//! action to apply at the current scope, a scope that encloses everything
//! built after it, or nothing at all. [`Chain::delta`] folds the links into a
//! single [`Action`](crate::algebra::Action), flattens it and caches the
//! result on the link it was called on.

mod mutate;
pub mod node;
pub mod scope;

pub use node::Chain;
pub use scope::{body, head, s, title, Selection};
