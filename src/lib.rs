//! wq: scoped DOM mutations, composed fluently and resolved into one delta
//!
//! Callers build an immutable [`Chain`] of pending mutations by mixing scope
//! calls (select, parent, siblings, root, first match) with mutation calls
//! (set content, attributes, classes, styles, insertions, removal), then ask
//! for the resolved [`Delta`] that a renderer or transport can apply.
//!
//! # Architecture
//!
//! - [`algebra`]: the operation vocabulary. [`Action`] trees are sequenced
//!   and scoped, then flattened into a [`Delta`] with validation.
//! - [`chain`]: the persistent builder. Each call allocates one link pointing
//!   at its predecessor; resolution folds the links from leaf to seed, wrapping
//!   at every scope boundary, and memoizes the result on the leaf.
//! - [`config`]: TOML mutation plans that replay builder calls step by step.
//!
//! # Guarantees
//!
//! - Building never fails and never mutates an existing link
//! - Resolution is deterministic and runs at most once per link
//! - Chains sharing an ancestor can be extended and resolved from any thread
//! - Invalid selectors or names surface as [`AlgebraError`] from
//!   [`Chain::delta`] and are never cached
//!
//! # Example
//!
//! ```
//! use wq::{s, Delta};
//!
//! let done = s("ul")
//!     .all()
//!     .select("li")
//!     .rm_class("active")
//!     .parent()
//!     .add_class("done");
//!
//! let delta = done.delta().expect("valid selectors");
//! assert!(matches!(*delta, Delta::Scope { .. }));
//! ```

pub mod algebra;
pub mod chain;
pub mod config;

// Re-exports
pub use algebra::{escape_html, Action, AlgebraError, Attributes, Content, Delta, Scope, Selector};
pub use chain::{body, head, s, title, Chain, Selection};
pub use config::{
    load_from_path, load_from_str, resolve_plan, ConfigError, MutationOutcome, PlanConfig,
    ResolveError,
};
