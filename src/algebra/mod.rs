//! The operation algebra the builder composes.
//!
//! An [`Action`] is an unvalidated tree of document mutations. Actions are
//! sequenced with [`Action::list`], narrowed with a [`Scope`], and finally
//! flattened into a [`Delta`], the concrete patch handed to whatever applies
//! or ships it. Selector syntax and attribute names are only checked during
//! that flattening step; building actions never fails.

pub mod action;
pub mod content;
pub mod delta;
pub mod errors;
pub mod selector;

pub use action::{Action, Attributes};
pub use content::{escape_html, Content};
pub use delta::Delta;
pub use errors::AlgebraError;
pub use selector::{Scope, Selector};
