use crate::algebra::action::Attributes;
use crate::algebra::content::Content;
use crate::algebra::selector::Scope;
use serde::Serialize;

/// A resolved, normalized patch.
///
/// Produced by [`Action::delta`](crate::algebra::Action::delta). A delta never
/// contains a nested list, a neutral entry inside a list, or a scope around
/// nothing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum Delta {
    #[default]
    Nil,
    List { deltas: Vec<Delta> },
    Scope { scope: Scope, delta: Box<Delta> },
    Remove,
    Clear,
    Html { content: Content },
    Replace { content: Content },
    Append { content: Content },
    Prepend { content: Content },
    InsertBefore { content: Content },
    InsertAfter { content: Content },
    AddAttr { attributes: Attributes },
    SetAttr { attributes: Attributes },
    RmAttr { names: Vec<String> },
    AddStyles { styles: Attributes },
    RmStyles { names: Vec<String> },
    AddClass { class: String },
    RmClass { class: String },
}

impl Delta {
    /// Build a list delta from already-flattened entries.
    pub(crate) fn from_list(mut deltas: Vec<Delta>) -> Delta {
        match deltas.len() {
            0 => Delta::Nil,
            1 => deltas.pop().unwrap_or(Delta::Nil),
            _ => Delta::List { deltas },
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Delta::Nil)
    }

    /// Number of mutations (everything except lists and scopes) in the delta.
    pub fn mutation_count(&self) -> usize {
        let mut count = 0;
        let mut pending = vec![self];
        while let Some(delta) = pending.pop() {
            match delta {
                Delta::Nil => {}
                Delta::List { deltas } => pending.extend(deltas),
                Delta::Scope { delta, .. } => pending.push(&**delta),
                _ => count += 1,
            }
        }
        count
    }

    /// Number of scopes on the deepest path through the delta.
    pub fn scope_depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending = vec![(self, 0usize)];
        while let Some((delta, depth)) = pending.pop() {
            match delta {
                Delta::List { deltas } => pending.extend(deltas.iter().map(|d| (d, depth))),
                Delta::Scope { delta, .. } => pending.push((&**delta, depth + 1)),
                _ => deepest = deepest.max(depth),
            }
        }
        deepest
    }

    fn detach_children(&mut self, out: &mut Vec<Delta>) {
        match self {
            Delta::List { deltas } => out.append(deltas),
            Delta::Scope { delta, .. } => out.push(std::mem::take(&mut **delta)),
            _ => {}
        }
    }
}

// Released iteratively: a delta resolved from a long chain nests one box per
// scope link.
impl Drop for Delta {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.detach_children(&mut pending);
        while let Some(mut delta) = pending.pop() {
            delta.detach_children(&mut pending);
        }
    }
}
