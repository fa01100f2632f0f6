use crate::algebra::content::Content;
use crate::algebra::delta::Delta;
use crate::algebra::errors::AlgebraError;
use crate::algebra::selector::Scope;
use std::collections::BTreeMap;

/// Attribute or style map. Ordered so that resolution is deterministic.
pub type Attributes = BTreeMap<String, String>;

/// A composable, not yet validated, document mutation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Action {
    /// The neutral action.
    #[default]
    Nil,
    /// Apply each action in order.
    List(Vec<Action>),
    /// Apply `action` to the part of the document selected by `scope`.
    Scoped { scope: Scope, action: Box<Action> },
    /// Remove matched nodes.
    Remove,
    /// Remove all children of matched nodes.
    Clear,
    /// Replace the contents of matched nodes.
    Html(Content),
    /// Replace matched nodes.
    Replace(Content),
    Append(Content),
    Prepend(Content),
    InsertBefore(Content),
    InsertAfter(Content),
    /// Add attributes, keeping existing ones.
    AddAttr(Attributes),
    /// Replace the full attribute set.
    SetAttr(Attributes),
    RmAttr(Vec<String>),
    AddStyles(Attributes),
    RmStyles(Vec<String>),
    AddClass(String),
    RmClass(String),
}

impl Action {
    /// Sequence actions into one.
    ///
    /// An empty sequence is [`Action::Nil`] and a single action is returned
    /// unchanged.
    pub fn list(actions: impl IntoIterator<Item = Action>) -> Action {
        let mut actions: Vec<Action> = actions.into_iter().collect();
        match actions.len() {
            0 => Action::Nil,
            1 => actions.pop().unwrap_or_default(),
            _ => Action::List(actions),
        }
    }

    pub fn add_attr<K, V>(attributes: impl IntoIterator<Item = (K, V)>) -> Action
    where
        K: Into<String>,
        V: Into<String>,
    {
        Action::AddAttr(collect_map(attributes))
    }

    pub fn set_attr<K, V>(attributes: impl IntoIterator<Item = (K, V)>) -> Action
    where
        K: Into<String>,
        V: Into<String>,
    {
        Action::SetAttr(collect_map(attributes))
    }

    pub fn rm_attr<N: Into<String>>(names: impl IntoIterator<Item = N>) -> Action {
        Action::RmAttr(names.into_iter().map(Into::into).collect())
    }

    pub fn add_styles<K, V>(styles: impl IntoIterator<Item = (K, V)>) -> Action
    where
        K: Into<String>,
        V: Into<String>,
    {
        Action::AddStyles(collect_map(styles))
    }

    pub fn rm_styles<N: Into<String>>(names: impl IntoIterator<Item = N>) -> Action {
        Action::RmStyles(names.into_iter().map(Into::into).collect())
    }

    pub fn add_class(name: impl Into<String>) -> Action {
        Action::AddClass(name.into())
    }

    pub fn rm_class(name: impl Into<String>) -> Action {
        Action::RmClass(name.into())
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Action::Nil)
    }

    /// Flatten this action into a delta.
    ///
    /// Nested lists are spliced into their parent, neutral entries are
    /// dropped and a scope around nothing disappears. Selectors and names are
    /// validated here; the first invalid one (in application order) is
    /// reported.
    ///
    /// Runs on an explicit work stack, so arbitrarily deep scope nesting
    /// resolves without recursion.
    pub fn delta(&self) -> Result<Delta, AlgebraError> {
        let mut tasks = vec![Flatten::Visit(self)];
        let mut done: Vec<Delta> = Vec::new();

        while let Some(task) = tasks.pop() {
            match task {
                Flatten::Visit(Action::List(actions)) => {
                    tasks.push(Flatten::Sequence(actions.len()));
                    tasks.extend(actions.iter().rev().map(Flatten::Visit));
                }
                Flatten::Visit(Action::Scoped { scope, action }) => {
                    scope.validate()?;
                    tasks.push(Flatten::Wrap(scope));
                    tasks.push(Flatten::Visit(&**action));
                }
                Flatten::Visit(action) => done.push(action.leaf_delta()?),
                Flatten::Sequence(len) => {
                    let entries = done.split_off(done.len() - len);
                    let mut deltas = Vec::with_capacity(entries.len());
                    for mut entry in entries {
                        if let Delta::List { deltas: inner } = &mut entry {
                            deltas.append(inner);
                        } else if !entry.is_nil() {
                            deltas.push(std::mem::take(&mut entry));
                        }
                    }
                    done.push(Delta::from_list(deltas));
                }
                Flatten::Wrap(scope) => {
                    let inner = done.pop().unwrap_or_default();
                    done.push(if inner.is_nil() {
                        Delta::Nil
                    } else {
                        Delta::Scope {
                            scope: scope.clone(),
                            delta: Box::new(inner),
                        }
                    });
                }
            }
        }

        Ok(done.pop().unwrap_or_default())
    }

    /// Delta of an action that has no nested actions.
    fn leaf_delta(&self) -> Result<Delta, AlgebraError> {
        let delta = match self {
            Action::Nil | Action::List(_) | Action::Scoped { .. } => Delta::Nil,
            Action::Remove => Delta::Remove,
            Action::Clear => Delta::Clear,
            Action::Html(content) => Delta::Html {
                content: content.clone(),
            },
            Action::Replace(content) => Delta::Replace {
                content: content.clone(),
            },
            Action::Append(content) => Delta::Append {
                content: content.clone(),
            },
            Action::Prepend(content) => Delta::Prepend {
                content: content.clone(),
            },
            Action::InsertBefore(content) => Delta::InsertBefore {
                content: content.clone(),
            },
            Action::InsertAfter(content) => Delta::InsertAfter {
                content: content.clone(),
            },
            Action::AddAttr(attributes) => {
                validate_names(attributes.keys(), is_attribute_name, attribute_error)?;
                if attributes.is_empty() {
                    Delta::Nil
                } else {
                    Delta::AddAttr {
                        attributes: attributes.clone(),
                    }
                }
            }
            Action::SetAttr(attributes) => {
                validate_names(attributes.keys(), is_attribute_name, attribute_error)?;
                // An empty set still clears every attribute, so it is kept.
                Delta::SetAttr {
                    attributes: attributes.clone(),
                }
            }
            Action::RmAttr(names) => {
                validate_names(names, is_attribute_name, attribute_error)?;
                if names.is_empty() {
                    Delta::Nil
                } else {
                    Delta::RmAttr {
                        names: names.clone(),
                    }
                }
            }
            Action::AddStyles(styles) => {
                validate_names(styles.keys(), is_style_name, style_error)?;
                if styles.is_empty() {
                    Delta::Nil
                } else {
                    Delta::AddStyles {
                        styles: styles.clone(),
                    }
                }
            }
            Action::RmStyles(names) => {
                validate_names(names, is_style_name, style_error)?;
                if names.is_empty() {
                    Delta::Nil
                } else {
                    Delta::RmStyles {
                        names: names.clone(),
                    }
                }
            }
            Action::AddClass(class) => {
                validate_names([class], is_class_name, class_error)?;
                Delta::AddClass {
                    class: class.clone(),
                }
            }
            Action::RmClass(class) => {
                validate_names([class], is_class_name, class_error)?;
                Delta::RmClass {
                    class: class.clone(),
                }
            }
        };
        Ok(delta)
    }

    /// Move nested actions out into `out`, leaving this node shallow.
    fn detach_children(&mut self, out: &mut Vec<Action>) {
        match self {
            Action::List(actions) => out.append(actions),
            Action::Scoped { action, .. } => out.push(std::mem::take(&mut **action)),
            _ => {}
        }
    }
}

// Nested scopes can be arbitrarily deep; the derived drop would recurse once
// per level.
impl Drop for Action {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.detach_children(&mut pending);
        while let Some(mut action) = pending.pop() {
            action.detach_children(&mut pending);
        }
    }
}

enum Flatten<'a> {
    Visit(&'a Action),
    /// Sequence the last `n` finished deltas.
    Sequence(usize),
    /// Scope the last finished delta.
    Wrap(&'a Scope),
}

fn collect_map<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Attributes
where
    K: Into<String>,
    V: Into<String>,
{
    entries
        .into_iter()
        .map(|(key, value)| (key.into(), value.into()))
        .collect()
}

fn validate_names<'a>(
    names: impl IntoIterator<Item = &'a String>,
    valid: fn(&str) -> bool,
    error: fn(&str) -> AlgebraError,
) -> Result<(), AlgebraError> {
    for name in names {
        if !valid(name) {
            return Err(error(name));
        }
    }
    Ok(())
}

fn is_attribute_name(name: &str) -> bool {
    !name.is_empty()
        && !name
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || matches!(c, '"' | '\'' | '=' | '/' | '>'))
}

fn is_class_name(name: &str) -> bool {
    !name.is_empty() && !name.chars().any(char::is_whitespace)
}

fn is_style_name(name: &str) -> bool {
    !name.is_empty() && !name.chars().any(|c| c.is_whitespace() || matches!(c, ':' | ';'))
}

fn attribute_error(name: &str) -> AlgebraError {
    AlgebraError::InvalidAttributeName {
        name: name.to_string(),
    }
}

fn class_error(name: &str) -> AlgebraError {
    AlgebraError::InvalidClassName {
        name: name.to_string(),
    }
}

fn style_error(name: &str) -> AlgebraError {
    AlgebraError::InvalidStyleName {
        name: name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::selector::Selector;

    #[test]
    fn list_collapses_trivial_sequences() {
        assert_eq!(Action::list([]), Action::Nil);
        assert_eq!(Action::list([Action::Clear]), Action::Clear);
        assert_eq!(
            Action::list([Action::Clear, Action::Remove]),
            Action::List(vec![Action::Clear, Action::Remove])
        );
    }

    #[test]
    fn delta_splices_nested_lists_and_drops_nil() {
        let action = Action::List(vec![
            Action::add_class("a"),
            Action::Nil,
            Action::List(vec![Action::add_class("b"), Action::List(vec![Action::Remove])]),
        ]);
        assert_eq!(
            action.delta().unwrap(),
            Delta::List {
                deltas: vec![
                    Delta::AddClass { class: "a".into() },
                    Delta::AddClass { class: "b".into() },
                    Delta::Remove,
                ]
            }
        );
    }

    #[test]
    fn delta_of_single_entry_list_is_the_entry() {
        let action = Action::List(vec![Action::Nil, Action::Clear, Action::List(vec![])]);
        assert_eq!(action.delta().unwrap(), Delta::Clear);
    }

    #[test]
    fn scope_around_nothing_disappears() {
        let action = Scope::All(Selector::new("li")).wrap(Action::List(vec![Action::Nil]));
        assert_eq!(action.delta().unwrap(), Delta::Nil);
    }

    #[test]
    fn scope_around_nothing_still_validates_selector() {
        let action = Scope::All(Selector::new("li[")).wrap(Action::Nil);
        assert!(matches!(
            action.delta(),
            Err(AlgebraError::InvalidSelector { .. })
        ));
    }

    #[test]
    fn empty_attribute_changes_are_neutral() {
        assert_eq!(Action::add_attr(Vec::<(String, String)>::new()).delta().unwrap(), Delta::Nil);
        assert_eq!(Action::rm_attr(Vec::<String>::new()).delta().unwrap(), Delta::Nil);
        assert_eq!(Action::rm_styles(Vec::<String>::new()).delta().unwrap(), Delta::Nil);
    }

    #[test]
    fn empty_set_attr_is_kept() {
        assert_eq!(
            Action::set_attr(Vec::<(String, String)>::new()).delta().unwrap(),
            Delta::SetAttr {
                attributes: Attributes::new()
            }
        );
    }

    #[test]
    fn rejects_bad_names() {
        assert_eq!(
            Action::add_attr([("data x", "1")]).delta(),
            Err(AlgebraError::InvalidAttributeName {
                name: "data x".to_string()
            })
        );
        assert!(matches!(
            Action::add_class("two words").delta(),
            Err(AlgebraError::InvalidClassName { .. })
        ));
        assert!(matches!(
            Action::rm_class("").delta(),
            Err(AlgebraError::InvalidClassName { .. })
        ));
        assert!(matches!(
            Action::add_styles([("color:", "red")]).delta(),
            Err(AlgebraError::InvalidStyleName { .. })
        ));
    }

    #[test]
    fn deep_scope_nesting_flattens() {
        let mut action = Action::Remove;
        for _ in 0..100_000 {
            action = Scope::Parent.wrap(action);
        }
        let delta = action.delta().unwrap();
        assert_eq!(delta.scope_depth(), 100_000);
        assert_eq!(delta.mutation_count(), 1);
    }

    #[test]
    fn deep_nesting_still_reports_innermost_error() {
        let mut action = Scope::All(Selector::new("li >")).wrap(Action::Remove);
        for _ in 0..50_000 {
            action = Action::List(vec![Action::Clear, Scope::FirstChild.wrap(action)]);
        }
        assert!(matches!(
            action.delta(),
            Err(AlgebraError::InvalidSelector { .. })
        ));
    }

    #[test]
    fn first_error_in_order_wins() {
        let action = Action::list([
            Action::add_class("bad class"),
            Scope::One(Selector::new("")).wrap(Action::Remove),
        ]);
        assert!(matches!(
            action.delta(),
            Err(AlgebraError::InvalidClassName { .. })
        ));
    }
}
