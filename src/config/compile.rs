//! Plan compilation - turns mutation definitions into chains and resolves them
//!
//! This module:
//! - Replays each step of a mutation as the matching builder call
//! - Gates the whole plan on its `version_range`
//! - Reports one outcome per mutation, in plan order

use crate::algebra::{AlgebraError, Delta};
use crate::chain::Chain;
use crate::config::schema::{MutationDefinition, PlanConfig, Step};
use crate::config::version::{VersionError, VersionRange};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Result of resolving a single mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "MutationOutcome should be checked for skipped mutations"]
pub enum MutationOutcome {
    Resolved { delta: Arc<Delta> },
    /// The plan's `version_range` excludes the running version.
    SkippedVersion { reason: String },
}

impl fmt::Display for MutationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MutationOutcome::Resolved { delta } => {
                write!(f, "Resolved ({} mutations)", delta.mutation_count())
            }
            MutationOutcome::SkippedVersion { reason } => {
                write!(f, "Skipped (version): {reason}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    Version(VersionError),
    Algebra(AlgebraError),
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::Version(e) => write!(f, "version error: {e}"),
            ResolveError::Algebra(e) => write!(f, "resolution failed: {e}"),
        }
    }
}

impl std::error::Error for ResolveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResolveError::Version(e) => Some(e),
            ResolveError::Algebra(e) => Some(e),
        }
    }
}

impl From<VersionError> for ResolveError {
    fn from(e: VersionError) -> Self {
        ResolveError::Version(e)
    }
}

impl From<AlgebraError> for ResolveError {
    fn from(e: AlgebraError) -> Self {
        ResolveError::Algebra(e)
    }
}

/// Extend `chain` with the builder call described by `step`.
pub fn apply_step(chain: &Chain, step: &Step) -> Chain {
    match step {
        Step::Select { query } => chain.select(query.as_str()),
        Step::SelectFirst { query } => chain.select_first(query.as_str()),
        Step::Root => chain.root(),
        Step::Parent => chain.parent(),
        Step::FirstChild => chain.first_child(),
        Step::LastChild => chain.last_child(),
        Step::PrevSibling => chain.prev_sibling(),
        Step::NextSibling => chain.next_sibling(),
        Step::Remove => chain.remove(),
        Step::Clear => chain.clear(),
        Step::Set { content } => chain.set(content.content()),
        Step::Replace { content } => chain.replace(content.content()),
        Step::Append { content } => chain.append(content.content()),
        Step::Prepend { content } => chain.prepend(content.content()),
        Step::InsertBefore { content } => chain.insert_before(content.content()),
        Step::InsertAfter { content } => chain.insert_after(content.content()),
        Step::AddAttr { attributes } => chain.add_attr(attributes.clone()),
        Step::SetAttr { attributes } => chain.set_attr(attributes.clone()),
        Step::RemoveAttr { names } => chain.rm_attr(names.iter().cloned()),
        Step::AddStyles { styles } => chain.add_styles(styles.clone()),
        Step::RemoveStyles { names } => chain.rm_styles(names.iter().cloned()),
        Step::AddClass { class } => chain.add_class(class.as_str()),
        Step::RemoveClass { class } => chain.rm_class(class.as_str()),
    }
}

/// Build the chain for a mutation, starting from an empty seed.
pub fn compile_mutation(mutation: &MutationDefinition) -> Chain {
    mutation
        .steps
        .iter()
        .fold(Chain::new(), |chain, step| apply_step(&chain, step))
}

/// Resolve every mutation of a plan.
///
/// # Arguments
///
/// * `plan` - The plan to resolve
/// * `version` - The wq version doing the resolving (e.g., "0.1.0")
///
/// # Returns
///
/// One `(id, result)` pair per mutation, in plan order
pub fn resolve_plan(
    plan: &PlanConfig,
    version: &str,
) -> Vec<(String, Result<MutationOutcome, ResolveError>)> {
    let range = plan.meta.version_range.as_deref();
    let admitted = VersionRange::parse(range).and_then(|range| range.admits(version));

    match admitted {
        Ok(true) => plan
            .mutations
            .iter()
            .map(|mutation| (mutation.id.clone(), resolve_mutation(mutation)))
            .collect(),
        Ok(false) => {
            let reason = format!(
                "wq version {version} does not satisfy version_range {}",
                range.unwrap_or("").trim()
            );
            debug!(plan = %plan.meta.name, %reason, "skipping plan");
            plan.mutations
                .iter()
                .map(|mutation| {
                    (
                        mutation.id.clone(),
                        Ok(MutationOutcome::SkippedVersion {
                            reason: reason.clone(),
                        }),
                    )
                })
                .collect()
        }
        Err(e) => plan
            .mutations
            .iter()
            .map(|mutation| (mutation.id.clone(), Err(ResolveError::Version(e.clone()))))
            .collect(),
    }
}

fn resolve_mutation(mutation: &MutationDefinition) -> Result<MutationOutcome, ResolveError> {
    let chain = compile_mutation(mutation);
    match chain.delta() {
        Ok(delta) => Ok(MutationOutcome::Resolved { delta }),
        Err(e) => {
            warn!(id = %mutation.id, error = %e, "mutation failed to resolve");
            Err(e.into())
        }
    }
}

/// The mutation id closest to `id`, for "did you mean" hints.
pub fn suggest_id<'a>(plan: &'a PlanConfig, id: &str) -> Option<&'a str> {
    plan.mutations
        .iter()
        .map(|mutation| {
            (
                strsim::jaro_winkler(id, &mutation.id),
                mutation.id.as_str(),
            )
        })
        .filter(|(score, _)| *score >= 0.8)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, candidate)| candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::{Action, Content, Scope, Selector};
    use crate::config::load_from_str;

    const PLAN: &str = r#"
[meta]
name = "todo"
version_range = ">=0.1.0, <1.0.0"

[[mutations]]
id = "finish-item"
steps = [
    { type = "select", query = "ul" },
    { type = "select", query = "li" },
    { type = "remove-class", class = "active" },
    { type = "parent" },
    { type = "add-class", class = "done" },
]

[[mutations]]
id = "rename"
steps = [
    { type = "select-first", query = "h1" },
    { type = "set", text = "<Tasks>" },
]
"#;

    #[test]
    fn compiles_steps_in_order() {
        let plan = load_from_str(PLAN).unwrap();
        let chain = compile_mutation(&plan.mutations[0]);
        let expected = Scope::All(Selector::new("ul")).wrap(Scope::All(Selector::new("li")).wrap(
            Action::List(vec![
                Action::rm_class("active"),
                Scope::Parent.wrap(Action::add_class("done")),
            ]),
        ));
        assert_eq!(chain.action(), expected);
    }

    #[test]
    fn text_content_is_escaped() {
        let plan = load_from_str(PLAN).unwrap();
        let chain = compile_mutation(&plan.mutations[1]);
        assert_eq!(
            chain.action(),
            Scope::One(Selector::new("h1")).wrap(Action::Html(Content::from_html("&lt;Tasks&gt;")))
        );
    }

    #[test]
    fn resolves_every_mutation() {
        let plan = load_from_str(PLAN).unwrap();
        let results = resolve_plan(&plan, "0.1.0");
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, "finish-item");
        assert!(matches!(
            results[0].1,
            Ok(MutationOutcome::Resolved { .. })
        ));
    }

    #[test]
    fn out_of_range_version_skips_plan() {
        let plan = load_from_str(PLAN).unwrap();
        let results = resolve_plan(&plan, "1.2.0");
        for (_, result) in results {
            match result {
                Ok(MutationOutcome::SkippedVersion { reason }) => {
                    assert!(reason.contains("1.2.0"));
                }
                other => panic!("expected skip, got {other:?}"),
            }
        }
    }

    #[test]
    fn algebra_errors_are_reported_per_mutation() {
        let plan = load_from_str(
            r#"
[[mutations]]
id = "bad"
steps = [{ type = "select", query = "ul >" }, { type = "remove" }]

[[mutations]]
id = "good"
steps = [{ type = "remove" }]
"#,
        )
        .unwrap();
        let results = resolve_plan(&plan, "0.1.0");
        assert!(matches!(
            results[0].1,
            Err(ResolveError::Algebra(AlgebraError::InvalidSelector { .. }))
        ));
        assert!(results[1].1.is_ok());
    }

    #[test]
    fn suggests_close_ids() {
        let plan = load_from_str(PLAN).unwrap();
        assert_eq!(suggest_id(&plan, "finish-itm"), Some("finish-item"));
        assert_eq!(suggest_id(&plan, "zzz"), None);
    }
}
