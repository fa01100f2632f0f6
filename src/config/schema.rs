use crate::algebra::{Attributes, Content};
use crate::config::version::VersionRange;
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Deserialize, Default, Clone)]
pub struct PlanConfig {
    #[serde(default)]
    pub meta: Metadata,
    #[serde(default)]
    pub mutations: Vec<MutationDefinition>,
}

impl PlanConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.mutations.is_empty() {
            issues.push(ValidationIssue::EmptyMutationList);
        }

        if let Some(range) = self.meta.version_range.as_deref() {
            if let Err(error) = VersionRange::parse(Some(range)) {
                issues.push(ValidationIssue::InvalidCombo {
                    mutation_id: None,
                    message: error.to_string(),
                });
            }
        }

        let mut seen = HashSet::new();
        for mutation in &self.mutations {
            let id = mutation.id.trim();
            if id.is_empty() {
                issues.push(ValidationIssue::MissingField {
                    mutation_id: None,
                    field: "id".to_string(),
                });
            } else if !seen.insert(id) {
                issues.push(ValidationIssue::DuplicateId { id: id.to_string() });
            }

            if mutation.steps.is_empty() {
                issues.push(ValidationIssue::InvalidCombo {
                    mutation_id: Some(mutation.id.clone()),
                    message: "mutation has no steps".to_string(),
                });
            }

            for (index, step) in mutation.steps.iter().enumerate() {
                let missing = |field: &str| ValidationIssue::MissingField {
                    mutation_id: Some(mutation.id.clone()),
                    field: format!("steps[{index}].{field}"),
                };

                match step {
                    Step::Select { query } | Step::SelectFirst { query } => {
                        if query.trim().is_empty() {
                            issues.push(missing("query"));
                        }
                    }
                    Step::Set { content }
                    | Step::Replace { content }
                    | Step::Append { content }
                    | Step::Prepend { content }
                    | Step::InsertBefore { content }
                    | Step::InsertAfter { content } => {
                        if let Err(message) = content.validate() {
                            issues.push(ValidationIssue::InvalidCombo {
                                mutation_id: Some(mutation.id.clone()),
                                message: format!("steps[{index}]: {message}"),
                            });
                        }
                    }
                    Step::AddAttr { attributes } => {
                        if attributes.is_empty() {
                            issues.push(missing("attributes"));
                        }
                    }
                    Step::AddStyles { styles } => {
                        if styles.is_empty() {
                            issues.push(missing("styles"));
                        }
                    }
                    Step::RemoveAttr { names } | Step::RemoveStyles { names } => {
                        if names.is_empty() {
                            issues.push(missing("names"));
                        }
                    }
                    Step::AddClass { class } | Step::RemoveClass { class } => {
                        if class.trim().is_empty() {
                            issues.push(missing("class"));
                        }
                    }
                    Step::SetAttr { .. }
                    | Step::Root
                    | Step::Parent
                    | Step::FirstChild
                    | Step::LastChild
                    | Step::PrevSibling
                    | Step::NextSibling
                    | Step::Remove
                    | Step::Clear => {}
                }
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }

    pub fn mutation(&self, id: &str) -> Option<&MutationDefinition> {
        self.mutations.iter().find(|mutation| mutation.id == id)
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Metadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Semver requirement on the wq version resolving this plan.
    #[serde(default)]
    pub version_range: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MutationDefinition {
    pub id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// One builder call.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Step {
    Select {
        query: String,
    },
    SelectFirst {
        query: String,
    },
    Root,
    Parent,
    FirstChild,
    LastChild,
    PrevSibling,
    NextSibling,
    Remove,
    Clear,
    Set {
        #[serde(flatten)]
        content: ContentSource,
    },
    Replace {
        #[serde(flatten)]
        content: ContentSource,
    },
    Append {
        #[serde(flatten)]
        content: ContentSource,
    },
    Prepend {
        #[serde(flatten)]
        content: ContentSource,
    },
    InsertBefore {
        #[serde(flatten)]
        content: ContentSource,
    },
    InsertAfter {
        #[serde(flatten)]
        content: ContentSource,
    },
    AddAttr {
        attributes: Attributes,
    },
    SetAttr {
        #[serde(default)]
        attributes: Attributes,
    },
    RemoveAttr {
        names: Vec<String>,
    },
    AddStyles {
        styles: Attributes,
    },
    RemoveStyles {
        names: Vec<String>,
    },
    AddClass {
        class: String,
    },
    RemoveClass {
        class: String,
    },
}

/// Content given either as plain text (escaped) or as raw markup.
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct ContentSource {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub html: Option<String>,
}

impl ContentSource {
    pub fn validate(&self) -> Result<(), String> {
        match (&self.text, &self.html) {
            (Some(_), Some(_)) => Err("only one of 'text' or 'html' is allowed".to_string()),
            (None, None) => Err("content step requires 'text' or 'html'".to_string()),
            _ => Ok(()),
        }
    }

    /// The content to insert. Text wins if both are present.
    pub fn content(&self) -> Content {
        match (&self.text, &self.html) {
            (Some(text), _) => Content::from_text(text),
            (None, Some(html)) => Content::from_html(html),
            (None, None) => Content::from_html(""),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    EmptyMutationList,
    MissingField {
        mutation_id: Option<String>,
        field: String,
    },
    DuplicateId {
        id: String,
    },
    InvalidCombo {
        mutation_id: Option<String>,
        message: String,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::EmptyMutationList => write!(f, "plan contains no mutations"),
            ValidationIssue::MissingField { mutation_id, field } => match mutation_id {
                Some(id) => write!(f, "mutation '{id}' missing required field '{field}'"),
                None => write!(f, "mutation missing required field '{field}'"),
            },
            ValidationIssue::DuplicateId { id } => write!(f, "duplicate mutation id '{id}'"),
            ValidationIssue::InvalidCombo {
                mutation_id,
                message,
            } => match mutation_id {
                Some(id) => write!(f, "mutation '{id}' has invalid configuration: {message}"),
                None => write!(f, "invalid plan configuration: {message}"),
            },
        }
    }
}
