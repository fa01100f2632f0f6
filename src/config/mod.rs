pub mod compile;
pub mod loader;
pub mod schema;
pub mod version;

pub use compile::{
    apply_step, compile_mutation, resolve_plan, suggest_id, MutationOutcome, ResolveError,
};
pub use loader::{load_from_path, load_from_str, ConfigError};
pub use schema::{
    ContentSource, Metadata, MutationDefinition, PlanConfig, Step, ValidationError,
    ValidationIssue,
};
pub use version::{matches_requirement, VersionError, VersionRange};
