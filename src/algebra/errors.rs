use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AlgebraError {
    #[error("invalid selector '{query}': {message}")]
    InvalidSelector { query: String, message: String },

    #[error("invalid attribute name '{name}'")]
    InvalidAttributeName { name: String },

    #[error("invalid class name '{name}'")]
    InvalidClassName { name: String },

    #[error("invalid style property '{name}'")]
    InvalidStyleName { name: String },
}
