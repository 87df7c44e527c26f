use thiserror::Error as ThisError;

#[derive(Debug, Clone, ThisError, Eq, PartialEq)]
pub enum DbConfigError {
    #[error("Database config is incomplete, environment variables not set: {}", vars.join(", "))]
    MissingVariables { vars: Vec<String> },
}
