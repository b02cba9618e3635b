use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
