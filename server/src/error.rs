#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("invalid PORT {0:?}: expected a number between 1 and 65535")]
    InvalidPort(String),
    #[error("leptos configuration: {0}")]
    Leptos(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
