#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectionError {
    UnknownKind(String),
    InvalidCell(String),
}

impl std::fmt::Display for ProjectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectionError::UnknownKind(name) => write!(f, "unknown projection kind: {name}"),
            ProjectionError::InvalidCell(msg) => write!(f, "invalid UTM cell: {msg}"),
        }
    }
}

impl std::error::Error for ProjectionError {}
