#[derive(Debug, thiserror::Error)]
pub enum OpalError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid schema: {0}")]
    InvalidSchema(String),
    #[error("invalid patient record: {0}")]
    InvalidRecord(String),

    #[error("row index {rix} is out of range ({len} patients)")]
    RowOutOfRange { rix: usize, len: usize },
    #[error("column index {cix} is out of range ({len} columns)")]
    ColumnOutOfRange { cix: usize, len: usize },
    #[error("column '{0}' is not declared in the schema")]
    UnknownColumn(String),
    #[error("single column '{0}' already holds an item")]
    SingleColumnOccupied(String),

    #[error("failed to read file {path}: {source}", path = path.display())]
    FileRead {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to deserialize JSON: {0}")]
    Deserialization(serde_json::Error),
    #[error("failed to deserialize YAML: {0}")]
    YamlDeserialization(serde_yaml::Error),
}

pub type OpalResult<T> = std::result::Result<T, OpalError>;
