use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReachError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV Parsing Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Unknown planning group '{0}'")]
    UnknownGroup(String),

    #[error("Specified frame '{0}' does not exist")]
    UnknownFrame(String),

    #[error("Planning Scene Error: {0}")]
    Scene(String),

    #[error("Joint '{joint}' required by group '{group}' is missing from the pose map")]
    MissingJoint { joint: String, group: String },

    #[error("Kinematics Error: {0}")]
    Kinematics(String),

    #[error("Persistence Error: {0}")]
    Persistence(String),

    #[error("Data Validation Error: {0}")]
    Validation(String),
}

pub type ReachResult<T> = Result<T, ReachError>;
