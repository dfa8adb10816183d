use thiserror::Error;

#[derive(Debug, Error)]
pub enum TriageError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid blood pressure '{0}': expected SYSTOLIC/DIASTOLIC")]
    InvalidBloodPressure(String),

    #[error("invalid profile: {0}")]
    InvalidProfile(String),

    #[error("invalid role: {0}")]
    InvalidRole(String),

    #[error("invalid specialty: {0}")]
    InvalidSpecialty(String),

    #[error("invalid ward: {0}")]
    InvalidWard(String),

    #[error("hospital not found: {0}")]
    HospitalNotFound(u32),

    #[error("no ICU beds available at {0}")]
    NoBedsAvailable(String),

    #[error("alert not found: {0}")]
    AlertNotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TriageError>;
