use thiserror::Error;

#[derive(Error, Debug)]
pub enum CentaurError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid FITS file: {0}")]
    InvalidFits(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Missing metadata: {0}")]
    MissingMetadata(&'static str),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Mask shape {found:?} does not match pixel array shape {expected:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("Aperture at ({x:.1}, {y:.1}) covers no usable pixels")]
    InvalidPosition { x: f64, y: f64 },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, CentaurError>;
