use thiserror::Error;

/// Errors raised while building engine state from assets or game code.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A JSON document (manifest, config) failed to parse.
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
    /// A sprite or animation frame referenced a name the atlas does not have.
    #[error("Unknown sprite {0:?}")]
    UnknownSprite(String),
    /// A sprite or animation name was registered twice in the same atlas.
    #[error("Duplicate name {0:?}")]
    DuplicateName(String),
    /// An animation definition is unusable (bad fps, empty or out-of-range frames).
    #[error("Invalid animation {name:?}: {reason}")]
    InvalidAnimation { name: String, reason: &'static str },
    /// An SVG `points` attribute could not be read as coordinate pairs.
    #[error("Invalid SVG points {0:?}")]
    InvalidPoints(String),
    /// An SVG paint value was not `none`, a hex color or a known color name.
    #[error("Invalid SVG color {0:?}")]
    InvalidColor(String),
    /// The atlas was disposed and can no longer take sprites or animations.
    #[error("Atlas {0:?} is disposed")]
    AtlasDisposed(String),
    /// A constraint referenced particles that do not exist or the same particle twice.
    #[error("Invalid constraint: {0}")]
    InvalidConstraint(&'static str),
}

/// Shorthand type for [`Result<T, EngineError>`]
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors raised while reading or writing binary persistence streams.
#[derive(Error, Debug)]
pub enum PersistError {
    /// IO error from the underlying stream.
    #[error("IO Error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    /// A length-prefixed string was not valid UTF-8.
    #[error("String is not valid UTF-8: {source}")]
    Utf8 {
        #[from]
        source: std::string::FromUtf8Error,
    },
    /// A boolean byte was neither 0 nor 1.
    #[error("Invalid bool byte {0}")]
    InvalidBool(u8),
    /// An enum discriminant did not match any known variant.
    #[error("Invalid {kind} tag {tag}")]
    InvalidTag { kind: &'static str, tag: u8 },
    /// Restored data violates an invariant (e.g. a constraint index out of range).
    #[error("Corrupt data: {0}")]
    Corrupt(&'static str),
}

/// Shorthand type for [`Result<T, PersistError>`]
pub type PersistResult<T> = Result<T, PersistError>;
