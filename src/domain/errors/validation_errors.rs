/// Validation errors for logical paths and entry names
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Normalized path exceeds the byte limit
    PathTooLong { actual: usize, max: usize },

    /// Path contains a character the namespace reserves
    ForbiddenCharacter(char),

    /// Path contains a `.` or `..` segment
    RelativeSegment(String),

    /// A directory path was required
    NotADirectory,

    /// A file path was required
    NotAFile,

    /// Entry names are single non-empty segments
    EmptyName,
    NameContainsSlash,
    ReservedName(String),

    /// The user's root folder cannot be renamed
    RootDirectory,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::PathTooLong { actual, max } => {
                write!(f, "Path too long: {} bytes (max: {})", actual, max)
            }
            ValidationError::ForbiddenCharacter(c) => {
                write!(f, "Forbidden character in path: '{}'", c.escape_default())
            }
            ValidationError::RelativeSegment(segment) => {
                write!(f, "Path cannot contain '{}' segments", segment)
            }
            ValidationError::NotADirectory => {
                write!(f, "Directory path must be empty or end with '/'")
            }
            ValidationError::NotAFile => {
                write!(f, "File path must be non-empty and must not end with '/'")
            }
            ValidationError::EmptyName => write!(f, "Name cannot be empty"),
            ValidationError::NameContainsSlash => write!(f, "Name cannot contain '/'"),
            ValidationError::ReservedName(name) => write!(f, "Name '{}' is reserved", name),
            ValidationError::RootDirectory => write!(f, "The root folder cannot be modified"),
        }
    }
}

impl std::error::Error for ValidationError {}
