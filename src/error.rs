use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Error raised when a name cannot be split under BibTeX's grammar.
///
/// Carries the complete offending name so that callers batch-processing a
/// bibliography can report it alongside the file and entry it came from.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} {{{name}}}.")]
pub struct InvalidName {
    message: &'static str,
    /// The name as it appeared in the input.
    pub name: String,
}

impl InvalidName {
    pub(crate) fn unmatched_close(name: &str) -> Self {
        InvalidName {
            message: "Unmatched closing brace in name",
            name: name.into(),
        }
    }

    pub(crate) fn unterminated_open(name: &str) -> Self {
        InvalidName {
            message: "Unterminated opening brace in the name",
            name: name.into(),
        }
    }

    pub(crate) fn too_many_commas(name: &str) -> Self {
        InvalidName {
            message: "Too many commas in the name",
            name: name.into(),
        }
    }

    pub(crate) fn trailing_comma(name: &str) -> Self {
        InvalidName {
            message: "Trailing comma at end of name",
            name: name.into(),
        }
    }
}

/// Top-level error type for operations on bibliography files.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Name(#[from] InvalidName),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid configuration in {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[cfg(feature = "serialization")]
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    #[cfg(feature = "cli")]
    pub(crate) fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::Config {
            path: path.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_the_offending_name() {
        assert_eq!(
            InvalidName::unmatched_close("Foo}").to_string(),
            "Unmatched closing brace in name {Foo}}."
        );
        assert_eq!(
            InvalidName::too_many_commas("a, b, c, d").to_string(),
            "Too many commas in the name {a, b, c, d}."
        );
        assert_eq!(
            InvalidName::unterminated_open("{Foo").to_string(),
            "Unterminated opening brace in the name {{Foo}."
        );
        assert_eq!(
            InvalidName::trailing_comma("Foo,").to_string(),
            "Trailing comma at end of name {Foo,}."
        );
    }
}
