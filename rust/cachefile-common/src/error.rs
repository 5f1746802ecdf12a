use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidArgument {
                name: name.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn invalid_operation(name: impl Into<String>) -> Error {
        Error(ErrorKind::InvalidOperation { name: name.into() }.into())
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Error {
        Error(
            ErrorKind::Io {
                context: context.into(),
                source,
            }
            .into(),
        )
    }

    pub fn unexpected_offset(requested: u64, actual: u64) -> Error {
        Error(ErrorKind::UnexpectedOffset { requested, actual }.into())
    }

    /// Returns the underlying `std::io::ErrorKind` when this error originates
    /// from a failed descriptor primitive.
    pub fn io_kind(&self) -> Option<std::io::ErrorKind> {
        match self.kind() {
            ErrorKind::Io { source, .. } => Some(source.kind()),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("invalid operation {name}")]
    InvalidOperation { name: String },

    #[error("IO error for '{context}': {source}")]
    Io {
        context: String,
        source: std::io::Error,
    },

    #[error("descriptor repositioned to {actual} instead of {requested}")]
    UnexpectedOffset { requested: u64, actual: u64 },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::io("", e)
    }
}

impl From<Error> for std::io::Error {
    fn from(e: Error) -> Self {
        match e.into_kind() {
            ErrorKind::Io { source, .. } => source,
            kind @ (ErrorKind::InvalidArgument { .. } | ErrorKind::InvalidOperation { .. }) => {
                std::io::Error::new(std::io::ErrorKind::InvalidInput, kind.to_string())
            }
            kind => std::io::Error::other(kind.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Error, ErrorKind};

    #[test]
    fn test_io_error_round_trip_keeps_kind() {
        let err = Error::io("fill", std::io::ErrorKind::BrokenPipe.into());
        assert_eq!(err.io_kind(), Some(std::io::ErrorKind::BrokenPipe));
        let io: std::io::Error = err.into();
        assert_eq!(io.kind(), std::io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn test_invalid_operation_maps_to_invalid_input() {
        let err = Error::invalid_operation("read");
        assert!(matches!(err.kind(), ErrorKind::InvalidOperation { .. }));
        assert_eq!(err.io_kind(), None);
        let io: std::io::Error = err.into();
        assert_eq!(io.kind(), std::io::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_unexpected_offset_display() {
        let err = Error::unexpected_offset(4096, 0);
        assert_eq!(
            err.to_string(),
            "descriptor repositioned to 0 instead of 4096"
        );
    }
}
