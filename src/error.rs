use std::fmt;

/// Everything that can stop a formatting run. All of these are fatal: a run
/// either formats the full section or prints nothing.
#[derive(Debug)]
pub enum FormatError {
    /// The document doesn't parse, or doesn't have the shape we expect.
    /// `opcode` names the offending record when there is one.
    MalformedInput { opcode: Option<String>, reason: String },
    /// A record is missing one of mnemonic/bytes/cycles.
    MissingField { opcode: String, field: &'static str },
    Io { context: String, source: std::io::Error },
}

impl FormatError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        FormatError::MalformedInput { opcode: None, reason: reason.into() }
    }

    pub fn malformed_at(opcode: &str, reason: impl Into<String>) -> Self {
        FormatError::MalformedInput { opcode: Some(opcode.to_string()), reason: reason.into() }
    }

    pub fn missing(opcode: &str, field: &'static str) -> Self {
        FormatError::MissingField { opcode: opcode.to_string(), field }
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        FormatError::Io { context: context.into(), source }
    }
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::MalformedInput { opcode: Some(op), reason } => {
                write!(f, "malformed input at opcode {}: {}", op, reason)
            }
            FormatError::MalformedInput { opcode: None, reason } => {
                write!(f, "malformed input: {}", reason)
            }
            FormatError::MissingField { opcode, field } => {
                write!(f, "opcode {} is missing field \"{}\"", opcode, field)
            }
            FormatError::Io { context, source } => write!(f, "{}: {}", context, source),
        }
    }
}

impl std::error::Error for FormatError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FormatError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for FormatError {
    fn from(e: serde_json::Error) -> Self {
        FormatError::malformed(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FormatError>;
