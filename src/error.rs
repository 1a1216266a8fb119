// SPDX-License-Identifier: MPL-2.0
use std::fmt;

#[derive(Debug, Clone)]
pub enum Error {
    /// The declared MIME type does not describe an image payload.
    InvalidFileType(String),
    /// The payload exceeds the configured upload limit (both in bytes).
    FileTooLarge { size: u64, limit: u64 },
    /// The payload could not be decoded as an image.
    Decode(String),
    /// Encoding the processed image failed.
    Encode(String),
    Io(String),
    Config(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidFileType(mime) => {
                write!(f, "Not an image file (declared type: {})", mime)
            }
            Error::FileTooLarge { size, limit } => {
                write!(f, "Image file too large: {} bytes (limit {} bytes)", size, limit)
            }
            Error::Decode(e) => write!(f, "Decode Error: {}", e),
            Error::Encode(e) => write!(f, "Encode Error: {}", e),
            Error::Io(e) => write!(f, "I/O Error: {}", e),
            Error::Config(e) => write!(f, "Config Error: {}", e),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
