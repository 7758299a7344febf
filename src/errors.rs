use std::fmt::{Display, Formatter};

use hyper::http::uri::InvalidUri;
use hyper::StatusCode;
use log::SetLoggerError;

#[derive(Debug)]
pub enum HaproxyCtlError {
    SetLoggerError(SetLoggerError),
    ConfigError(String),
    UsageError(String),
    AuthDecodeError(String),
    TransportError(String),
    HttpStatusError(StatusCode),
    DecodeError { reason: String, raw: String },
    ActionOutcomeError(String),
    IoError(std::io::Error),
}

impl HaproxyCtlError {
    pub fn decode(reason: &str, raw: &str) -> Self {
        HaproxyCtlError::DecodeError {
            reason: reason.to_string(),
            raw: raw.to_string(),
        }
    }
}

impl Display for HaproxyCtlError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            HaproxyCtlError::SetLoggerError(set_logger_error) => write!(f, "{:?}", set_logger_error),
            HaproxyCtlError::ConfigError(message) => write!(f, "config error: {}", message),
            HaproxyCtlError::UsageError(message) => write!(f, "{}", message),
            HaproxyCtlError::AuthDecodeError(message) => write!(f, "auth string error: {}", message),
            HaproxyCtlError::TransportError(message) => write!(f, "{}", message),
            HaproxyCtlError::HttpStatusError(status) => write!(f, "status code {}", status.as_u16()),
            HaproxyCtlError::DecodeError { reason, raw } => {
                write!(f, "could not decode stats ({}): {:?}", reason, raw)
            }
            HaproxyCtlError::ActionOutcomeError(message) => write!(f, "{}", message),
            HaproxyCtlError::IoError(io_error) => write!(f, "{}", io_error),
        }
    }
}

impl std::error::Error for HaproxyCtlError {}

impl From<SetLoggerError> for HaproxyCtlError {
    fn from(set_logger_error: SetLoggerError) -> Self {
        HaproxyCtlError::SetLoggerError(set_logger_error)
    }
}

impl From<InvalidUri> for HaproxyCtlError {
    fn from(invalid_uri: InvalidUri) -> Self {
        HaproxyCtlError::TransportError(format!("invalid request uri: {}", invalid_uri))
    }
}

impl From<hyper::http::Error> for HaproxyCtlError {
    fn from(http_error: hyper::http::Error) -> Self {
        HaproxyCtlError::TransportError(format!("could not build request: {}", http_error))
    }
}

impl From<hyper::Error> for HaproxyCtlError {
    fn from(hyper_error: hyper::Error) -> Self {
        HaproxyCtlError::TransportError(hyper_error.to_string())
    }
}

impl From<std::io::Error> for HaproxyCtlError {
    fn from(io_error: std::io::Error) -> Self {
        HaproxyCtlError::IoError(io_error)
    }
}

impl From<toml::de::Error> for HaproxyCtlError {
    fn from(toml_error: toml::de::Error) -> Self {
        HaproxyCtlError::ConfigError(toml_error.to_string())
    }
}

impl From<base64::DecodeError> for HaproxyCtlError {
    fn from(decode_error: base64::DecodeError) -> Self {
        HaproxyCtlError::AuthDecodeError(decode_error.to_string())
    }
}

impl From<serde_json::Error> for HaproxyCtlError {
    fn from(json_error: serde_json::Error) -> Self {
        HaproxyCtlError::IoError(json_error.into())
    }
}
