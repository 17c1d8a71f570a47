// Copyright 2023 Simo Sorce
// See LICENSE.txt file for terms

use std::error;
use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

type Origin = Box<dyn error::Error + Send + Sync>;

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    origin: Option<Origin>,
    errmsg: Option<String>,
}

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[non_exhaustive]
pub enum ErrorKind {
    /* Malformed or out of range algorithm parameters */
    Parameter,
    /* The key type, usages or algorithm do not allow the operation */
    KeyRole,
    /* Unknown format string or malformed key data */
    Format,
    /* Unknown algorithm name */
    NotSupported,
    /* The RSA engine failed, see origin */
    Engine,
    /* Invalid configuration */
    Config,
    /* Other error, see origin */
    Nested,
}

impl Error {
    fn with_errmsg(kind: ErrorKind, errmsg: String) -> Error {
        Error {
            kind: kind,
            origin: None,
            errmsg: Some(errmsg),
        }
    }

    pub fn parameter(errmsg: String) -> Error {
        Error::with_errmsg(ErrorKind::Parameter, errmsg)
    }

    pub fn key_role(errmsg: String) -> Error {
        Error::with_errmsg(ErrorKind::KeyRole, errmsg)
    }

    pub fn format(errmsg: String) -> Error {
        Error::with_errmsg(ErrorKind::Format, errmsg)
    }

    pub fn not_supported(errmsg: String) -> Error {
        Error::with_errmsg(ErrorKind::NotSupported, errmsg)
    }

    pub fn config(errmsg: String) -> Error {
        Error::with_errmsg(ErrorKind::Config, errmsg)
    }

    /// Wraps a failure reported by the RSA engine, `context` names the
    /// operation that failed
    pub fn engine<E>(context: &str, error: E) -> Error
    where
        E: Into<Origin>,
    {
        Error {
            kind: ErrorKind::Engine,
            origin: Some(error.into()),
            errmsg: Some(context.to_string()),
        }
    }

    pub fn kind_from_error<E>(kind: ErrorKind, error: E) -> Error
    where
        E: Into<Origin>,
    {
        Error {
            kind: kind,
            origin: Some(error.into()),
            errmsg: None,
        }
    }

    pub fn other_error<E>(error: E) -> Error
    where
        E: Into<Origin>,
    {
        Error::kind_from_error(ErrorKind::Nested, error)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn errmsg(&self) -> Option<&str> {
        self.errmsg.as_deref()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (&self.errmsg, &self.origin) {
            (Some(msg), Some(origin)) => write!(f, "{}: {}", msg, origin),
            (Some(msg), None) => write!(f, "{}", msg),
            (None, Some(origin)) => origin.fmt(f),
            (None, None) => write!(f, "{:?} error", self.kind),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self.origin {
            Some(ref e) => Some(e.as_ref()),
            None => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Error {
        Error::other_error(error)
    }
}

impl From<std::num::TryFromIntError> for Error {
    fn from(error: std::num::TryFromIntError) -> Error {
        Error::other_error(error)
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Error {
        Error::kind_from_error(ErrorKind::Format, error)
    }
}

impl From<toml::de::Error> for Error {
    fn from(error: toml::de::Error) -> Error {
        Error::kind_from_error(ErrorKind::Config, error)
    }
}

impl From<data_encoding::DecodeError> for Error {
    fn from(error: data_encoding::DecodeError) -> Error {
        Error::kind_from_error(ErrorKind::Format, error)
    }
}

impl From<rsa::Error> for Error {
    fn from(error: rsa::Error) -> Error {
        Error::kind_from_error(ErrorKind::Engine, error)
    }
}

impl From<rsa::pkcs8::Error> for Error {
    fn from(error: rsa::pkcs8::Error) -> Error {
        Error::kind_from_error(ErrorKind::Engine, error)
    }
}

impl From<rsa::pkcs8::spki::Error> for Error {
    fn from(error: rsa::pkcs8::spki::Error) -> Error {
        Error::kind_from_error(ErrorKind::Engine, error)
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(error: tokio::task::JoinError) -> Error {
        Error::other_error(error)
    }
}

#[macro_export]
macro_rules! param_err {
    ($($arg:tt)*) => {
        Err($crate::error::Error::parameter(format!($($arg)*)))
    };
}

#[macro_export]
macro_rules! role_err {
    ($($arg:tt)*) => {
        Err($crate::error::Error::key_role(format!($($arg)*)))
    };
}

#[macro_export]
macro_rules! format_err {
    ($($arg:tt)*) => {
        Err($crate::error::Error::format(format!($($arg)*)))
    };
}

#[macro_export]
macro_rules! map_engine_err {
    ($res:expr, $ctx:expr) => {{
        $res.map_err(|e| $crate::error::Error::engine($ctx, e))
    }};
}
