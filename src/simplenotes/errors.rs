use std::fmt;
use std::convert::From;
use std::error::Error as StdError;
use std::io::Error as IoError;
use std::string::FromUtf8Error;

pub type Result<T> = ::std::result::Result<T, Error>;

#[derive(Debug)]
pub enum ErrorKind {
    Io(IoError),
    Json(serde_json::Error),
    Yaml(serde_yaml::Error),
    Regex(regex::Error),
    Crypt,
    Generic,
}

#[derive(Debug)]
pub struct Error {
    pub kind: ErrorKind,
    pub desc: String,
    pub detail: Option<String>,
}

impl Error {
    pub fn generic<S: Into<String>>(desc: S) -> Error {
        Error {
            kind: ErrorKind::Generic,
            desc: desc.into(),
            detail: None,
        }
    }

    pub fn crypt<S: Into<String>>(desc: S) -> Error {
        Error {
            kind: ErrorKind::Crypt,
            desc: desc.into(),
            detail: None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", &self.desc)?;
        if let Some(ref detail) = self.detail {
            write!(f, " ({})", detail)?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self.kind {
            ErrorKind::Io(ref e) => Some(e),
            ErrorKind::Json(ref e) => Some(e),
            ErrorKind::Yaml(ref e) => Some(e),
            ErrorKind::Regex(ref e) => Some(e),
            _ => None,
        }
    }
}

#[macro_export]
macro_rules! specific_fail {
    ($short:expr) => {{
        use $crate::errors::{Error, ErrorKind};
        Err(::std::convert::From::from(
            Error {
                kind: ErrorKind::Generic,
                desc: $short,
                detail: None
            }
        ))
    }}
}

#[macro_export]
macro_rules! specific_fail_str {
    ($s:expr) => {
        $crate::specific_fail!($s.to_string())
    }
}

impl From<IoError> for Error {
    fn from(err: IoError) -> Error {
        Error {
            desc: err.to_string(),
            kind: ErrorKind::Io(err),
            detail: None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Error {
        Error {
            desc: format!("JSON error: {}", err),
            kind: ErrorKind::Json(err),
            detail: None,
        }
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Error {
        Error {
            desc: format!("YAML error: {}", err),
            kind: ErrorKind::Yaml(err),
            detail: None,
        }
    }
}

impl From<regex::Error> for Error {
    fn from(err: regex::Error) -> Error {
        Error {
            desc: format!("regex error: {}", err),
            kind: ErrorKind::Regex(err),
            detail: None,
        }
    }
}

impl From<FromUtf8Error> for Error {
    fn from(err: FromUtf8Error) -> Error {
        Error::generic(format!("UTF-8 error: {}", err))
    }
}

impl From<fmt::Error> for Error {
    fn from(_: fmt::Error) -> Error {
        Error::generic("formatting error")
    }
}

impl From<String> for Error {
    fn from(err: String) -> Error {
        Error::generic(err)
    }
}

impl From<&str> for Error {
    fn from(err: &str) -> Error {
        Error::generic(err)
    }
}
