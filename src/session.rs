//! Explicit session context carrying the logged-in identity.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::error::ReportError;

/// Identity of the current user, if any.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    identity: Option<String>,
}

impl Session {
    /// A session without an identity.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A session for `identity`, kept exactly as given. An empty identity yields an anonymous
    /// session.
    pub fn with_identity(identity: impl Into<String>) -> Self {
        let identity = identity.into();
        Self {
            identity: (!identity.is_empty()).then_some(identity),
        }
    }

    /// The opaque identity, if logged in.
    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    /// Forgets the identity.
    pub fn logout(&mut self) {
        self.identity = None;
    }
}

/// Session persisted as a single-line text file.
#[derive(Clone, Debug)]
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    /// Default file name used when no explicit path is configured.
    pub const DEFAULT_FILE_NAME: &'static str = ".sleep_report_session";

    /// Creates a handle for the file at `path`. Nothing is read until [`SessionFile::load`].
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the session file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the stored session; a missing or blank file is an anonymous session.
    pub fn load(&self) -> Result<Session, ReportError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Session::with_identity(contents.trim())),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("no session file at {}", self.path.display());
                Ok(Session::anonymous())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Writes the session, removing the file for anonymous sessions.
    pub fn store(&self, session: &Session) -> Result<(), ReportError> {
        match session.identity() {
            Some(identity) => {
                fs::write(&self.path, format!("{identity}\n"))?;
                info!("stored session in {}", self.path.display());
                Ok(())
            }
            None => self.clear(),
        }
    }

    /// Removes the stored session. Clearing an absent session is not an error.
    pub fn clear(&self) -> Result<(), ReportError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!("cleared session {}", self.path.display());
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
