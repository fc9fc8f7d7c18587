//! Tracks metadata for a loading/rendering session.

use crate::log;

/// Metadata for a loading/rendering session.
///
/// When the calling program first uses one of the API entry points, e.g. [`Loader::new`],
/// there is no context yet where the library may start to track things.  This struct
/// provides that context.  It is cheap to clone; the loader hands a copy to the document
/// it creates, and the renderer reuses the document's copy.
///
/// [`Loader::new`]: crate::Loader::new
#[derive(Clone, Debug)]
pub struct Session {
    log_enabled: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            log_enabled: log::log_enabled(),
        }
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// A session with logging turned off, regardless of the environment.
    pub fn new_for_test_suite() -> Self {
        Self { log_enabled: false }
    }

    pub fn log_enabled(&self) -> bool {
        self.log_enabled
    }
}
