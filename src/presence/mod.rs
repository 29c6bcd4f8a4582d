pub mod cache;
pub mod collation;
pub mod directory;
pub mod records;
pub mod stats;
pub mod time;

use std::path::PathBuf;
use thiserror::Error;

pub use cache::{PresenceStore, TtlCache};
pub use collation::Collation;
pub use directory::{DirectorySource, UserProfile};
pub use records::{PresenceByUser, PresenceSpan, UserId, UserPresence};

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Malformed user directory: {0}")]
    Directory(#[from] quick_xml::DeError),
    #[error("User directory download failed: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("Failed to replace {path:?}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
