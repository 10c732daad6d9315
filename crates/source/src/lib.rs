//! Source catalog for hosted meeting recordings.
//!
//! - **`SourceCatalog`** - list, resolve, download and delete recordings
//! - **`WebexCatalogClient`** - Webex REST API implementation, plus the site and
//!   people lookups an operator needs to pick a host
//!
//! Every catalog call takes an explicit [`SourceSession`]; the crate keeps no
//! process-wide state.

mod error;
mod traits;
mod types;
mod webex;

pub use error::SourceError;
pub use traits::SourceCatalog;
pub use types::{
    Credential, MeetingRecord, Person, RecordingQuery, RecordingStream, Site, SourceSession,
    SourceSettings, TransferMetadata,
};
pub use webex::WebexCatalogClient;
