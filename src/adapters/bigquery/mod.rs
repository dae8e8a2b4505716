//! BigQuery Storage Read adapter
//!
//! Tables are read through Storage API read sessions. A session is opened per
//! time window over the table's timestamp column, its streams are read in
//! parallel, and Arrow record batches are decoded into JSON records. Windows
//! keep every session well inside its server-side lifetime.
//!
//! The page token carries the current window and, while a session is open,
//! its stream offsets, so a read can resume mid-session.

mod backend;
mod connector;
mod decode;
mod token;

pub use backend::{ReadSession, RestBackend, SessionRequest, StorageReadBackend, StreamPage};
pub use connector::{BigQueryConnector, DEFAULT_WINDOW_DAYS};
pub use decode::{decode_arrow, records_from_batches};
pub use token::{PageToken, SessionState, StreamState};
