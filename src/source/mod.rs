//! Page sources
//!
//! A page source turns a [`PageToken`](crate::pagination::PageToken) into
//! a [`RawPage`]: the content plus the continuation signal read from it.
//!
//! - [`HttpPageSource`]: request/response pagination over HTTP
//! - [`ScrollPageSource`]: incremental loading behind a [`ScrollDriver`]
//!
//! Continuation markers are declared with [`SignalRules`] and compiled
//! once into a [`SignalDetector`].

mod http;
mod scroll;
mod signals;
mod types;

pub use http::HttpPageSource;
pub use scroll::{ScrollDriver, ScrollPageSource};
pub use signals::{CursorLocator, Fingerprint, Marker, SignalDetector, SignalRules};
pub use types::{PageSource, RawPage};

pub(crate) use signals::parse_selector;
