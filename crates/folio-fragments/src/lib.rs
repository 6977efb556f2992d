//! Folio Fragments
//!
//! Every view of the site is a fragment of markup stored at
//! `<root>/<view><extension>`. This crate names views, fetches their
//! fragments over a pluggable transport, and turns every outcome into a
//! [`FragmentResult`] so that callers never see a transport error.

mod error;
mod loader;
mod source;
mod view;

pub use error::TransportError;
pub use loader::{classify_response, FragmentLoader, FragmentResult, DEFAULT_EXTENSION};
pub use source::{source_for_root, DirSource, FetchResponse, FragmentSource, HttpSource, StaticSource};
pub use view::{ViewName, DEFAULT_VIEW};

pub type Result<T> = std::result::Result<T, TransportError>;
