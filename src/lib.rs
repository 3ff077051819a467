//! A Burrows-Wheeler Transform and FM-index full-text search engine.
//!
//! Build an [`Index`] over a byte string, then answer two queries against
//! it: [`Index::count`] (how many times does a pattern occur?) and
//! [`Index::locate`] (at which offsets?). [`bwt::forward`] and
//! [`bwt::inverse`] are usable on their own if only the transform itself is
//! needed.
//!
//! ```
//! use bwt_fmindex::Index;
//!
//! let index = Index::build(b"abracadabra").unwrap();
//! assert_eq!(index.count(b"abra"), 2);
//! assert_eq!(index.locate(b"abra"), vec![0, 7]);
//! ```

mod alphabet;
pub mod bwt;
mod error;
mod index;
mod occurrence;
mod oracle;
pub mod serialize;
pub mod suffix_array;

pub use error::{Error, Result};
pub use index::{Index, IndexBuilder};
pub use oracle::{OracleVariant, DEFAULT_CHECKPOINT_STEP};
