//! Structural Object Engine
//!
//! Recursive algorithms over [`Value`](crate::value::Value): equality, hash,
//! clone, merge, flatten/unflatten, diff and path access.

mod clone;
mod diff;
mod equality;
mod flatten;
mod hash;
mod merge;
mod path;


pub use clone::deep_clone;
pub use diff::{diff, Change, ObjectDiff};
pub use equality::{deep_equal, strict_equal};
pub use flatten::{flatten, unflatten, DEFAULT_SEPARATOR};
pub use hash::{content_digest, content_key, hash, hash_with, sha256_base64, CONTENT_KEY_LENGTH};
pub use merge::deep_merge;
pub use path::{get_path, set_path, PATH_SEPARATOR};

pub(crate) use path::resolve;
