//! Content-derived identifiers for commits and blobs.
//!
//! Both are 40-character lowercase SHA-1 hex strings. Blob ids hash the
//! content together with the path it was added under, so identical bytes at
//! two paths get two ids. Commit ids hash the message, the tracked path names
//! and the formatted timestamp, never the blob contents.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

use crate::error::{Error, Result};

/// Length of a full hex object id.
pub const ID_HEX_LEN: usize = 40;

/// Length used when abbreviating ids in log output.
pub const SHORT_ID_LEN: usize = 7;

macro_rules! object_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Parse a full hex id, rejecting anything that is not 40 hex chars.
            pub fn parse(raw: &str) -> Result<Self> {
                let raw = raw.trim();
                if raw.len() != ID_HEX_LEN || !raw.chars().all(|c| c.is_ascii_hexdigit()) {
                    return Err(Error::CorruptObject {
                        id: raw.to_string(),
                        reason: format!("expected {ID_HEX_LEN} hex characters"),
                    });
                }
                Ok(Self(raw.to_ascii_lowercase()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Abbreviated form for human output.
            pub fn short(&self) -> &str {
                &self.0[..SHORT_ID_LEN.min(self.0.len())]
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

object_id!(
    /// Identifier of an immutable commit record.
    CommitId
);

object_id!(
    /// Identifier of an immutable blob.
    BlobId
);

impl BlobId {
    /// Hash file content together with the path it is tracked under.
    pub fn for_content(content: &[u8], path: &str) -> Self {
        let mut hasher = Sha1::new();
        hasher.update(content);
        hasher.update(path.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }
}

impl CommitId {
    /// Hash a commit's identity fields: message, each tracked path in order,
    /// then the formatted timestamp.
    pub fn for_commit<'a, I>(message: &str, paths: I, timestamp: &str) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut hasher = Sha1::new();
        hasher.update(message.as_bytes());
        for path in paths {
            hasher.update(path.as_bytes());
        }
        hasher.update(timestamp.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }
}
