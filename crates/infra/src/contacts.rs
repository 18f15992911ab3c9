//! Device-local contact index for avatar matching.
//!
//! The host platform reads the device's contacts (behind its own
//! permission prompt) and hands us hashed phone numbers with avatar
//! URIs. Matching is a pure in-memory lookup.

use std::collections::HashMap;

use momentum_core::realtime::ports::AvatarLookup;

/// Immutable hash-to-avatar index built from one contact read.
#[derive(Debug, Default)]
pub struct DeviceContacts {
    avatars: HashMap<String, String>,
}

impl DeviceContacts {
    /// Build the index from `(phone_hash, avatar_uri)` pairs. Later
    /// duplicates win, matching the order the device returns them in.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        let avatars =
            entries.into_iter().map(|(hash, uri)| (hash.into(), uri.into())).collect();
        Self { avatars }
    }

    pub fn len(&self) -> usize {
        self.avatars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.avatars.is_empty()
    }
}

impl AvatarLookup for DeviceContacts {
    fn avatar_for(&self, phone_hash: &str) -> Option<String> {
        self.avatars.get(phone_hash).cloned()
    }
}
