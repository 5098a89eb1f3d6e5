//! # Projection Options
//!
//! Knobs that change what the projectors emit. With the defaults every fact
//! produces its full set of units, repeats included.

use crate::UserKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Options shared by every cursor an engine hands out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ProjectionOptions {
    /// Suppress repeated user nodes (graph) and user rows (relational) by key.
    ///
    /// Off by default: every fact emits its own user unit and the backend's
    /// upsert-by-key makes the repeats harmless. When on, each cursor keeps
    /// the set of user keys it has already emitted. Catalog output is never
    /// deduplicated.
    pub dedup_users: bool,
}

impl ProjectionOptions {
    /// Options with user deduplication enabled.
    #[must_use]
    pub fn dedup_users() -> Self {
        Self { dedup_users: true }
    }
}

/// Per-cursor record of emitted user keys. Empty when deduplication is off.
#[derive(Debug, Clone, Default)]
pub(crate) struct SeenUsers {
    seen: Option<BTreeSet<UserKey>>,
}

impl SeenUsers {
    pub(crate) fn new(options: &ProjectionOptions) -> Self {
        Self {
            seen: options.dedup_users.then(BTreeSet::new),
        }
    }

    /// Returns `true` if a unit for `key` should be emitted.
    pub(crate) fn admit(&mut self, key: &UserKey) -> bool {
        match &mut self.seen {
            Some(seen) => seen.insert(key.clone()),
            None => true,
        }
    }
}
