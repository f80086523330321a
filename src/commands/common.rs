// Common helpers for store commands

use chrono::{SecondsFormat, Utc};
use uuid::Uuid;

pub const ID_LEN: usize = 8;

/// Current UTC timestamp, RFC 3339 with milliseconds
pub fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Short random id (first 8 hex chars of a v4 UUID)
pub fn newId() -> String {
    Uuid::new_v4().simple().to_string()[..ID_LEN].to_string()
}

/// Short id not already taken by `taken`
pub fn uniqueId(mut taken: impl FnMut(&str) -> bool) -> String {
    loop {
        let id = newId();
        if !taken(&id) {
            return id;
        }
    }
}
