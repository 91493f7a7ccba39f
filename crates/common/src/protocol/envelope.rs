// Socket envelope for the three intercepted host methods.
//
// Framing is newline-delimited JSON over the host's Unix socket.
// The envelope only carries the outer call; the channel string inside
// `Installer { arg }` keeps its own prefix-based format.

use serde::{Deserialize, Serialize};

/// One inbound call on the host socket, one per intercepted method.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum HostCall {
    /// The repurposed string-in/string-out call the channel rides on.
    Installer { arg: String },
    /// Permission check keyed by subject uid.
    CheckUidPermission { permission: String, uid: u32 },
    /// Permission check keyed by pid and subject uid.
    CheckPermission { permission: String, pid: i32, uid: u32 },
}

/// The reply line for a [`HostCall`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum HostReply {
    /// Reply to either permission check. Listed first because the
    /// untagged decode tries variants in order: `granted` is required,
    /// while `Value`'s optional `value` key would match any object.
    Granted { granted: bool },
    /// Reply to `Installer`: the original call's nullable string result.
    Value { value: Option<String> },
}

impl HostReply {
    #[must_use]
    pub fn value(value: Option<String>) -> Self {
        Self::Value { value }
    }

    #[must_use]
    pub fn granted(granted: bool) -> Self {
        Self::Granted { granted }
    }
}
