// Command vocabulary for the bridge channel.
//
// The channel tunnels a fixed set of commands through a single
// string-in/string-out host call. A wire string is the command's
// literal prefix, immediately followed by the payload for the two
// commands that carry one. There is no escaping and no length field:
// a payload that itself begins with another command's prefix would
// decode as that command. Upholding that invariant is the caller's
// responsibility; the codec does not try to repair it.

// ── Command prefixes ───────────────────────────────────────────────
pub const QUERY_SERVER_VERSION: &str = "serverVersion";
pub const MIGRATE_OLD_CONFIG_FILE: &str = "migrateOldConfigFile";
pub const QUERY_CONFIG: &str = "queryConfig";
pub const UPDATE_CONFIG: &str = "updateConfig:";
pub const REBOOT_THE_SYSTEM: &str = "rebootTheSystem";
pub const FORCE_STOP: &str = "forceStop:";

// ── Boolean result sentinels ───────────────────────────────────────
pub const EXEC_SUCCEED: &str = "1";
pub const EXEC_FAILED: &str = "0";

/// A request the channel can carry. Closed set; there is no
/// catch-all variant because unrecognized wire strings are not
/// channel traffic at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    QueryServerVersion,
    MigrateOldConfig,
    QueryConfig,
    UpdateConfig(String),
    RebootSystem,
    ForceStop(String),
}

impl Command {
    /// Encode into the wire string: prefix plus verbatim payload.
    #[must_use]
    pub fn encode(&self) -> String {
        match self {
            Self::QueryServerVersion => QUERY_SERVER_VERSION.to_string(),
            Self::MigrateOldConfig => MIGRATE_OLD_CONFIG_FILE.to_string(),
            Self::QueryConfig => QUERY_CONFIG.to_string(),
            Self::UpdateConfig(payload) => format!("{UPDATE_CONFIG}{payload}"),
            Self::RebootSystem => REBOOT_THE_SYSTEM.to_string(),
            Self::ForceStop(package) => format!("{FORCE_STOP}{package}"),
        }
    }

    /// Decode a wire string. Exact matches for the no-payload
    /// commands are tested first, then the payload-bearing prefixes.
    /// Anything else is not channel traffic and decodes to `None`.
    #[must_use]
    pub fn decode(wire: &str) -> Option<Self> {
        match wire {
            QUERY_SERVER_VERSION => return Some(Self::QueryServerVersion),
            MIGRATE_OLD_CONFIG_FILE => return Some(Self::MigrateOldConfig),
            QUERY_CONFIG => return Some(Self::QueryConfig),
            REBOOT_THE_SYSTEM => return Some(Self::RebootSystem),
            _ => {}
        }

        if let Some(payload) = wire.strip_prefix(UPDATE_CONFIG) {
            return Some(Self::UpdateConfig(payload.to_string()));
        }
        if let Some(package) = wire.strip_prefix(FORCE_STOP) {
            return Some(Self::ForceStop(package.to_string()));
        }
        None
    }
}
