// Interception glue: one decoded host call in, one reply out.
//
// The dispatcher is consulted first; whenever it declines, the call
// falls through to the original system behavior, so every caller
// except the bridge client sees an unmodified host.

use std::sync::Arc;

use privbridge_common::protocol::envelope::{HostCall, HostReply};
use tracing::debug;

use crate::dispatch::Dispatcher;

/// Original behavior of the three intercepted methods.
pub trait LegacySystem: Send + Sync {
    fn installer_package_name(&self, arg: &str) -> Option<String>;
    fn check_uid_permission(&self, permission: &str, uid: u32) -> bool;
    fn check_permission(&self, permission: &str, pid: i32, uid: u32) -> bool;
}

/// Stand-in used when the host has no backing implementation of the
/// intercepted methods: no installer records, every check denied.
pub struct DenyAllSystem;

impl LegacySystem for DenyAllSystem {
    fn installer_package_name(&self, _arg: &str) -> Option<String> {
        None
    }

    fn check_uid_permission(&self, _permission: &str, _uid: u32) -> bool {
        false
    }

    fn check_permission(&self, _permission: &str, _pid: i32, _uid: u32) -> bool {
        false
    }
}

#[derive(Clone)]
pub struct ChannelServer {
    dispatcher: Arc<Dispatcher>,
    legacy: Arc<dyn LegacySystem>,
}

impl ChannelServer {
    pub fn new(dispatcher: Arc<Dispatcher>, legacy: Arc<dyn LegacySystem>) -> Self {
        Self { dispatcher, legacy }
    }

    /// Handle one raw request line from a connection whose peer
    /// credentials resolved to `caller_uid`. Undecodable lines get a
    /// null-value reply rather than an error; nothing on this path is
    /// allowed to fault.
    pub fn handle_line(&self, caller_uid: u32, raw: &[u8]) -> HostReply {
        let call = match serde_json::from_slice::<HostCall>(raw) {
            Ok(call) => call,
            Err(error) => {
                debug!(%error, "dropping undecodable host call");
                return HostReply::value(None);
            }
        };
        self.handle_call(caller_uid, call)
    }

    pub fn handle_call(&self, caller_uid: u32, call: HostCall) -> HostReply {
        match call {
            HostCall::Installer { arg } => {
                let value = match self.dispatcher.handle_call(caller_uid, &arg) {
                    Some(reply) => Some(reply),
                    None => self.legacy.installer_package_name(&arg),
                };
                HostReply::value(value)
            }
            // The override short-circuits; the legacy check only runs
            // for non-client subjects, whose outcome stays untouched.
            HostCall::CheckUidPermission { permission, uid } => {
                let granted = self.dispatcher.overrides_permission_check(uid)
                    || self.legacy.check_uid_permission(&permission, uid);
                HostReply::granted(granted)
            }
            HostCall::CheckPermission { permission, pid, uid } => {
                let granted = self.dispatcher.overrides_permission_check(uid)
                    || self.legacy.check_permission(&permission, pid, uid);
                HostReply::granted(granted)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use tempfile::TempDir;

    use super::*;
    use crate::actions::PrivilegedActions;
    use crate::dispatch::ConfigObserver;
    use crate::identity::IdentityResolver;
    use crate::store::ConfigStore;

    const CLIENT_UID: u32 = 10_234;
    const OTHER_UID: u32 = 1_000;

    struct FixedResolver(u32);

    impl IdentityResolver for FixedResolver {
        fn resolve(&self, _app: &str) -> anyhow::Result<u32> {
            Ok(self.0)
        }
    }

    struct NoActions;

    impl PrivilegedActions for NoActions {
        fn force_stop(&self, _app: &str) -> anyhow::Result<()> {
            Ok(())
        }

        fn reboot(&self) -> anyhow::Result<()> {
            Ok(())
        }
    }

    struct NoObserver;

    impl ConfigObserver for NoObserver {
        fn apply(&self, _document: &privbridge_common::document::ConfigDocument) {}
    }

    /// Legacy system that records what reached it and answers with
    /// fixed originals.
    struct RecordingLegacy {
        installer_calls: Mutex<Vec<String>>,
        permission_answer: bool,
    }

    impl LegacySystem for RecordingLegacy {
        fn installer_package_name(&self, arg: &str) -> Option<String> {
            self.installer_calls.lock().unwrap().push(arg.to_string());
            Some("com.android.vending".to_string())
        }

        fn check_uid_permission(&self, _permission: &str, _uid: u32) -> bool {
            self.permission_answer
        }

        fn check_permission(&self, _permission: &str, _pid: i32, _uid: u32) -> bool {
            self.permission_answer
        }
    }

    fn server(permission_answer: bool) -> (ChannelServer, Arc<RecordingLegacy>, TempDir) {
        let dir = TempDir::new().unwrap();
        let dispatcher = Dispatcher::new(
            "bridge-client",
            Arc::new(FixedResolver(CLIENT_UID)),
            Arc::new(NoActions),
            Arc::new(NoObserver),
            ConfigStore::new(dir.path().join("config.json"), dir.path().join("legacy.json")),
        )
        .with_allow_all_callers(false);
        let legacy =
            Arc::new(RecordingLegacy { installer_calls: Mutex::new(Vec::new()), permission_answer });
        (ChannelServer::new(Arc::new(dispatcher), legacy.clone()), legacy, dir)
    }

    #[test]
    fn channel_traffic_from_the_client_never_reaches_the_legacy_call() {
        let (server, legacy, _dir) = server(false);
        let reply =
            server.handle_call(CLIENT_UID, HostCall::Installer { arg: "forceStop:x".into() });
        assert_eq!(reply, HostReply::value(Some("1".to_string())));
        assert!(legacy.installer_calls.lock().unwrap().is_empty());
    }

    #[test]
    fn non_client_callers_get_the_original_installer_result() {
        let (server, legacy, _dir) = server(false);
        let reply =
            server.handle_call(OTHER_UID, HostCall::Installer { arg: "serverVersion".into() });
        assert_eq!(reply, HostReply::value(Some("com.android.vending".to_string())));
        assert_eq!(legacy.installer_calls.lock().unwrap().as_slice(), ["serverVersion"]);
    }

    #[test]
    fn non_channel_strings_from_the_client_fall_through() {
        let (server, legacy, _dir) = server(false);
        let reply =
            server.handle_call(CLIENT_UID, HostCall::Installer { arg: "com.example.app".into() });
        assert_eq!(reply, HostReply::value(Some("com.android.vending".to_string())));
        assert_eq!(legacy.installer_calls.lock().unwrap().as_slice(), ["com.example.app"]);
    }

    #[test]
    fn permission_checks_are_granted_for_the_client_uid_only() {
        let (server, _legacy, _dir) = server(false);
        let client_check = server.handle_call(
            0,
            HostCall::CheckUidPermission { permission: "net.RAW".into(), uid: CLIENT_UID },
        );
        assert_eq!(client_check, HostReply::granted(true));

        let other_check = server.handle_call(
            0,
            HostCall::CheckPermission { permission: "net.RAW".into(), pid: 42, uid: OTHER_UID },
        );
        assert_eq!(other_check, HostReply::granted(false));
    }

    #[test]
    fn non_client_permission_checks_keep_the_original_outcome() {
        let (server, _legacy, _dir) = server(true);
        let reply = server.handle_call(
            0,
            HostCall::CheckUidPermission { permission: "net.RAW".into(), uid: OTHER_UID },
        );
        assert_eq!(reply, HostReply::granted(true));
    }

    #[test]
    fn undecodable_lines_reply_with_a_null_value() {
        let (server, _legacy, _dir) = server(false);
        assert_eq!(server.handle_line(CLIENT_UID, b"not json"), HostReply::value(None));
    }
}
