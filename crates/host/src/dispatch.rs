// The privileged dispatcher: authorization gate, command dispatch,
// permission-check override.
//
// Every branch converts failure into a defined reply or a no-op.
// Nothing here may panic or propagate an error to the transport; the
// worst failure mode for the bridge is destabilizing the host process
// it runs in.

use std::sync::{Arc, OnceLock};

use privbridge_common::document::ConfigDocument;
use privbridge_common::protocol::command::{Command, EXEC_FAILED, EXEC_SUCCEED};
use tracing::{debug, info, warn};

use crate::actions::PrivilegedActions;
use crate::identity::IdentityResolver;
use crate::store::ConfigStore;

/// Wire-visible dispatcher version, returned for `serverVersion`.
/// Bumped on every change a client could observe.
pub const SERVER_VERSION: u32 = 4;

/// Receives each accepted config document before it is persisted.
pub trait ConfigObserver: Send + Sync {
    fn apply(&self, document: &ConfigDocument);
}

/// One long-lived dispatcher instance, constructed at host start and
/// shared by every connection. The only mutable state is the cached
/// client uid.
pub struct Dispatcher {
    client_app: String,
    allow_all_callers: bool,
    resolver: Arc<dyn IdentityResolver>,
    actions: Arc<dyn PrivilegedActions>,
    observer: Arc<dyn ConfigObserver>,
    store: ConfigStore,
    client_uid: OnceLock<u32>,
}

impl Dispatcher {
    pub fn new(
        client_app: impl Into<String>,
        resolver: Arc<dyn IdentityResolver>,
        actions: Arc<dyn PrivilegedActions>,
        observer: Arc<dyn ConfigObserver>,
        store: ConfigStore,
    ) -> Self {
        Self {
            client_app: client_app.into(),
            allow_all_callers: cfg!(debug_assertions),
            resolver,
            actions,
            observer,
            store,
            client_uid: OnceLock::new(),
        }
    }

    /// Serve channel traffic from any caller. Defaults to the build
    /// profile (`cfg!(debug_assertions)`); release hosts keep it off.
    #[must_use]
    pub fn with_allow_all_callers(mut self, allow: bool) -> Self {
        self.allow_all_callers = allow;
        self
    }

    /// Handle the repurposed string-in/string-out call.
    ///
    /// `None` means the dispatcher does not touch the call: either the
    /// caller is not the client, or the argument is not channel
    /// traffic. The transport falls through to the original behavior
    /// in both cases, so non-channel callers see an unmodified system.
    pub fn handle_call(&self, caller_uid: u32, arg: &str) -> Option<String> {
        if !self.is_client(caller_uid) && !self.allow_all_callers {
            return None;
        }
        let command = Command::decode(arg)?;
        Some(self.execute(command))
    }

    /// Whether a permission check for `subject_uid` should be forced
    /// to "granted". Runs on the hot path of every permission check
    /// the host services: the miss path is one cached comparison.
    pub fn overrides_permission_check(&self, subject_uid: u32) -> bool {
        self.is_client(subject_uid)
    }

    fn is_client(&self, uid: u32) -> bool {
        self.client_uid() == Some(uid)
    }

    /// Resolved uid of the legitimate client, cached after the first
    /// successful lookup. Resolution failure means "no known client"
    /// and fails closed; the lookup is retried on the next call.
    fn client_uid(&self) -> Option<u32> {
        if let Some(uid) = self.client_uid.get() {
            return Some(*uid);
        }
        match self.resolver.resolve(&self.client_app) {
            Ok(uid) => {
                // Idempotent fill: concurrent first calls race to set
                // the same resolved value, losers discard theirs.
                let _ = self.client_uid.set(uid);
                Some(uid)
            }
            // No logging here: this path is hit by every caller while
            // the client is not installed.
            Err(_) => None,
        }
    }

    fn execute(&self, command: Command) -> String {
        match command {
            Command::QueryServerVersion => SERVER_VERSION.to_string(),
            Command::MigrateOldConfig => {
                self.migrate();
                String::new()
            }
            // Missing or unreadable file is a normal "no config yet" state.
            Command::QueryConfig => self.store.read_raw().unwrap_or_default(),
            Command::RebootSystem => {
                info!("reboot requested over the bridge");
                if let Err(error) = self.actions.reboot() {
                    warn!(%error, "reboot request failed");
                }
                String::new()
            }
            Command::ForceStop(app) => self.force_stop(&app),
            Command::UpdateConfig(payload) => {
                self.update_config(&payload);
                String::new()
            }
        }
    }

    fn force_stop(&self, app: &str) -> String {
        match self.actions.force_stop(app) {
            Ok(()) => EXEC_SUCCEED.to_string(),
            Err(error) => {
                warn!(app, %error, "force stop failed");
                EXEC_FAILED.to_string()
            }
        }
    }

    fn update_config(&self, payload: &str) {
        let document = match ConfigDocument::from_json(payload) {
            Ok(document) => document,
            Err(error) => {
                // Malformed writes are dropped without persisting
                // partial state; the client gets the same empty reply.
                debug!(%error, "rejected malformed config update");
                return;
            }
        };
        self.observer.apply(&document);
        if let Err(error) = self.store.write_raw(payload) {
            warn!(%error, "failed to persist config update");
        }
    }

    fn migrate(&self) {
        match self.store.migrate_legacy() {
            Ok(true) => info!("migrated legacy config file"),
            Ok(false) => {}
            Err(error) => warn!(%error, "legacy config migration failed"),
        }
    }
}
