// Caller identity resolution.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

/// Resolves a named application identity to its stable numeric uid.
///
/// Injected into the dispatcher so tests can substitute arbitrary
/// identities without a real account lookup.
pub trait IdentityResolver: Send + Sync {
    fn resolve(&self, app: &str) -> Result<u32>;
}

/// Resolves against the system account database. Each bridged client
/// application runs under its own dedicated account, so the account
/// name doubles as the application identifier.
pub struct PasswdResolver {
    passwd_path: PathBuf,
}

impl PasswdResolver {
    pub fn new() -> Self {
        Self { passwd_path: PathBuf::from("/etc/passwd") }
    }

    pub fn with_passwd_path(passwd_path: impl Into<PathBuf>) -> Self {
        Self { passwd_path: passwd_path.into() }
    }
}

impl Default for PasswdResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityResolver for PasswdResolver {
    fn resolve(&self, app: &str) -> Result<u32> {
        let contents = std::fs::read_to_string(&self.passwd_path)
            .with_context(|| format!("failed to read `{}`", self.passwd_path.display()))?;

        for line in contents.lines() {
            let mut fields = line.split(':');
            let (Some(name), _password, Some(uid)) =
                (fields.next(), fields.next(), fields.next())
            else {
                continue;
            };
            if name == app {
                return uid
                    .parse::<u32>()
                    .with_context(|| format!("malformed uid `{uid}` for account `{app}`"));
            }
        }

        bail!("no account named `{app}`")
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn passwd_file(contents: &str) -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("passwd");
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn resolves_named_account() {
        let (_dir, path) = passwd_file(
            "root:x:0:0:root:/root:/bin/bash\n\
             bridge-client:x:10234:10234::/nonexistent:/usr/sbin/nologin\n",
        );
        let resolver = PasswdResolver::with_passwd_path(path);
        assert_eq!(resolver.resolve("bridge-client").unwrap(), 10_234);
        assert_eq!(resolver.resolve("root").unwrap(), 0);
    }

    #[test]
    fn unknown_account_is_an_error() {
        let (_dir, path) = passwd_file("root:x:0:0:root:/root:/bin/bash\n");
        let resolver = PasswdResolver::with_passwd_path(path);
        assert!(resolver.resolve("bridge-client").is_err());
    }

    #[test]
    fn missing_database_is_an_error() {
        let dir = TempDir::new().unwrap();
        let resolver = PasswdResolver::with_passwd_path(dir.path().join("absent"));
        assert!(resolver.resolve("bridge-client").is_err());
    }

    #[test]
    fn malformed_uid_is_an_error_not_a_panic() {
        let (_dir, path) = passwd_file("bridge-client:x:not-a-uid:0::/:/bin/false\n");
        let resolver = PasswdResolver::with_passwd_path(path);
        assert!(resolver.resolve("bridge-client").is_err());
    }
}
