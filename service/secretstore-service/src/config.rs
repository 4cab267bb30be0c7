use std::env;
use std::path::PathBuf;

/// Where the database lives (§6.2). `$SECRET_STORE_HOME` overrides the
/// default for tests and unusual setups; normal use resolves to
/// `$HOME/.local/secret-store`.
#[derive(Debug, Clone)]
pub struct Config {
    pub root: PathBuf,
}

impl Config {
    pub fn resolve() -> Self {
        let root = env::var_os("SECRET_STORE_HOME")
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|home| home.join(".local").join("secret-store")))
            .unwrap_or_else(|| PathBuf::from(".secret-store"));
        Self { root }
    }

    pub fn db_path(&self) -> PathBuf {
        self.root.join("data.db")
    }

    /// Creates the root directory with user-only permissions if it does not
    /// already exist. No-op on platforms without Unix permission bits.
    pub fn ensure_root(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.root)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o700);
            std::fs::set_permissions(&self.root, perms)?;
        }

        Ok(())
    }
}
