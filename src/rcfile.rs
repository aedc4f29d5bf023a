//! Credential store backed by a YAML file (`~/.trc` by default).
//!
//! The file maps a profile name (the account's screen name) to one or more
//! consumer keys, each holding the access token pair obtained through the
//! PIN authorization flow. One `(profile, consumer_key)` pair is the default.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::mask_secret;
use crate::error::{CliError, Result};

/// OAuth credentials for one account under one consumer key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub consumer_key: String,
    pub consumer_secret: String,
    pub token: String,
    pub secret: String,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct RcConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default_profile: Option<(String, String)>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct RcData {
    #[serde(default)]
    profiles: BTreeMap<String, BTreeMap<String, Credentials>>,
    #[serde(default)]
    configuration: RcConfiguration,
}

/// In-memory view of the credential file.
#[derive(Debug, Clone)]
pub struct RcFile {
    path: PathBuf,
    data: RcData,
    unreadable: Option<String>,
}

impl RcFile {
    /// Loads the credential file at `path`. A missing file is an empty store.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            info!("No credential file at {}, starting empty", path.display());
            return Ok(RcFile {
                path,
                data: RcData::default(),
                unreadable: None,
            });
        }

        let content = fs::read_to_string(&path)?;
        let data: RcData = if content.trim().is_empty() {
            RcData::default()
        } else {
            serde_yaml::from_str(&content)?
        };
        debug!(
            "Loaded {} profile(s) from {}",
            data.profiles.len(),
            path.display()
        );
        Ok(RcFile {
            path,
            data,
            unreadable: None,
        })
    }

    /// Loads the credential file, falling back to an empty store when it cannot
    /// be read or parsed. The failure is kept and reported by
    /// [`RcFile::ensure_readable`], so only commands that need credentials fail.
    pub fn load_or_empty(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match RcFile::load(path) {
            Ok(rcfile) => rcfile,
            Err(e) => {
                warn!("Ignoring unreadable credential file {}: {}", path.display(), e);
                RcFile {
                    path: path.to_path_buf(),
                    data: RcData::default(),
                    unreadable: Some(e.to_string()),
                }
            }
        }
    }

    /// Fails if the store was loaded from a file that could not be read.
    pub fn ensure_readable(&self) -> Result<()> {
        match &self.unreadable {
            Some(reason) => Err(CliError::Credentials(format!(
                "cannot read {} ({}); run `t authorize` to replace it",
                self.path.display(),
                reason
            ))),
            None => Ok(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the store back to disk, owner-readable only on Unix.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = serde_yaml::to_string(&self.data)?;

        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&self.path)?;

        // The mode above only applies to newly created files.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(0o600))?;
        }
        file.write_all(content.as_bytes())?;

        info!("Saved credential file {}", self.path.display());
        Ok(())
    }

    /// The `(profile, consumer_key)` pair marked as default.
    pub fn default_profile(&self) -> Option<(&str, &str)> {
        self.data
            .configuration
            .default_profile
            .as_ref()
            .map(|(name, key)| (name.as_str(), key.as_str()))
    }

    /// Credentials of the default profile.
    pub fn active(&self) -> Option<&Credentials> {
        let (name, key) = self.default_profile()?;
        let credentials = self.data.profiles.get(name)?.get(key);
        if credentials.is_none() {
            warn!("Default profile {}/{} is not in the credential file", name, key);
        }
        credentials
    }

    /// Credentials of the default profile, or a `Credentials` error.
    pub fn require_active(&self) -> Result<&Credentials> {
        self.ensure_readable()?;
        self.active().ok_or_else(|| {
            CliError::Credentials(format!(
                "no authorized profile in {}; run `t authorize` first",
                self.path.display()
            ))
        })
    }

    /// Profile names and their consumer keys, sorted by name.
    pub fn profiles(&self) -> impl Iterator<Item = (&str, Vec<&str>)> {
        self.data
            .profiles
            .iter()
            .map(|(name, keys)| (name.as_str(), keys.keys().map(String::as_str).collect()))
    }

    /// Stores credentials and makes them the default profile.
    pub fn upsert(&mut self, credentials: Credentials) {
        debug!(
            "Storing profile {} with token {}",
            credentials.username,
            mask_secret(&credentials.token)
        );
        let name = credentials.username.clone();
        let key = credentials.consumer_key.clone();
        self.data
            .profiles
            .entry(name.clone())
            .or_default()
            .insert(key.clone(), credentials);
        self.data.configuration.default_profile = Some((name, key));
        self.unreadable = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Credentials {
        Credentials {
            username: "testcli".to_string(),
            consumer_key: "abc123".to_string(),
            consumer_secret: "asdfasd223sd2".to_string(),
            token: "7505382-cebdct6bwobn".to_string(),
            secret: "epzrjvxtumoc".to_string(),
        }
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let rcfile = RcFile::load(dir.path().join("missing")).unwrap();
        assert!(rcfile.active().is_none());
        assert_eq!(rcfile.profiles().count(), 0);
        assert!(matches!(
            rcfile.require_active(),
            Err(CliError::Credentials(_))
        ));
    }

    #[test]
    fn test_upsert_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("trc");
        let mut rcfile = RcFile::load(&path).unwrap();
        rcfile.upsert(sample());
        rcfile.save().unwrap();

        let reloaded = RcFile::load(&path).unwrap();
        assert_eq!(reloaded.default_profile(), Some(("testcli", "abc123")));
        assert_eq!(reloaded.active(), Some(&sample()));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn test_parses_trc_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".trc");
        fs::write(
            &path,
            "profiles:\n  testcli:\n    abc123:\n      username: testcli\n      consumer_key: abc123\n      consumer_secret: asdfasd223sd2\n      token: 7505382-cebdct6bwobn\n      secret: epzrjvxtumoc\nconfiguration:\n  default_profile:\n  - testcli\n  - abc123\n",
        )
        .unwrap();

        let rcfile = RcFile::load(&path).unwrap();
        let active = rcfile.require_active().unwrap();
        assert_eq!(active.username, "testcli");
        assert_eq!(active.secret, "epzrjvxtumoc");
        let profiles: Vec<_> = rcfile.profiles().collect();
        assert_eq!(profiles, vec![("testcli", vec!["abc123"])]);
    }

    #[test]
    fn test_corrupt_file_loads_as_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".trc");
        fs::write(&path, "profiles: [not, a, map\n").unwrap();

        assert!(matches!(RcFile::load(&path), Err(CliError::Yaml(_))));

        let mut rcfile = RcFile::load_or_empty(&path);
        assert_eq!(rcfile.profiles().count(), 0);
        assert!(matches!(
            rcfile.ensure_readable(),
            Err(CliError::Credentials(_))
        ));
        let err = rcfile.require_active().unwrap_err();
        assert!(err.to_string().contains("cannot read"));

        rcfile.upsert(sample());
        rcfile.ensure_readable().unwrap();
        rcfile.save().unwrap();
        let reloaded = RcFile::load(&path).unwrap();
        assert_eq!(reloaded.active(), Some(&sample()));
    }

    #[cfg(unix)]
    #[test]
    fn test_save_restricts_existing_file() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".trc");
        fs::write(&path, "").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        let mut rcfile = RcFile::load(&path).unwrap();
        rcfile.upsert(sample());
        rcfile.save().unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(RcFile::load(&path).unwrap().active(), Some(&sample()));
    }
}
