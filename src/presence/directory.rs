use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::{Collation, Error, Result, UserId};

/// A user as published by the intranet directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    #[serde(skip)]
    pub id: UserId,
    pub name: String,
    #[serde(rename = "image")]
    pub image_url: String,
}

// Document layout of the directory file.
#[derive(Deserialize)]
struct IntranetXml {
    server: ServerXml,
    users: UsersXml,
}

#[derive(Deserialize)]
struct ServerXml {
    host: String,
    protocol: String,
}

#[derive(Deserialize)]
struct UsersXml {
    #[serde(rename = "user", default)]
    users: Vec<UserXml>,
}

#[derive(Deserialize)]
struct UserXml {
    #[serde(rename = "@id")]
    id: UserId,
    name: String,
    avatar: AvatarXml,
}

#[derive(Deserialize)]
struct AvatarXml {
    #[serde(rename = "$text")]
    path: String,
}

/// Parses a directory document into profiles keyed by user id.
pub fn parse_directory(xml: &str) -> Result<BTreeMap<UserId, UserProfile>> {
    let doc: IntranetXml = quick_xml::de::from_str(xml)?;
    let ServerXml { host, protocol } = doc.server;

    Ok(doc
        .users
        .users
        .into_iter()
        .map(|user| {
            let profile = UserProfile {
                id: user.id,
                name: user.name,
                image_url: format!("{protocol}://{host}{}", user.avatar.path),
            };
            (user.id, profile)
        })
        .collect())
}

/// Reads and parses the directory file at `path`.
pub fn load_directory(path: &Path) -> Result<BTreeMap<UserId, UserProfile>> {
    let xml = fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let profiles = parse_directory(&xml)?;
    debug!(path = %path.display(), users = profiles.len(), "Loaded user directory.");
    Ok(profiles)
}

/// Local copy of the user directory plus the endpoint it is refreshed from.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    path: PathBuf,
    remote_url: String,
    collation: Collation,
}

impl DirectorySource {
    pub fn new(path: impl Into<PathBuf>, remote_url: impl Into<String>, collation: Collation) -> Self {
        Self {
            path: path.into(),
            remote_url: remote_url.into(),
            collation,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<BTreeMap<UserId, UserProfile>> {
        load_directory(&self.path)
    }

    /// Profiles ordered by display name using the configured collation.
    pub fn load_sorted(&self) -> Result<Vec<UserProfile>> {
        let mut profiles: Vec<UserProfile> = self.load()?.into_values().collect();
        profiles.sort_by(|a, b| self.collation.compare(&a.name, &b.name));
        Ok(profiles)
    }

    /// Downloads a fresh directory document and replaces the local file.
    ///
    /// The download is validated before anything is written, and the file is
    /// swapped in with a rename so readers never observe a partial document.
    pub async fn refresh(&self, client: &reqwest::Client) -> Result<usize> {
        info!(url = %self.remote_url, "Downloading user directory.");
        let body = client
            .get(&self.remote_url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let users = parse_directory(&body)?.len();
        self.replace_local_copy(body.as_bytes())?;

        info!(path = %self.path.display(), users, "User directory refreshed.");
        Ok(users)
    }

    fn replace_local_copy(&self, contents: &[u8]) -> Result<()> {
        let persist_err = |source: std::io::Error| Error::Persist {
            path: self.path.clone(),
            source,
        };
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(persist_err)?;
        tmp.write_all(contents).map_err(persist_err)?;
        tmp.persist(&self.path).map_err(|e| persist_err(e.error))?;
        Ok(())
    }
}
