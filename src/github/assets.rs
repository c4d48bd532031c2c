use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Client;

use crate::error::{Error, Result};
use crate::models::Readme;
use crate::table::RowKey;

/// Writes per-repository assets under the site's public directory:
/// `readmes/{org}/{repo}.md` and `social-previews/{org}/{repo}.png`.
pub struct AssetStore {
    public_dir: PathBuf,
    client: Client,
    timeout: Duration,
}

impl AssetStore {
    pub fn new(public_dir: impl Into<PathBuf>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            public_dir: public_dir.into(),
            client,
            timeout,
        })
    }

    /// Decodes and stores a README, returning its site-relative path.
    pub fn save_readme(&self, key: &RowKey, readme: &Readme) -> Result<Option<String>> {
        let Some(content) = readme.content.as_deref().filter(|c| !c.is_empty()) else {
            return Ok(None);
        };

        let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = STANDARD
            .decode(compact)
            .map_err(|e| Error::ParseError(format!("README is not valid base64: {}", e)))?;
        let text = String::from_utf8(bytes)
            .map_err(|e| Error::ParseError(format!("README is not UTF-8: {}", e)))?;

        let relative = format!("readmes/{}/{}.md", key.org(), key.repo());
        write_asset(&self.public_dir.join(&relative), text.as_bytes())?;
        Ok(Some(format!("/{}", relative)))
    }

    /// Downloads the social preview image, returning its site-relative path.
    pub async fn save_social_preview(&self, key: &RowKey, url: &str) -> Result<String> {
        tracing::info!("Downloading social preview for {}", key);
        let bytes = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::from_request(e, self.timeout))?
            .bytes()
            .await
            .map_err(|e| Error::from_request(e, self.timeout))?;

        let relative = format!("social-previews/{}/{}.png", key.org(), key.repo());
        write_asset(&self.public_dir.join(&relative), &bytes)?;
        tracing::info!("Saved social preview ({} KB)", bytes.len() / 1024);
        Ok(format!("/{}", relative))
    }
}

fn write_asset(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_readme_decodes_wrapped_base64() {
        let dir = tempdir().unwrap();
        let store = AssetStore::new(dir.path(), Duration::from_secs(1)).unwrap();
        let key = RowKey::new("whaleen", "earth").unwrap();
        let encoded = STANDARD.encode("# Earth\n\nA globe.\n");
        let wrapped = format!("{}\n{}\n", &encoded[..8], &encoded[8..]);
        let readme = Readme {
            content: Some(wrapped),
            ..Default::default()
        };

        let path = store.save_readme(&key, &readme).unwrap();
        assert_eq!(path.as_deref(), Some("/readmes/whaleen/earth.md"));
        let saved = fs::read_to_string(dir.path().join("readmes/whaleen/earth.md")).unwrap();
        assert_eq!(saved, "# Earth\n\nA globe.\n");
    }

    #[test]
    fn test_save_readme_without_content() {
        let dir = tempdir().unwrap();
        let store = AssetStore::new(dir.path(), Duration::from_secs(1)).unwrap();
        let key = RowKey::new("whaleen", "earth").unwrap();
        assert_eq!(store.save_readme(&key, &Readme::default()).unwrap(), None);
    }
}
