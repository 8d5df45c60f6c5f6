//! Fetches the Pod texture and model, either over HTTP or from a local
//! directory. One request per asset, no retries, no timeout.

use std::path::PathBuf;

use reqwest::{Client, Url};

use crate::error::LoadError;
use crate::pod::{MeshBundle, decode_pod};
use crate::texture::{FilterMode, TextureData};

pub const TEXTURE_NAME: &str = "Pod.png";
pub const MODEL_NAME: &str = "Pod.obj.txt";

/// Where assets are fetched from.
#[derive(Clone, Debug)]
pub enum AssetSource {
    /// Base URL; asset names are joined onto it.
    Http { client: Client, base: Url },
    Directory(PathBuf),
}

impl AssetSource {
    /// `http(s)://` locations become [`AssetSource::Http`]; anything else
    /// (optionally prefixed with `file://`) is a directory.
    pub fn parse(location: &str) -> Result<Self, LoadError> {
        if location.starts_with("http://") || location.starts_with("https://") {
            let mut base =
                Url::parse(location).map_err(|_| LoadError::InvalidSource(location.to_owned()))?;
            if !base.path().ends_with('/') {
                let path = format!("{}/", base.path());
                base.set_path(&path);
            }
            return Ok(Self::Http {
                client: Client::new(),
                base,
            });
        }

        let path = location.strip_prefix("file://").unwrap_or(location);
        if path.is_empty() {
            return Err(LoadError::InvalidSource(location.to_owned()));
        }
        Ok(Self::Directory(PathBuf::from(path)))
    }

    /// Full body of the named asset.
    pub async fn fetch(&self, name: &str) -> Result<Vec<u8>, LoadError> {
        match self {
            Self::Http { client, base } => {
                let url = base
                    .join(name)
                    .map_err(|_| LoadError::InvalidSource(format!("{base}{name}")))?;
                log::info!("GET {}", url);

                let response = client.get(url.clone()).send().await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(LoadError::Status {
                        url: url.to_string(),
                        status,
                    });
                }

                let bytes = response.bytes().await?;
                log::debug!("{} -> {} bytes", url, bytes.len());
                Ok(bytes.to_vec())
            }
            Self::Directory(dir) => {
                let path = dir.join(name);
                log::info!("Reading {}", path.display());
                tokio::fs::read(&path)
                    .await
                    .map_err(|source| LoadError::Io { path, source })
            }
        }
    }
}

/// Fetch `Pod.png` and decode it into a nearest-filtered texture.
pub async fn load_texture(source: &AssetSource) -> Result<TextureData, LoadError> {
    let bytes = source.fetch(TEXTURE_NAME).await?;
    let texture = TextureData::decode_png(&bytes)?.with_filter(FilterMode::Nearest);
    log::info!("Loaded texture {}x{}", texture.width, texture.height);
    Ok(texture)
}

/// Fetch `Pod.obj.txt` and decode the whole body into a [`MeshBundle`].
pub async fn load_mesh(source: &AssetSource) -> Result<MeshBundle, LoadError> {
    let bytes = source.fetch(MODEL_NAME).await?;
    let text = String::from_utf8(bytes)?;
    Ok(decode_pod(&text)?)
}
