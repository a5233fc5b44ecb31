use std::path::{Path, PathBuf};
use std::fs;
use std::io;
use std::sync::Arc;
use std::env;
use tokio::sync::Mutex;
use sha2::{Sha256, Digest};

use crate::models::ModelInfo;

/// Environment variable overriding the cache root
pub const CACHE_ENV: &str = "CHAT_SENTIMENT_CACHE";

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Model not downloaded: {0}")]
    NotDownloaded(String),
    #[error("Download error: {0}")]
    DownloadError(#[from] reqwest::Error),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Unexpected HTTP status {status} while fetching {url}")]
    HttpStatus {
        url: String,
        status: u16,
    },
    #[error("Model verification failed")]
    VerificationFailed,
    #[error("Hash mismatch: expected {expected}, got {actual} for {file_type} file")]
    HashMismatch {
        file_type: String,
        expected: String,
        actual: String,
    },
}

/// The three files making up a cached model
#[derive(Debug, Clone, Copy)]
enum ModelFile {
    Model,
    Tokenizer,
    Config,
}

impl ModelFile {
    const ALL: [ModelFile; 3] = [ModelFile::Model, ModelFile::Tokenizer, ModelFile::Config];

    fn file_name(self) -> &'static str {
        match self {
            Self::Model => "model.onnx",
            Self::Tokenizer => "tokenizer.json",
            Self::Config => "config.json",
        }
    }

    fn kind(self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Tokenizer => "tokenizer",
            Self::Config => "config",
        }
    }

    fn url(self, info: &ModelInfo) -> &str {
        match self {
            Self::Model => &info.model_url,
            Self::Tokenizer => &info.tokenizer_url,
            Self::Config => &info.config_url,
        }
    }

    fn hash(self, info: &ModelInfo) -> Option<&str> {
        match self {
            Self::Model => info.model_hash.as_deref(),
            Self::Tokenizer => info.tokenizer_hash.as_deref(),
            Self::Config => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ModelManager {
    models_dir: PathBuf,
    download_lock: Arc<Mutex<()>>,
}

impl ModelManager {
    /// Creates a new ModelManager with the default models directory
    pub fn new_default() -> io::Result<Self> {
        Self::new(Self::get_default_models_dir())
    }

    /// Returns the default models directory path
    pub fn get_default_models_dir() -> PathBuf {
        if let Ok(path) = env::var(CACHE_ENV) {
            return PathBuf::from(path).join("models");
        }

        if let Some(cache_dir) = dirs::cache_dir() {
            return cache_dir.join("chat-sentiment").join("models");
        }

        if let Some(home_dir) = dirs::home_dir() {
            return home_dir.join(".cache").join("chat-sentiment").join("models");
        }

        env::temp_dir().join("chat-sentiment").join("models")
    }

    pub fn new<P: AsRef<Path>>(models_dir: P) -> io::Result<Self> {
        let models_dir = models_dir.as_ref().to_path_buf();
        fs::create_dir_all(&models_dir)?;
        Ok(Self {
            models_dir,
            download_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn models_dir(&self) -> &Path {
        &self.models_dir
    }

    fn file_path(&self, name: &str, file: ModelFile) -> PathBuf {
        self.models_dir.join(name).join(file.file_name())
    }

    pub fn get_model_path(&self, name: &str) -> PathBuf {
        self.file_path(name, ModelFile::Model)
    }

    pub fn get_tokenizer_path(&self, name: &str) -> PathBuf {
        self.file_path(name, ModelFile::Tokenizer)
    }

    pub fn get_config_path(&self, name: &str) -> PathBuf {
        self.file_path(name, ModelFile::Config)
    }

    pub fn is_model_downloaded(&self, name: &str) -> bool {
        let downloaded = ModelFile::ALL
            .iter()
            .all(|&file| self.file_path(name, file).exists());
        log::debug!("Model '{}' downloaded: {}", name, downloaded);
        downloaded
    }

    /// Fetches every missing or invalid file of the model. Files already on
    /// disk that pass verification are kept. On failure the partial download
    /// is removed.
    pub async fn download_model(&self, info: &ModelInfo) -> Result<(), ModelError> {
        let _lock = self.download_lock.lock().await;

        let model_dir = self.models_dir.join(&info.name);
        log::info!("Creating model directory at {:?}", model_dir);
        fs::create_dir_all(&model_dir)?;

        for file in ModelFile::ALL {
            let path = self.file_path(&info.name, file);
            let result = if path.exists() && self.verify_file(&path, file.hash(info))? {
                log::info!("Existing {} file verified at {:?}", file.kind(), path);
                Ok(())
            } else {
                if path.exists() {
                    log::warn!("{} file verification failed, redownloading", file.kind());
                }
                self.download_and_verify_file(file.url(info), &path, file.hash(info), file.kind())
                    .await
            };

            if let Err(e) = result {
                log::error!("Failed to setup {} file: {}", file.kind(), e);
                let _ = self.remove_download(&info.name);
                return Err(e);
            }
        }

        log::info!("Model '{}' ready to use", info.name);
        Ok(())
    }

    fn verify_file(&self, path: &Path, expected_hash: Option<&str>) -> Result<bool, ModelError> {
        let bytes = fs::read(path)?;
        if bytes.is_empty() {
            log::warn!("File {:?} is empty", path);
            return Ok(false);
        }
        match expected_hash {
            Some(expected) => {
                let hash = sha256_hex(&bytes);
                log::debug!("Hash of {:?}: {} (expected {})", path, hash, expected);
                Ok(hash == expected)
            }
            None => Ok(true),
        }
    }

    pub fn verify_model(&self, info: &ModelInfo) -> Result<bool, ModelError> {
        for file in ModelFile::ALL {
            let path = self.file_path(&info.name, file);
            if !path.exists() {
                log::info!("{} file missing at {:?}", file.kind(), path);
                return Ok(false);
            }
            if !self.verify_file(&path, file.hash(info))? {
                log::info!("{} file at {:?} failed verification", file.kind(), path);
                return Ok(false);
            }
        }
        Ok(true)
    }

    async fn download_and_verify_file(
        &self,
        url: &str,
        path: &Path,
        expected_hash: Option<&str>,
        file_type: &str,
    ) -> Result<(), ModelError> {
        log::info!("Downloading {} file from {} to {:?}", file_type, url, path);
        let response = reqwest::get(url).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ModelError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let bytes = response.bytes().await?;
        log::info!("Downloaded {} bytes", bytes.len());

        if let Some(expected) = expected_hash {
            let hash = sha256_hex(&bytes);
            if hash != expected {
                log::error!("{} hash mismatch: expected {}, got {}", file_type, expected, hash);
                return Err(ModelError::HashMismatch {
                    file_type: file_type.to_string(),
                    expected: expected.to_string(),
                    actual: hash,
                });
            }
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, &bytes)?;

        if !self.verify_file(path, expected_hash)? {
            return Err(ModelError::VerificationFailed);
        }

        log::info!("{} file downloaded and verified successfully", file_type);
        Ok(())
    }

    pub fn remove_download(&self, name: &str) -> Result<(), ModelError> {
        for file in ModelFile::ALL {
            let path = self.file_path(name, file);
            if path.exists() {
                fs::remove_file(&path)?;
            }
        }
        Ok(())
    }

    /// Ensures that a model is downloaded and verified.
    /// If the model doesn't exist, it will be downloaded.
    /// If verification fails, it will be re-downloaded.
    pub async fn ensure_model_downloaded(&self, info: &ModelInfo) -> Result<(), ModelError> {
        if !self.is_model_downloaded(&info.name) {
            log::info!("Model '{}' not found, downloading...", info.name);
            self.download_model(info).await?;
        } else if !self.verify_model(info)? {
            log::info!("Model '{}' failed verification, re-downloading...", info.name);
            self.remove_download(&info.name)?;
            self.download_model(info).await?;
        } else {
            log::info!("Model '{}' verified", info.name);
        }
        Ok(())
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(tag: &str) -> PathBuf {
        env::temp_dir()
            .join("chat-sentiment-test")
            .join(format!("{}-{}", tag, std::process::id()))
    }

    fn local_info(name: &str) -> ModelInfo {
        ModelInfo {
            name: name.to_string(),
            model_url: "http://127.0.0.1:9/model.onnx".to_string(),
            tokenizer_url: "http://127.0.0.1:9/tokenizer.json".to_string(),
            config_url: "http://127.0.0.1:9/config.json".to_string(),
            model_hash: Some(sha256_hex(b"onnx bytes")),
            tokenizer_hash: None,
            labels: vec!["negative".into(), "neutral".into(), "positive".into()],
        }
    }

    fn write_all(manager: &ModelManager, name: &str, model: &[u8]) {
        fs::create_dir_all(manager.models_dir().join(name)).unwrap();
        fs::write(manager.get_model_path(name), model).unwrap();
        fs::write(manager.get_tokenizer_path(name), b"{}").unwrap();
        fs::write(manager.get_config_path(name), b"{}").unwrap();
    }

    #[test]
    fn test_paths_layout() {
        let manager = ModelManager::new(scratch_dir("paths")).unwrap();
        assert!(manager.get_model_path("xlm").ends_with("xlm/model.onnx"));
        assert!(manager.get_tokenizer_path("xlm").ends_with("xlm/tokenizer.json"));
        assert!(manager.get_config_path("xlm").ends_with("xlm/config.json"));
    }

    #[test]
    fn test_verify_model_checks_hash_and_presence() -> Result<(), ModelError> {
        let manager = ModelManager::new(scratch_dir("verify")).unwrap();
        let info = local_info("verify");
        manager.remove_download(&info.name)?;

        assert!(!manager.is_model_downloaded(&info.name));
        assert!(!manager.verify_model(&info)?);

        write_all(&manager, &info.name, b"onnx bytes");
        assert!(manager.is_model_downloaded(&info.name));
        assert!(manager.verify_model(&info)?);

        fs::write(manager.get_model_path(&info.name), b"corrupted data")?;
        assert!(!manager.verify_model(&info)?);

        manager.remove_download(&info.name)?;
        assert!(!manager.is_model_downloaded(&info.name));
        Ok(())
    }

    #[test]
    fn test_empty_file_fails_verification_without_hash() -> Result<(), ModelError> {
        let manager = ModelManager::new(scratch_dir("empty")).unwrap();
        let mut info = local_info("empty");
        info.model_hash = None;

        write_all(&manager, &info.name, b"");
        assert!(!manager.verify_model(&info)?);
        manager.remove_download(&info.name)?;
        Ok(())
    }

    #[tokio::test]
    async fn test_verified_files_are_not_refetched() -> Result<(), ModelError> {
        // URLs point at a closed port; success proves nothing was fetched
        let manager = ModelManager::new(scratch_dir("cached")).unwrap();
        let info = local_info("cached");
        write_all(&manager, &info.name, b"onnx bytes");

        manager.ensure_model_downloaded(&info).await?;
        assert!(manager.verify_model(&info)?);
        manager.remove_download(&info.name)?;
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_download_cleans_up() {
        let manager = ModelManager::new(scratch_dir("failed")).unwrap();
        let info = local_info("failed");
        write_all(&manager, &info.name, b"stale bytes");

        assert!(manager.download_model(&info).await.is_err());
        assert!(!manager.get_model_path(&info.name).exists());
        assert!(!manager.get_tokenizer_path(&info.name).exists());
    }

    #[test]
    fn test_default_models_dir() {
        env::set_var(CACHE_ENV, "/tmp/test-cache");
        let path = ModelManager::get_default_models_dir();
        assert_eq!(path, PathBuf::from("/tmp/test-cache/models"));
        env::remove_var(CACHE_ENV);

        let path = ModelManager::get_default_models_dir();
        assert!(path.ends_with("chat-sentiment/models"));
    }
}
