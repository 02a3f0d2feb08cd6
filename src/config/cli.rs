use crate::domain::ports::Storage;
use crate::utils::error::Result;
use std::fs;
use std::path::Path;

/// File-per-key blob store under a base directory — the device-storage
/// analog used for the location, follow, and recent-search caches and the
/// feed output.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, key: &str) -> Result<Vec<u8>> {
        let full_path = Path::new(&self.base_path).join(key);
        let data = fs::read(full_path)?;
        Ok(data)
    }

    async fn write_file(&self, key: &str, data: &[u8]) -> Result<()> {
        let full_path = Path::new(&self.base_path).join(key);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(full_path, data)?;
        Ok(())
    }

    async fn remove_file(&self, key: &str) -> Result<()> {
        let full_path = Path::new(&self.base_path).join(key);
        match fs::remove_file(full_path) {
            Ok(()) => Ok(()),
            // Removing something that was never written is not an error.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_round_trip_and_remove() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());

        storage.write_file("user_location", b"{}").await.unwrap();
        assert_eq!(storage.read_file("user_location").await.unwrap(), b"{}");

        storage.remove_file("user_location").await.unwrap();
        assert!(storage.read_file("user_location").await.is_err());

        // Double remove stays quiet.
        storage.remove_file("user_location").await.unwrap();
    }
}
