//! The set-size catalog: how many distinct cards make a complete set for
//! each game.

use crate::error::FileError;
use crate::types::AppId;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use futures::AsyncWriteExt;

const CATALOG_FILENAME: &str = "database.json";

/// An idempotent lookup of the number of distinct cards in a complete set.
/// `0` means the game has no sets.
pub trait SetSizeCatalog: Send + Sync {
    fn set_size(&self, appid: AppId) -> u32;
}

/// A catalog backed by a plain map. Useful for tests and for callers that
/// fetch the table themselves.
#[derive(Debug, Clone, Default)]
pub struct FixedSetSizeCatalog(HashMap<AppId, u32>);

impl SetSizeCatalog for FixedSetSizeCatalog {
    fn set_size(&self, appid: AppId) -> u32 {
        self.0.get(&appid).copied().unwrap_or(0)
    }
}

impl<const N: usize> From<[(AppId, u32); N]> for FixedSetSizeCatalog {
    fn from(entries: [(AppId, u32); N]) -> Self {
        Self(HashMap::from(entries))
    }
}

/// A catalog persisted as JSON in the data directory. The table is
/// replaced wholesale when a fresh copy is downloaded; lookups in between
/// observe a consistent table.
#[derive(Debug)]
pub struct FileSetSizeCatalog {
    data_directory: PathBuf,
    table: RwLock<HashMap<AppId, u32>>,
}

impl FileSetSizeCatalog {
    /// Loads the catalog from the data directory. A missing or unreadable
    /// file yields an empty catalog; callers are expected to fetch and
    /// [`replace`](Self::replace) the table when that happens.
    pub fn load<T>(data_directory: T) -> Self
    where
        T: Into<PathBuf>,
    {
        let data_directory = data_directory.into();
        let table = read_table(&data_directory).unwrap_or_default();

        if !table.is_empty() {
            log::debug!("Loaded set sizes for {} apps", table.len());
        }

        Self {
            data_directory,
            table: RwLock::new(table),
        }
    }

    /// The number of games known to the catalog.
    pub fn len(&self) -> usize {
        self.table.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.read().unwrap().is_empty()
    }

    /// Replaces the table with a freshly downloaded copy and persists it.
    pub async fn replace(&self, table: HashMap<AppId, u32>) -> Result<(), FileError> {
        let data = {
            let mut guard = self.table.write().unwrap();

            *guard = table;
            serde_json::to_string(&*guard)?
        };

        save_table(&self.data_directory, &data).await
    }
}

impl SetSizeCatalog for FileSetSizeCatalog {
    fn set_size(&self, appid: AppId) -> u32 {
        self.table.read().unwrap().get(&appid).copied().unwrap_or(0)
    }
}

fn read_table(path: &Path) -> Result<HashMap<AppId, u32>, FileError> {
    let data = std::fs::read_to_string(path.join(CATALOG_FILENAME))?;
    let table = serde_json::from_str(&data)?;

    Ok(table)
}

async fn save_table(path: &Path, data: &str) -> Result<(), FileError> {
    let filepath = path.join(CATALOG_FILENAME);
    let mut file = async_fs::File::create(&filepath).await?;

    match file.write_all(data.as_bytes()).await {
        Ok(_) => {
            file.flush().await?;

            Ok(())
        },
        Err(error) => {
            // something went wrong writing to this file...
            async_fs::remove_file(&filepath).await?;

            Err(error.into())
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_games_have_no_sets() {
        let catalog = FixedSetSizeCatalog::from([(440, 3)]);

        assert_eq!(catalog.set_size(440), 3);
        assert_eq!(catalog.set_size(570), 0);
    }

    #[tokio::test]
    async fn round_trips_through_the_data_directory() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = FileSetSizeCatalog::load(dir.path());

        assert!(catalog.is_empty());

        catalog.replace(HashMap::from([(440, 3), (730, 5)])).await.unwrap();

        let reloaded = FileSetSizeCatalog::load(dir.path());

        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.set_size(730), 5);
    }
}
