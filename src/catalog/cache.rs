//! Load-once cache for the constellation catalogue.

use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

use super::CatalogError;
use crate::pip::Catalogue;

/// Where the catalogue is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    File(PathBuf),
    Url(String),
}

impl CatalogSource {
    /// Read and decode the catalogue, without caching
    pub async fn fetch(&self) -> Result<Catalogue, CatalogError> {
        match self {
            CatalogSource::File(path) => {
                let path = path.clone();
                tokio::task::spawn_blocking(move || Catalogue::from_path(path)).await?
            }
            CatalogSource::Url(url) => {
                info!("Fetching constellation catalogue from {}", url);
                let response = reqwest::get(url).await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(CatalogError::HttpStatus {
                        url: url.clone(),
                        status: status.as_u16(),
                    });
                }
                let bytes = response.bytes().await?;
                let catalogue = Catalogue::from_bytes(&bytes)?;
                info!("Loaded {} regions", catalogue.len());
                Ok(catalogue)
            }
        }
    }
}

impl std::fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogSource::File(path) => write!(f, "{}", path.display()),
            CatalogSource::Url(url) => write!(f, "{}", url),
        }
    }
}

/// Holds the parsed catalogue once it has been loaded.
///
/// Concurrent `load` calls share a single fetch. A failed fetch leaves the
/// cache empty so the next call tries again.
pub struct CatalogCache {
    source: CatalogSource,
    cell: OnceCell<Arc<Catalogue>>,
}

impl CatalogCache {
    pub fn new(source: CatalogSource) -> Self {
        Self {
            source,
            cell: OnceCell::new(),
        }
    }

    /// Cache that starts out holding an already parsed catalogue
    pub fn preloaded(source: CatalogSource, catalogue: Catalogue) -> Self {
        Self {
            source,
            cell: OnceCell::new_with(Some(Arc::new(catalogue))),
        }
    }

    /// Return the cached catalogue, fetching it on first use
    pub async fn load(&self) -> Result<Arc<Catalogue>, CatalogError> {
        self.cell
            .get_or_try_init(|| async { self.source.fetch().await.map(Arc::new) })
            .await
            .cloned()
    }

    /// Return the catalogue if it has already been loaded
    pub fn get(&self) -> Option<Arc<Catalogue>> {
        self.cell.get().cloned()
    }

    pub fn source(&self) -> &CatalogSource {
        &self.source
    }
}
