//! Disc resource access
//!
//! The controller reads navigation files through [`ResourceProvider`] so
//! that discs can come from a mounted filesystem, an archive or test
//! fixtures alike. Resources are addressed logically; the provider maps
//! them to whatever layout it fronts.

use std::collections::HashMap;
use std::fmt;

use crate::error::ProviderError;

/// A navigation file on the disc.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Resource {
    /// The disc index (`index.bdmv`).
    Index,
    /// The movie-object container (`MovieObject.bdmv`).
    MovieObjects,
    /// A playlist by five-digit identifier (`PLAYLIST/xxxxx.mpls`).
    Playlist(String),
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Index => f.write_str("index.bdmv"),
            Resource::MovieObjects => f.write_str("MovieObject.bdmv"),
            Resource::Playlist(id) => write!(f, "PLAYLIST/{id}.mpls"),
        }
    }
}

pub trait ResourceProvider {
    /// Reads the raw bytes of `resource`.
    fn fetch(&self, resource: &Resource) -> Result<Vec<u8>, ProviderError>;
}

/// Provider over an in-memory resource map.
#[derive(Debug, Default)]
pub struct MemoryProvider {
    files: HashMap<Resource, Vec<u8>>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, resource: Resource, data: Vec<u8>) {
        self.files.insert(resource, data);
    }
}

impl ResourceProvider for MemoryProvider {
    fn fetch(&self, resource: &Resource) -> Result<Vec<u8>, ProviderError> {
        self.files
            .get(resource)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound {
                resource: resource.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_and_miss() {
        let mut provider = MemoryProvider::new();
        provider.insert(Resource::Index, vec![1, 2, 3]);

        assert_eq!(provider.fetch(&Resource::Index).unwrap(), vec![1, 2, 3]);
        assert_eq!(
            provider.fetch(&Resource::MovieObjects).unwrap_err(),
            ProviderError::NotFound {
                resource: "MovieObject.bdmv".into()
            }
        );
    }

    #[test]
    fn resource_names() {
        assert_eq!(Resource::Playlist("00001".into()).to_string(), "PLAYLIST/00001.mpls");
    }
}
