//! Logical path resolution and storage-key derivation.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;

use cumulus_core::AppResult;
use cumulus_database::repositories::FolderRepository;

/// Logical path of the implicit root folder.
///
/// The root is not a record; files attached directly to it get keys of
/// the form `{owner}/{file_id}.{ext}` with no path segment.
pub const ROOT_PATH: &str = "";

/// Extension used when a file name carries none.
pub const DEFAULT_EXTENSION: &str = "bin";

/// Resolves folder ids to slash-joined logical paths and derives the
/// storage keys file blobs are stored under.
///
/// Resolution walks parent pointers upward with a visited set, so a
/// corrupt cycle terminates instead of spinning. A folder whose
/// ancestry cannot be fully resolved (missing or soft-deleted ancestor
/// mid-walk) resolves to [`ROOT_PATH`] rather than failing, so cascade
/// resyncs can still make progress over damaged trees.
#[derive(Debug, Clone)]
pub struct PathResolver {
    folders: Arc<dyn FolderRepository>,
}

impl PathResolver {
    pub fn new(folders: Arc<dyn FolderRepository>) -> Self {
        Self { folders }
    }

    /// Resolves the logical path of `folder_id`, e.g. `"docs/reports"`.
    ///
    /// `None` is the root and resolves to [`ROOT_PATH`]. The starting
    /// folder may be soft-deleted (its name still contributes a
    /// segment); a deleted or missing *ancestor* collapses the whole
    /// path to the root sentinel.
    pub async fn resolve_folder_path(
        &self,
        owner_id: Uuid,
        folder_id: Option<Uuid>,
    ) -> AppResult<String> {
        let Some(start) = folder_id else {
            return Ok(ROOT_PATH.to_string());
        };

        let mut segments: Vec<String> = Vec::new();
        let mut visited: HashSet<Uuid> = HashSet::new();
        let mut current = Some(start);

        while let Some(id) = current {
            if !visited.insert(id) {
                warn!(
                    folder_id = %start,
                    repeated = %id,
                    "Cycle detected while resolving folder path, falling back to root"
                );
                return Ok(ROOT_PATH.to_string());
            }

            let Some(folder) = self.folders.find_owned(owner_id, id).await? else {
                warn!(
                    folder_id = %start,
                    missing = %id,
                    "Unresolvable ancestor while resolving folder path, falling back to root"
                );
                return Ok(ROOT_PATH.to_string());
            };
            if folder.is_deleted() && id != start {
                return Ok(ROOT_PATH.to_string());
            }

            segments.push(folder.name);
            current = folder.parent_id;
        }

        segments.reverse();
        Ok(segments.join("/"))
    }

    /// Derives the storage key for a file placed in `folder_id`.
    pub async fn derive_storage_key(
        &self,
        owner_id: Uuid,
        folder_id: Option<Uuid>,
        file_id: Uuid,
        logical_name: &str,
    ) -> AppResult<String> {
        let path = self.resolve_folder_path(owner_id, folder_id).await?;
        Ok(Self::compose_key(owner_id, &path, file_id, logical_name))
    }

    /// Composes a storage key from an already-resolved logical path.
    ///
    /// Keys have the shape `{owner}/{path}/{file_id}.{ext}`; the path
    /// segment is omitted entirely for root files. The extension comes
    /// from the logical name, lowercased, or [`DEFAULT_EXTENSION`] when
    /// the name has no usable extension.
    pub fn compose_key(owner_id: Uuid, path: &str, file_id: Uuid, logical_name: &str) -> String {
        let ext = Self::extension_of(logical_name);
        if path.is_empty() {
            format!("{owner_id}/{file_id}.{ext}")
        } else {
            format!("{owner_id}/{path}/{file_id}.{ext}")
        }
    }

    fn extension_of(name: &str) -> String {
        name.rsplit('.')
            .next()
            .filter(|ext| *ext != name && !ext.is_empty())
            .map(str::to_lowercase)
            .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cumulus_database::memory::MemoryFolderRepository;
    use cumulus_entity::folder::CreateFolder;

    fn resolver(folders: Arc<MemoryFolderRepository>) -> PathResolver {
        PathResolver::new(folders)
    }

    #[test]
    fn compose_key_places_extension_and_path() {
        let owner = Uuid::nil();
        let file = Uuid::nil();
        let key = PathResolver::compose_key(owner, "docs/reports", file, "Q3.PDF");
        assert_eq!(key, format!("{owner}/docs/reports/{file}.pdf"));
    }

    #[test]
    fn compose_key_defaults_extension_for_bare_names() {
        let owner = Uuid::nil();
        let file = Uuid::nil();
        assert!(PathResolver::compose_key(owner, "", file, "README").ends_with(".bin"));
        assert!(PathResolver::compose_key(owner, "", file, "notes.").ends_with(".bin"));
    }

    #[test]
    fn compose_key_omits_path_segment_at_root() {
        let owner = Uuid::new_v4();
        let file = Uuid::new_v4();
        assert_eq!(
            PathResolver::compose_key(owner, ROOT_PATH, file, "a.txt"),
            format!("{owner}/{file}.txt")
        );
    }

    #[tokio::test]
    async fn resolves_nested_folder_path() {
        let folders = Arc::new(MemoryFolderRepository::new());
        let owner = Uuid::new_v4();
        let docs = folders
            .create(&CreateFolder { parent_id: None, name: "docs".into(), owner_id: owner })
            .await
            .unwrap();
        let reports = folders
            .create(&CreateFolder {
                parent_id: Some(docs.id),
                name: "reports".into(),
                owner_id: owner,
            })
            .await
            .unwrap();

        let resolver = resolver(folders);
        assert_eq!(
            resolver.resolve_folder_path(owner, Some(reports.id)).await.unwrap(),
            "docs/reports"
        );
        assert_eq!(resolver.resolve_folder_path(owner, None).await.unwrap(), ROOT_PATH);
    }

    #[tokio::test]
    async fn missing_ancestor_resolves_to_root() {
        let folders = Arc::new(MemoryFolderRepository::new());
        let owner = Uuid::new_v4();
        let resolver = resolver(folders);
        let path = resolver
            .resolve_folder_path(owner, Some(Uuid::new_v4()))
            .await
            .unwrap();
        assert_eq!(path, ROOT_PATH);
    }
}
