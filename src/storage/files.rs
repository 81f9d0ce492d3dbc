//! Filesystem item sink
//!
//! Writes each item to `root + storage path`. Bytes are streamed to a `.part`
//! file next to the target and renamed into place once complete, so an
//! interrupted download never leaves a truncated file under the final name.
//! Every store gets its own `.part` name; two items sharing a storage path
//! race only on the final rename, and the later one wins.

use crate::storage::traits::{ItemSink, StorageError, StorageResult};
use crate::storage::{DownloadJob, StoredFile};
use async_trait::async_trait;
use reqwest::header::REFERER;
use reqwest::Client;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::AsyncWriteExt;

/// Writes items under an output directory
pub struct FileStore {
    root: PathBuf,
    client: Client,
    /// Suffix source for `.part` names
    sequence: AtomicU64,
}

impl FileStore {
    /// Creates a store rooted at `root`
    ///
    /// `client` should be the session client used for the crawl, so downloads
    /// carry the login cookies.
    pub fn new(root: impl Into<PathBuf>, client: Client) -> Self {
        Self {
            root: root.into(),
            client,
            sequence: AtomicU64::new(0),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a storage path to a filesystem path under the root
    ///
    /// Leading `/` and `.` segments are ignored; any `..` segment is rejected.
    pub fn resolve(&self, storage_path: &str) -> StorageResult<PathBuf> {
        let mut resolved = self.root.clone();
        let mut has_name = false;

        for component in Path::new(storage_path).components() {
            match component {
                Component::Normal(part) => {
                    resolved.push(part);
                    has_name = true;
                }
                Component::RootDir | Component::CurDir => {}
                Component::ParentDir | Component::Prefix(_) => {
                    return Err(StorageError::UnsafePath(storage_path.to_string()));
                }
            }
        }

        if !has_name {
            return Err(StorageError::UnsafePath(storage_path.to_string()));
        }
        Ok(resolved)
    }

    /// Unique temporary path next to `target`
    fn part_path(&self, target: &Path) -> PathBuf {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        let mut part = target.as_os_str().to_owned();
        part.push(format!(".{}.part", sequence));
        PathBuf::from(part)
    }

    /// Streams the job's URL into `part`, returning the byte count
    async fn download_to(&self, job: &DownloadJob, part: &Path) -> StorageResult<u64> {
        let mut response = self
            .client
            .get(&job.url)
            .header(REFERER, job.item.origin_url())
            .send()
            .await
            .map_err(|e| StorageError::Download {
                url: job.url.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(StorageError::HttpStatus {
                url: job.url.clone(),
                status: status.as_u16(),
            });
        }

        let mut file = tokio::fs::File::create(part).await?;
        let mut written: u64 = 0;

        while let Some(chunk) = response.chunk().await.map_err(|e| StorageError::Download {
            url: job.url.clone(),
            reason: e.to_string(),
        })? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        Ok(written)
    }

    async fn write_to(&self, job: &DownloadJob, part: &Path) -> StorageResult<u64> {
        match &job.body {
            Some(body) => {
                tokio::fs::write(part, body).await?;
                Ok(body.len() as u64)
            }
            None => self.download_to(job, part).await,
        }
    }
}

#[async_trait]
impl ItemSink for FileStore {
    async fn store(&self, job: &DownloadJob) -> StorageResult<StoredFile> {
        let target = self.resolve(&job.path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let part = self.part_path(&target);

        match self.write_to(job, &part).await {
            Ok(bytes) => {
                tokio::fs::rename(&part, &target).await?;
                Ok(StoredFile {
                    path: target,
                    bytes,
                })
            }
            Err(e) => {
                let _ = tokio::fs::remove_file(&part).await;
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{ClassifiedItem, ItemMeta};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> FileStore {
        FileStore::new(dir.path(), Client::new())
    }

    fn no_part_files(dir: &Path) -> bool {
        std::fs::read_dir(dir)
            .unwrap()
            .all(|entry| !entry.unwrap().file_name().to_string_lossy().ends_with(".part"))
    }

    fn page_job(title: &str, origin: &str) -> DownloadJob {
        DownloadJob::new(ClassifiedItem::Page(
            ItemMeta::new(title, "html", origin, origin).unwrap(),
        ))
    }

    #[test]
    fn test_resolve_under_root() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        assert_eq!(
            store.resolve("/lessons/one/Foo.html").unwrap(),
            dir.path().join("lessons").join("one").join("Foo.html")
        );
        assert_eq!(
            store.resolve("./a/./b.pdf").unwrap(),
            dir.path().join("a").join("b.pdf")
        );
    }

    #[test]
    fn test_resolve_rejects_escape() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        for path in ["/../etc/passwd", "/a/../../b.pdf", "/", ""] {
            assert!(
                matches!(store.resolve(path), Err(StorageError::UnsafePath(_))),
                "accepted {:?}",
                path
            );
        }
    }

    #[tokio::test]
    async fn test_store_prefetched_body() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let job = page_job("Foo", "https://example.com/lessons/foo/")
            .with_body(b"<html>foo</html>".to_vec());

        let stored = store.store(&job).await.unwrap();

        assert_eq!(stored.bytes, 16);
        assert_eq!(stored.path, dir.path().join("lessons/foo/Foo.html"));
        assert_eq!(
            std::fs::read_to_string(&stored.path).unwrap(),
            "<html>foo</html>"
        );
        assert!(no_part_files(&dir.path().join("lessons/foo")));
    }

    #[test]
    fn test_part_paths_are_unique() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let target = dir.path().join("a/Foo.html");

        let first = store.part_path(&target);
        let second = store.part_path(&target);
        assert_ne!(first, second);
        assert_eq!(first.parent(), target.parent());
        assert!(first.to_string_lossy().ends_with(".part"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_colliding_stores_both_succeed() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(store(&dir));
        let origin = "https://example.com/lessons/foo/";

        for _ in 0..10 {
            let big = page_job("Foo", origin).with_body(vec![b'a'; 4 * 1024 * 1024]);
            let small = page_job("Foo", origin).with_body(vec![b'b'; 3 * 1024 * 1024]);

            let first = tokio::spawn({
                let store = Arc::clone(&store);
                async move { store.store(&big).await }
            });
            let second = tokio::spawn({
                let store = Arc::clone(&store);
                async move { store.store(&small).await }
            });

            let first = first.await.unwrap().expect("first store failed");
            let second = second.await.unwrap().expect("second store failed");
            assert_eq!(first.path, second.path);

            let written = std::fs::read(&first.path).unwrap();
            assert!(
                written == vec![b'a'; 4 * 1024 * 1024] || written == vec![b'b'; 3 * 1024 * 1024],
                "file holds a mix of both bodies"
            );
        }

        assert!(no_part_files(&dir.path().join("lessons/foo")));
    }

    #[tokio::test]
    async fn test_store_overwrites_same_path() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let origin = "https://example.com/lessons/foo/";

        store
            .store(&page_job("Foo", origin).with_body(b"first".to_vec()))
            .await
            .unwrap();
        let stored = store
            .store(&page_job("Foo", origin).with_body(b"second".to_vec()))
            .await
            .unwrap();

        assert_eq!(std::fs::read_to_string(stored.path).unwrap(), "second");
    }
}
