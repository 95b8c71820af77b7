use std::io;
use std::path::{Path, PathBuf};

const FRAGMENT_PREFIX: &str = "chunk_";
const FRAGMENT_EXTENSION: &str = "mp3";
const PARTIAL_SUFFIX: &str = ".part";
const LOCK_FILE: &str = ".lock";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("fragment store I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("fragment directory {path} is in use by another run (lock owner: {owner})")]
    Locked { path: PathBuf, owner: String },
    #[error("refusing to store empty audio for fragment {0}")]
    EmptyArtifact(usize),
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Exclusive hold on a fragment directory, released when dropped
#[derive(Debug)]
pub struct DirectoryLock {
    path: PathBuf,
}

impl Drop for DirectoryLock {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(lock = %self.path.display(), "Fragment directory lock released"),
            // cleanup already removed the whole directory
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                error = %e,
                lock = %self.path.display(),
                "Failed to release fragment directory lock"
            ),
        }
    }
}

/// Persists synthesized fragment audio as `chunk_NNNN.mp3` files.
///
/// The directory survives failed and interrupted runs: a file that exists with
/// non-zero size marks its fragment as done, which is what lets a later run
/// resume. Files are only ever added, or removed all at once by `cleanup`.
pub struct FragmentRepository {
    dir: PathBuf,
}

impl FragmentRepository {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the directory if needed (never clearing it) and take the run lock
    pub async fn prepare(&self) -> Result<DirectoryLock, StoreError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(io_error(&self.dir))?;

        self.acquire_lock()
    }

    /// The owner PID is written to a private file first and hard-linked into
    /// place, so a lock file is never visible without its owner.
    fn acquire_lock(&self) -> Result<DirectoryLock, StoreError> {
        let lock_path = self.dir.join(LOCK_FILE);
        let staged_path = self
            .dir
            .join(format!("{}.{}", LOCK_FILE, uuid::Uuid::new_v4().simple()));

        std::fs::write(&staged_path, std::process::id().to_string())
            .map_err(io_error(&staged_path))?;
        let result = publish_lock(&staged_path, &lock_path, &self.dir);
        if let Err(e) = std::fs::remove_file(&staged_path) {
            tracing::warn!(error = %e, path = %staged_path.display(), "Failed to remove staged lock file");
        }

        result
    }

    pub fn path_for(&self, index: usize) -> PathBuf {
        self.dir
            .join(format!("{}{:04}.{}", FRAGMENT_PREFIX, index, FRAGMENT_EXTENSION))
    }

    /// True when the fragment's audio file exists and is not empty
    pub async fn exists_and_valid(&self, index: usize) -> bool {
        tokio::fs::metadata(self.path_for(index))
            .await
            .map(|metadata| metadata.is_file() && metadata.len() > 0)
            .unwrap_or(false)
    }

    /// Persist fragment audio. The bytes land in a partial file first and are
    /// renamed into place, so an interrupted write never looks complete.
    pub async fn commit(&self, index: usize, audio: &[u8]) -> Result<PathBuf, StoreError> {
        if audio.is_empty() {
            return Err(StoreError::EmptyArtifact(index));
        }

        let final_path = self.path_for(index);
        let mut partial = final_path.clone().into_os_string();
        partial.push(PARTIAL_SUFFIX);
        let partial_path = PathBuf::from(partial);

        tokio::fs::write(&partial_path, audio)
            .await
            .map_err(io_error(&partial_path))?;
        tokio::fs::rename(&partial_path, &final_path)
            .await
            .map_err(io_error(&final_path))?;

        tracing::debug!(
            fragment_index = index,
            path = %final_path.display(),
            audio_size_bytes = audio.len(),
            "Fragment audio stored"
        );

        Ok(final_path)
    }

    /// Absolute paths of the valid artifacts among fragments `0..total`, in index order
    pub async fn valid_artifacts(&self, total: usize) -> Result<Vec<PathBuf>, StoreError> {
        let mut artifacts = Vec::new();

        for index in 0..total {
            if self.exists_and_valid(index).await {
                let path = self.path_for(index);
                let absolute = std::path::absolute(&path).map_err(io_error(&path))?;
                artifacts.push(absolute);
            }
        }

        Ok(artifacts)
    }

    /// Delete the directory and everything in it
    pub async fn cleanup(&self) -> Result<(), StoreError> {
        match tokio::fs::remove_dir_all(&self.dir).await {
            Ok(()) => {
                tracing::info!(dir = %self.dir.display(), "Fragment directory removed");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(&self.dir)(e)),
        }
    }
}

fn publish_lock(staged_path: &Path, lock_path: &Path, dir: &Path) -> Result<DirectoryLock, StoreError> {
    for _ in 0..2 {
        match std::fs::hard_link(staged_path, lock_path) {
            Ok(()) => {
                tracing::debug!(lock = %lock_path.display(), "Fragment directory lock acquired");
                return Ok(DirectoryLock {
                    path: lock_path.to_path_buf(),
                });
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                let owner = std::fs::read_to_string(lock_path).unwrap_or_default();
                if !lock_is_stale(&owner) {
                    return Err(StoreError::Locked {
                        path: dir.to_path_buf(),
                        owner: owner.trim().to_string(),
                    });
                }

                tracing::warn!(
                    lock = %lock_path.display(),
                    owner = owner.trim(),
                    "Removing stale fragment directory lock"
                );
                match std::fs::remove_file(lock_path) {
                    Ok(()) => {}
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                    Err(e) => return Err(io_error(lock_path)(e)),
                }
            }
            Err(e) => return Err(io_error(lock_path)(e)),
        }
    }

    Err(StoreError::Locked {
        path: dir.to_path_buf(),
        owner: "unknown".to_string(),
    })
}

/// A lock is stale only when it names a process that is gone. An owner that
/// cannot be read is treated as held. Liveness can only be checked on Linux.
fn lock_is_stale(owner: &str) -> bool {
    let Ok(pid) = owner.trim().parse::<u32>() else {
        return false;
    };

    #[cfg(target_os = "linux")]
    {
        !Path::new("/proc").join(pid.to_string()).exists()
    }

    #[cfg(not(target_os = "linux"))]
    {
        let _ = pid;
        false
    }
}
