//! Verified file delivery
//!
//! The copy-verify-delete sequence behind every classification. At every
//! exit either the source is intact and the destination absent, or the
//! destination holds a checksum-verified copy and the source is gone.
//! Partial copies never survive.

use std::fs::{self, File};
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use log::{debug, warn};
use sha2::{Digest, Sha256};

use crate::error::{FactureroError, FactureroResult};

/// Deletion attempts before giving the file up as locked
const DELETE_ATTEMPTS: u32 = 6;

/// Base backoff between deletion attempts; grows linearly
const DELETE_BACKOFF: Duration = Duration::from_millis(25);

const HASH_CHUNK: usize = 1024 * 1024;

/// Outcome of a completed delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub destination: PathBuf,
    /// Checksum of the delivered content
    pub sha256: String,
}

/// SHA-256 of a file, streamed in 1 MiB chunks
pub fn sha256_file(path: &Path) -> FactureroResult<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; HASH_CHUNK];
    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// Move `source` into `dest_folder` with checksum verification
///
/// Name collisions retarget to `<stem>__<hash prefix><ext>`; finding that
/// name already holding identical content means an earlier run crashed
/// after its copy was verified, so only the source removal is replayed.
pub fn deliver(source: &Path, dest_folder: &Path) -> FactureroResult<Delivery> {
    let file_name = source
        .file_name()
        .ok_or_else(|| {
            FactureroError::Validation(format!(
                "Evidence path '{}' has no file name",
                source.display()
            ))
        })?
        .to_owned();

    fs::create_dir_all(dest_folder)?;
    let source_hash = sha256_file(source)?;

    let mut target = dest_folder.join(&file_name);
    if target.exists() {
        target = dest_folder.join(collision_name(&file_name, &source_hash));
        if target.exists() {
            if sha256_file(&target)? == source_hash {
                debug!(
                    "delivery of {} found verified copy at {}, replaying source removal",
                    source.display(),
                    target.display()
                );
                remove_source(source, &target)?;
                return Ok(Delivery {
                    destination: target,
                    sha256: source_hash,
                });
            }
            return Err(FactureroError::Validation(format!(
                "Destination '{}' already holds different content",
                target.display()
            )));
        }
    }

    fs::copy(source, &target)?;
    let copy_hash = match sha256_file(&target) {
        Ok(hash) => hash,
        Err(err) => {
            let _ = fs::remove_file(&target);
            return Err(err);
        }
    };
    if copy_hash != source_hash {
        let _ = fs::remove_file(&target);
        return Err(FactureroError::HashMismatch {
            source: source.display().to_string(),
            destination: target.display().to_string(),
        });
    }

    remove_source(source, &target)?;

    Ok(Delivery {
        destination: target,
        sha256: source_hash,
    })
}

/// Remove the source after its copy is verified
///
/// Network shares hold freshly scanned files open for a moment, so
/// removal retries with growing pauses. Exhaustion removes the verified
/// copy instead: a retriable failure must not leave a duplicate behind.
fn remove_source(source: &Path, verified_copy: &Path) -> FactureroResult<()> {
    for attempt in 1..=DELETE_ATTEMPTS {
        match fs::remove_file(source) {
            Ok(()) => return Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(()),
            Err(err) => {
                if attempt == DELETE_ATTEMPTS {
                    warn!(
                        "could not remove source {} after {} attempts: {}",
                        source.display(),
                        DELETE_ATTEMPTS,
                        err
                    );
                    break;
                }
                thread::sleep(DELETE_BACKOFF * attempt);
            }
        }
    }

    if let Err(err) = fs::remove_file(verified_copy) {
        warn!(
            "could not remove duplicate copy {}: {}",
            verified_copy.display(),
            err
        );
    }
    Err(FactureroError::SourceDeletion {
        path: source.display().to_string(),
        attempts: DELETE_ATTEMPTS,
    })
}

fn collision_name(file_name: &std::ffi::OsStr, hash: &str) -> String {
    let name = Path::new(file_name);
    let stem = name
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = name
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    format!("{stem}__{}{extension}", &hash[..8])
}
