//! Folder-name sanitization
//!
//! Every operator-influenced path component (client, counterparty,
//! subtype, account) goes through here before it becomes a directory name
//! on the accounting drive. The drive may be FAT/NTFS, so the Windows
//! reserved set is replaced even when running elsewhere.

use once_cell::sync::Lazy;
use regex::Regex;

static RESERVED: Lazy<Regex> = Lazy::new(|| Regex::new(r#"[\\/:*?"<>|]"#).expect("valid regex"));

/// Replace reserved characters with `_`, trim, and strip trailing dots
/// and spaces (Windows rejects them at the end of a directory name).
///
/// May return an empty string; callers substitute their default.
pub fn sanitize_folder_name(name: &str) -> String {
    let replaced = RESERVED.replace_all(name, "_");
    replaced
        .trim()
        .trim_end_matches(['.', ' '])
        .to_string()
}
