//! Atomic output files: write to a temp file beside the destination, then
//! rename over it. A failed write leaves any existing file untouched.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

fn parent_dir_or_dot(path: &Path) -> &Path {
    // `Path::parent` is `Some("")` for a bare file name.
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

/// Write `bytes` to `dest` atomically, creating parent directories as needed.
pub fn atomic_write_bytes(dest: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = parent_dir_or_dot(dest);
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file_mut().flush()?;
    tmp.as_file().sync_all()?;

    tmp.persist(dest).map_err(|err| err.error)?;
    Ok(())
}
