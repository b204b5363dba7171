//! Filesystem utilities.

use std::fs::{self, File};
use std::io;
use std::path::Path;

/// Overwrite `dst` with the contents of `src`.
///
/// `dst` is truncated and rewritten in place, so its permissions and inode
/// are kept. Returns the number of bytes copied.
pub fn replace_file_contents(src: &Path, dst: &Path) -> io::Result<u64> {
    let mut input = File::open(src)?;
    let mut output = File::create(dst)?;
    let copied = io::copy(&mut input, &mut output)?;
    output.sync_all()?;
    Ok(copied)
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> io::Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}
