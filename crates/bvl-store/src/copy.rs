//! File copy primitives shared by `store` and `extract`.
//!
//! Content is written to a temporary file next to the target and then
//! renamed into place, so a failed copy never leaves a partial file at the
//! target path. The temporary file is removed when dropped.

use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::Path;

use tempfile::NamedTempFile;

/// How the staged file is published at the target path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Publish {
    /// Keep whatever is already at the target.
    NoClobber,
    /// Replace the target.
    Replace,
}

/// What publishing did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Published {
    Written,
    /// Another writer published the same target first (`NoClobber` only).
    AlreadyPresent,
}

#[derive(Debug)]
pub(crate) enum CopyError {
    CreateDir(io::Error),
    Copy(io::Error),
}

/// Copy `source` to `target`, creating parent directories on demand.
pub(crate) fn copy_file(
    source: &Path,
    target: &Path,
    mode: Publish,
) -> Result<Published, CopyError> {
    let dir = target.parent().ok_or_else(|| {
        CopyError::Copy(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} has no parent directory", target.display()),
        ))
    })?;
    // Racing creators of the same shard are fine: create_dir_all treats an
    // existing directory as success.
    fs::create_dir_all(dir).map_err(CopyError::CreateDir)?;

    let mut reader = File::open(source).map_err(CopyError::Copy)?;
    let permissions = reader.metadata().map_err(CopyError::Copy)?.permissions();

    let mut staged = NamedTempFile::new_in(dir).map_err(CopyError::Copy)?;
    io::copy(&mut reader, staged.as_file_mut()).map_err(CopyError::Copy)?;
    staged
        .as_file()
        .set_permissions(permissions)
        .map_err(CopyError::Copy)?;

    match mode {
        Publish::NoClobber => match staged.persist_noclobber(target) {
            Ok(_) => Ok(Published::Written),
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
                Ok(Published::AlreadyPresent)
            }
            Err(e) => Err(CopyError::Copy(e.error)),
        },
        Publish::Replace => staged
            .persist(target)
            .map(|_| Published::Written)
            .map_err(|e| CopyError::Copy(e.error)),
    }
}

/// Byte-for-byte comparison of two files.
pub(crate) fn same_content(a: &Path, b: &Path) -> io::Result<bool> {
    if fs::metadata(a)?.len() != fs::metadata(b)?.len() {
        return Ok(false);
    }

    let mut ra = BufReader::new(File::open(a)?);
    let mut rb = BufReader::new(File::open(b)?);
    let mut buf_a = [0u8; 64 * 1024];
    let mut buf_b = [0u8; 64 * 1024];
    loop {
        let n = read_full(&mut ra, &mut buf_a)?;
        let m = read_full(&mut rb, &mut buf_b)?;
        if n != m || buf_a[..n] != buf_b[..m] {
            return Ok(false);
        }
        if n == 0 {
            return Ok(true);
        }
    }
}

/// Fill `buf` as far as the reader allows; returns bytes read (0 at EOF).
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
