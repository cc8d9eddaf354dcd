//! Zip archives of class directories.

use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// An entry to be archived.
enum Entry {
    Directory(String),
    File(String, PathBuf, u64),
}

/// Writes a zip archive of everything under `source` to `target`.
///
/// Entry names are relative to `source`. Returns the number of files
/// archived. The archive is synced to disk before returning.
///
/// This blocks and must be run with `spawn_blocking`.
pub(super) fn write_archive(source: &Path, target: &Path) -> Result<usize> {
    let mut entries = Vec::new();
    collect_entries(source, "", &mut entries)?;

    let file = File::create(target)?;
    let mut zip = ZipWriter::new(BufWriter::new(file));

    let mut files = 0;
    for entry in entries {
        match entry {
            Entry::Directory(name) => {
                zip.add_directory(name, file_options(false))?;
            }
            Entry::File(name, path, size) => {
                zip.start_file(name, file_options(size >= u32::MAX as u64))?;

                let mut reader = File::open(&path)?;
                io::copy(&mut reader, &mut zip)?;
                files += 1;
            }
        }
    }

    let file = zip
        .finish()?
        .into_inner()
        .map_err(|e| anyhow!("Failed to flush archive: {}", e.error()))?;
    file.sync_all()?;

    Ok(files)
}

fn file_options(large_file: bool) -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .large_file(large_file)
}

/// Lists the directory tree under `dir` in a stable order.
fn collect_entries(dir: &Path, prefix: &str, entries: &mut Vec<Entry>) -> Result<()> {
    let mut children = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<io::Result<Vec<_>>>()?;
    children.sort();

    for path in children {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| anyhow!("Cannot archive non-UTF-8 path {:?}", path))?;
        let name = format!("{}{}", prefix, file_name);

        // Symlinks are not followed
        let metadata = fs::symlink_metadata(&path)?;
        if metadata.is_dir() {
            let name = format!("{}/", name);
            entries.push(Entry::Directory(name.clone()));
            collect_entries(&path, &name, entries)?;
        } else if metadata.is_file() {
            entries.push(Entry::File(name, path, metadata.len()));
        } else {
            tracing::warn!("Skipping {:?}: not a regular file", path);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Read;

    use tempfile::TempDir;
    use zip::ZipArchive;

    fn read_archive(path: &Path) -> Vec<(String, Vec<u8>)> {
        let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
        let mut contents = Vec::new();

        for i in 0..archive.len() {
            let mut file = archive.by_index(i).unwrap();
            let mut data = Vec::new();
            file.read_to_end(&mut data).unwrap();
            contents.push((file.name().to_string(), data));
        }

        contents
    }

    #[test]
    fn test_nested() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("CS101");
        fs::create_dir_all(source.join("extra/deeper")).unwrap();
        fs::write(source.join("1001_Alice.zip"), b"alice").unwrap();
        fs::write(source.join("extra/deeper/notes.txt"), b"notes").unwrap();

        let target = dir.path().join("out.zip");
        assert_eq!(2, write_archive(&source, &target).unwrap());

        assert_eq!(
            vec![
                ("1001_Alice.zip".to_string(), b"alice".to_vec()),
                ("extra/".to_string(), Vec::new()),
                ("extra/deeper/".to_string(), Vec::new()),
                ("extra/deeper/notes.txt".to_string(), b"notes".to_vec()),
            ],
            read_archive(&target)
        );
    }

    #[test]
    fn test_empty_directory() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("CS101");
        fs::create_dir_all(&source).unwrap();

        let target = dir.path().join("out.zip");
        assert_eq!(0, write_archive(&source, &target).unwrap());
        assert!(read_archive(&target).is_empty());
    }

    #[test]
    fn test_missing_source() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("out.zip");

        write_archive(&dir.path().join("CS101"), &target).unwrap_err();
    }
}
