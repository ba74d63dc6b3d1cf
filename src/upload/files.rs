use super::types::{FileSource, UploadFile};
use ignore::Walk;
use std::path::{Path, PathBuf};

/// Expands picked or dropped paths into upload files. Directories are walked recursively,
/// honouring `.gitignore` and hidden-file rules.
pub fn collect_files(paths: &[PathBuf]) -> Vec<UploadFile> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_dir() {
            for entry in Walk::new(path) {
                match entry {
                    Ok(entry) if entry.path().is_file() => {
                        if let Some(file) = to_upload_file(entry.path()) {
                            files.push(file);
                        }
                    }
                    Ok(_) => {}
                    Err(e) => tracing::warn!("Error walking {}: {}", path.display(), e),
                }
            }
        } else if let Some(file) = to_upload_file(path) {
            files.push(file);
        }
    }

    files
}

fn to_upload_file(path: &Path) -> Option<UploadFile> {
    let name = path.file_name()?.to_str()?.to_string();
    Some(UploadFile {
        name,
        source: FileSource::Path(path.to_path_buf()),
    })
}
