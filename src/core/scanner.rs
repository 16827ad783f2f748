use crate::core::model::{local_to_relative, LocalFileDescriptor};
use crate::error::{Result, SyncError};
use chrono::{DateTime, Utc};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// 递归列出本地根目录下的所有普通文件
///
/// 根目录不存在时返回错误，不负责创建目录。
pub async fn scan(local_root: &Path) -> Result<Vec<LocalFileDescriptor>> {
    let root = local_root.to_path_buf();

    // 使用 spawn_blocking 避免阻塞 async runtime
    let files = tokio::task::spawn_blocking(move || scan_blocking(&root)).await??;

    info!("本地扫描完成: {} ({} 个文件)", local_root.display(), files.len());
    Ok(files)
}

fn scan_blocking(root: &Path) -> Result<Vec<LocalFileDescriptor>> {
    if !root.is_dir() {
        return Err(SyncError::filesystem(
            root,
            io::Error::new(io::ErrorKind::NotFound, "本地目录不存在"),
        ));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry.map_err(|e| walk_error(root, e))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let metadata = entry.metadata().map_err(|e| walk_error(path, e))?;
        let modified = metadata
            .modified()
            .map_err(|e| SyncError::filesystem(path, e))?;

        let Ok(relative) = path.strip_prefix(root) else {
            continue;
        };

        debug!("本地文件: {}", relative.display());
        files.push(LocalFileDescriptor {
            path: path.to_path_buf(),
            relative_path: local_to_relative(relative),
            last_modified: DateTime::<Utc>::from(modified),
        });
    }

    Ok(files)
}

fn walk_error(fallback: &Path, err: walkdir::Error) -> SyncError {
    let path = err.path().map(PathBuf::from).unwrap_or_else(|| fallback.to_path_buf());
    let source = err
        .into_io_error()
        .unwrap_or_else(|| io::Error::other("目录遍历出现循环"));
    SyncError::filesystem(path, source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::MAIN_SEPARATOR_STR;

    #[tokio::test]
    async fn test_scan_lists_files_relative_to_root() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), b"a").unwrap();
        fs::create_dir_all(dir.path().join("sub").join("empty")).unwrap();
        fs::write(dir.path().join("sub").join("b.txt"), b"b").unwrap();

        let files = scan(dir.path()).await.unwrap();
        let mut relative: Vec<_> = files.iter().map(|f| f.relative_path.clone()).collect();
        relative.sort();

        assert_eq!(
            relative,
            vec!["a.txt".to_string(), format!("sub{}b.txt", MAIN_SEPARATOR_STR)]
        );
        let a = files.iter().find(|f| f.relative_path == "a.txt").unwrap();
        assert_eq!(a.path, dir.path().join("a.txt"));
    }

    #[tokio::test]
    async fn test_scan_records_modified_time() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.txt");
        fs::write(&file, b"a").unwrap();
        let expected = DateTime::<Utc>::from(fs::metadata(&file).unwrap().modified().unwrap());

        let files = scan(dir.path()).await.unwrap();

        assert_eq!(files[0].last_modified, expected);
    }

    #[tokio::test]
    async fn test_scan_missing_root_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");

        let err = scan(&missing).await.unwrap_err();

        assert!(matches!(err, SyncError::Filesystem { ref path, .. } if *path == missing));
    }

    #[tokio::test]
    async fn test_scan_empty_root() {
        let dir = tempfile::tempdir().unwrap();
        assert!(scan(dir.path()).await.unwrap().is_empty());
    }
}
