use crate::core::model::{LocalFileDescriptor, RemoteFileDescriptor, ResourceMapping, SyncItem};
use std::collections::HashMap;
use tracing::debug;

/// 以相对路径左外连接远程与本地文件，选出需要下载的文件
///
/// - 本地没有：下载到 `local_root` + 相对路径
/// - 远程严格更新：覆盖已有的本地文件
/// - 时间相同或本地更新：跳过
pub fn reconcile(
    remote_files: &[RemoteFileDescriptor],
    local_files: &[LocalFileDescriptor],
    mapping: &ResourceMapping,
) -> Vec<SyncItem> {
    let local_index: HashMap<&str, &LocalFileDescriptor> = local_files
        .iter()
        .map(|f| (f.relative_path.as_str(), f))
        .collect();

    let mut items = Vec::new();
    let mut skipped = 0usize;

    for remote in remote_files {
        let destination = match local_index.get(remote.relative_path.as_str()) {
            None => mapping.local_root.join(&remote.relative_path),
            Some(local) if remote.last_modified > local.last_modified => local.path.clone(),
            Some(_) => {
                skipped += 1;
                continue;
            }
        };

        items.push(SyncItem {
            source_uri: remote.uri.clone(),
            destination,
        });
    }

    debug!(
        "比较完成: {} 需要同步, {} 已是最新 ({})",
        items.len(),
        skipped,
        mapping.local_root.display()
    );
    items
}
