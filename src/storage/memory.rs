//! 内存远程文件树，仅用于测试

use super::{encode_path, ByteStream, Credentials, RemoteConnector, RemoteEntry, RemoteTree};
use crate::error::{Result, SyncError};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
struct Node {
    is_dir: bool,
    modified: Option<DateTime<Utc>>,
    data: Bytes,
}

/// 以已解码的服务器绝对路径为键的文件树，目录以 `/` 结尾
#[derive(Debug, Default)]
pub struct MemoryRemote {
    nodes: Mutex<BTreeMap<String, Node>>,
    failing_dirs: Mutex<HashSet<String>>,
    listed: Mutex<Vec<String>>,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加文件，自动补齐所有上级目录
    pub fn add_file(&self, path: &str, modified: Option<DateTime<Utc>>, data: &[u8]) {
        let mut nodes = self.nodes.lock().unwrap();
        let mut dir = String::from("/");
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        for part in &parts[..parts.len().saturating_sub(1)] {
            dir.push_str(part);
            dir.push('/');
            nodes.entry(dir.clone()).or_insert(Node {
                is_dir: true,
                modified: None,
                data: Bytes::new(),
            });
        }
        nodes.insert(
            path.to_string(),
            Node {
                is_dir: false,
                modified,
                data: Bytes::copy_from_slice(data),
            },
        );
    }

    /// 让该目录的列表请求失败
    pub fn fail_listing(&self, dir: &str) {
        self.failing_dirs.lock().unwrap().insert(dir.to_string());
    }

    /// 已请求过列表的目录，按请求顺序
    pub fn listed_dirs(&self) -> Vec<String> {
        self.listed.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteTree for MemoryRemote {
    async fn list_children(&self, dir: &str) -> Result<Vec<RemoteEntry>> {
        self.listed.lock().unwrap().push(dir.to_string());
        if self.failing_dirs.lock().unwrap().contains(dir) {
            return Err(SyncError::list(dir, "500 Internal Server Error"));
        }

        let nodes = self.nodes.lock().unwrap();
        // 与 PROPFIND 一致：第一项是目录自身
        let mut entries = vec![RemoteEntry {
            href: encode_path(dir),
            is_collection: true,
            last_modified: None,
        }];
        for (path, node) in nodes.range(dir.to_string()..) {
            let Some(rest) = path.strip_prefix(dir) else {
                break;
            };
            let rest = rest.trim_end_matches('/');
            if rest.is_empty() || rest.contains('/') {
                continue;
            }
            entries.push(RemoteEntry {
                href: encode_path(path),
                is_collection: node.is_dir,
                last_modified: node.modified,
            });
        }
        Ok(entries)
    }

    async fn open_read(&self, path: &str) -> Result<ByteStream> {
        let data = match self.nodes.lock().unwrap().get(path) {
            Some(node) if !node.is_dir => node.data.clone(),
            _ => return Err(SyncError::fetch(path, "404 Not Found")),
        };
        // 拆成两块，验证流式拷贝
        let mid = data.len() / 2;
        let chunks = vec![Ok(data.slice(..mid)), Ok(data.slice(mid..))];
        Ok(Box::pin(futures::stream::iter(chunks)))
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// 所有连接共享同一棵树，并记录连接次数
#[derive(Debug, Default)]
pub struct MemoryConnector {
    pub remote: Arc<MemoryRemote>,
    connections: AtomicUsize,
}

impl MemoryConnector {
    pub fn new(remote: Arc<MemoryRemote>) -> Self {
        Self {
            remote,
            connections: AtomicUsize::new(0),
        }
    }

    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteConnector for MemoryConnector {
    async fn connect(&self, _credentials: &Credentials) -> Result<Arc<dyn RemoteTree>> {
        self.connections.fetch_add(1, Ordering::SeqCst);
        Ok(self.remote.clone() as Arc<dyn RemoteTree>)
    }
}
