use super::{encode_path, ByteStream, Credentials, RemoteConnector, RemoteEntry, RemoteTree};
use crate::error::{Result, SyncError};
use async_trait::async_trait;
use futures::TryStreamExt;
use opendal::{Metakey, Operator};
use std::sync::Arc;
use tracing::debug;

/// WebDAV 远程文件树
///
/// 目录列表走 opendal 的 WebDAV 服务（PROPFIND depth 1），文件读取直接用
/// reqwest 发 GET，这样失败时能拿到服务器返回的状态描述。
pub struct WebDavRemote {
    operator: Operator,
    http: reqwest::Client,
    endpoint: String,
    credentials: Credentials,
    name: String,
}

impl WebDavRemote {
    pub fn new(endpoint: &str, credentials: &Credentials) -> Result<Self> {
        use opendal::services::Webdav;

        let endpoint = endpoint.trim_end_matches('/').to_string();

        let builder = Webdav::default()
            .endpoint(&endpoint)
            .username(&credentials.username)
            .password(&credentials.password)
            .root("/");

        let operator = Operator::new(builder)
            .map_err(|e| SyncError::Config(format!("无法创建 WebDAV 客户端: {}", e)))?
            .finish();

        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| SyncError::Config(format!("无法创建 HTTP 客户端: {}", e)))?;

        let name = format!("webdav://{}@{}", credentials.username, endpoint);

        Ok(Self {
            operator,
            http,
            endpoint,
            credentials: credentials.clone(),
            name,
        })
    }
}

#[async_trait]
impl RemoteTree for WebDavRemote {
    async fn list_children(&self, dir: &str) -> Result<Vec<RemoteEntry>> {
        // opendal 的路径相对于 root，不带前导 /
        let path = match dir.trim_start_matches('/') {
            "" => "/",
            p => p,
        };

        let mut lister = self
            .operator
            .lister_with(path)
            .metakey(Metakey::LastModified | Metakey::Mode)
            .await
            .map_err(|e| SyncError::list(dir, e))?;

        let mut entries = Vec::new();
        while let Some(entry) = lister.try_next().await.map_err(|e| SyncError::list(dir, e))? {
            let meta = entry.metadata();
            // opendal 已解码 href，这里还原成协议原始形式，解码统一在爬取阶段做
            let decoded = format!("/{}", entry.path().trim_start_matches('/'));
            entries.push(RemoteEntry {
                href: encode_path(&decoded),
                is_collection: meta.is_dir(),
                last_modified: meta.last_modified(),
            });
        }

        debug!("{} 列出 {}: {} 项", self.name, dir, entries.len());
        Ok(entries)
    }

    async fn open_read(&self, path: &str) -> Result<ByteStream> {
        let url = format!("{}{}", self.endpoint, encode_path(path));

        let response = self
            .http
            .get(&url)
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .send()
            .await
            .map_err(|e| SyncError::fetch(path, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::fetch(path, status));
        }

        let stream = response.bytes_stream().map_err(std::io::Error::other);
        Ok(Box::pin(stream))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// 为每个任务创建独立的 WebDAV 客户端
#[derive(Debug, Clone)]
pub struct WebDavConnector {
    endpoint: String,
}

impl WebDavConnector {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl RemoteConnector for WebDavConnector {
    async fn connect(&self, credentials: &Credentials) -> Result<Arc<dyn RemoteTree>> {
        Ok(Arc::new(WebDavRemote::new(&self.endpoint, credentials)?) as Arc<dyn RemoteTree>)
    }
}
