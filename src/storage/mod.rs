#[cfg(test)]
pub mod memory;
pub mod webdav;

use crate::error::Result;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::Stream;
use std::fmt;
use std::pin::Pin;
use std::sync::Arc;

pub use webdav::{WebDavConnector, WebDavRemote};

/// 远程文件内容流
pub type ByteStream = Pin<Box<dyn Stream<Item = std::io::Result<Bytes>> + Send>>;

/// 登录凭据，显式传入爬取和下载流程
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// 目录列表中的一项
#[derive(Debug, Clone)]
pub struct RemoteEntry {
    /// 服务器绝对路径，保持协议原始的百分号编码形式
    pub href: String,
    pub is_collection: bool,
    pub last_modified: Option<DateTime<Utc>>,
}

/// 远程文件树的访问接口
#[async_trait]
pub trait RemoteTree: Send + Sync {
    /// 列出目录的直接子项（不递归）
    ///
    /// `dir` 为已解码的服务器绝对路径，以 `/` 结尾。返回结果可能包含目录自身。
    async fn list_children(&self, dir: &str) -> Result<Vec<RemoteEntry>>;

    /// 打开远程文件读取，`path` 为已解码的服务器绝对路径
    async fn open_read(&self, path: &str) -> Result<ByteStream>;

    /// 获取存储名称（用于日志）
    fn name(&self) -> &str;
}

/// 远程客户端工厂，每个任务各自建立连接
#[async_trait]
pub trait RemoteConnector: Send + Sync {
    async fn connect(&self, credentials: &Credentials) -> Result<Arc<dyn RemoteTree>>;
}

/// 按段百分号编码路径，保留 `/`
pub fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
