//! 错误类型

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// 同步过程中的所有错误，任何一个都会终止整次同步
#[derive(Debug, Error)]
pub enum SyncError {
    /// 配置文件缺失、格式错误或字段非法
    #[error("配置错误: {0}")]
    Config(String),

    /// 远程目录列表请求失败
    #[error("列出远程目录失败 {dir}: {message}")]
    NetworkList { dir: String, message: String },

    /// 本地目录缺失、创建目录或写文件失败
    #[error("文件系统错误 {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// 远程读取返回失败响应
    #[error("下载失败 {uri}: {description}")]
    Fetch { uri: String, description: String },

    /// 后台任务 panic 或被中止
    #[error("同步任务异常终止: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl SyncError {
    pub fn filesystem(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }

    pub fn fetch(uri: impl Into<String>, description: impl ToString) -> Self {
        Self::Fetch {
            uri: uri.into(),
            description: description.to_string(),
        }
    }

    pub fn list(dir: impl Into<String>, message: impl ToString) -> Self {
        Self::NetworkList {
            dir: dir.into(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
