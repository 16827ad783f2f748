//! 应用配置模块

use crate::core::ResourceMapping;
use crate::error::{Result, SyncError};
use crate::logging::LogConfig;
use crate::storage::Credentials;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::Path;

/// 配置文件名，从工作目录读取
pub const CONFIG_FILE_NAME: &str = "SyncConfig.json";

fn default_server() -> String {
    "https://sakai.sustc.edu.cn".to_string()
}

/// 同步配置
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// WebDAV 服务器地址
    #[serde(default = "default_server")]
    pub server: String,
    pub username: String,
    pub password: String,
    pub resources: Vec<ResourceMapping>,
    #[serde(default)]
    pub log: LogConfig,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("server", &self.server)
            .field("username", &self.username)
            .field("resources", &self.resources)
            .field("log", &self.log)
            .finish_non_exhaustive()
    }
}

impl AppConfig {
    /// 从配置文件加载
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            SyncError::Config(format!("无法读取配置文件 {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let config: AppConfig = serde_json::from_str(content)
            .map_err(|e| SyncError::Config(format!("配置文件格式错误: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !(self.server.starts_with("http://") || self.server.starts_with("https://")) {
            return Err(SyncError::Config(format!(
                "server 必须是 http(s) 地址: {}",
                self.server
            )));
        }
        if self.username.trim().is_empty() {
            return Err(SyncError::Config("username 不能为空".to_string()));
        }
        for res in &self.resources {
            if !res.server_root.starts_with('/') {
                return Err(SyncError::Config(format!(
                    "serverRoot 必须以 / 开头: {}",
                    res.server_root
                )));
            }
            if res.local_root.as_os_str().is_empty() {
                return Err(SyncError::Config(format!(
                    "{} 缺少 localRoot",
                    res.server_root
                )));
            }
        }
        Ok(())
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(&self.username, &self.password)
    }
}
