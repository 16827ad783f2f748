use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path, PathBuf, MAIN_SEPARATOR_STR};

/// 一组远程子树到本地子树的映射
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceMapping {
    /// 服务器上的根路径，例如 `/dav/group/xxx`
    pub server_root: String,
    pub local_root: PathBuf,
    /// 相对 server_root 的排除前缀
    #[serde(default)]
    pub excludes: Vec<String>,
}

impl ResourceMapping {
    pub fn new(server_root: impl Into<String>, local_root: impl Into<PathBuf>) -> Self {
        Self {
            server_root: server_root.into(),
            local_root: local_root.into(),
            excludes: Vec::new(),
        }
    }

    pub fn with_excludes<I, S>(mut self, excludes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excludes = excludes.into_iter().map(Into::into).collect();
        self
    }

    /// 规范化后的远程根目录，以 `/` 开头和结尾
    pub fn remote_root(&self) -> String {
        let trimmed = self.server_root.trim_matches('/');
        if trimmed.is_empty() {
            "/".to_string()
        } else {
            format!("/{}/", trimmed)
        }
    }

    /// 远程相对路径是否命中排除前缀
    pub fn is_excluded(&self, relative: &str) -> bool {
        self.excludes
            .iter()
            .map(|ex| ex.trim_start_matches('/'))
            .filter(|ex| !ex.is_empty())
            .any(|ex| relative.starts_with(ex))
    }
}

/// 远程文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFileDescriptor {
    /// 已解码的服务器绝对路径
    pub uri: String,
    pub relative_path: String,
    pub last_modified: DateTime<Utc>,
}

/// 本地文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFileDescriptor {
    pub path: PathBuf,
    pub relative_path: String,
    pub last_modified: DateTime<Utc>,
}

/// 一个需要下载的文件
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SyncItem {
    pub source_uri: String,
    pub destination: PathBuf,
}

impl fmt::Display for SyncItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] -> [{}]", self.source_uri, self.destination.display())
    }
}

/// 远程相对路径是否含有 `.` 或 `..` 段
pub fn has_dot_segment(relative: &str) -> bool {
    relative.split('/').any(|s| s == "." || s == "..")
}

/// 把 `/` 分隔的远程相对路径转成本地分隔符形式
///
/// 远程与本地两侧的相对路径都必须经过同样的规范化才能作为连接键。
pub fn remote_to_relative(remote: &str) -> String {
    remote
        .split('/')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(MAIN_SEPARATOR_STR)
}

/// 本地相对路径的连接键
pub fn local_to_relative(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join(MAIN_SEPARATOR_STR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_root_normalized() {
        assert_eq!(ResourceMapping::new("/dav/course", "x").remote_root(), "/dav/course/");
        assert_eq!(ResourceMapping::new("dav/course/", "x").remote_root(), "/dav/course/");
        assert_eq!(ResourceMapping::new("/", "x").remote_root(), "/");
    }

    #[test]
    fn test_exclude_prefix() {
        let mapping = ResourceMapping::new("/dav", "x").with_excludes(["private", "/old/", ""]);
        assert!(mapping.is_excluded("private"));
        assert!(mapping.is_excluded("private/c.txt"));
        assert!(mapping.is_excluded("old/a.txt"));
        assert!(!mapping.is_excluded("public/private/c.txt"));
        assert!(!mapping.is_excluded("a.txt"));
    }

    #[test]
    fn test_relative_keys_match_across_sides() {
        let remote = remote_to_relative("sub/dir/b.txt");
        let local = local_to_relative(&Path::new("sub").join("dir").join("b.txt"));
        assert_eq!(remote, local);
        assert_eq!(remote_to_relative("/a.txt"), "a.txt");
    }

    #[test]
    fn test_dot_segments_detected() {
        assert!(has_dot_segment("../evil.txt"));
        assert!(has_dot_segment("sub/./b.txt"));
        assert!(has_dot_segment(".."));
        assert!(!has_dot_segment("sub/..hidden/b.txt"));
        assert!(!has_dot_segment(".gitignore"));
    }

    #[test]
    fn test_sync_item_display() {
        let item = SyncItem {
            source_uri: "/dav/a.txt".to_string(),
            destination: PathBuf::from("a.txt"),
        };
        assert_eq!(item.to_string(), "[/dav/a.txt] -> [a.txt]");
    }
}
