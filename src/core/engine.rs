use crate::core::crawler::crawl;
use crate::core::model::{ResourceMapping, SyncItem};
use crate::core::reconciler::reconcile;
use crate::core::scanner::scan;
use crate::core::transfer::fetch;
use crate::error::Result;
use crate::storage::{Credentials, RemoteConnector};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{info, warn};

/// 同步报告
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub mappings: usize,
    pub remote_files: usize,
    pub local_files: usize,
    pub items: usize,
    pub bytes_transferred: u64,
    pub duration: Duration,
}

/// 同步引擎
///
/// 第一阶段每个映射一个任务（爬取与本地扫描并发，然后比较），结果汇入共享列表；
/// 全部完成后第二阶段每个文件一个任务并发下载。任一任务失败即终止整次同步。
pub struct SyncEngine {
    connector: Arc<dyn RemoteConnector>,
    credentials: Credentials,
}

impl SyncEngine {
    pub fn new(connector: Arc<dyn RemoteConnector>, credentials: Credentials) -> Self {
        Self {
            connector,
            credentials,
        }
    }

    /// 运行同步任务
    pub async fn run(&self, mappings: &[ResourceMapping]) -> Result<SyncReport> {
        let started = Instant::now();

        info!("正在生成同步列表 ({} 个映射)", mappings.len());
        let (items, remote_files, local_files) = self.build_sync_list(mappings).await?;
        report_overlaps(&items);

        info!("需要同步 {} 个文件", items.len());
        let item_count = items.len();
        let bytes_transferred = self.transfer_all(items).await?;

        Ok(SyncReport {
            mappings: mappings.len(),
            remote_files,
            local_files,
            items: item_count,
            bytes_transferred,
            duration: started.elapsed(),
        })
    }

    /// 第一阶段：为每个映射生成同步列表
    pub async fn build_sync_list(
        &self,
        mappings: &[ResourceMapping],
    ) -> Result<(Vec<SyncItem>, usize, usize)> {
        let sync_list = Arc::new(Mutex::new(Vec::<SyncItem>::new()));
        let mut tasks = JoinSet::new();

        for mapping in mappings.iter().cloned() {
            let connector = self.connector.clone();
            let credentials = self.credentials.clone();
            let sync_list = sync_list.clone();

            tasks.spawn(async move {
                let remote = connector.connect(&credentials).await?;
                let (remote_files, local_files) =
                    tokio::try_join!(crawl(remote.as_ref(), &mapping), scan(&mapping.local_root))?;

                let items = reconcile(&remote_files, &local_files, &mapping);
                sync_list.lock().await.extend(items);

                Ok::<_, crate::error::SyncError>((remote_files.len(), local_files.len()))
            });
        }

        let mut remote_total = 0;
        let mut local_total = 0;
        // 提前返回时 JoinSet 被丢弃，其余任务随之中止
        while let Some(joined) = tasks.join_next().await {
            let (remote_count, local_count) = joined??;
            remote_total += remote_count;
            local_total += local_count;
        }

        let items = std::mem::take(&mut *sync_list.lock().await);
        Ok((items, remote_total, local_total))
    }

    /// 第二阶段：每个文件一个任务并发下载，返回总字节数
    pub async fn transfer_all(&self, items: Vec<SyncItem>) -> Result<u64> {
        let mut tasks = JoinSet::new();

        for item in items {
            let connector = self.connector.clone();
            let credentials = self.credentials.clone();

            tasks.spawn(async move {
                let remote = connector.connect(&credentials).await?;
                info!("开始同步: {}", item);
                let bytes = fetch(remote.as_ref(), &item).await?;
                info!("同步完成: {}", item);
                Ok::<_, crate::error::SyncError>(bytes)
            });
        }

        let mut total = 0;
        while let Some(joined) = tasks.join_next().await {
            total += joined??;
        }
        Ok(total)
    }
}

/// 多个同步项指向同一目标路径时给出警告，不去重
fn report_overlaps(items: &[SyncItem]) {
    for (path, count) in overlapping_destinations(items) {
        warn!("{} 个同步项写入同一目标: {}", count, path.display());
    }
}

/// 出现不止一次的目标路径及其次数，按路径排序
fn overlapping_destinations(items: &[SyncItem]) -> Vec<(&PathBuf, usize)> {
    let mut targets: HashMap<&PathBuf, usize> = HashMap::new();
    for item in items {
        *targets.entry(&item.destination).or_default() += 1;
    }
    let mut overlaps: Vec<_> = targets.into_iter().filter(|(_, c)| *c > 1).collect();
    overlaps.sort();
    overlaps
}
