use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};

use crate::error::Result;

pub mod authoring;
pub mod fixtures;
pub mod schema;

pub use authoring::{NewComment, NewPost};
pub use fixtures::{Fixture, FixtureSummary};

/// 实体存储：作者、文章、标签、评论与点赞
///
/// 读查询都经过 `record_query` 计数，便于确认每个页面的查询次数是固定的。
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
    reads: Arc<AtomicUsize>,
}

impl Store {
    /// 连接到数据库，文件不存在时自动创建
    pub async fn connect(database_url: &str) -> Result<Self> {
        info!("连接数据库: {}", database_url);
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        Ok(Self::from_pool(pool))
    }

    /// 创建一个已初始化表结构的内存数据库
    ///
    /// 内存数据库只存在于单个连接上，所以连接池固定为一个永不回收的连接。
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let store = Self::from_pool(pool);
        store.init_schema().await?;
        Ok(store)
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self {
            pool,
            reads: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// 创建所有表和索引（幂等）
    pub async fn init_schema(&self) -> Result<()> {
        sqlx::raw_sql(schema::SCHEMA).execute(&self.pool).await?;
        debug!("schema initialised");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// 到目前为止发出的读查询次数
    pub fn queries_issued(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }

    pub(crate) fn record_query(&self, kind: &'static str) {
        let n = self.reads.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(kind, n, "store read");
    }
}
