use std::fmt;
use thiserror::Error;

/// 可被查找的实体类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Post,
    Tag,
    Author,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Post => "post",
            EntityKind::Tag => "tag",
            EntityKind::Author => "author",
        };
        f.write_str(name)
    }
}

/// 博客核心错误类型
#[derive(Error, Debug)]
pub enum BlogError {
    /// 按 slug 或标签名查找不到实体，页面边界上对应 404
    #[error("{kind} not found: {key}")]
    NotFound {
        kind: EntityKind,
        key: String,
    },

    #[error("作者 {username} 不是 staff 账号，不能发布文章")]
    NotStaff {
        username: String,
    },

    #[error("{field} 超过 {max} 个字符")]
    TooLong {
        field: &'static str,
        max: usize,
    },

    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("模板渲染失败: {0}")]
    Render(#[from] tera::Error),

    #[error("fixture 错误: {0}")]
    Fixture(String),
}

impl BlogError {
    pub fn not_found(kind: EntityKind, key: impl Into<String>) -> Self {
        BlogError::NotFound {
            kind,
            key: key.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, BlogError::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, BlogError>;
