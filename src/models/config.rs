use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};

/// 站点配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// 站点标题
    pub title: String,
    /// 数据库连接串
    #[serde(default = "default_database_url")]
    pub database_url: String,
    /// 图片等媒体文件的基础 URL
    #[serde(default = "default_media_url")]
    pub media_url: String,
    /// 主题目录，未设置时使用内置主题
    pub theme: Option<String>,
    /// 静态输出目录
    pub public_dir: Option<String>,
    /// 各个列表的长度
    #[serde(default)]
    pub listing: ListingConfig,
}

/// 页面上各列表的条目数
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingConfig {
    pub popular_posts: i64,
    pub fresh_posts: i64,
    pub popular_tags: i64,
    pub tag_posts: i64,
}

fn default_database_url() -> String {
    "sqlite://blog.db".to_string()
}

fn default_media_url() -> String {
    "/media/".to_string()
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            popular_posts: 5,
            fresh_posts: 5,
            popular_tags: 5,
            tag_posts: 20,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: "My Blog".to_string(),
            database_url: default_database_url(),
            media_url: default_media_url(),
            theme: None,
            public_dir: Some("public".to_string()),
            listing: ListingConfig::default(),
        }
    }
}

impl Config {
    /// 从文件加载配置
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("读取配置文件失败: {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("解析配置文件失败: {}", path.display()))?;
        Ok(config)
    }

    /// 配置文件存在时加载，否则使用默认配置
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// 保存配置到文件
    pub fn save(&self, path: &Path) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        fs::write(path, yaml)?;
        Ok(())
    }

    pub fn public_dir(&self) -> PathBuf {
        PathBuf::from(self.public_dir.as_deref().unwrap_or("public"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_yaml_uses_defaults() {
        let config: Config = serde_yaml::from_str("title: Test\n").unwrap();
        assert_eq!(config.database_url, "sqlite://blog.db");
        assert_eq!(config.media_url, "/media/");
        assert_eq!(config.listing.tag_posts, 20);
        assert_eq!(config.listing.popular_posts, 5);
        assert_eq!(config.public_dir(), PathBuf::from("public"));
    }

    #[test]
    fn test_partial_listing_override() {
        let yaml = "title: Test\nlisting:\n  popular_tags: 10\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.listing.popular_tags, 10);
        assert_eq!(config.listing.fresh_posts, 5);
    }

    #[test]
    fn test_save_and_load() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("blog.yml");

        let mut config = Config::default();
        config.title = "Saved".to_string();
        config.media_url = "https://cdn.example.com/media/".to_string();
        config.save(&path)?;

        let loaded = Config::load(&path)?;
        assert_eq!(loaded.title, "Saved");
        assert_eq!(loaded.media_url, "https://cdn.example.com/media/");
        Ok(())
    }

    #[test]
    fn test_load_missing_file_falls_back_to_default() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let config = Config::load(&dir.path().join("missing.yml"))?;
        assert_eq!(config.title, "My Blog");
        Ok(())
    }
}
