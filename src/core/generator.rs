use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::core::pages::{self, PageContext};
use crate::core::query::{PostQuery, TagQuery};
use crate::models::Config;
use crate::store::Store;
use crate::theme::{render_page, Renderer};

/// 生成结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateReport {
    pub posts: usize,
    pub tags: usize,
    pub skipped: usize,
}

impl GenerateReport {
    /// 写出的页面总数（含首页和联系页）
    pub fn pages(&self) -> usize {
        self.posts + self.tags + 2
    }
}

/// 静态站点生成器：把每个页面渲染到输出目录
pub struct SiteGenerator<'a, R: Renderer + ?Sized> {
    store: &'a Store,
    config: &'a Config,
    renderer: &'a R,
    /// 输出目录
    pub output_dir: PathBuf,
}

/// 只允许单段路径，避免 slug 或标签写出输出目录
fn is_safe_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment.contains(['/', '\\'])
}

impl<'a, R: Renderer + ?Sized> SiteGenerator<'a, R> {
    pub fn new(store: &'a Store, config: &'a Config, renderer: &'a R, output_dir: PathBuf) -> Self {
        Self {
            store,
            config,
            renderer,
            output_dir,
        }
    }

    /// 生成所有页面
    pub async fn generate(&self) -> Result<GenerateReport> {
        info!("开始生成站点到 {}", self.output_dir.display());
        fs::create_dir_all(&self.output_dir)
            .with_context(|| format!("创建输出目录失败: {}", self.output_dir.display()))?;

        let mut report = GenerateReport::default();

        let home = pages::home(self.store, self.config).await?;
        self.write_page(&self.output_dir, &home)?;

        self.write_page(&self.output_dir.join("contacts"), &pages::contacts())?;

        for slug in PostQuery::all_slugs(self.store).await? {
            if !is_safe_segment(&slug) {
                warn!("跳过无法作为路径的 slug: {:?}", slug);
                report.skipped += 1;
                continue;
            }
            let page = pages::post_detail(self.store, self.config, &slug).await?;
            self.write_page(&self.output_dir.join("posts").join(&slug), &page)?;
            report.posts += 1;
        }

        for tag in TagQuery::new().fetch(self.store).await? {
            if !is_safe_segment(&tag.title) {
                warn!("跳过无法作为路径的标签: {:?}", tag.title);
                report.skipped += 1;
                continue;
            }
            let page = pages::tag_filter(self.store, self.config, &tag.title).await?;
            self.write_page(&self.output_dir.join("tags").join(&tag.title), &page)?;
            report.tags += 1;
        }

        info!(
            "Generated {} pages ({} posts, {} tags)",
            report.pages(),
            report.posts,
            report.tags
        );
        Ok(report)
    }

    fn write_page<P: PageContext>(&self, dir: &Path, page: &P) -> Result<()> {
        let html = render_page(self.renderer, page)
            .with_context(|| format!("渲染 {} 失败", P::TEMPLATE))?;

        fs::create_dir_all(dir)?;
        fs::write(dir.join("index.html"), html)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_segment() {
        assert!(is_safe_segment("hello-world"));
        assert!(is_safe_segment("c++"));
        assert!(!is_safe_segment(""));
        assert!(!is_safe_segment(".."));
        assert!(!is_safe_segment("a/b"));
        assert!(!is_safe_segment("a\\b"));
    }

    #[test]
    fn test_report_pages() {
        let report = GenerateReport {
            posts: 3,
            tags: 2,
            skipped: 1,
        };
        assert_eq!(report.pages(), 7);
    }
}
