use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context as AnyhowContext};
use chrono::DateTime;
use tera::{Context as TeraContext, Tera};
use tracing::{debug, error};

use crate::core::pages::PageContext;
use crate::error::Result;
use crate::utils::markdown;

/// 内置主题模板
const BUILTIN_TEMPLATES: [(&str, &str); 5] = [
    ("layout.html", include_str!("../../themes/default/layout/layout.html")),
    ("index.html", include_str!("../../themes/default/layout/index.html")),
    ("post-details.html", include_str!("../../themes/default/layout/post-details.html")),
    ("posts-list.html", include_str!("../../themes/default/layout/posts-list.html")),
    ("contacts.html", include_str!("../../themes/default/layout/contacts.html")),
];

/// 渲染器：接收模板名和上下文，输出最终页面
pub trait Renderer {
    fn render(&self, template: &str, context: &TeraContext) -> Result<String>;
}

/// 把页面上下文交给渲染器
pub fn render_page<R, P>(renderer: &R, page: &P) -> Result<String>
where
    R: Renderer + ?Sized,
    P: PageContext,
{
    let context = TeraContext::from_serialize(page)?;
    renderer.render(P::TEMPLATE, &context)
}

/// 未配置站点标题时使用
const DEFAULT_SITE_TITLE: &str = "Blog";

/// 基于 Tera 的主题渲染器
#[derive(Clone)]
pub struct ThemeRenderer {
    /// 主题目录，内置主题为 None
    pub theme_dir: Option<PathBuf>,
    /// 模板引擎
    pub tera: Tera,
    /// 每个页面都可用的 `site_title`
    pub site_title: String,
}

impl ThemeRenderer {
    /// 使用编译进二进制的默认主题
    pub fn builtin() -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(BUILTIN_TEMPLATES)?;
        Self::register_filters(&mut tera);

        Ok(ThemeRenderer {
            theme_dir: None,
            tera,
            site_title: DEFAULT_SITE_TITLE.to_string(),
        })
    }

    /// 从主题目录加载 `layout/**/*.html`
    pub fn from_dir(theme_dir: &Path) -> anyhow::Result<Self> {
        if !theme_dir.exists() {
            return Err(anyhow!("主题目录不存在: {}", theme_dir.display()));
        }

        let pattern = format!("{}/**/*.html", theme_dir.join("layout").display());
        let mut tera = Tera::new(&pattern)
            .with_context(|| format!("加载主题模板失败: {}", theme_dir.display()))?;
        Self::register_filters(&mut tera);

        debug!("loaded {} templates from {}", tera.get_template_names().count(), theme_dir.display());
        Ok(ThemeRenderer {
            theme_dir: Some(theme_dir.to_path_buf()),
            tera,
            site_title: DEFAULT_SITE_TITLE.to_string(),
        })
    }

    pub fn with_site_title(mut self, title: impl Into<String>) -> Self {
        self.site_title = title.into();
        self
    }

    /// 注册模板过滤器
    fn register_filters(tera: &mut Tera) {
        tera.register_filter("date_format", Self::date_format_filter);
        tera.register_filter("markdown", Self::markdown_filter);
    }

    /// 获取可用的布局列表
    pub fn available_layouts(&self) -> Vec<String> {
        self.tera.get_template_names().map(String::from).collect()
    }

    /// 检查布局是否存在
    pub fn has_layout(&self, layout: &str) -> bool {
        self.tera.get_template_names().any(|name| name == layout)
    }

    fn date_format_filter(value: &tera::Value, args: &HashMap<String, tera::Value>) -> tera::Result<tera::Value> {
        if let Some(date) = value.as_str().and_then(|s| DateTime::parse_from_rfc3339(s).ok()) {
            let format = args.get("format")
                .and_then(|f| f.as_str())
                .unwrap_or("%Y-%m-%d");
            Ok(tera::Value::String(date.format(format).to_string()))
        } else {
            Ok(value.clone())
        }
    }

    fn markdown_filter(value: &tera::Value, _args: &HashMap<String, tera::Value>) -> tera::Result<tera::Value> {
        match value.as_str() {
            Some(text) => Ok(tera::Value::String(markdown::render(text))),
            None => Ok(value.clone()),
        }
    }
}

impl Renderer for ThemeRenderer {
    fn render(&self, template: &str, context: &TeraContext) -> Result<String> {
        let mut context = context.clone();
        context.insert("site_title", &self.site_title);

        self.tera.render(template, &context).map_err(|e| {
            error!("模板渲染失败: {} ({})", template, e);
            e.into()
        })
    }
}
