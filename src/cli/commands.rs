use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use serde::Serialize;
use tracing::info;

use crate::core::{pages, SiteGenerator};
use crate::models::Config;
use crate::store::{Fixture, Store};
use crate::theme::ThemeRenderer;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// 配置文件路径
    #[arg(short, long, default_value = "blog.yml")]
    pub config: PathBuf,

    /// 输出调试日志
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 写入默认配置并创建数据库表
    Init,

    /// 从 YAML fixture 导入数据
    Seed(SeedArgs),

    /// 以 JSON 输出某个页面的上下文
    Show(ShowArgs),

    /// 生成静态页面
    Generate(GenArgs),

    /// 清理生成的文件
    Clean,
}

#[derive(Args)]
pub struct SeedArgs {
    /// fixture 文件
    #[arg(value_name = "FILE")]
    pub fixture: PathBuf,
}

#[derive(Args)]
pub struct ShowArgs {
    #[command(subcommand)]
    pub page: PageArg,
}

#[derive(Subcommand)]
pub enum PageArg {
    /// 首页
    Home,
    /// 文章详情页
    Post {
        slug: String,
    },
    /// 标签筛选页
    Tag {
        title: String,
    },
    /// 联系页
    Contacts,
}

#[derive(Args)]
pub struct GenArgs {
    /// 输出目录，默认使用配置中的 public_dir
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn renderer_for(config: &Config) -> Result<ThemeRenderer> {
    let renderer = match &config.theme {
        Some(theme) => ThemeRenderer::from_dir(&PathBuf::from(theme))?,
        None => ThemeRenderer::builtin()?,
    };
    Ok(renderer.with_site_title(&config.title))
}

/// 执行命令
pub async fn execute(cli: Cli) -> Result<()> {
    let config = Config::load(&cli.config)?;

    match cli.command {
        Commands::Init => {
            if cli.config.exists() {
                info!("配置文件已存在: {}", cli.config.display());
            } else {
                config
                    .save(&cli.config)
                    .with_context(|| format!("写入配置文件失败: {}", cli.config.display()))?;
                println!("{} {}", "Created".bright_green(), cli.config.display());
            }

            let store = Store::connect(&config.database_url).await?;
            store.init_schema().await?;
            println!("{} {}", "Initialised".bright_green(), config.database_url);
        }
        Commands::Seed(args) => {
            let store = Store::connect(&config.database_url).await?;
            store.init_schema().await?;

            let fixture = Fixture::from_file(&args.fixture)?;
            let summary = fixture.apply(&store).await?;
            println!(
                "{} {} authors, {} tags, {} posts, {} likes, {} comments",
                "Seeded".bright_green(),
                summary.authors,
                summary.tags,
                summary.posts,
                summary.likes,
                summary.comments
            );
        }
        Commands::Show(args) => {
            let store = Store::connect(&config.database_url).await?;
            match args.page {
                PageArg::Home => print_json(&pages::home(&store, &config).await?)?,
                PageArg::Post { slug } => {
                    print_json(&pages::post_detail(&store, &config, &slug).await?)?
                }
                PageArg::Tag { title } => {
                    print_json(&pages::tag_filter(&store, &config, &title).await?)?
                }
                PageArg::Contacts => print_json(&pages::contacts())?,
            }
        }
        Commands::Generate(args) => {
            let store = Store::connect(&config.database_url).await?;
            let renderer = renderer_for(&config)?;
            let output_dir = args.output.unwrap_or_else(|| config.public_dir());

            let generator = SiteGenerator::new(&store, &config, &renderer, output_dir);
            let report = generator.generate().await?;
            println!(
                "{} {} pages into {}",
                "Generated".bright_green(),
                report.pages(),
                generator.output_dir.display()
            );
            if report.skipped > 0 {
                println!("{} {} pages", "Skipped".yellow(), report.skipped);
            }
        }
        Commands::Clean => {
            let public_dir = config.public_dir();
            if public_dir.exists() {
                std::fs::remove_dir_all(&public_dir)
                    .with_context(|| format!("删除输出目录失败: {}", public_dir.display()))?;
                println!("{} {}", "Removed".bright_green(), public_dir.display());
            }
        }
    }

    Ok(())
}
