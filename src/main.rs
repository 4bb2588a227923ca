use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use lang_assistant::{Project, RemovalSelection, ScanOptions};
use lang_assistant::utils::truncate_for_display;

#[derive(Parser)]
#[command(name = "lang_assistant")]
#[command(about = "管理 Java 属性文件形式的多语言字符串")]
#[command(version = "0.1.0")]
struct Cli {
    /// 项目根目录
    #[arg(long, global = true, default_value = ".")]
    project: PathBuf,

    /// 静默模式(仅输出结果和错误)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// 输出调试日志
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 显示两列语言对照表
    Show {
        /// 项目部分(默认第一个)
        #[arg(long)]
        part: Option<String>,

        /// 按键名或翻译过滤(不区分大小写)
        #[arg(long)]
        search: Option<String>,

        /// 两列显示的语言，如 es_ES,en_EN
        #[arg(long, value_delimiter = ',')]
        columns: Option<Vec<String>>,

        /// 以JSON格式输出
        #[arg(long)]
        json: bool,
    },

    /// 显示统计信息
    Stats {
        /// 项目部分(默认全部)
        #[arg(long)]
        part: Option<String>,
    },

    /// 新增键
    AddKey {
        key: String,

        #[arg(long)]
        part: Option<String>,
    },

    /// 为所有部分新增语言
    AddLanguage {
        id: String,
    },

    /// 设置键在某语言下的值
    Set {
        key: String,
        lang: String,
        value: String,

        #[arg(long)]
        part: Option<String>,
    },

    /// 从源码中提取 "@@KEY$$ES$$EN$$" 字面量并改写
    Parse {
        /// 只报告，不改写源码也不保存
        #[arg(long)]
        dry_run: bool,

        /// 改写前备份源文件
        #[arg(long)]
        backup: bool,
    },

    /// 检测源码中未使用的键
    Unused {
        #[arg(long)]
        part: Option<String>,

        /// 删除未使用的键并保存
        #[arg(long)]
        remove: bool,

        /// 删除时保留的键
        #[arg(long, num_args = 1..)]
        keep: Vec<String>,
    },

    /// 导出全部键和翻译为JSON
    Export {
        #[arg(long)]
        part: Option<String>,

        /// 输出文件(默认标准输出)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 列出帮助文档
    HelpDocs {
        /// 只列出该语言的文档
        #[arg(long)]
        lang: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut project = Project::open(&cli.project)
        .with_context(|| format!("无法打开项目: {:?}", cli.project))?;

    match &cli.command {
        Command::Show { part, search, columns, json } => {
            handle_show(&mut project, part.as_deref(), search.as_deref(), columns.as_deref(), *json)
        }
        Command::Stats { part } => handle_stats(&project, part.as_deref()),
        Command::AddKey { key, part } => handle_add_key(&cli, &mut project, key, part.as_deref()),
        Command::AddLanguage { id } => handle_add_language(&cli, &mut project, id),
        Command::Set { key, lang, value, part } => {
            handle_set(&cli, &mut project, key, lang, value, part.as_deref())
        }
        Command::Parse { dry_run, backup } => handle_parse(&cli, &mut project, *dry_run, *backup),
        Command::Unused { part, remove, keep } => {
            handle_unused(&cli, &mut project, part.as_deref(), *remove, keep)
        }
        Command::Export { part, output } => handle_export(&cli, &project, part.as_deref(), output.as_deref()),
        Command::HelpDocs { lang } => handle_help_docs(&project, lang.as_deref()),
    }
}

/// 初始化日志：RUST_LOG 优先，否则默认 warn（-v 时为 debug），输出到 stderr
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// 未指定部分时使用第一个部分
fn resolve_part<'a>(project: &'a Project, part: Option<&'a str>) -> Result<&'a str> {
    match part {
        Some(name) => Ok(name),
        None => project
            .part_names()
            .first()
            .copied()
            .context("项目中没有任何部分"),
    }
}

fn handle_show(
    project: &mut Project,
    part: Option<&str>,
    search: Option<&str>,
    columns: Option<&[String]>,
    json: bool,
) -> Result<()> {
    let name = resolve_part(project, part)?.to_string();

    let mut table = project.table();
    if let Some(columns) = columns {
        if columns.len() != 2 {
            bail!("--columns 需要两个语言，例如 es_ES,en_EN");
        }
        for (i, identifier) in columns.iter().enumerate() {
            table.set_column(i, identifier)?;
        }
    }

    let manager = &mut project.part_mut(&name)?.manager;
    if let Some(text) = search {
        manager.search(text);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&table.rows(manager))?);
    } else {
        print!("{}", table.render(manager));
        println!("共 {} 个键", manager.key_count());
    }

    Ok(())
}

fn handle_stats(project: &Project, part: Option<&str>) -> Result<()> {
    let parts = match part {
        Some(name) => vec![project.part(name)?],
        None => project.parts().iter().collect(),
    };

    for part in parts {
        println!("[{}] {:?}", part.name(), part.i18n_dir());
        println!("{}", part.manager.stats());
    }

    Ok(())
}

fn handle_add_key(cli: &Cli, project: &mut Project, key: &str, part: Option<&str>) -> Result<()> {
    let name = resolve_part(project, part)?.to_string();
    let row = project.part_mut(&name)?.manager.add_key(key);

    if !cli.quiet {
        println!("已新增键 {} (第 {} 行)", key, row + 1);
    }

    save_project(cli, project)
}

fn handle_add_language(cli: &Cli, project: &mut Project, id: &str) -> Result<()> {
    let added = project.add_language(id);

    if !cli.quiet {
        if added == 0 {
            println!("语言 {} 已存在于所有部分", id);
        } else {
            println!("已在 {} 个部分中新增语言 {}", added, id);
        }
    }

    save_project(cli, project)
}

fn handle_set(
    cli: &Cli,
    project: &mut Project,
    key: &str,
    lang: &str,
    value: &str,
    part: Option<&str>,
) -> Result<()> {
    let name = resolve_part(project, part)?.to_string();
    project
        .part_mut(&name)?
        .manager
        .set_key_value(key, lang, value)
        .with_context(|| format!("无法设置 {} 的 {} 翻译", key, lang))?;

    if !cli.quiet {
        println!("{} [{}] = \"{}\"", key, lang, truncate_for_display(value, 60));
    }

    save_project(cli, project)
}

fn handle_parse(cli: &Cli, project: &mut Project, dry_run: bool, backup: bool) -> Result<()> {
    let options = ScanOptions { dry_run, backup };
    let report = project.parse_code(&options).context("扫描源码失败")?;

    if !cli.quiet {
        print!("{}", report);
        for file in &report.files {
            println!("  {:?}: {} 个字面量", file.path, file.matches.len());
            for literal in &file.matches {
                println!(
                    "    {} = \"{}\" / \"{}\"",
                    literal.key,
                    truncate_for_display(&literal.translations[0], 40),
                    truncate_for_display(&literal.translations[1], 40)
                );
            }
        }
    }

    if dry_run {
        if !cli.quiet {
            println!("试运行模式：未改写源码，未保存");
        }
        return Ok(());
    }

    save_project(cli, project)
}

fn handle_unused(
    cli: &Cli,
    project: &mut Project,
    part: Option<&str>,
    remove: bool,
    keep: &[String],
) -> Result<()> {
    let name = resolve_part(project, part)?.to_string();
    let report = project.find_unused(&name).context("检测未使用的键失败")?;

    let mut selection = RemovalSelection::new(&report);
    for key in keep {
        if !selection.deselect(key) {
            tracing::warn!("Key {} is not in the unused list", key);
        }
    }

    if !cli.quiet {
        println!("检查 {} 个键，未使用 {} 个", report.checked.len(), report.unused_count());
    }
    print!("{}", selection);

    if !remove {
        return Ok(());
    }

    let removed = selection.apply(&mut project.part_mut(&name)?.manager);
    if !cli.quiet {
        println!("已删除 {} 个键", removed);
    }

    save_project(cli, project)
}

fn handle_export(cli: &Cli, project: &Project, part: Option<&str>, output: Option<&Path>) -> Result<()> {
    let name = resolve_part(project, part)?;
    let exported = project.part(name)?.manager.export();
    let json = serde_json::to_string_pretty(&exported)?;

    match output {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("写入文件失败: {:?}", path))?;
            if !cli.quiet {
                println!("已导出 {} 个键到: {:?}", exported.len(), path);
            }
        }
        None => println!("{}", json),
    }

    Ok(())
}

fn handle_help_docs(project: &Project, lang: Option<&str>) -> Result<()> {
    let catalog = project.help_catalog();

    let languages = match lang {
        Some(lang) => vec![lang.to_string()],
        None => catalog.languages()?,
    };

    if languages.is_empty() {
        println!("没有找到帮助文档: {:?}", catalog.directory());
        return Ok(());
    }

    for language in languages {
        let documents = catalog.documents(&language)?;
        println!("[{}] {} 个文档", language, documents.len());
        if lang.is_some() {
            for document in documents {
                println!("  {}", document.display());
            }
        }
    }

    Ok(())
}

/// 保存所有部分，任一语言写入失败时返回错误
fn save_project(cli: &Cli, project: &Project) -> Result<()> {
    let summaries = project.save_all().context("保存失败")?;

    let mut failed = 0;
    for (name, summary) in &summaries {
        if !cli.quiet {
            println!("[{}] 已保存 {} 个语言文件", name, summary.written.len());
        }
        for (language, reason) in &summary.failed {
            eprintln!("[{}] 保存 {} 失败: {}", name, language, reason);
        }
        failed += summary.failed.len();
    }

    if failed > 0 {
        bail!("{} 个语言文件保存失败", failed);
    }

    Ok(())
}
