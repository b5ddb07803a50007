//! # xtask - 开发辅助工具
//!
//! 提供本地质量门禁与对话数据检查命令。
//!
//! ## 命令
//!
//! - `check-all`: 运行 fmt、clippy、test
//! - `cov-core`: 运行 dialogue-audit 覆盖率
//! - `dialogue-check`: 检查对话数据文件（结构审计）

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use dialogue_audit::{AnalysisReport, AuditConfig, render_findings, render_summary, render_trees};
use serde::Serialize;
use tracing::{Level, debug, warn};
use walkdir::WalkDir;
use xshell::{Shell, cmd};

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "开发辅助工具")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 日志详细程度（-v: debug，-vv: trace）
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// 运行 fmt、clippy、test 门禁检查
    CheckAll,

    /// 运行 dialogue-audit 覆盖率报告
    CovCore,

    /// 检查对话数据文件
    DialogueCheck(DialogueCheckArgs),
}

#[derive(Args)]
struct DialogueCheckArgs {
    /// 数据文件或目录（目录下所有 .js 文件）
    #[arg(default_value = "src/data.js")]
    path: PathBuf,

    /// 容器关键字（覆盖配置文件）
    #[arg(short, long)]
    keyword: Option<String>,

    /// JSON 配置文件
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 对话树报告输出路径
    #[arg(long, default_value = "dialogue_trees.txt")]
    tree_out: PathBuf,

    /// 以 JSON 输出分析报告（stdout）
    #[arg(long)]
    json: bool,

    /// 存在严重问题时返回失败
    #[arg(long)]
    strict: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = real_main(cli.command) {
        eprintln!("xtask error: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn real_main(command: Commands) -> anyhow::Result<()> {
    let sh = Shell::new()?;

    match command {
        Commands::CheckAll => {
            eprintln!("\n==> cargo fmt --all -- --check");
            cmd!(sh, "cargo fmt --all -- --check").run()?;

            eprintln!("\n==> cargo clippy --workspace --all-targets");
            cmd!(sh, "cargo clippy --workspace --all-targets").run()?;

            eprintln!("\n==> cargo test --workspace");
            cmd!(sh, "cargo test --workspace").run()?;
        }
        Commands::CovCore => {
            ensure_cargo_llvm_cov_available(&sh)?;

            eprintln!("\n==> cargo llvm-cov -p dialogue-audit --html");
            cmd!(sh, "cargo llvm-cov -p dialogue-audit --html").run()?;

            eprintln!("\nCoverage HTML: target/llvm-cov/html/index.html");
        }
        Commands::DialogueCheck(args) => dialogue_check(&args)?,
    }

    Ok(())
}

fn ensure_cargo_llvm_cov_available(sh: &Shell) -> anyhow::Result<()> {
    if cmd!(sh, "cargo llvm-cov --version")
        .quiet()
        .ignore_stdout()
        .ignore_stderr()
        .run()
        .is_ok()
    {
        return Ok(());
    }
    anyhow::bail!(
        "cargo llvm-cov 不可用。\n\
请先安装：\n\
  - cargo install cargo-llvm-cov\n\
  - rustup component add llvm-tools-preview\n\
然后重试。"
    )
}

//=============================================================================
// dialogue-check 命令实现
//=============================================================================

/// 单个文件的分析结果（JSON 输出）
#[derive(Serialize)]
struct FileReport {
    file: String,
    report: AnalysisReport,
}

/// 检查结果
#[derive(Default)]
struct DialogueCheckResult {
    /// 成功分析的文件
    reports: Vec<FileReport>,
    /// 无法读取或找不到容器的文件
    fatal: usize,
}

impl DialogueCheckResult {
    fn count(&self, pick: impl Fn(&AnalysisReport) -> usize) -> usize {
        self.reports.iter().map(|r| pick(&r.report)).sum()
    }
}

/// 执行对话数据检查
fn dialogue_check(args: &DialogueCheckArgs) -> anyhow::Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(keyword) = &args.keyword {
        config = config.with_container_keyword(keyword.clone());
    }
    config.validate()?;

    let files = collect_data_files(&args.path)?;
    if files.is_empty() {
        eprintln!("未找到数据文件（.js）");
        return Ok(());
    }

    eprintln!("==> 检查 {} 个数据文件...\n", files.len());

    let mut result = DialogueCheckResult::default();
    for file in &files {
        check_data_file(file, &config, &mut result);
    }

    write_trees(&args.tree_out, &result)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result.reports)?);
    } else {
        print_check_result(&result);
    }
    print_totals(&result, files.len());

    let critical = result.count(|r| r.summary.critical);
    if result.fatal > 0 {
        anyhow::bail!("{} 个文件无法分析", result.fatal);
    }
    if args.strict && critical > 0 {
        anyhow::bail!("发现 {} 个严重问题（--strict）", critical);
    }

    Ok(())
}

/// 加载配置：文件不存在时使用默认值
fn load_config(path: Option<&Path>) -> anyhow::Result<AuditConfig> {
    let Some(path) = path else {
        return Ok(AuditConfig::default());
    };

    if !path.exists() {
        warn!(path = %path.display(), "配置文件不存在，使用默认配置");
        return Ok(AuditConfig::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("无法读取配置文件: {}", path.display()))?;
    let config = AuditConfig::from_json_str(&content)
        .with_context(|| format!("配置文件无效: {}", path.display()))?;
    debug!(path = %path.display(), "已加载配置文件");
    Ok(config)
}

/// 收集要检查的文件
fn collect_data_files(path: &Path) -> anyhow::Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        anyhow::bail!(
            "路径不存在: {}\n请在项目根目录运行，或指定数据文件路径",
            path.display()
        );
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(path).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() && entry.path().extension().is_some_and(|ext| ext == "js")
        {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// 检查单个数据文件
fn check_data_file(file: &Path, config: &AuditConfig, result: &mut DialogueCheckResult) {
    let file_id = file.display().to_string();

    let content = match fs::read_to_string(file) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("[ERROR] {}: 无法读取文件 - {}", file_id, e);
            result.fatal += 1;
            return;
        }
    };

    match dialogue_audit::analyze(&content, config) {
        Ok(report) => {
            debug!(
                file = %file_id,
                entities = report.summary.entities_parsed,
                findings = report.summary.findings,
                "分析完成"
            );
            result.reports.push(FileReport {
                file: file_id,
                report,
            });
        }
        Err(e) => {
            eprintln!("[ERROR] {}: {}", file_id, e);
            result.fatal += 1;
        }
    }
}

/// 写出对话树报告
fn write_trees(path: &Path, result: &DialogueCheckResult) -> anyhow::Result<()> {
    let text = match result.reports.as_slice() {
        [single] => render_trees(&single.report),
        reports => reports
            .iter()
            .map(|r| format!("# {}\n\n{}", r.file, render_trees(&r.report)))
            .collect::<Vec<_>>()
            .join("\n\n"),
    };

    fs::write(path, text + "\n")
        .with_context(|| format!("无法写入对话树报告: {}", path.display()))?;
    eprintln!("对话树报告: {}", path.display());
    Ok(())
}

/// 输出每个文件的诊断与汇总
fn print_check_result(result: &DialogueCheckResult) {
    for file_report in &result.reports {
        eprintln!("─────────────────────────────────────────────────────");
        eprintln!("{}", file_report.file);
        eprintln!();

        let findings = render_findings(&file_report.report);
        if !findings.is_empty() {
            eprintln!("{}", findings);
            eprintln!();
        }
        eprintln!("{}", render_summary(&file_report.report.summary));
    }
}

/// 输出总计
fn print_totals(result: &DialogueCheckResult, files: usize) {
    let critical = result.count(|r| r.summary.critical);
    let warnings = result.count(|r| r.summary.warnings);
    let infos = result.count(|r| r.summary.infos);

    eprintln!("─────────────────────────────────────────────────────");
    eprintln!("检查完成: {} 个文件", files);
    eprintln!();

    if result.fatal > 0 || critical > 0 {
        eprintln!(
            "❌ {} 个致命错误, {} 个严重问题, {} 个警告, {} 个提示",
            result.fatal, critical, warnings, infos
        );
    } else if warnings > 0 {
        eprintln!("⚠️  0 个严重问题, {} 个警告, {} 个提示", warnings, infos);
    } else {
        eprintln!("✅ 检查通过，无严重问题与警告");
    }
}
