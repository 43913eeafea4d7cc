// ==========================================
// 工作量再分配引擎 - 命令行入口
// ==========================================
// 子命令: init-db / import / update / restore / flagged
// 输出: 格式化 JSON（stdout）, 日志写 stderr
// ==========================================

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;

use workload_reassign::app::{get_default_db_path, AppState};
use workload_reassign::domain::types::AvailabilityStatus;
use workload_reassign::importer::RosterImporter;
use workload_reassign::logging::{self, LogFormat};

#[derive(Debug, Parser)]
#[command(name = "workload-reassign", version, about = "Staff availability and workload reassignment")]
struct Cli {
    /// SQLite 数据库路径
    #[arg(long, global = true, env = "WORKLOAD_REASSIGN_DB_PATH")]
    db: Option<String>,

    /// 日志格式 (text | json)
    #[arg(long, global = true, default_value = "text")]
    log_format: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// 建库（幂等）
    InitDb,

    /// 导入员工与工作项花名册
    Import {
        #[arg(long)]
        staff: Option<PathBuf>,
        #[arg(long)]
        assignments: Option<PathBuf>,
    },

    /// 变更员工可用状态
    Update {
        #[arg(long)]
        staff: String,
        /// available | on_leave | unavailable
        #[arg(long)]
        status: String,
        /// RFC 3339 截止时间
        #[arg(long)]
        until: Option<String>,
        #[arg(long)]
        reason: Option<String>,
    },

    /// 恢复可用（不清除复核标记）
    Restore {
        #[arg(long)]
        staff: String,
    },

    /// 列出单元内待复核的工作项
    Flagged {
        #[arg(long)]
        unit: String,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_until(raw: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    raw.map(|s| {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .with_context(|| format!("--until 不是 RFC 3339 时间: {}", s))
    })
    .transpose()
}

fn run(cli: Cli) -> Result<()> {
    let db_path = cli.db.unwrap_or_else(get_default_db_path);
    tracing::info!(db_path = %db_path, version = workload_reassign::VERSION, "启动");

    let state = AppState::new(db_path.clone()).map_err(anyhow::Error::msg)?;

    match cli.command {
        Command::InitDb => print_json(&serde_json::json!({ "db_path": db_path, "initialized": true })),
        Command::Import { staff, assignments } => {
            let importer = RosterImporter::new(state.staff_repo.clone(), state.assignment_repo.clone());
            let mut summaries = Vec::new();
            if let Some(path) = staff {
                summaries.push(importer.import_staff(&path)?);
            }
            if let Some(path) = assignments {
                summaries.push(importer.import_assignments(&path, Utc::now())?);
            }
            print_json(&summaries)
        }
        Command::Update {
            staff,
            status,
            until,
            reason,
        } => {
            let status = AvailabilityStatus::from_str(&status)
                .with_context(|| format!("未知的状态: {}", status))?;
            let until = parse_until(until.as_deref())?;
            let response = state
                .availability_api
                .update_availability(&staff, status, until, reason)?;
            print_json(&response)
        }
        Command::Restore { staff } => {
            state.availability_api.set_available(&staff)?;
            print_json(&serde_json::json!({ "staff_id": staff, "status": AvailabilityStatus::Available }))
        }
        Command::Flagged { unit } => {
            let items = state.availability_api.get_flagged_items_for_unit(&unit)?;
            print_json(&items)
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let format = LogFormat::from_str(&cli.log_format).unwrap_or_default();
    logging::init_with_format(format);

    if let Err(e) = run(cli) {
        eprintln!("错误: {:#}", e);
        std::process::exit(1);
    }
}
