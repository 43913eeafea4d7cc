// ==========================================
// 工作量再分配引擎 - 性能统计
// ==========================================
// 每次 API 调用: 耗时 + SQL 语句数 + 慢 SQL 数
// 开关:
// - WORKLOAD_REASSIGN_PERF_SQL=1     强制开启（Debug 默认开启）
// - WORKLOAD_REASSIGN_SLOW_SQL_MS=50 慢 SQL 阈值（毫秒）
// ==========================================

use rusqlite::Connection;
use std::cell::Cell;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

const ENV_PERF_SQL: &str = "WORKLOAD_REASSIGN_PERF_SQL";
const ENV_SLOW_SQL_MS: &str = "WORKLOAD_REASSIGN_SLOW_SQL_MS";
const SQL_LOG_MAX_CHARS: usize = 420;

static SQL_STATS_ENABLED: AtomicBool = AtomicBool::new(false);
static SLOW_SQL_MS: AtomicU64 = AtomicU64::new(0);

/// 线程内计数（SQLite 回调与 API 调用在同一线程）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct SqlCounters {
    open_guards: u32,
    statements: u64,
    slow_statements: u64,
}

thread_local! {
    static COUNTERS: Cell<SqlCounters> = Cell::new(SqlCounters::default());
}

fn update_counters(f: impl FnOnce(&mut SqlCounters)) -> SqlCounters {
    COUNTERS.with(|cell| {
        let mut counters = cell.get();
        f(&mut counters);
        cell.set(counters);
        counters
    })
}

/// SQL 统计开关
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SqlStatsSettings {
    pub enabled: bool,
    pub slow_sql_ms: u64,
}

impl SqlStatsSettings {
    /// 由环境变量值解析; 未设置时按编译模式取默认值
    pub fn resolve(perf_sql: Option<&str>, slow_sql_ms: Option<&str>) -> Self {
        let enabled = perf_sql.map(flag_enabled).unwrap_or(cfg!(debug_assertions));
        let slow_sql_ms = slow_sql_ms
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(if cfg!(debug_assertions) { 50 } else { 200 });
        Self {
            enabled,
            slow_sql_ms,
        }
    }

    pub fn from_env() -> Self {
        let perf_sql = std::env::var(ENV_PERF_SQL).ok();
        let slow_sql_ms = std::env::var(ENV_SLOW_SQL_MS).ok();
        Self::resolve(perf_sql.as_deref(), slow_sql_ms.as_deref())
    }
}

fn flag_enabled(v: &str) -> bool {
    matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

fn shorten_sql(sql: &str) -> String {
    let flat = sql.split_whitespace().collect::<Vec<_>>().join(" ");
    match flat.char_indices().nth(SQL_LOG_MAX_CHARS) {
        Some((cut, _)) => format!("{}…", &flat[..cut]),
        None => flat,
    }
}

/// 在连接上挂载 SQL 计数与慢查询日志
pub fn install_sqlite_tracing(conn: &mut Connection) {
    let settings = SqlStatsSettings::from_env();
    SQL_STATS_ENABLED.store(settings.enabled, Ordering::Relaxed);
    SLOW_SQL_MS.store(settings.slow_sql_ms, Ordering::Relaxed);

    if settings.enabled {
        conn.trace(Some(on_sql_statement));
        conn.profile(Some(on_sql_finished));
    } else {
        conn.trace(None);
        conn.profile(None);
    }
}

fn on_sql_statement(_sql: &str) {
    if !SQL_STATS_ENABLED.load(Ordering::Relaxed) {
        return;
    }
    update_counters(|c| {
        if c.open_guards > 0 {
            c.statements = c.statements.saturating_add(1);
        }
    });
}

fn on_sql_finished(sql: &str, duration: Duration) {
    let threshold = SLOW_SQL_MS.load(Ordering::Relaxed);
    let elapsed_ms = duration.as_millis() as u64;
    if !SQL_STATS_ENABLED.load(Ordering::Relaxed) || threshold == 0 || elapsed_ms < threshold {
        return;
    }

    tracing::warn!(target: "slow_sql", elapsed_ms, sql = %shorten_sql(sql), "慢 SQL");
    update_counters(|c| {
        if c.open_guards > 0 {
            c.slow_statements = c.slow_statements.saturating_add(1);
        }
    });
}

/// 单次 API 调用的统计范围, drop 时输出一条 perf 日志
///
/// ```ignore
/// let _perf = PerfGuard::new("update_availability").subject(staff_id);
/// ```
pub struct PerfGuard {
    op: &'static str,
    subject: Option<String>,
    start: Instant,
    baseline: SqlCounters,
}

impl PerfGuard {
    pub fn new(op: &'static str) -> Self {
        let baseline = update_counters(|c| c.open_guards = c.open_guards.saturating_add(1));
        Self {
            op,
            subject: None,
            start: Instant::now(),
            baseline,
        }
    }

    /// 操作对象（员工 ID / 单元 ID）
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }
}

impl Drop for PerfGuard {
    fn drop(&mut self) {
        let now = update_counters(|c| c.open_guards = c.open_guards.saturating_sub(1));
        tracing::info!(
            target: "perf",
            op = self.op,
            subject = self.subject.as_deref().unwrap_or("-"),
            elapsed_ms = self.start.elapsed().as_millis() as u64,
            sql_count = now.statements.saturating_sub(self.baseline.statements),
            slow_sql_count = now.slow_statements.saturating_sub(self.baseline.slow_statements),
            "done"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_resolution() {
        let s = SqlStatsSettings::resolve(Some(" On "), Some("75"));
        assert!(s.enabled);
        assert_eq!(s.slow_sql_ms, 75);

        let s = SqlStatsSettings::resolve(Some("0"), Some("abc"));
        assert!(!s.enabled);
        assert!(s.slow_sql_ms > 0);
    }

    #[test]
    fn test_shorten_sql_respects_char_boundaries() {
        assert_eq!(shorten_sql("SELECT 1\n   FROM t"), "SELECT 1 FROM t");
        let long = format!("SELECT '{}'", "员".repeat(SQL_LOG_MAX_CHARS));
        let short = shorten_sql(&long);
        assert!(short.ends_with('…'));
        assert_eq!(short.chars().count(), SQL_LOG_MAX_CHARS + 1);
    }

    #[test]
    fn test_guards_count_statements_on_their_thread() {
        SQL_STATS_ENABLED.store(true, Ordering::Relaxed);
        {
            let outer = PerfGuard::new("outer").subject("A");
            on_sql_statement("SELECT 1");
            let inner = PerfGuard::new("inner");
            on_sql_statement("SELECT 2");
            assert_eq!(COUNTERS.with(|c| c.get()).open_guards, 2);
            assert_eq!(COUNTERS.with(|c| c.get()).statements - inner.baseline.statements, 1);
            assert_eq!(COUNTERS.with(|c| c.get()).statements - outer.baseline.statements, 2);
        }
        assert_eq!(COUNTERS.with(|c| c.get()).open_guards, 0);
    }
}
