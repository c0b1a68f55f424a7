use anyhow::Result;
use rusqlite::Connection;

use crate::report::aggregate::Statistics;
use crate::report::SkipCounts;

const DB_PATH: &str = "data/orm_report.sqlite";

pub fn connect() -> Result<Connection> {
    if let Some(dir) = std::path::Path::new(DB_PATH).parent() {
        std::fs::create_dir_all(dir)?;
    }
    let conn = Connection::open(DB_PATH)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS jobs (
            id           INTEGER PRIMARY KEY,
            source       TEXT NOT NULL,
            output       TEXT,
            product      TEXT,
            period       TEXT,
            status       TEXT NOT NULL DEFAULT 'processing'
                         CHECK(status IN ('processing','completed','error')),
            statistics   TEXT,
            skipped      TEXT,
            error        TEXT,
            duration_ms  INTEGER,
            created_at   TEXT NOT NULL DEFAULT (datetime('now')),
            finished_at  TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_jobs_status ON jobs(status);
        ",
    )?;
    Ok(())
}

// ── Job lifecycle ──

pub fn insert_job(
    conn: &Connection,
    source: &str,
    product: &str,
    period: Option<&str>,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO jobs (source, product, period) VALUES (?1, ?2, ?3)",
        rusqlite::params![source, product, period],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn mark_completed(
    conn: &Connection,
    job_id: i64,
    output: &str,
    statistics: &Statistics,
    skipped: &SkipCounts,
    duration_ms: u64,
) -> Result<()> {
    conn.execute(
        "UPDATE jobs
         SET status = 'completed', output = ?2, statistics = ?3, skipped = ?4,
             duration_ms = ?5, finished_at = datetime('now')
         WHERE id = ?1",
        rusqlite::params![
            job_id,
            output,
            serde_json::to_string(statistics)?,
            serde_json::to_string(skipped)?,
            duration_ms as i64,
        ],
    )?;
    Ok(())
}

pub fn mark_error(conn: &Connection, job_id: i64, error: &str) -> Result<()> {
    conn.execute(
        "UPDATE jobs
         SET status = 'error', error = ?2, finished_at = datetime('now')
         WHERE id = ?1",
        rusqlite::params![job_id, error],
    )?;
    Ok(())
}

// ── Listing ──

pub struct JobRow {
    pub id: i64,
    pub source: String,
    pub output: Option<String>,
    pub product: Option<String>,
    pub period: Option<String>,
    pub status: String,
    pub statistics: Option<Statistics>,
    pub error: Option<String>,
    pub created_at: String,
}

pub fn fetch_recent(conn: &Connection, limit: usize) -> Result<Vec<JobRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, source, output, product, period, status, statistics, error, created_at
         FROM jobs ORDER BY id DESC LIMIT ?1",
    )?;
    let rows = stmt
        .query_map([limit as i64], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, Option<String>>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, Option<String>>(6)?,
                row.get::<_, Option<String>>(7)?,
                row.get::<_, String>(8)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows
        .into_iter()
        .map(
            |(id, source, output, product, period, status, statistics, error, created_at)| {
                JobRow {
                    id,
                    source,
                    output,
                    product,
                    period,
                    status,
                    statistics: statistics
                        .as_deref()
                        .and_then(|s| serde_json::from_str(s).ok()),
                    error,
                    created_at,
                }
            },
        )
        .collect())
}

// ── Stats ──

pub struct Stats {
    pub total: usize,
    pub completed: usize,
    pub errors: usize,
    pub processing: usize,
    pub records_total: i64,
    pub views_total: i64,
}

pub fn get_stats(conn: &Connection) -> Result<Stats> {
    let total: usize = conn.query_row("SELECT COUNT(*) FROM jobs", [], |r| r.get(0))?;
    let completed: usize = conn.query_row(
        "SELECT COUNT(*) FROM jobs WHERE status = 'completed'",
        [],
        |r| r.get(0),
    )?;
    let errors: usize = conn.query_row(
        "SELECT COUNT(*) FROM jobs WHERE status = 'error'",
        [],
        |r| r.get(0),
    )?;
    let records_total: i64 = conn.query_row(
        "SELECT COALESCE(SUM(json_extract(statistics, '$.totalRows')), 0)
         FROM jobs WHERE status = 'completed'",
        [],
        |r| r.get(0),
    )?;
    let views_total: i64 = conn.query_row(
        "SELECT COALESCE(SUM(json_extract(statistics, '$.totalViews')), 0)
         FROM jobs WHERE status = 'completed'",
        [],
        |r| r.get(0),
    )?;
    Ok(Stats {
        total,
        completed,
        errors,
        processing: total - completed - errors,
        records_total,
        views_total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn job_lifecycle() {
        let conn = memory_db();
        let id = insert_job(&conn, "input.xlsx", "Фортедетрим", Some("Март 2025")).unwrap();

        let stats = Statistics {
            total_rows: 4,
            reviews_count: 2,
            comments_count: 2,
            total_views: 1700,
            ..Statistics::default()
        };
        mark_completed(&conn, id, "out.xlsx", &stats, &SkipCounts::default(), 120).unwrap();

        let jobs = fetch_recent(&conn, 10).unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].status, "completed");
        assert_eq!(jobs[0].output.as_deref(), Some("out.xlsx"));
        assert_eq!(jobs[0].statistics.as_ref().unwrap().total_views, 1700);
    }

    #[test]
    fn error_jobs_keep_the_message() {
        let conn = memory_db();
        let id = insert_job(&conn, "bad.xlsx", "П", None).unwrap();
        mark_error(&conn, id, "sheet structure not recognized").unwrap();

        let jobs = fetch_recent(&conn, 10).unwrap();
        assert_eq!(jobs[0].status, "error");
        assert!(jobs[0].error.as_deref().unwrap().contains("structure"));

        let stats = get_stats(&conn).unwrap();
        assert_eq!(stats.total, 1);
        assert_eq!(stats.errors, 1);
        assert_eq!(stats.completed, 0);
    }

    #[test]
    fn stats_sum_across_completed_jobs() {
        let conn = memory_db();
        for views in [100u64, 200] {
            let id = insert_job(&conn, "in.xlsx", "П", None).unwrap();
            let stats = Statistics {
                total_rows: 1,
                total_views: views,
                ..Statistics::default()
            };
            mark_completed(&conn, id, "out.xlsx", &stats, &SkipCounts::default(), 10).unwrap();
        }
        let stats = get_stats(&conn).unwrap();
        assert_eq!(stats.records_total, 2);
        assert_eq!(stats.views_total, 300);
    }
}
