//! Script application against an open connection.
//!
//! Scripts are applied category by category (domains, tables, procedures)
//! and file by file in repository order. A failing script never stops the
//! run: every outcome is recorded in the [`ExecutionReport`].

pub mod classify;

pub use classify::{classify, ErrorClass};

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::core::Connection;
use crate::error::Result;
use crate::scripts::{ScriptCategory, ScriptRepository};

/// Terminal state of one script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExecutionOutcome {
    Succeeded,
    SkippedIdempotent { reason: String },
    Failed { error: String },
}

/// Outcome of one script file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptResult {
    pub category: ScriptCategory,
    pub file_name: String,
    pub outcome: ExecutionOutcome,
}

impl ScriptResult {
    /// One human-readable report line.
    pub fn line(&self) -> String {
        let path = format!("{}/{}", self.category.dir_name(), self.file_name);
        match &self.outcome {
            ExecutionOutcome::Succeeded => format!("[OK] {}", path),
            ExecutionOutcome::SkippedIdempotent { reason } => {
                format!("[INFO] {} skipped: {}", path, first_line(reason))
            }
            ExecutionOutcome::Failed { error } => format!("[ERROR] {}: {}", path, first_line(error)),
        }
    }
}

fn first_line(message: &str) -> &str {
    message.lines().next().unwrap_or_default()
}

/// Result of applying a scripts tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionReport {
    /// Unique run identifier.
    pub run_id: String,

    /// When application started.
    pub started_at: DateTime<Utc>,

    /// When application completed.
    pub completed_at: DateTime<Utc>,

    /// Per-script outcomes in apply order.
    pub results: Vec<ScriptResult>,
}

impl ExecutionReport {
    fn begin() -> Self {
        let now = Utc::now();
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            started_at: now,
            completed_at: now,
            results: Vec::new(),
        }
    }

    pub fn succeeded(&self) -> usize {
        self.count(|o| matches!(o, ExecutionOutcome::Succeeded))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, ExecutionOutcome::SkippedIdempotent { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, ExecutionOutcome::Failed { .. }))
    }

    fn count(&self, pred: impl Fn(&ExecutionOutcome) -> bool) -> usize {
        self.results.iter().filter(|r| pred(&r.outcome)).count()
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    /// Report lines followed by a summary line.
    pub fn lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self.results.iter().map(ScriptResult::line).collect();
        lines.push(format!(
            "{} scripts: {} succeeded, {} skipped, {} failed",
            self.results.len(),
            self.succeeded(),
            self.skipped(),
            self.failed()
        ));
        lines
    }

    /// Convert to JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Applies scripts over one open connection.
pub struct ScriptApplier<'a> {
    conn: &'a mut dyn Connection,
    patterns: &'a [String],
}

impl<'a> ScriptApplier<'a> {
    /// `patterns` are the message fragments that mark an "already exists" error.
    pub fn new(conn: &'a mut dyn Connection, patterns: &'a [String]) -> Self {
        Self { conn, patterns }
    }

    /// Apply every category in order.
    pub fn apply_all(&mut self, repo: &ScriptRepository) -> Result<ExecutionReport> {
        let mut report = ExecutionReport::begin();
        info!("Applying scripts from {:?} (run {})", repo.root(), report.run_id);

        for category in ScriptCategory::ALL {
            let results = self.apply_category(repo, category);
            report.results.extend(results);
        }

        report.completed_at = Utc::now();
        info!(
            "Applied {} scripts: {} succeeded, {} skipped, {} failed",
            report.results.len(),
            report.succeeded(),
            report.skipped(),
            report.failed()
        );
        Ok(report)
    }

    /// Apply one category's files in repository order. A category that
    /// cannot be listed yields a single failed result named after its
    /// directory.
    pub fn apply_category(&mut self, repo: &ScriptRepository, category: ScriptCategory) -> Vec<ScriptResult> {
        let files = match repo.list(category) {
            Ok(files) => files,
            Err(e) => {
                warn!("{}: cannot list scripts: {}", category, e);
                return vec![ScriptResult {
                    category,
                    file_name: String::new(),
                    outcome: ExecutionOutcome::Failed {
                        error: format!("cannot list scripts: {}", e),
                    },
                }];
            }
        };
        info!("Applying {} {} scripts", files.len(), category);

        files
            .iter()
            .map(|path| self.apply_file(repo, category, path))
            .collect()
    }

    /// Apply a single file. Never fails: errors become the outcome.
    pub fn apply_file(
        &mut self,
        repo: &ScriptRepository,
        category: ScriptCategory,
        path: &Path,
    ) -> ScriptResult {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let outcome = match repo.read(path) {
            Err(e) => {
                warn!("{}/{}: cannot read script: {}", category, file_name, e);
                ExecutionOutcome::Failed {
                    error: format!("cannot read script: {}", e),
                }
            }
            Ok(text) if text.trim().is_empty() => {
                info!("{}/{}: empty script, skipping", category, file_name);
                ExecutionOutcome::SkippedIdempotent {
                    reason: "empty script".to_string(),
                }
            }
            Ok(text) => self.execute(category, &file_name, &text),
        };

        ScriptResult {
            category,
            file_name,
            outcome,
        }
    }

    fn execute(&mut self, category: ScriptCategory, file_name: &str, sql: &str) -> ExecutionOutcome {
        match self.conn.execute(sql) {
            Ok(()) => {
                info!("{}/{}: applied", category, file_name);
                ExecutionOutcome::Succeeded
            }
            Err(e) => match classify(&e, self.patterns) {
                ErrorClass::AlreadyExists => {
                    info!("{}/{}: already exists, skipping", category, file_name);
                    ExecutionOutcome::SkippedIdempotent {
                        reason: e.to_string(),
                    }
                }
                ErrorClass::Failure => {
                    warn!("{}/{}: failed: {}", category, file_name, e);
                    ExecutionOutcome::Failed {
                        error: e.to_string(),
                    }
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_idempotent_patterns;
    use crate::error::EngineError;
    use crate::scripts::ScriptArtifact;
    use crate::testing::FakeConnection;
    use std::fs;
    use tempfile::TempDir;

    fn repo_with(scripts: &[(ScriptCategory, &str, &str)]) -> (TempDir, ScriptRepository) {
        let dir = TempDir::new().unwrap();
        let repo = ScriptRepository::new(dir.path());
        for (category, name, text) in scripts {
            repo.write(&ScriptArtifact::new(*category, name, text.to_string()))
                .unwrap();
        }
        (dir, repo)
    }

    #[test]
    fn test_same_script_twice_is_idempotent() {
        let (_dir, repo) = repo_with(&[(
            ScriptCategory::Table,
            "T",
            "CREATE TABLE T (\n    ID INTEGER\n);",
        )]);
        let mut conn = FakeConnection::new();
        let patterns = default_idempotent_patterns();

        let first = ScriptApplier::new(&mut conn, &patterns).apply_all(&repo).unwrap();
        let second = ScriptApplier::new(&mut conn, &patterns).apply_all(&repo).unwrap();

        assert_eq!(first.results[0].outcome, ExecutionOutcome::Succeeded);
        assert!(matches!(
            second.results[0].outcome,
            ExecutionOutcome::SkippedIdempotent { .. }
        ));
        assert!(!second.has_failures());
    }

    #[test]
    fn test_domains_applied_before_tables() {
        let (_dir, repo) = repo_with(&[
            (ScriptCategory::Procedure, "P", "CREATE OR ALTER PROCEDURE P AS BEGIN END"),
            (ScriptCategory::Table, "A_TABLE", "CREATE TABLE A_TABLE (X D);"),
            (ScriptCategory::Domain, "D", "CREATE DOMAIN D AS INTEGER;"),
        ]);
        let mut conn = FakeConnection::new();
        let patterns = default_idempotent_patterns();
        ScriptApplier::new(&mut conn, &patterns).apply_all(&repo).unwrap();

        let executed = conn.executed();
        assert!(executed[0].starts_with("CREATE DOMAIN D"));
        assert!(executed[1].starts_with("CREATE TABLE A_TABLE"));
        assert!(executed[2].starts_with("CREATE OR ALTER PROCEDURE P"));
    }

    #[test]
    fn test_files_applied_in_name_order() {
        let (_dir, repo) = repo_with(&[
            (ScriptCategory::Table, "B", "CREATE TABLE B (X INTEGER);"),
            (ScriptCategory::Table, "A", "CREATE TABLE A (X INTEGER);"),
        ]);
        let mut conn = FakeConnection::new();
        let patterns = default_idempotent_patterns();
        let report = ScriptApplier::new(&mut conn, &patterns).apply_all(&repo).unwrap();

        let names: Vec<_> = report.results.iter().map(|r| r.file_name.as_str()).collect();
        assert_eq!(names, vec!["A.sql", "B.sql"]);
    }

    #[test]
    fn test_failure_does_not_stop_run() {
        let (_dir, repo) = repo_with(&[
            (ScriptCategory::Domain, "BAD", "CREATE DOMAIN BAD AS NOPE;"),
            (ScriptCategory::Domain, "GOOD", "CREATE DOMAIN GOOD AS INTEGER;"),
            (ScriptCategory::Table, "T", "CREATE TABLE T (X GOOD);"),
        ]);
        let mut conn = FakeConnection::new().with_execute_error(
            "NOPE",
            EngineError::with_code(-104, "Dynamic SQL Error\nToken unknown - line 1, column 26"),
        );
        let patterns = default_idempotent_patterns();
        let report = ScriptApplier::new(&mut conn, &patterns).apply_all(&repo).unwrap();

        assert_eq!(report.results.len(), 3);
        assert!(matches!(report.results[0].outcome, ExecutionOutcome::Failed { .. }));
        assert_eq!(report.results[1].outcome, ExecutionOutcome::Succeeded);
        assert_eq!(report.results[2].outcome, ExecutionOutcome::Succeeded);
        assert!(report.has_failures());
        assert_eq!(report.failed(), 1);
        assert_eq!(
            report.results[0].line(),
            "[ERROR] domains/BAD.sql: Dynamic SQL Error"
        );
    }

    #[test]
    fn test_blank_script_is_skipped_without_executing() {
        let (_dir, repo) = repo_with(&[(ScriptCategory::Table, "BLANK", "  \n\t\n")]);
        let mut conn = FakeConnection::new();
        let patterns = default_idempotent_patterns();
        let report = ScriptApplier::new(&mut conn, &patterns).apply_all(&repo).unwrap();

        assert_eq!(
            report.results[0].outcome,
            ExecutionOutcome::SkippedIdempotent {
                reason: "empty script".into()
            }
        );
        assert!(conn.executed().is_empty());
    }

    #[test]
    fn test_unreadable_file_is_failed() {
        let (_dir, repo) = repo_with(&[]);
        fs::create_dir_all(repo.category_dir(ScriptCategory::Domain)).unwrap();
        // Invalid UTF-8 cannot be read as text.
        fs::write(
            repo.category_dir(ScriptCategory::Domain).join("BIN.sql"),
            [0xff, 0xfe, 0x00, 0xc3],
        )
        .unwrap();

        let mut conn = FakeConnection::new();
        let patterns = default_idempotent_patterns();
        let report = ScriptApplier::new(&mut conn, &patterns).apply_all(&repo).unwrap();

        assert!(matches!(report.results[0].outcome, ExecutionOutcome::Failed { .. }));
        assert!(conn.executed().is_empty());
    }

    #[test]
    fn test_unlistable_category_is_failed_and_run_continues() {
        let (_dir, repo) = repo_with(&[
            (ScriptCategory::Domain, "D", "CREATE DOMAIN D AS INTEGER;"),
            (ScriptCategory::Procedure, "P", "CREATE OR ALTER PROCEDURE P AS BEGIN END"),
        ]);
        // A plain file where the tables directory should be.
        fs::write(repo.category_dir(ScriptCategory::Table), "not a directory").unwrap();

        let mut conn = FakeConnection::new();
        let patterns = default_idempotent_patterns();
        let report = ScriptApplier::new(&mut conn, &patterns).apply_all(&repo).unwrap();

        assert_eq!(report.results.len(), 3);
        assert_eq!(report.results[0].outcome, ExecutionOutcome::Succeeded);
        assert_eq!(report.results[1].category, ScriptCategory::Table);
        assert!(matches!(report.results[1].outcome, ExecutionOutcome::Failed { .. }));
        assert!(report.results[1]
            .line()
            .starts_with("[ERROR] tables/: cannot list scripts"));
        assert_eq!(report.results[2].outcome, ExecutionOutcome::Succeeded);
        assert_eq!(report.failed(), 1);
        assert_eq!(conn.executed().len(), 2);
    }

    #[test]
    fn test_report_lines_and_json() {
        let (_dir, repo) = repo_with(&[(ScriptCategory::Domain, "D", "CREATE DOMAIN D AS INTEGER;")]);
        let mut conn = FakeConnection::new();
        let patterns = default_idempotent_patterns();
        let report = ScriptApplier::new(&mut conn, &patterns).apply_all(&repo).unwrap();

        let lines = report.lines();
        assert_eq!(lines[0], "[OK] domains/D.sql");
        assert_eq!(lines[1], "1 scripts: 1 succeeded, 0 skipped, 0 failed");

        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["results"][0]["category"], "domain");
        assert_eq!(json["results"][0]["outcome"]["status"], "succeeded");
        assert!(json["run_id"].is_string());
    }
}
