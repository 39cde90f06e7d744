//! Orchestrator - ties the catalog reader, resolver, emitter, repository
//! and applier into the three user-facing workflows.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::apply::{ExecutionReport, ScriptApplier};
use crate::config::{ApplyConfig, Config, ConnectionParams};
use crate::core::{Connection, ConnectionFactory};
use crate::ddl::render_snapshot;
use crate::error::{MetaError, Result};
use crate::scripts::{ScriptCategory, ScriptRepository};
use crate::source::CatalogReader;
use crate::typemap::{resolve_catalog, ResolveOptions};

/// Result of an export run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSummary {
    /// Unique run identifier.
    pub run_id: String,

    /// When the export started.
    pub started_at: DateTime<Utc>,

    /// When the export completed.
    pub completed_at: DateTime<Utc>,

    /// Root of the written scripts tree.
    pub output_root: PathBuf,

    /// Domain scripts written.
    pub domains: usize,

    /// Table scripts written.
    pub tables: usize,

    /// Procedure scripts written.
    pub procedures: usize,
}

impl ExportSummary {
    pub fn total(&self) -> usize {
        self.domains + self.tables + self.procedures
    }

    /// Human-readable summary lines.
    pub fn lines(&self) -> Vec<String> {
        vec![
            format!("Exported {} objects to {}", self.total(), self.output_root.display()),
            format!("  domains:    {}", self.domains),
            format!("  tables:     {}", self.tables),
            format!("  procedures: {}", self.procedures),
        ]
    }

    /// Convert to JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Workflow coordinator over a connection factory.
pub struct Orchestrator<F: ConnectionFactory> {
    config: Config,
    factory: F,
}

impl<F: ConnectionFactory> Orchestrator<F> {
    /// Create a new orchestrator.
    pub fn new(config: Config, factory: F) -> Self {
        Self { config, factory }
    }

    /// Create a fresh database file under `db_dir` and apply `scripts_root` to it.
    pub fn build_database(&self, db_dir: &Path, scripts_root: &Path) -> Result<ExecutionReport> {
        require_dir(scripts_root, "scripts directory")?;

        let db_dir = absolute(db_dir)?;
        fs::create_dir_all(&db_dir)?;
        let target = db_dir.join(&self.config.build.database_file);

        if target.exists() {
            if !self.config.build.overwrite {
                return Err(MetaError::Config(format!(
                    "{} already exists and build.overwrite is disabled",
                    target.display()
                )));
            }
            info!("Removing existing database {}", target.display());
            fs::remove_file(&target)?;
        }

        let params = ConnectionParams::for_file(&self.config.server, &target);
        info!("Creating database {}", params.location());
        let mut conn = self.factory.create_database(&params)?;

        apply_with(conn.as_mut(), scripts_root, &self.config.apply)
    }

    /// Export the schema of the database named by `connection_string` into
    /// `output_root`, replacing whatever was there.
    pub fn export_scripts(&self, connection_string: &str, output_root: &Path) -> Result<ExportSummary> {
        let params = ConnectionParams::parse(connection_string)?;
        info!("Connecting to {}", params.location());
        let mut conn = self.factory.connect(&params)?;

        let opts = ResolveOptions {
            column_not_null: self.config.export.column_not_null,
        };
        export_with(conn.as_mut(), output_root, opts)
    }

    /// Apply `scripts_root` to the existing database named by `connection_string`.
    pub fn update_database(&self, connection_string: &str, scripts_root: &Path) -> Result<ExecutionReport> {
        require_dir(scripts_root, "scripts directory")?;

        let params = ConnectionParams::parse(connection_string)?;
        info!("Connecting to {}", params.location());
        let mut conn = self.factory.connect(&params)?;

        apply_with(conn.as_mut(), scripts_root, &self.config.apply)
    }
}

/// Read the catalog over `conn` and write one script per object under `root`.
///
/// The catalog is read completely before `root` is touched, so a failed read
/// leaves any previous export in place.
pub fn export_with(conn: &mut dyn Connection, root: &Path, opts: ResolveOptions) -> Result<ExportSummary> {
    let started_at = Utc::now();
    let run_id = uuid::Uuid::new_v4().to_string();
    info!("Starting export run: {}", run_id);

    info!("Phase 1: Reading system catalog");
    let catalog = CatalogReader::new(conn).read_all()?;

    info!("Phase 2: Resolving types");
    let snapshot = resolve_catalog(&catalog, opts);

    info!("Phase 3: Writing {} scripts to {}", snapshot.object_count(), root.display());
    let artifacts = render_snapshot(&snapshot);
    let repo = ScriptRepository::new(root);
    repo.recreate()?;
    for artifact in &artifacts {
        let path = repo.write(artifact)?;
        debug!("Wrote {}", path.display());
    }

    let count = |category: ScriptCategory| artifacts.iter().filter(|a| a.category == category).count();
    let summary = ExportSummary {
        run_id,
        started_at,
        completed_at: Utc::now(),
        output_root: root.to_path_buf(),
        domains: count(ScriptCategory::Domain),
        tables: count(ScriptCategory::Table),
        procedures: count(ScriptCategory::Procedure),
    };

    info!(
        "Export complete: {} domains, {} tables, {} procedures",
        summary.domains, summary.tables, summary.procedures
    );
    Ok(summary)
}

/// Apply the scripts tree at `root` over `conn`.
pub fn apply_with(conn: &mut dyn Connection, root: &Path, config: &ApplyConfig) -> Result<ExecutionReport> {
    let repo = ScriptRepository::new(root);
    ScriptApplier::new(conn, &config.idempotent_patterns).apply_all(&repo)
}

fn require_dir(path: &Path, what: &str) -> Result<()> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(MetaError::Config(format!("{} {} does not exist", what, path.display())))
    }
}

/// The server resolves database paths on its own side, so relative paths are
/// anchored to the current directory first.
fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apply::ExecutionOutcome;
    use crate::row;
    use crate::testing::{FakeConnection, FakeFactory};
    use tempfile::TempDir;

    const NONE: Option<i64> = None;

    /// Catalog rows for a database built from the two-script fixture below.
    fn fixture_catalog(conn: FakeConnection) -> FakeConnection {
        conn.with_rows(
            "FROM RDB$FIELDS f",
            vec![row!["ID_TYPE", 8, NONE, 4, 0, 0, 1, 0]],
        )
        .with_rows("FROM RDB$RELATIONS r", vec![row!["T"]])
        .with_rows(
            "rf.RDB$RELATION_NAME = 'T'",
            vec![
                row!["ID", "ID_TYPE", 0, 0, 8, NONE, 4, 0, 0, 1, 0],
                row!["NAME", "RDB$1", 1, 0, 37, 50, 200, 0, 0, 0, 0],
            ],
        )
    }

    fn fixture_scripts(root: &Path) {
        let repo = ScriptRepository::new(root);
        repo.write(&crate::scripts::ScriptArtifact::new(
            ScriptCategory::Domain,
            "ID_TYPE",
            "CREATE DOMAIN ID_TYPE AS INTEGER NOT NULL;".into(),
        ))
        .unwrap();
        repo.write(&crate::scripts::ScriptArtifact::new(
            ScriptCategory::Table,
            "T",
            "CREATE TABLE T (ID ID_TYPE, NAME VARCHAR(50));".into(),
        ))
        .unwrap();
    }

    #[test]
    fn test_build_then_export_end_to_end() {
        let dir = TempDir::new().unwrap();
        let scripts = dir.path().join("scripts");
        fixture_scripts(&scripts);

        let conn = fixture_catalog(FakeConnection::new());
        let orch = Orchestrator::new(Config::default(), FakeFactory::new(conn.clone()));

        let report = orch.build_database(&dir.path().join("db"), &scripts).unwrap();
        assert_eq!(report.succeeded(), 2);
        assert!(!report.has_failures());

        let out = dir.path().join("exported");
        let summary = orch
            .export_scripts("Database=/tmp/x.fdb;User=SYSDBA;Password=masterkey", &out)
            .unwrap();
        assert_eq!(summary.domains, 1);
        assert_eq!(summary.tables, 1);
        assert_eq!(summary.procedures, 0);

        assert_eq!(
            fs::read_to_string(out.join("domains/ID_TYPE.sql")).unwrap(),
            "CREATE DOMAIN ID_TYPE AS INTEGER NOT NULL;"
        );
        assert_eq!(
            fs::read_to_string(out.join("tables/T.sql")).unwrap(),
            "CREATE TABLE T (\n    ID ID_TYPE,\n    NAME VARCHAR(50)\n);"
        );
        assert!(out.join("procedures").is_dir());
        assert_eq!(conn.connected_databases(), vec!["/tmp/x.fdb".to_string()]);
    }

    #[test]
    fn test_build_replaces_existing_database_file() {
        let dir = TempDir::new().unwrap();
        let scripts = dir.path().join("scripts");
        fs::create_dir_all(&scripts).unwrap();
        let db_dir = dir.path().join("db");
        fs::create_dir_all(&db_dir).unwrap();
        fs::write(db_dir.join("NewDbFromScripts.fdb"), "stale").unwrap();

        let conn = FakeConnection::new();
        let orch = Orchestrator::new(Config::default(), FakeFactory::new(conn.clone()));
        orch.build_database(&db_dir, &scripts).unwrap();

        assert!(!db_dir.join("NewDbFromScripts.fdb").exists());
        let created = conn.created_databases();
        assert_eq!(created.len(), 1);
        assert!(created[0].ends_with("NewDbFromScripts.fdb"));
    }

    #[test]
    fn test_build_respects_overwrite_flag() {
        let dir = TempDir::new().unwrap();
        let scripts = dir.path().join("scripts");
        fs::create_dir_all(&scripts).unwrap();
        fs::write(dir.path().join("NewDbFromScripts.fdb"), "keep").unwrap();

        let mut config = Config::default();
        config.build.overwrite = false;
        let conn = FakeConnection::new();
        let orch = Orchestrator::new(config, FakeFactory::new(conn.clone()));

        let err = orch.build_database(dir.path(), &scripts).unwrap_err();
        assert!(matches!(err, MetaError::Config(_)));
        assert!(conn.created_databases().is_empty());
        assert!(dir.path().join("NewDbFromScripts.fdb").exists());
    }

    #[test]
    fn test_build_creates_missing_db_dir() {
        let dir = TempDir::new().unwrap();
        let scripts = dir.path().join("scripts");
        fs::create_dir_all(&scripts).unwrap();
        let db_dir = dir.path().join("nested/db");

        let orch = Orchestrator::new(Config::default(), FakeFactory::new(FakeConnection::new()));
        orch.build_database(&db_dir, &scripts).unwrap();
        assert!(db_dir.is_dir());
    }

    #[test]
    fn test_missing_scripts_dir_is_config_error() {
        let dir = TempDir::new().unwrap();
        let conn = FakeConnection::new();
        let orch = Orchestrator::new(Config::default(), FakeFactory::new(conn.clone()));

        let err = orch
            .update_database("Database=db.fdb", &dir.path().join("nope"))
            .unwrap_err();
        assert!(matches!(err, MetaError::Config(_)));
        assert!(conn.connected_databases().is_empty());
    }

    #[test]
    fn test_refused_connection() {
        let dir = TempDir::new().unwrap();
        let mut factory = FakeFactory::new(FakeConnection::new());
        factory.refuse = true;
        let orch = Orchestrator::new(Config::default(), factory);

        let err = orch.update_database("Database=db.fdb", dir.path()).unwrap_err();
        assert!(matches!(err, MetaError::Connection { .. }));
        assert_eq!(err.exit_code(), crate::error::EXIT_CONNECTION_ERROR);
    }

    #[test]
    fn test_bad_connection_string_does_not_connect() {
        let dir = TempDir::new().unwrap();
        let conn = FakeConnection::new();
        let orch = Orchestrator::new(Config::default(), FakeFactory::new(conn.clone()));

        let err = orch.export_scripts("Bogus=1", dir.path()).unwrap_err();
        assert!(matches!(err, MetaError::Config(_)));
        assert!(conn.connected_databases().is_empty());
    }

    #[test]
    fn test_update_is_idempotent() {
        let dir = TempDir::new().unwrap();
        fixture_scripts(dir.path());
        let conn = FakeConnection::new();
        let orch = Orchestrator::new(Config::default(), FakeFactory::new(conn));

        let first = orch.update_database("Database=db.fdb", dir.path()).unwrap();
        let second = orch.update_database("Database=db.fdb", dir.path()).unwrap();
        assert_eq!(first.succeeded(), 2);
        assert_eq!(second.skipped(), 2);
        assert!(second
            .results
            .iter()
            .all(|r| matches!(r.outcome, ExecutionOutcome::SkippedIdempotent { .. })));
    }

    #[test]
    fn test_export_replaces_previous_output() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out");
        fs::create_dir_all(out.join("tables")).unwrap();
        fs::write(out.join("tables/OLD.sql"), "CREATE TABLE OLD (X INTEGER);").unwrap();

        let mut conn = fixture_catalog(FakeConnection::new());
        let summary = export_with(&mut conn, &out, ResolveOptions::default()).unwrap();

        assert_eq!(summary.total(), 2);
        assert!(!out.join("tables/OLD.sql").exists());
        let json: serde_json::Value = serde_json::from_str(&summary.to_json().unwrap()).unwrap();
        assert_eq!(json["tables"], 1);
    }

    #[test]
    fn test_failed_catalog_read_keeps_previous_output() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out");
        fs::create_dir_all(out.join("tables")).unwrap();
        fs::write(out.join("tables/OLD.sql"), "x").unwrap();

        let mut conn = FakeConnection::new().with_query_error(
            "FROM RDB$FIELDS f",
            crate::error::EngineError::with_code(-551, "no permission for read/select access"),
        );
        let err = export_with(&mut conn, &out, ResolveOptions::default()).unwrap_err();
        assert!(matches!(err, MetaError::CatalogRead { .. }));
        assert!(out.join("tables/OLD.sql").exists());
    }

    #[test]
    fn test_export_column_not_null_option() {
        let dir = TempDir::new().unwrap();
        let conn = FakeConnection::new()
            .with_rows("FROM RDB$RELATIONS r", vec![row!["C"]])
            .with_rows(
                "rf.RDB$RELATION_NAME = 'C'",
                vec![row!["CODE", "RDB$5", 0, 1, 14, 3, 3, 0, 0, 0, 0]],
            );

        let mut config = Config::default();
        config.export.column_not_null = true;
        let orch = Orchestrator::new(config, FakeFactory::new(conn));
        let out = dir.path().join("out");
        orch.export_scripts("Database=db.fdb", &out).unwrap();

        assert_eq!(
            fs::read_to_string(out.join("tables/C.sql")).unwrap(),
            "CREATE TABLE C (\n    CODE CHAR(3) NOT NULL\n);"
        );
    }
}
