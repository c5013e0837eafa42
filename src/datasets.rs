//! Sample dataset catalog and per-dataset load plans.
//!
//! The five datasets are a fixed, ordered set. They are mutually independent
//! (any permutation of the catalog yields the same final state), but sakila
//! and menagerie carry intra-dataset ordering: schema artifacts must be
//! applied before data artifacts, which the plans encode as task order and
//! the fail-fast executor enforces.

use crate::tasks::ExecTask;
use std::time::Duration;

/// One step of a local-infile load sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfileStep {
    /// Apply a SQL script against the dataset's database.
    Script(&'static str),
    /// Bulk-load a text file into a table via LOAD DATA LOCAL INFILE.
    Load {
        table: &'static str,
        data_file: &'static str,
    },
}

/// How a dataset gets into the source instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStrategy {
    /// Entry script that sources further schema/data files relative to the
    /// dataset directory; target database implied by the statements inside.
    MultiScript { entry: &'static str },

    /// Single consolidated schema+data script.
    ConsolidatedScript { script: &'static str },

    /// Explicit database creation, then schema scripts and per-table bulk
    /// text-file loads in the given order.
    LocalInfile { steps: &'static [InfileStep] },

    /// Schema script must run to completion before the data script starts.
    SchemaThenData {
        schema: &'static str,
        data: &'static str,
    },

    /// Dump-loading utility with configurable parallelism, deferred
    /// secondary-index construction, and a version-check bypass.
    DumpLoad { dump_dir: &'static str },
}

/// Immutable configuration of one sample dataset.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub name: &'static str,
    /// Database the dataset ends up in.
    pub database: &'static str,
    /// Directory under the datasets mount holding this dataset's artifacts.
    pub dir: &'static str,
    pub strategy: LoadStrategy,
}

impl Dataset {
    /// Whether the server-side local-infile flag must be enabled before this
    /// dataset's job runs.
    pub fn requires_local_infile(&self) -> bool {
        matches!(self.strategy, LoadStrategy::LocalInfile { .. })
    }
}

const MENAGERIE_STEPS: &[InfileStep] = &[
    InfileStep::Script("cr_pet_tbl.sql"),
    InfileStep::Load {
        table: "pet",
        data_file: "pet.txt",
    },
    InfileStep::Script("ins_puff_rec.sql"),
    InfileStep::Script("cr_event_tbl.sql"),
    InfileStep::Load {
        table: "event",
        data_file: "event.txt",
    },
];

/// The fixed, ordered dataset catalog.
pub fn catalog() -> [Dataset; 5] {
    [
        Dataset {
            name: "employees",
            database: "employees",
            dir: "employees",
            strategy: LoadStrategy::MultiScript {
                entry: "employees.sql",
            },
        },
        Dataset {
            name: "menagerie",
            database: "menagerie",
            dir: "menagerie",
            strategy: LoadStrategy::LocalInfile {
                steps: MENAGERIE_STEPS,
            },
        },
        Dataset {
            name: "world",
            database: "world",
            dir: "world",
            strategy: LoadStrategy::ConsolidatedScript {
                script: "world.sql",
            },
        },
        Dataset {
            name: "sakila",
            database: "sakila",
            dir: "sakila",
            strategy: LoadStrategy::SchemaThenData {
                schema: "sakila-schema.sql",
                data: "sakila-data.sql",
            },
        },
        Dataset {
            name: "airport",
            database: "airportdb",
            dir: "airport-db",
            strategy: LoadStrategy::DumpLoad {
                dump_dir: "airport-db",
            },
        },
    ]
}

/// Everything a load plan needs to know about the source instance.
#[derive(Debug, Clone)]
pub struct ImportContext {
    /// Datasets mount point inside the source container.
    pub dataset_root: String,
    pub root_password: String,
    /// Worker count for the dump-loading utility.
    pub dump_threads: u32,
}

impl ImportContext {
    fn dataset_dir(&self, dataset: &Dataset) -> String {
        format!("{}/{}", self.dataset_root, dataset.dir)
    }

    /// `sh -c` wrapper: script loads need shell redirection and a working
    /// directory, because multi-file scripts source siblings by relative path.
    fn script_task(&self, name: String, dir: &str, db: Option<&str>, script: &str) -> ExecTask {
        let db = db.map(|d| format!(" {}", d)).unwrap_or_default();
        let shell = format!(
            "cd {dir} && mysql -uroot -p{password} --local-infile=1{db} < {script}",
            dir = dir,
            password = self.root_password,
            db = db,
            script = script
        );
        ExecTask::new(name, vec!["sh".to_string(), "-c".to_string(), shell])
    }

    fn statement_task(&self, name: String, db: Option<&str>, sql: String) -> ExecTask {
        let mut command = vec![
            "mysql".to_string(),
            "-uroot".to_string(),
            format!("-p{}", self.root_password),
            "--local-infile=1".to_string(),
        ];
        if let Some(db) = db {
            command.push(db.to_string());
        }
        command.push("-e".to_string());
        command.push(sql);
        ExecTask::new(name, command)
    }
}

impl Dataset {
    /// Build the ordered task plan loading this dataset into the source
    /// instance. Task order encodes every intra-dataset dependency.
    pub fn plan(&self, ctx: &ImportContext) -> Vec<ExecTask> {
        let dir = ctx.dataset_dir(self);
        match &self.strategy {
            LoadStrategy::MultiScript { entry } => {
                vec![ctx.script_task(
                    format!("{}: schema+data scripts", self.name),
                    &dir,
                    None,
                    entry,
                )]
            }

            LoadStrategy::ConsolidatedScript { script } => {
                vec![ctx.script_task(
                    format!("{}: consolidated script", self.name),
                    &dir,
                    None,
                    script,
                )]
            }

            LoadStrategy::LocalInfile { steps } => {
                let mut tasks = vec![ctx.statement_task(
                    format!("{}: create database", self.name),
                    None,
                    format!("CREATE DATABASE IF NOT EXISTS {};", self.database),
                )];
                for step in steps.iter() {
                    match step {
                        InfileStep::Script(script) => tasks.push(ctx.script_task(
                            format!("{}: apply {}", self.name, script),
                            &dir,
                            Some(self.database),
                            script,
                        )),
                        InfileStep::Load { table, data_file } => tasks.push(ctx.statement_task(
                            format!("{}: load {}", self.name, table),
                            Some(self.database),
                            format!(
                                "LOAD DATA LOCAL INFILE '{}/{}' INTO TABLE {};",
                                dir, data_file, table
                            ),
                        )),
                    }
                }
                tasks
            }

            LoadStrategy::SchemaThenData { schema, data } => {
                // Data must never load into an unprepared schema; the
                // fail-fast executor skips the second task if the first fails.
                vec![
                    ctx.script_task(format!("{}: schema script", self.name), &dir, None, schema),
                    ctx.script_task(format!("{}: data script", self.name), &dir, None, data),
                ]
            }

            LoadStrategy::DumpLoad { dump_dir } => {
                let command = vec![
                    "mysqlsh".to_string(),
                    "--mysql".to_string(),
                    "-uroot".to_string(),
                    format!("-p{}", ctx.root_password),
                    "-h127.0.0.1".to_string(),
                    "--".to_string(),
                    "util".to_string(),
                    "load-dump".to_string(),
                    format!("{}/{}", ctx.dataset_root, dump_dir),
                    format!("--threads={}", ctx.dump_threads),
                    "--deferTableIndexes=all".to_string(),
                    "--ignoreVersion".to_string(),
                    // The dump directory is a read-only mount; the loader
                    // must not place its progress-state file there.
                    "--progressFile=".to_string(),
                ];
                vec![ExecTask::new(format!("{}: load dump", self.name), command)
                    .with_timeout(Duration::from_secs(3600))]
            }
        }
    }
}
