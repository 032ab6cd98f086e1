//! E2E test fixture with step logging and index checkpoints.

use std::path::PathBuf;
use std::process::Command;
use std::time::{Duration, Instant};

use rusqlite::Connection;
use tempfile::TempDir;

use taskctx::tasks::TaskCollection;

/// Checkpoint snapshot for test debugging.
#[derive(Debug, Clone)]
pub struct Checkpoint {
    pub name: String,
    pub timestamp: Duration,
    pub step_count: usize,
    pub index_state: Option<String>,
}

/// Step result for report generation.
#[derive(Debug, Clone)]
pub struct StepResult {
    pub name: String,
    pub success: bool,
    pub duration: Duration,
    pub output_summary: String,
}

/// E2E test fixture: an isolated project directory with a task file.
pub struct E2EFixture {
    pub scenario_name: String,
    pub temp_dir: TempDir,
    /// Project root (temp_dir path)
    pub root: PathBuf,
    pub task_file: PathBuf,
    /// On-disk FTS index location (./.taskctx/index.db)
    pub index_path: PathBuf,
    start_time: Instant,
    step_count: usize,
    checkpoints: Vec<Checkpoint>,
    step_results: Vec<StepResult>,
}

impl E2EFixture {
    pub fn new(scenario_name: &str, collection: &TaskCollection) -> Self {
        let start_time = Instant::now();
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path().to_path_buf();
        let task_file = root.join("tasks.json");
        let index_path = root.join(".taskctx").join("index.db");
        std::fs::create_dir_all(root.join(".taskctx")).expect("Failed to create .taskctx");

        println!();
        println!("{}", "█".repeat(70));
        println!("█ E2E TEST: {}", scenario_name);
        println!("█ Root: {:?}", root);
        println!("{}", "█".repeat(70));

        let fixture = Self {
            scenario_name: scenario_name.to_string(),
            temp_dir,
            root,
            task_file,
            index_path,
            start_time,
            step_count: 0,
            checkpoints: Vec::new(),
            step_results: Vec::new(),
        };
        fixture.write_tasks(collection);
        fixture
    }

    /// Replace the task file contents.
    pub fn write_tasks(&self, collection: &TaskCollection) {
        let raw = serde_json::to_string_pretty(collection).expect("serialize tasks");
        std::fs::write(&self.task_file, raw).expect("Failed to write task file");
        println!("[TASKS] Wrote {} tasks", collection.tasks.len());
    }

    /// Write `.taskctx/config.toml` in the project root.
    pub fn write_project_config(&self, toml: &str) {
        std::fs::write(self.root.join(".taskctx").join("config.toml"), toml)
            .expect("Failed to write project config");
    }

    pub fn log_step(&mut self, description: &str) {
        self.step_count += 1;
        let elapsed = self.start_time.elapsed();

        println!();
        println!("┌{}", "─".repeat(68));
        println!("│ STEP {}: {}", self.step_count, description);
        println!("│ Time: {:?}", elapsed);
        println!("└{}", "─".repeat(68));
    }

    /// Capture a checkpoint, including the on-disk index row count.
    pub fn checkpoint(&mut self, name: &str) {
        let index_state = self.index_state();
        println!();
        println!("[CHECKPOINT] {}", name);
        if let Some(ref state) = index_state {
            println!("[CHECKPOINT] Index: {}", state);
        }
        self.checkpoints.push(Checkpoint {
            name: name.to_string(),
            timestamp: self.start_time.elapsed(),
            step_count: self.step_count,
            index_state,
        });
    }

    /// Run `taskctx context` against the fixture's task file.
    pub fn run_context(&mut self, extra: &[&str]) -> CommandOutput {
        let task_file = self.task_file.display().to_string();
        let mut args = vec!["-O", "json", "context", "--task-file", task_file.as_str()];
        args.extend_from_slice(extra);
        self.run_taskctx(&args)
    }

    /// Run the CLI and capture output.
    pub fn run_taskctx(&mut self, args: &[&str]) -> CommandOutput {
        let step_name = format!("taskctx {}", args.join(" "));
        let start = Instant::now();

        println!();
        println!("[CMD] {}", step_name);

        let output = Command::new(env!("CARGO_BIN_EXE_taskctx"))
            .args(args)
            .env("HOME", &self.root)
            .env("XDG_CONFIG_HOME", self.root.join(".config"))
            .env_remove("TASKCTX_CONFIG")
            .env_remove("TASKCTX_INDEX_BACKEND")
            .env_remove("TASKCTX_INDEX_PATH")
            .env_remove("RUST_LOG")
            .current_dir(&self.root)
            .output()
            .expect("Failed to execute taskctx command");

        let elapsed = start.elapsed();
        let result = CommandOutput {
            success: output.status.success(),
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            elapsed,
        };

        println!("[CMD] Exit: {} ({:?})", result.exit_code, elapsed);
        if !result.stdout.is_empty() {
            println!("[STDOUT] {}", truncate(&result.stdout, 500));
        }
        if !result.stderr.is_empty() {
            println!("[STDERR] {}", result.stderr);
        }

        let summary = if result.success {
            format!("OK ({})", truncate(&result.stdout, 50))
        } else {
            format!("FAIL: {}", truncate(&result.stderr, 100))
        };
        self.step_results.push(StepResult {
            name: step_name,
            success: result.success,
            duration: elapsed,
            output_summary: summary,
        });

        result
    }

    pub fn assert_success(&self, output: &CommandOutput, operation: &str) {
        assert!(
            output.success,
            "[E2E] {} failed with exit code {}: {}",
            operation,
            output.exit_code,
            output.stderr
        );
        println!("[ASSERT] {} - SUCCESS", operation);
    }

    pub fn generate_report(&self) {
        println!();
        println!("{}", "█".repeat(70));
        println!("█ E2E REPORT: {}", self.scenario_name);
        println!("{}", "█".repeat(70));
        println!("Total Steps: {}", self.step_count);
        println!("Total Time:  {:?}", self.start_time.elapsed());

        for (i, step) in self.step_results.iter().enumerate() {
            let status = if step.success { "✓" } else { "✗" };
            println!("{:2}. {} {} ({:?})", i + 1, status, step.name, step.duration);
            if !step.success {
                println!("     └─ {}", step.output_summary);
            }
        }
        for checkpoint in &self.checkpoints {
            println!(
                "  [{:?}] {} (step {}) {}",
                checkpoint.timestamp,
                checkpoint.name,
                checkpoint.step_count,
                checkpoint.index_state.as_deref().unwrap_or("no index")
            );
        }
    }

    fn index_state(&self) -> Option<String> {
        if !self.index_path.exists() {
            return None;
        }
        let db = Connection::open(&self.index_path).ok()?;
        let rows: i64 = db
            .query_row("SELECT COUNT(*) FROM tasks_fts", [], |r| r.get(0))
            .ok()?;
        let hash: Option<String> = db
            .query_row(
                "SELECT value FROM index_meta WHERE key = 'content_hash'",
                [],
                |r| r.get(0),
            )
            .ok();
        Some(format!(
            "rows={} hash={}",
            rows,
            hash.as_deref().map_or("-", |h| &h[..h.len().min(12)])
        ))
    }
}

impl Drop for E2EFixture {
    fn drop(&mut self) {
        println!();
        println!("█ E2E CLEANUP: {} ({:?})", self.scenario_name, self.start_time.elapsed());
    }
}

/// Command output structure.
pub struct CommandOutput {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
}

impl CommandOutput {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.stdout).expect("stdout should be valid JSON")
    }

    /// Task ids in output order.
    pub fn ids(&self) -> Vec<String> {
        self.json()["tasks"]
            .as_array()
            .expect("tasks array")
            .iter()
            .map(|t| t["id"].as_str().expect("task id").to_string())
            .collect()
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    let truncated: String = s.chars().take(max_len).collect();
    format!("{truncated}...")
}
