//! Binary smoke tests for task-cli
//!
//! Every test runs against its own config file and plans directory so nothing
//! touches the real home directory.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use taskcli::{Plan, PlanStore, Priority, Task};
use tempfile::TempDir;

struct TestEnv {
    temp: TempDir,
    config: PathBuf,
}

impl TestEnv {
    fn new() -> Self {
        Self::with_config("")
    }

    fn with_config(extra: &str) -> Self {
        let temp = TempDir::new().expect("Failed to create temporary directory");
        let config = temp.path().join("task-cli.yml");
        let plans_dir = temp.path().join("plans");
        let yaml = format!("storage:\n  plans-dir: {}\n{extra}", plans_dir.display());
        fs::write(&config, yaml).expect("Failed to write config");
        Self { temp, config }
    }

    fn plans_dir(&self) -> PathBuf {
        self.temp.path().join("plans")
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("task-cli").expect("Failed to find task-cli binary");
        cmd.arg("--no-color")
            .arg("-c")
            .arg(&self.config)
            .env("XDG_DATA_HOME", self.temp.path().join("data"))
            .env_remove("TASK_CLI_ANTHROPIC_API_KEY")
            .env_remove("TASK_CLI_MODEL_NAME")
            .env_remove("TASK_CLI_MAX_TOKENS")
            .env_remove("TASK_CLI_MAX_QUESTIONS")
            .env_remove("TASK_CLI_PLANS_DIR");
        cmd
    }
}

fn saved_plan(dir: &Path) -> String {
    let mut plan = Plan::new("Login Page", "Email and password login", "Build a login page");
    plan.tasks.push(
        Task::new("Create form", "Build the login form")
            .with_priority(Priority::High)
            .with_estimate(2.0),
    );
    let base = PlanStore::new(dir).save(&plan).expect("Failed to save plan");
    base.file_name().expect("base has a name").to_string_lossy().into_owned()
}

#[test]
fn test_cli_version() {
    let env = TestEnv::new();
    env.cmd()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("task-cli version"));
}

#[test]
fn test_cli_no_command_shows_help() {
    Command::cargo_bin("task-cli")
        .expect("Failed to find task-cli binary")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_config_shows_overrides() {
    let env = TestEnv::new();
    env.cmd()
        .arg("config")
        .env("TASK_CLI_MODEL_NAME", "claude-test-model")
        .env("TASK_CLI_MAX_QUESTIONS", "3")
        .assert()
        .success()
        .stdout(predicate::str::contains("claude-test-model"))
        .stdout(predicate::str::contains("Max Questions: 3"))
        .stdout(predicate::str::contains("(not set)"));
}

#[test]
fn test_cli_config_masks_key() {
    let env = TestEnv::new();
    env.cmd()
        .arg("config")
        .env("TASK_CLI_ANTHROPIC_API_KEY", "sk-ant-secret-value")
        .assert()
        .success()
        .stdout(predicate::str::contains("(set)"))
        .stdout(predicate::str::contains("sk-ant-secret-value").not());
}

#[test]
fn test_cli_invalid_max_questions_in_config() {
    let env = TestEnv::with_config("conversation:\n  max-questions: 42\n");
    env.cmd()
        .arg("config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("max-questions"));
}

#[test]
fn test_cli_invalid_env_override() {
    let env = TestEnv::new();
    env.cmd()
        .arg("config")
        .env("TASK_CLI_MAX_TOKENS", "lots")
        .assert()
        .failure()
        .stderr(predicate::str::contains("TASK_CLI_MAX_TOKENS"));
}

#[test]
fn test_cli_list_empty() {
    let env = TestEnv::new();
    env.cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No saved plans found."));
}

#[test]
fn test_cli_list_and_load_saved_plan() {
    let env = TestEnv::new();
    let name = saved_plan(&env.plans_dir());

    env.cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Login Page"))
        .stdout(predicate::str::contains(name.as_str()));

    env.cmd()
        .args(["load", &name])
        .assert()
        .success()
        .stdout(predicate::str::contains("Login Page"))
        .stdout(predicate::str::contains("Create form **[HIGH]**"));

    let output = env
        .cmd()
        .args(["load", &format!("{name}.json"), "--format", "json"])
        .output()
        .expect("Failed to run task-cli");
    assert!(output.status.success());
    let plan: Plan = serde_json::from_slice(&output.stdout).expect("stdout is a plan");
    assert_eq!(plan.title, "Login Page");
    assert_eq!(plan.tasks[0].priority, Priority::High);
}

#[test]
fn test_cli_plans_dir_env_override() {
    let env = TestEnv::new();
    let other = env.temp.path().join("other-plans");
    saved_plan(&other);

    env.cmd()
        .arg("list")
        .env("TASK_CLI_PLANS_DIR", &other)
        .assert()
        .success()
        .stdout(predicate::str::contains("Login Page"));
}

#[test]
fn test_cli_load_missing_plan() {
    let env = TestEnv::new();
    env.cmd()
        .args(["load", "2026-01-01_nothing"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Plan not found"));
}

#[test]
fn test_cli_plan_empty_task() {
    let env = TestEnv::new();
    env.cmd()
        .args(["plan", "   "])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Task description cannot be empty."));
}

#[test]
fn test_cli_plan_without_api_key() {
    let env = TestEnv::new();
    env.cmd()
        .args(["plan", "--skip-questions", "--save", "Build a login page"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("TASK_CLI_ANTHROPIC_API_KEY"));
}

#[test]
fn test_cli_plan_rejects_max_questions_out_of_range() {
    let env = TestEnv::new();
    env.cmd()
        .args(["plan", "-q", "11", "Build a login page"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("11"));
}

#[test]
fn test_cli_dotenv_in_working_dir() {
    let env = TestEnv::new();
    fs::write(
        env.temp.path().join(".env"),
        "TASK_CLI_MODEL_NAME=model-from-dotenv\nTASK_CLI_ANTHROPIC_API_KEY=sk-from-dotenv\n",
    )
    .expect("Failed to write .env");

    env.cmd()
        .arg("config")
        .current_dir(env.temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("model-from-dotenv"))
        .stdout(predicate::str::contains("(set)"))
        .stdout(predicate::str::contains("sk-from-dotenv").not());
}

#[test]
fn test_cli_environment_beats_dotenv() {
    let env = TestEnv::new();
    fs::write(env.temp.path().join(".env"), "TASK_CLI_MODEL_NAME=model-from-dotenv\n").expect("Failed to write .env");

    env.cmd()
        .arg("config")
        .current_dir(env.temp.path())
        .env("TASK_CLI_MODEL_NAME", "model-from-shell")
        .assert()
        .success()
        .stdout(predicate::str::contains("model-from-shell"))
        .stdout(predicate::str::contains("model-from-dotenv").not());
}
