use assert_cmd::Command;
use predicates::str::contains;
use serde_json::Value;
use tempfile::TempDir;

struct Harness {
    dir: TempDir,
}

impl Harness {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("tally_cli").unwrap();
        cmd.env_remove("TALLY_DATA_DIR")
            .env_remove("RUST_LOG")
            .arg("--plain")
            .arg("--config")
            .arg(self.dir.path().join("config.json"))
            .arg("--data-dir")
            .arg(self.dir.path().join("data"));
        cmd
    }

    fn json(&self, args: &[&str]) -> Value {
        let output = self.cmd().arg("--json").args(args).output().unwrap();
        assert!(
            output.status.success(),
            "{args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).unwrap()
    }

    fn register(&self, email: &str, trial: bool) -> String {
        let mut args = vec!["user", "create", "--email", email, "--name", "Test"];
        if trial {
            args.push("--trial");
        }
        self.json(&args)["id"].as_str().unwrap().to_string()
    }
}

#[test]
fn version_prints_build_summary() {
    Harness::new()
        .cmd()
        .arg("version")
        .assert()
        .success()
        .stdout(contains("tally "));
}

#[test]
fn features_marks_pro_only_entries() {
    Harness::new()
        .cmd()
        .arg("features")
        .assert()
        .success()
        .stdout(contains("budget_sharing"))
        .stdout(contains("(pro)"));
}

#[test]
fn anonymous_session_is_unauthorized() {
    Harness::new()
        .cmd()
        .args(["budget", "list"])
        .assert()
        .code(2)
        .stderr(contains("Unauthorized"));
}

#[test]
fn trial_user_reports_trial_status() {
    let h = Harness::new();
    let user = h.register("trial@example.com", true);

    let account = h.json(&["--user", &user, "user", "status"]);
    assert_eq!(account["status"], "trial");
    assert_eq!(account["entitled_plan"], "pro");
    assert_eq!(account["days_left"], 14);
}

#[test]
fn free_user_cannot_open_second_budget() {
    let h = Harness::new();
    let user = h.register("free@example.com", false);

    h.json(&["--user", &user, "budget", "create", "--name", "Home"]);
    h.cmd()
        .args(["--user", &user, "budget", "create", "--name", "Holiday"])
        .assert()
        .code(1)
        .stderr(contains("requires the pro plan"));
}

#[test]
fn reconcile_persists_totals() {
    let h = Harness::new();
    let user = h.register("flow@example.com", true);

    let budget = h.json(&[
        "--user", &user, "budget", "create", "--name", "Home", "--income", "1000",
    ]);
    let budget_id = budget["id"].as_str().unwrap().to_string();

    let section = h.json(&[
        "--user", &user, "section", "add", "--budget", &budget_id, "--name", "Bills",
    ]);
    let section_id = section.as_str().unwrap().to_string();

    h.json(&[
        "--user", &user, "category", "add", "--budget", &budget_id, "--section", &section_id,
        "--name", "Rent", "--budgeted", "400",
    ]);

    let outcome = h.json(&["--user", &user, "budget", "reconcile", "--budget", &budget_id]);
    assert_eq!(outcome["total_budgeted"].as_f64(), Some(400.0));
    assert_eq!(outcome["categories"].as_array().map(Vec::len), Some(1));

    let stored = h.json(&["--user", &user, "budget", "show"]);
    assert_eq!(stored["totals"]["total_available"].as_f64(), Some(600.0));
}

#[test]
fn unknown_budget_exits_with_not_found_code() {
    let h = Harness::new();
    let user = h.register("missing@example.com", false);

    h.cmd()
        .args(["--user", &user, "budget", "show", "--budget"])
        .arg(uuid::Uuid::new_v4().to_string())
        .assert()
        .code(3)
        .stderr(contains("Budget not found"));
}

#[test]
fn notices_json_keeps_notice_fields() {
    let h = Harness::new();
    let user = h.register("notices@example.com", true);

    let budget = h.json(&["--user", &user, "budget", "create", "--name", "Home", "--income", "100"]);
    let budget_id = budget["id"].as_str().unwrap().to_string();
    let section = h.json(&[
        "--user", &user, "section", "add", "--budget", &budget_id, "--name", "Food",
    ]);
    let section_id = section.as_str().unwrap().to_string();
    let category = h.json(&[
        "--user", &user, "category", "add", "--budget", &budget_id, "--section", &section_id,
        "--name", "Takeaway", "--budgeted", "10",
    ]);
    let category_id = category.as_str().unwrap().to_string();
    h.json(&[
        "--user", &user, "category", "spend", "--budget", &budget_id, "--category", &category_id,
        "--amount", "25",
    ]);
    h.json(&[
        "--user", &user, "category", "rename", "--budget", &budget_id, "--category",
        &category_id, "--name", "Delivery",
    ]);

    let notices = h.json(&["--user", &user, "notices"]);
    let notices = notices.as_array().unwrap();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0]["kind"], "category_overspent");
    assert_eq!(notices[0]["name"], "Delivery");
    assert_eq!(notices[0]["over_by"].as_f64(), Some(15.0));
}
