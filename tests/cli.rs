use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("score.pdf"), b"%PDF-1.4").unwrap();
        Self { dir }
    }

    fn data_dir(&self) -> std::path::PathBuf {
        self.dir.path().join("data")
    }

    fn score(&self) -> String {
        self.dir.path().join("score.pdf").display().to_string()
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("scorebook").unwrap();
        cmd.env("SCOREBOOK_DATA_DIR", self.data_dir())
            .env("XDG_CONFIG_HOME", self.dir.path().join("config"))
            .env("HOME", self.dir.path())
            .env_remove("RUST_LOG");
        cmd
    }

    fn add(&self, title: &str, public: bool) {
        let score = self.score();
        let mut cmd = self.cmd();
        cmd.args([
            "add",
            "--title",
            title,
            "--composer",
            "Arcadelt",
            "--tags",
            "Latin, latin",
            "--file",
            &score,
        ]);
        if public {
            cmd.arg("--public");
        }
        cmd.assert()
            .success()
            .stdout(predicate::str::contains(format!("Successfully added '{}'", title)));
    }
}

#[test]
fn add_list_and_show() {
    let ws = Workspace::new();
    ws.add("Ave Maria", true);
    assert!(Path::new(&ws.data_dir().join("sheets.json")).exists());

    ws.cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Ave Maria  ave-maria"))
        .stdout(predicate::str::contains("Page 1 of 1 (1 sheet)"));

    ws.cmd()
        .args(["show", "ave-maria"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Arcadelt"))
        .stdout(predicate::str::contains("Tags:           Latin\n"));
}

#[test]
fn no_subcommand_lists() {
    let ws = Workspace::new();
    ws.cmd()
        .assert()
        .success()
        .stdout(predicate::str::contains("No sheets found."));
}

#[test]
fn same_title_gets_a_numbered_slug() {
    let ws = Workspace::new();
    ws.add("Ave Maria", true);
    ws.add("Ave Maria", true);

    ws.cmd()
        .args(["show", "ave-maria-2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ave-maria-2"));
}

#[test]
fn rejected_form_lists_each_field() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["add", "--composer", "Arcadelt", "--cast", "XYZ"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error: the sheet was not saved"))
        .stderr(predicate::str::contains("title: This field is required."))
        .stderr(predicate::str::contains("cast: Select a valid choice."))
        .stderr(predicate::str::contains("sheet_file: This field is required."));
}

#[test]
fn unknown_slug_fails() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["show", "nope"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error: No sheet with slug 'nope'"));
}

#[test]
fn unknown_filter_code_fails() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["list", "--cast", "NOPE"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid query"));
}

#[test]
fn edit_keeps_slug_then_delete() {
    let ws = Workspace::new();
    ws.add("Ave Maria", true);

    ws.cmd()
        .args(["edit", "ave-maria", "--title", "Ave Maria II", "--tags", ""])
        .assert()
        .success()
        .stdout(predicate::str::contains("Successfully updated 'Ave Maria II'"));

    ws.cmd()
        .args(["show", "ave-maria"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ave Maria II"))
        .stdout(predicate::str::contains("Tags:").not());

    ws.cmd()
        .args(["delete", "ave-maria"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Successfully deleted 'Ave Maria II'"));

    ws.cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No sheets found."));
}

#[test]
fn members_cannot_see_private_sheets() {
    let ws = Workspace::new();
    ws.add("Secret Motet", false);

    ws.cmd()
        .args(["--as-user", "petr", "show", "secret-motet"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Permission denied"));

    ws.cmd()
        .args(["--as-user", "jana", "--groups", "editors", "show", "secret-motet"])
        .assert()
        .success()
        .stdout(predicate::str::contains("private"));

    ws.cmd()
        .args(["--as-user", "petr", "tags"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No tags yet."));
}

#[test]
fn codes_and_tags() {
    let ws = Workspace::new();
    ws.add("Ave Maria", true);

    ws.cmd()
        .arg("codes")
        .assert()
        .success()
        .stdout(predicate::str::contains("SATB"))
        .stdout(predicate::str::contains("liturgical_use"));

    ws.cmd()
        .arg("tags")
        .assert()
        .success()
        .stdout(predicate::str::contains("1  Latin"));
}
