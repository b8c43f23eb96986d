//! CLI integration tests.
//!
//! These tests spawn the actual `school` binary against a data file in a
//! temporary directory, so every command goes through load, mutate and save.

use std::path::PathBuf;
use std::process::{Command, Output};

use speculate2::speculate;
use tempfile::TempDir;

struct SchoolCli {
    dir: TempDir,
    data: PathBuf,
}

impl SchoolCli {
    fn new(file_name: &str) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let data = dir.path().join(file_name);
        Self { dir, data }
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_school"))
            .arg("--data")
            .arg(&self.data)
            .args(args)
            .env("XDG_CONFIG_HOME", self.dir.path())
            .env("XDG_DATA_HOME", self.dir.path())
            .env("HOME", self.dir.path())
            .env_remove("SCHOOL_DATA_FILE")
            .env("RUST_LOG", "off")
            .output()
            .expect("Failed to run school")
    }

    /// Run a command that must succeed and return its stdout.
    fn ok(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            output.status.success(),
            "school {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8(output.stdout).expect("stdout is not UTF-8")
    }

    fn seed(&self) {
        self.ok(&["student", "add", "S001", "--name", "Ana", "--age", "20", "--email", "ana@x.com"]);
        self.ok(&["student", "add", "S002", "--name", "Bob", "--age", "21", "--email", "bob@x.com"]);
        self.ok(&["instructor", "add", "I001", "--name", "Lee", "--age", "45", "--email", "lee@x.com"]);
        self.ok(&["course", "add", "C100", "--name", "Algorithms"]);
    }
}

speculate! {
    before {
        let cli = SchoolCli::new("school_data.json");
    }

    describe "adding records" {
        it "saves and prints the refreshed listing" {
            let stdout = cli.ok(&["student", "add", "S001", "--name", "Ana", "--age", "20", "--email", "ana@x.com"]);

            assert!(stdout.contains("Added student S001"));
            assert!(stdout.contains("Name"));
            assert!(stdout.contains("Ana"));
            assert!(cli.data.exists());
        }

        it "rejects a non-numeric age without touching the file" {
            cli.seed();
            let before = std::fs::read(&cli.data).unwrap();

            let output = cli.run(&["student", "add", "S003", "--name", "Cy", "--age", "abc", "--email", "cy@x.com"]);

            assert!(!output.status.success());
            assert!(String::from_utf8_lossy(&output.stderr).contains("age must be an integer"));
            assert_eq!(std::fs::read(&cli.data).unwrap(), before);
        }

        it "rejects a malformed email" {
            let output = cli.run(&["instructor", "add", "I009", "--name", "Kim", "--age", "50", "--email", "kim"]);

            assert!(!output.status.success());
            assert!(String::from_utf8_lossy(&output.stderr).contains("not a valid email"));
            assert!(!cli.data.exists());
        }
    }

    describe "associations" {
        it "shows enrolled students and the instructor on the roster" {
            cli.seed();
            cli.ok(&["enroll", "S001", "C100"]);
            cli.ok(&["enroll", "S002", "C100"]);
            cli.ok(&["assign", "I001", "C100"]);

            let roster = cli.ok(&["course", "show", "C100"]);
            assert_eq!(
                roster,
                "Algorithms (C100)\n├── Instructor: Lee (I001)\n└── Students\n    ├── Ana (S001)\n    └── Bob (S002)\n"
            );
        }

        it "drops the student from the course when the student is removed" {
            cli.seed();
            cli.ok(&["enroll", "S001", "C100"]);
            cli.ok(&["student", "remove", "S001"]);

            let listing = cli.ok(&["course", "list"]);
            assert!(listing.contains("Instructor: None, Enrolled Students: None"));
        }

        it "rejects an instructor id where a student is expected" {
            cli.seed();
            let output = cli.run(&["enroll", "I001", "C100"]);

            assert!(!output.status.success());
            assert!(String::from_utf8_lossy(&output.stderr).contains("expected student, found instructor"));
        }
    }

    describe "queries" {
        it "searches names case-insensitively" {
            cli.seed();
            let stdout = cli.ok(&["search", "ANA"]);

            assert!(stdout.contains("Ana"));
            assert!(!stdout.contains("Bob"));
        }

        it "introduces a student" {
            cli.seed();
            let stdout = cli.ok(&["introduce", "S001"]);
            assert_eq!(stdout.trim(), "My name is Ana, and I am 20 years old.");
        }

        it "exports every record as CSV" {
            cli.seed();
            cli.ok(&["enroll", "S001", "C100"]);
            let out = cli.dir.path().join("export.csv");

            cli.ok(&["export-csv", "--output", out.to_str().unwrap()]);

            let csv = std::fs::read_to_string(&out).unwrap();
            let mut lines = csv.lines();
            assert_eq!(lines.next(), Some("Name,ID,Type,Details"));
            assert_eq!(lines.next(), Some("Ana,S001,Student,Algorithms"));
            assert_eq!(csv.lines().count(), 5);
        }
    }

    describe "config" {
        it "persists fields given on the command line" {
            let stdout = cli.ok(&["config", "--data-file", "/srv/school.db", "--store-format", "sqlite"]);
            assert!(stdout.contains("Saved"));

            let shown = cli.ok(&["config"]);
            assert!(!shown.contains("Saved"));
            assert!(shown.contains("/srv/school.db"));
            assert!(shown.contains("\"sqlite\""));
        }
    }

    describe "sqlite data file" {
        it "persists across invocations" {
            let cli = SchoolCli::new("school.db");
            cli.seed();
            cli.ok(&["enroll", "S002", "C100"]);

            let stdout = cli.ok(&["student", "show", "S002"]);
            assert!(stdout.contains("Courses: Algorithms"));
        }
    }
}
