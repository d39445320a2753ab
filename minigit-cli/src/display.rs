use colored::Colorize;
use minigit_core::{CommitLog, StatusReport};
use std::io::{self, Write};

const SEPARATOR_WIDTH: usize = 40;

pub const HELP: &str = "
Available commands:
  init                 Initialize a new Mini Git repo
  add <filename>       Add a file to staging area
  commit <message>     Commit staged changes with a message
  log                  Show commit history
  status               Show status of working directory
  help                 Show this help message
";

/// Newest commit first; numbering counts from the oldest commit.
pub fn write_history<W: Write>(out: &mut W, log: &CommitLog) -> io::Result<()> {
    if log.is_empty() {
        writeln!(out, "{}", "No commits found.".yellow())?;
        return Ok(());
    }

    for entry in log.history() {
        let record = entry.record;
        writeln!(
            out,
            "{} {}",
            format!("Commit {}:", entry.number).bold(),
            record.id.yellow()
        )?;
        writeln!(out, "Message   : {}", record.message)?;
        writeln!(out, "Timestamp : {}", record.timestamp)?;
        writeln!(out, "Files     : {}", record.files_joined())?;
        writeln!(out, "{}", "-".repeat(SEPARATOR_WIDTH).bright_black())?;
    }

    Ok(())
}

/// The first three sections always print; "Deleted files" only when
/// something was deleted.
pub fn write_status<W: Write>(out: &mut W, report: &StatusReport) -> io::Result<()> {
    write_section(out, "Staged for commit", &report.staged, |s| s.green())?;
    write_section(out, "Modified but not staged", &report.modified, |s| {
        s.yellow()
    })?;
    write_section(out, "Untracked files", &report.untracked, |s| s.red())?;

    if !report.deleted.is_empty() {
        write_section(out, "Deleted files", &report.deleted, |s| s.red())?;
    }

    Ok(())
}

fn write_section<W, F>(out: &mut W, title: &str, names: &[String], paint: F) -> io::Result<()>
where
    W: Write,
    F: Fn(&str) -> colored::ColoredString,
{
    writeln!(out)?;
    writeln!(out, "{}", format!("=== {} ===", title).bold())?;
    for name in names {
        writeln!(out, "  {}", paint(name))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use minigit_core::CommitRecord;
    use similar_asserts::assert_eq;

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> io::Result<()>,
    {
        colored::control::set_override(false);
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn record(message: &str, second: u32, files: &[&str]) -> CommitRecord {
        let at = NaiveDate::from_ymd_opt(2024, 2, 29)
            .unwrap()
            .and_hms_opt(12, 0, second)
            .unwrap();
        CommitRecord::new(message, at, files.iter().map(|f| f.to_string()).collect())
    }

    #[test]
    fn test_empty_history() {
        let output = render(|out| write_history(out, &CommitLog::new()));
        assert_eq!(output.as_str(), "No commits found.\n");
    }

    #[test]
    fn test_history_layout() {
        let mut log = CommitLog::new();
        log.push(record("first", 1, &["a.txt"]));
        log.push(record("second", 2, &["a.txt", "b.txt"]));

        let output = render(|out| write_history(out, &log));

        let expected = "\
Commit 2: commit_20240229120002
Message   : second
Timestamp : 2024-02-29 12:00:02
Files     : a.txt, b.txt
----------------------------------------
Commit 1: commit_20240229120001
Message   : first
Timestamp : 2024-02-29 12:00:01
Files     : a.txt
----------------------------------------
";
        assert_eq!(output.as_str(), expected);
    }

    #[test]
    fn test_status_without_deletions() {
        let report = StatusReport {
            staged: vec!["a.txt".to_string()],
            modified: vec![],
            untracked: vec!["b.txt".to_string(), "c.txt".to_string()],
            deleted: vec![],
        };

        let output = render(|out| write_status(out, &report));

        let expected = "
=== Staged for commit ===
  a.txt

=== Modified but not staged ===

=== Untracked files ===
  b.txt
  c.txt
";
        assert_eq!(output.as_str(), expected);
    }

    #[test]
    fn test_status_with_deletions() {
        let report = StatusReport {
            deleted: vec!["gone.txt".to_string()],
            ..StatusReport::default()
        };

        let output = render(|out| write_status(out, &report));

        assert!(output.ends_with("\n=== Deleted files ===\n  gone.txt\n"));
    }
}
