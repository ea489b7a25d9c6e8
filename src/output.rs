//! Terminal output: colored messages, the progress bar and the summary table.
//!
//! Everything the user sees on a normal run goes through [`OutputFormatter`];
//! diagnostics go through `tracing` instead.

use crate::file_organizer::MoveDecision;
use crate::report::{MoveFailure, RunReport};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;

/// Formats and prints user-facing output.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// # Arguments
    ///
    /// * `message` - The message to display
    ///
    /// # Example
    ///
    /// ```no_run
    /// use organizer::output::OutputFormatter;
    /// OutputFormatter::success("Organized 12 files");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red to stderr.
    ///
    /// # Arguments
    ///
    /// * `message` - The message to display
    ///
    /// # Example
    ///
    /// ```no_run
    /// use organizer::output::OutputFormatter;
    /// OutputFormatter::error("Source folder does not exist");
    /// ```
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    ///
    /// # Arguments
    ///
    /// * `message` - The message to display
    ///
    /// # Example
    ///
    /// ```no_run
    /// use organizer::output::OutputFormatter;
    /// OutputFormatter::warning("2 of 10 files could not be organized.");
    /// ```
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Prints a dry-run notice.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }

    /// Renders one decision as `source -> destination [Category]`.
    ///
    /// # Example
    ///
    /// ```
    /// use organizer::file_organizer::MoveDecision;
    /// use organizer::output::OutputFormatter;
    /// use std::path::PathBuf;
    ///
    /// colored::control::set_override(false);
    /// let decision = MoveDecision {
    ///     source: PathBuf::from("in/a.pdf"),
    ///     destination: PathBuf::from("out/Documents/a.pdf"),
    ///     category: "Documents".to_string(),
    ///     simulated: false,
    /// };
    /// assert_eq!(
    ///     OutputFormatter::decision_line(&decision),
    ///     "in/a.pdf -> out/Documents/a.pdf [Documents]"
    /// );
    /// ```
    pub fn decision_line(decision: &MoveDecision) -> String {
        format!(
            "{} -> {} [{}]",
            decision.source.display(),
            decision.destination.display(),
            decision.category.cyan()
        )
    }

    /// Renders one failure as `✗ path: reason`.
    pub fn failure_line(failure: &MoveFailure) -> String {
        format!(
            "{} {}: {}",
            "✗".red(),
            failure.path.display(),
            failure.reason
        )
    }

    /// Creates a progress bar for `total` files.
    ///
    /// The bar draws to stderr and stays invisible when that is not a terminal.
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        pb.set_style(style);
        pb
    }

    /// Prints the per-category summary table.
    ///
    /// # Arguments
    ///
    /// * `category_counts` - Files per category folder, in display order
    /// * `total_files` - Value for the closing `Total` row
    ///
    /// # Example
    ///
    /// ```no_run
    /// use organizer::output::OutputFormatter;
    /// use std::collections::BTreeMap;
    ///
    /// let mut counts = BTreeMap::new();
    /// counts.insert("Documents".to_string(), 3);
    /// counts.insert("Images".to_string(), 1);
    /// OutputFormatter::summary_table(&counts, 4);
    /// ```
    pub fn summary_table(category_counts: &BTreeMap<String, usize>, total_files: usize) {
        Self::header("SUMMARY");

        let width = category_counts
            .keys()
            .map(|name| name.len())
            .max()
            .unwrap_or(0)
            .max("Category".len());

        println!(
            "{:<width$} | {}",
            "Category".bold(),
            "Files".bold(),
            width = width
        );
        println!("{}", "-".repeat(width + 10));
        for (category, count) in category_counts {
            println!(
                "{:<width$} | {} {}",
                category,
                count.to_string().green(),
                plural(*count),
                width = width
            );
        }
        println!("{}", "-".repeat(width + 10));
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total_files.to_string().green().bold(),
            plural(total_files),
            width = width
        );
    }

    /// Prints the closing section of a run: summary, failures and a verdict.
    pub fn report(report: &RunReport) {
        Self::summary_table(&report.summarize(), report.moved.len());

        if report.has_failures() {
            Self::header("FAILURES");
            for failure in &report.failures {
                eprintln!("{}", Self::failure_line(failure));
            }
            Self::warning(&format!(
                "{} of {} files could not be organized.",
                report.failures.len(),
                report.total_processed()
            ));
        } else if report.dry_run {
            Self::dry_run_notice("No files were modified.");
        } else {
            Self::success("Organization complete!");
        }
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_failure_line_mentions_path_and_reason() {
        colored::control::set_override(false);
        let failure = MoveFailure {
            path: PathBuf::from("in/locked.pdf"),
            reason: "Permission denied".to_string(),
            not_found: false,
        };
        assert_eq!(
            OutputFormatter::failure_line(&failure),
            "✗ in/locked.pdf: Permission denied"
        );
    }

    #[test]
    fn test_plural() {
        assert_eq!(plural(0), "files");
        assert_eq!(plural(1), "file");
        assert_eq!(plural(2), "files");
    }

    #[test]
    fn test_progress_bar_length() {
        let pb = OutputFormatter::create_progress_bar(3);
        assert_eq!(pb.length(), Some(3));
    }
}
