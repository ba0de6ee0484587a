//! Colored output helpers for CLI
//!
//! Every line printed by the `ragline` binary goes through [`Output`], so the
//! `--no-color` flag switches the whole interface to plain bracketed tags.

use owo_colors::OwoColorize;

use crate::types::{CollectionInfo, IngestReport, SearchResult};

/// Longest chunk excerpt printed for a search hit
const EXCERPT_CHARS: usize = 240;

/// Output style configuration
pub struct Output {
    /// Whether to use colored output
    pub colored: bool,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    /// Create a new output helper with colors enabled
    pub fn new() -> Self {
        Self { colored: true }
    }

    /// Create a new output helper with colors disabled
    pub fn no_color() -> Self {
        Self { colored: false }
    }

    pub fn banner(&self) {
        let version = format!("v{}", env!("CARGO_PKG_VERSION"));
        if self.colored {
            println!(
                "\n   {} {}\n   {}\n",
                "ragline".bright_cyan().bold(),
                version.dimmed(),
                "retrieval-augmented answers over your documents".bright_white()
            );
        } else {
            println!(
                "\n   ragline {}\n   retrieval-augmented answers over your documents\n",
                version
            );
        }
    }

    /// Print a success message with a checkmark
    pub fn success(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "✓".green().bold(), message.green());
        } else {
            println!("  [OK] {}", message);
        }
    }

    pub fn info(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "•".blue(), message);
        } else {
            println!("  [INFO] {}", message);
        }
    }

    pub fn warning(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "⚠".yellow().bold(), message.yellow());
        } else {
            println!("  [WARN] {}", message);
        }
    }

    /// Print an error message to stderr
    pub fn error(&self, message: &str) {
        if self.colored {
            eprintln!("  {} {}", "✗".red().bold(), message.red());
        } else {
            eprintln!("  [ERROR] {}", message);
        }
    }

    /// Print a file creation message
    pub fn created(&self, file_type: &str, path: &str) {
        if self.colored {
            println!(
                "  {} {} {}",
                "✓".green().bold(),
                file_type.dimmed(),
                path.bright_white()
            );
        } else {
            println!("  [CREATED] {} {}", file_type, path);
        }
    }

    /// Print a file skipped message
    pub fn skipped(&self, path: &str, reason: &str) {
        if self.colored {
            println!(
                "  {} {} {}",
                "○".yellow(),
                path.dimmed(),
                format!("({})", reason).yellow()
            );
        } else {
            println!("  [SKIPPED] {} ({})", path, reason);
        }
    }

    pub fn header(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.bright_white().bold().underline());
        } else {
            println!("\n  === {} ===", title);
        }
    }

    pub fn subheader(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.cyan().bold());
        } else {
            println!("\n  --- {} ---", title);
        }
    }

    /// Print a key-value pair
    pub fn kv(&self, key: &str, value: &str) {
        if self.colored {
            println!("    {}: {}", key.dimmed(), value.bright_white());
        } else {
            println!("    {}: {}", key, value);
        }
    }

    pub fn list_item(&self, item: &str) {
        if self.colored {
            println!("    {} {}", "•".blue(), item);
        } else {
            println!("    - {}", item);
        }
    }

    /// Print a hint/tip message
    pub fn hint(&self, message: &str) {
        if self.colored {
            println!("\n  {} {}", "💡".dimmed(), message.dimmed().italic());
        } else {
            println!("\n  [TIP] {}", message);
        }
    }

    /// Print a command suggestion
    pub fn command(&self, cmd: &str) {
        if self.colored {
            println!("     {}", format!("$ {}", cmd).bright_cyan());
        } else {
            println!("     $ {}", cmd);
        }
    }

    pub fn complete(&self, message: &str) {
        if self.colored {
            println!("\n  {} {}", "🚀".green(), message.bright_green().bold());
        } else {
            println!("\n  [DONE] {}", message);
        }
    }

    /// Print one ranked search hit with its source and an excerpt
    pub fn search_result(&self, rank: usize, result: &SearchResult) {
        let source = result
            .metadata
            .get("source")
            .and_then(|v| v.as_str())
            .unwrap_or("inline text");
        let heading = format!("#{} {}", rank, source);
        let score = format!("score {:.3}", result.score);

        if self.colored {
            println!("\n  {} {}", heading.bright_white().bold(), score.dimmed());
        } else {
            println!("\n  {} ({})", heading, score);
        }
        println!("    {}", excerpt(&result.text, EXCERPT_CHARS));
    }

    /// Print the counters of an ingest run
    pub fn ingest_report(&self, report: &IngestReport) {
        self.kv("files processed", &report.files_processed.to_string());
        self.kv("files failed", &report.files_failed.to_string());
        self.kv("texts processed", &report.texts_processed.to_string());
        self.kv("chunks ingested", &report.chunks_ingested.to_string());
    }

    pub fn collection_info(&self, info: &CollectionInfo) {
        self.kv("collection", &info.name);
        self.kv("status", &info.status);
        self.kv("points", &info.points_count.to_string());
        self.kv("indexed vectors", &info.vectors_count.to_string());
    }

    /// Print a block of free text, such as a generated answer
    pub fn paragraph(&self, text: &str) {
        for line in text.lines() {
            println!("    {}", line);
        }
    }

    pub fn newline(&self) {
        println!();
    }
}

/// Collapse whitespace and cut `text` to at most `max_chars` characters.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let cut: String = flat.chars().take(max_chars).collect();
    format!("{}...", cut.trim_end())
}
