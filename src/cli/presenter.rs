//! CLI presenter for output formatting

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::domain::classification::{Label, Verdict};

/// Presenter for CLI output formatting
pub struct Presenter {
    spinner: Option<ProgressBar>,
    is_spinner_active: Arc<AtomicBool>,
}

impl Presenter {
    /// Create a new presenter
    pub fn new() -> Self {
        Self {
            spinner: None,
            is_spinner_active: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Start a spinner with message
    pub fn start_spinner(&mut self, message: &str) {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
                .template("{spinner:.cyan} {msg}")
                .unwrap(),
        );
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        self.spinner = Some(spinner);
        self.is_spinner_active.store(true, Ordering::SeqCst);
    }

    /// Update spinner message
    pub fn update_spinner(&self, message: &str) {
        if let Some(ref spinner) = self.spinner {
            spinner.set_message(message.to_string());
        }
    }

    /// Mark spinner as success and finish
    pub fn spinner_success(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_with_message(format!("{} {}", "✓".green(), message));
        }
        self.is_spinner_active.store(false, Ordering::SeqCst);
    }

    /// Mark spinner as failed and finish
    pub fn spinner_fail(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_with_message(format!("{} {}", "✗".red(), message));
        }
        self.is_spinner_active.store(false, Ordering::SeqCst);
    }

    /// Stop spinner without status
    pub fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
        self.is_spinner_active.store(false, Ordering::SeqCst);
    }

    /// Print info message to stderr
    pub fn info(&self, message: &str) {
        eprintln!("{} {}", "ℹ".cyan(), message);
    }

    /// Print success message to stderr
    pub fn success(&self, message: &str) {
        eprintln!("{} {}", "✓".green(), message);
    }

    /// Print warning message to stderr
    pub fn warn(&self, message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print error message to stderr
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Output text to stdout (the actual result output)
    pub fn output(&self, text: &str) {
        println!("{}", text);
    }

    /// Render a verdict report to stdout
    pub fn verdict(&self, verdict: &Verdict) {
        let label_text = verdict.label().to_string();
        let label = match verdict.label() {
            Label::HateSpeech => label_text.red().bold(),
            Label::OffensiveLanguage => label_text.yellow().bold(),
            Label::NormalSpeech => label_text.green().bold(),
        };

        println!(
            "{} ({:.1}% confidence)",
            label,
            verdict.confidence() * 100.0
        );
        println!("{}", verdict.explanation());

        if let Some(transcription) = verdict.transcription() {
            println!();
            println!("{} {}", "Transcript:".cyan(), transcription);
        }
    }

    /// Format elapsed time and input level for the recording line
    pub fn format_level(&self, elapsed_ms: u64, level: f32) -> String {
        let secs = elapsed_ms / 1000;
        let tenths = (elapsed_ms % 1000) / 100;

        // Speech RMS rarely exceeds a third of full scale
        let scaled = (level * 3.0).clamp(0.0, 1.0);

        let bar_width = 16;
        let filled = ((scaled * bar_width as f32) as usize).min(bar_width);
        let empty = bar_width - filled;

        format!(
            "{}.{}s [{}{}]",
            secs,
            tenths,
            "█".repeat(filled).cyan(),
            "░".repeat(empty)
        )
    }

    /// Update the recording line with elapsed time, level and the
    /// provisional transcript tail
    pub fn update_recording(&self, elapsed_ms: u64, level: f32, transcript: Option<&str>) {
        let line = match transcript {
            Some(t) if !t.is_empty() => format!(
                "Recording... {}  {}",
                self.format_level(elapsed_ms, level),
                Self::transcript_tail(t, 48).dimmed()
            ),
            _ => format!("Recording... {}", self.format_level(elapsed_ms, level)),
        };
        self.update_spinner(&line);
    }

    /// Last `max_chars` characters of a transcript
    fn transcript_tail(text: &str, max_chars: usize) -> String {
        let count = text.chars().count();
        if count <= max_chars {
            return text.to_string();
        }
        let tail: String = text.chars().skip(count - max_chars).collect();
        format!("...{}", tail)
    }

    /// Print a key-value pair (for config list)
    pub fn key_value(&self, key: &str, value: &str) {
        println!("{}: {}", key.cyan(), value);
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_level_at_start() {
        let presenter = Presenter::new();
        let line = presenter.format_level(0, 0.0);
        assert!(line.contains("0.0s"));
        assert!(line.contains("░"));
        assert!(!line.contains("█"));
    }

    #[test]
    fn format_level_with_loud_input() {
        let presenter = Presenter::new();
        let line = presenter.format_level(2500, 1.0);
        assert!(line.contains("2.5s"));
        assert!(line.contains("█"));
        assert!(!line.contains("░"));
    }

    #[test]
    fn transcript_tail_short_text_is_unchanged() {
        assert_eq!(Presenter::transcript_tail("hello", 48), "hello");
    }

    #[test]
    fn transcript_tail_long_text_keeps_the_end() {
        let text = "a".repeat(40) + " the end";
        let tail = Presenter::transcript_tail(&text, 10);
        assert!(tail.starts_with("..."));
        assert!(tail.ends_with("the end"));
    }
}
