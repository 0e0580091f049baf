//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use parley_core::Message;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    /// Print a single message in full
    pub fn print_message(&self, message: &Message) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:      {}", message.id);
                println!("From:    {}", message.author.name);
                println!(
                    "Sent:    {}",
                    message.created_at.format("%Y-%m-%d %H:%M:%S")
                );
                if let Some(ref text) = message.text {
                    println!("Text:    {}", text);
                }
                if let Some(ref image) = message.image {
                    println!("Image:   {}", image);
                }
                if let Some(ref location) = message.location {
                    println!(
                        "Location: {:.4}, {:.4}",
                        location.latitude, location.longitude
                    );
                }
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(message).unwrap());
            }
            OutputFormat::Quiet => {
                println!("{}", message.id);
            }
        }
    }

    /// Print a list of messages, newest first
    pub fn print_messages(&self, messages: &[Message]) {
        match self.format {
            OutputFormat::Human => {
                if messages.is_empty() {
                    println!("No messages.");
                    return;
                }
                for message in messages {
                    println!(
                        "{} | {} | {}: {}",
                        &message.id.to_string()[..8],
                        message.created_at.format("%Y-%m-%d %H:%M"),
                        message.author.name,
                        truncate(&payload(message), 60)
                    );
                }
                println!("\n{} message(s)", messages.len());
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(messages).unwrap());
            }
            OutputFormat::Quiet => {
                for message in messages {
                    println!("{}", message.id);
                }
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

/// One-line rendering of a message payload
pub fn payload(message: &Message) -> String {
    let mut parts = Vec::new();
    if let Some(ref text) = message.text {
        parts.push(text.clone());
    }
    if let Some(ref image) = message.image {
        parts.push(format!("[image {}]", image));
    }
    if let Some(ref location) = message.location {
        parts.push(format!(
            "[location {:.4}, {:.4}]",
            location.latitude, location.longitude
        ));
    }
    parts.join(" ")
}

/// Truncate a string to max length, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", &s[..max_len - 3])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::{Author, Draft};

    #[test]
    fn test_format_from_flags() {
        assert_eq!(OutputFormat::from_flags(false, false), OutputFormat::Human);
        assert_eq!(OutputFormat::from_flags(true, false), OutputFormat::Json);
        assert_eq!(OutputFormat::from_flags(false, true), OutputFormat::Quiet);
        // Quiet takes precedence
        assert_eq!(OutputFormat::from_flags(true, true), OutputFormat::Quiet);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("this is a long string", 10), "this is...");
    }

    #[test]
    fn test_payload_rendering() {
        let author = Author::new("u1", "Alice");

        let text = Draft::text("hello").into_message(author.clone());
        assert_eq!(payload(&text), "hello");

        let image = Draft::image("https://example.com/a.png").into_message(author.clone());
        assert_eq!(payload(&image), "[image https://example.com/a.png]");

        let location = Draft::location(48.8584, 2.2945).into_message(author);
        assert_eq!(payload(&location), "[location 48.8584, 2.2945]");
    }
}
