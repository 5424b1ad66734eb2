use chrono::{DateTime, Utc};
use colored::Colorize;
use pastebox::commands::{CmdMessage, MessageLevel, ServedFile};
use pastebox::config::{PasteboxConfig, KEYS};
use pastebox::model::{Paste, PasteSummary};
use timeago::Formatter;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const LINE_WIDTH: usize = 100;
const ID_WIDTH: usize = 24;
const TIME_WIDTH: usize = 14;
const PUBLIC_MARKER: &str = "●";

pub(super) fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => println!("{}", message.content.red()),
        }
    }
}

pub(super) fn print_list(pastes: &[PasteSummary]) {
    if pastes.is_empty() {
        println!("No pastes found.");
        return;
    }

    for summary in pastes {
        let marker = if summary.public {
            format!("{} ", PUBLIC_MARKER.green())
        } else {
            "  ".to_string()
        };
        let id = truncate_to_width(&summary.id, ID_WIDTH);
        let id_padding = ID_WIDTH.saturating_sub(id.width());

        let mut title = summary.title.clone();
        if summary.file_count > 0 {
            title.push_str(&format!(" [{}]", summary.file_count));
        }
        let available = LINE_WIDTH.saturating_sub(2 + ID_WIDTH + 1 + TIME_WIDTH);
        let title_display = truncate_to_width(&title, available);
        let padding = available.saturating_sub(title_display.width());

        let updated = if summary.updated_at.timestamp() > 0 {
            summary.updated_at
        } else {
            summary.created_at
        };

        println!(
            "{}{}{} {}{}{}",
            marker,
            id.yellow(),
            " ".repeat(id_padding),
            title_display,
            " ".repeat(padding),
            format_time_ago(updated).dimmed()
        );
    }
}

pub(super) fn print_paste(paste: &Paste, url: Option<&str>) {
    println!("{} {}", paste.id.yellow(), paste.meta.title.bold());
    if let Some(url) = url {
        println!("{}", url.dimmed());
    }
    println!("--------------------------------");
    if !paste.meta.description.is_empty() {
        println!("{}", paste.meta.description);
    }
    println!(
        "by {}, {}, {}",
        paste.meta.author,
        if paste.meta.public { "public" } else { "private" },
        paste.meta.display_mode.as_str()
    );
    if !paste.meta.aliases.is_empty() {
        println!("aliases: {}", paste.meta.aliases.join(", "));
    }
    for (name, entry) in &paste.meta.files {
        let flags = if entry.hidden { " (hidden)" } else { "" };
        println!(
            "  {} {}{}",
            name,
            format!("{}/{}", entry.render, entry.file_type).dimmed(),
            flags
        );
    }
}

pub(super) fn print_served(served: &ServedFile) {
    println!("{}", served.path.display());
    let disposition = if served.attachment { "attachment" } else { "inline" };
    println!("{}", format!("{} ({})", served.mime, disposition).dimmed());
}

pub(super) fn print_config(config: &PasteboxConfig) {
    for key in KEYS {
        let value = config.get(key).unwrap_or_default();
        println!("{} = {}", key.yellow(), value);
    }
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    let mut result = String::new();
    let mut current_width = 0;

    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }

    result
}

fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);
    let time_str = Formatter::new().convert(duration.to_std().unwrap_or_default());
    format!("{:>width$}", time_str, width = TIME_WIDTH)
}
