use colored::Colorize;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{OnceLock, RwLock};

/// Message categories used by the CLI output helpers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Warning,
    Error,
    Section,
}

static PLAIN: AtomicBool = AtomicBool::new(false);

/// Turns colour styling off for the rest of the process.
pub fn set_plain(plain: bool) {
    PLAIN.store(plain, Ordering::Relaxed);
}

fn is_plain() -> bool {
    PLAIN.load(Ordering::Relaxed)
}

static CURRENCY: OnceLock<RwLock<String>> = OnceLock::new();

fn currency_lock() -> &'static RwLock<String> {
    CURRENCY.get_or_init(|| RwLock::new(String::new()))
}

/// Currency code appended to formatted amounts.
pub fn set_currency(code: &str) {
    if let Ok(mut guard) = currency_lock().write() {
        *guard = code.trim().to_string();
    }
}

fn currency() -> String {
    currency_lock()
        .read()
        .map(|guard| guard.clone())
        .unwrap_or_default()
}

fn label(kind: MessageKind) -> &'static str {
    match kind {
        MessageKind::Info => "[i]",
        MessageKind::Success => "[ok]",
        MessageKind::Warning => "[!]",
        MessageKind::Error => "[x]",
        MessageKind::Section => "",
    }
}

pub(crate) fn apply_style(kind: MessageKind, message: impl fmt::Display, plain: bool) -> String {
    let text = message.to_string();
    let base = match kind {
        MessageKind::Section => format!("=== {} ===", text.trim()),
        _ => format!("{} {text}", label(kind)),
    };
    if plain {
        return base;
    }
    match kind {
        MessageKind::Success => base.bright_green().to_string(),
        MessageKind::Warning => base.bright_yellow().to_string(),
        MessageKind::Error => base.bright_red().to_string(),
        MessageKind::Section => base.bold().to_string(),
        MessageKind::Info => base,
    }
}

pub fn print(kind: MessageKind, message: impl fmt::Display) {
    let formatted = apply_style(kind, message, is_plain());
    match kind {
        MessageKind::Error => eprintln!("{formatted}"),
        MessageKind::Section => println!("\n{formatted}"),
        _ => println!("{formatted}"),
    }
}

pub fn info(message: impl fmt::Display) {
    print(MessageKind::Info, message);
}

pub fn success(message: impl fmt::Display) {
    print(MessageKind::Success, message);
}

pub fn warning(message: impl fmt::Display) {
    print(MessageKind::Warning, message);
}

pub fn error(message: impl fmt::Display) {
    print(MessageKind::Error, message);
}

pub fn section(title: impl fmt::Display) {
    print(MessageKind::Section, title);
}

pub(crate) fn format_amount(value: f64, currency: &str) -> String {
    if currency.is_empty() {
        format!("{value:.2}")
    } else {
        format!("{value:.2} {currency}")
    }
}

/// Formats an amount with two decimals and the configured currency, marking
/// negatives in red.
pub fn amount(value: f64) -> String {
    let text = format_amount(value, &currency());
    if value < 0.0 && !is_plain() {
        text.red().to_string()
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_style_keeps_labels() {
        assert_eq!(apply_style(MessageKind::Success, "saved", true), "[ok] saved");
        assert_eq!(apply_style(MessageKind::Section, " Budget ", true), "=== Budget ===");
    }

    #[test]
    fn amounts_carry_the_currency_code() {
        assert_eq!(format_amount(12.5, "EUR"), "12.50 EUR");
        assert_eq!(format_amount(-3.0, ""), "-3.00");
    }

    #[test]
    fn coloured_style_wraps_text() {
        colored::control::set_override(true);
        let styled = apply_style(MessageKind::Error, "boom", false);
        assert!(styled.contains("[x] boom"));
        assert_ne!(styled, "[x] boom");
        colored::control::unset_override();
    }
}
