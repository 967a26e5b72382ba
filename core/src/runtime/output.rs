/// Log level announced by an interpreter output line prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Plain,
}

impl LogLevel {
    /// Case-insensitive `ERROR:` / `WARN:` / `INFO:` / `DEBUG:` prefix.
    pub fn classify(line: &str) -> Self {
        let starts = |prefix: &str| line.get(..prefix.len()).is_some_and(|p| p.eq_ignore_ascii_case(prefix));
        if starts("ERROR:") {
            LogLevel::Error
        } else if starts("WARN:") {
            LogLevel::Warn
        } else if starts("INFO:") {
            LogLevel::Info
        } else if starts("DEBUG:") {
            LogLevel::Debug
        } else {
            LogLevel::Plain
        }
    }

    fn ansi_color(self) -> Option<&'static str> {
        match self {
            LogLevel::Error => Some("\x1b[31m"),
            LogLevel::Warn => Some("\x1b[33m"),
            LogLevel::Info => Some("\x1b[36m"),
            LogLevel::Debug => Some("\x1b[90m"),
            LogLevel::Plain => None,
        }
    }
}

/// Wraps the line in the ANSI colour of its level.
pub fn style_line(line: &str) -> String {
    match LogLevel::classify(line).ansi_color() {
        Some(color) => format!("{color}{line}\x1b[0m"),
        None => line.to_string(),
    }
}

pub fn exit_message(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("Process exited with code {code}"),
        None => "Process terminated by signal".to_string(),
    }
}
