//! Formatted tensorgrab output.

use std::fmt;

use log;

const TENSORGRAB_BANNER_LENGTH: usize = 89;

/// Logs a warning to the `tensorgrab-output` logger.
macro_rules! tensorgrab_warn {
    ($fmt:expr $(, $($arg:tt)*)?) => { log::warn!(target: "tensorgrab-output", $fmt, $($($arg)*)?); }
}

/// Logs a main output line to the `tensorgrab-output` logger.
macro_rules! tensorgrab_output {
    ($fmt:expr $(, $($arg:tt)*)?) => { log::info!(target: "tensorgrab-output", $fmt, $($($arg)*)?); }
}

pub(crate) use {tensorgrab_output, tensorgrab_warn};

/// Logs a boxed section title to the `tensorgrab-output` logger.
pub(crate) fn log_title(title: &str) {
    let length = title.chars().count().max(TENSORGRAB_BANNER_LENGTH - 6);
    let bar = "─".repeat(length);
    tensorgrab_output!("┌──{bar}──┐");
    tensorgrab_output!("│§ {title:^length$} §│");
    tensorgrab_output!("└──{bar}──┘");
}

/// Logs an underlined subtitle to the `tensorgrab-output` logger.
pub(crate) fn log_subtitle(subtitle: &str) {
    let bar = "═".repeat(subtitle.chars().count());
    tensorgrab_output!("{subtitle}");
    tensorgrab_output!("{bar}");
}

/// Turns a boolean into a string of `yes` or `no`.
pub(crate) fn nice_bool(b: bool) -> String {
    if b {
        "yes".to_string()
    } else {
        "no".to_string()
    }
}

/// A trait for logging multi-line displayable structures line by line to the
/// `tensorgrab-output` logger.
pub(crate) trait TensorGrabOutput: fmt::Display {
    fn log_output_display(&self) {
        self.to_string().lines().for_each(|line| {
            tensorgrab_output!("{line}");
        })
    }
}

impl<T> TensorGrabOutput for T where T: fmt::Display {}
