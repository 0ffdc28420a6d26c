//! Convenience macros

/// Write a formatted line to a logger.
///
/// ```no_run
/// # let logger = fanlog::Logger::new();
/// fanlog::logline!(logger, "worker {} started", 3);
/// ```
#[macro_export]
macro_rules! logline {
    ($logger:expr, $($arg:tt)+) => {
        $logger.write_line(format!($($arg)+))
    };
}

/// Write a formatted line with a one-shot format override.
///
/// ```no_run
/// use fanlog::{FormatInfo, LogColor};
/// # let logger = fanlog::Logger::new();
/// let red = FormatInfo::new().with_fore_color(LogColor::Red);
/// fanlog::logline_with!(logger, red, "worker {} crashed", 3);
/// ```
#[macro_export]
macro_rules! logline_with {
    ($logger:expr, $format:expr, $($arg:tt)+) => {
        $logger.write_line_with($format, format!($($arg)+))
    };
}
