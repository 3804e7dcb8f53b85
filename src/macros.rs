// SPDX-License-Identifier: Apache-2.0 OR MIT
// Formatting macros; arguments are only formatted when the severity passes

/// Log a formatted message with dump severity
///
/// # Examples
/// ```ignore
/// log_dump!(logger, "request body: {:?}", body);
/// ```
#[macro_export]
macro_rules! log_dump {
    ($logger:expr, $($arg:tt)+) => {
        $logger.log_fmt($crate::Severity::Dump, format_args!($($arg)+))
    };
}

/// Log a formatted message with debug severity
///
/// # Examples
/// ```ignore
/// log_debug!(logger, "cache miss for {}", key);
/// ```
#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($arg:tt)+) => {
        $logger.log_fmt($crate::Severity::Debug, format_args!($($arg)+))
    };
}

/// Log a formatted message with info severity
///
/// # Examples
/// ```ignore
/// log_info!(logger, "listening on {}", addr);
/// ```
#[macro_export]
macro_rules! log_info {
    ($logger:expr, $($arg:tt)+) => {
        $logger.log_fmt($crate::Severity::Info, format_args!($($arg)+))
    };
}

/// Log a formatted message with warning severity
///
/// # Examples
/// ```ignore
/// log_warn!(logger, "retrying in {}s", delay);
/// ```
#[macro_export]
macro_rules! log_warn {
    ($logger:expr, $($arg:tt)+) => {
        $logger.log_fmt($crate::Severity::Warn, format_args!($($arg)+))
    };
}

/// Log a formatted message with error severity
///
/// # Examples
/// ```ignore
/// log_error!(logger, "request failed: {}", err);
/// ```
#[macro_export]
macro_rules! log_error {
    ($logger:expr, $($arg:tt)+) => {
        $logger.log_fmt($crate::Severity::Error, format_args!($($arg)+))
    };
}
