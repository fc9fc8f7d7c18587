//! Utilities for logging messages from the library.

use once_cell::sync::Lazy;

#[doc(hidden)]
#[macro_export]
macro_rules! minisvg_log {
    (
        $session:expr,
        $($arg:tt)+
    ) => {
        if $session.log_enabled() {
            println!("{}", format_args!($($arg)+));
        }
    };
}

/// Whether the `MINISVG_LOG` environment variable was set when the library first looked.
pub fn log_enabled() -> bool {
    static ENABLED: Lazy<bool> = Lazy::new(|| ::std::env::var_os("MINISVG_LOG").is_some());

    *ENABLED
}
