// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Synapse Hero Engine - Host Console Logging
//
// Lifecycle events only; nothing here runs per frame.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    fn log(s: &str);
}

#[cfg(not(target_arch = "wasm32"))]
fn log(s: &str) {
    eprintln!("{}", s);
}

pub(crate) fn event_line(message: &str) -> String {
    format!("[synapse] {}", message)
}

pub(crate) fn emit(message: &str) {
    log(&event_line(message));
}

/// `console_log!(enabled, "fmt", args..)` writes one line when `enabled`.
macro_rules! console_log {
    ($enabled:expr, $($arg:tt)*) => {
        if $enabled {
            $crate::logging::emit(&format!($($arg)*));
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_line_prefix() {
        assert_eq!(event_line("field ready"), "[synapse] field ready");
    }
}
