//! Console clock
//!
//! Sample timestamps and chart windows share one monotonic clock, measured
//! in milliseconds since the console process started.

use std::sync::OnceLock;
use std::time::Instant;

pub fn now_millis() -> f64 {
    static START: OnceLock<Instant> = OnceLock::new();
    START.get_or_init(Instant::now).elapsed().as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_never_goes_backwards() {
        let a = now_millis();
        let b = now_millis();
        assert!(b >= a);
    }
}
