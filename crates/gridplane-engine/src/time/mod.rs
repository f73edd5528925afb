//! Time subsystem.
//!
//! Provides the fixed-rate redraw schedule without coupling to the runtime.
//! Intended usage:
//! - the runtime owns one `RedrawClock` and sleeps until its deadline
//! - call `tick()` once per redraw to obtain `FrameTick`

mod redraw_clock;

pub use redraw_clock::{FrameTick, RedrawClock};
