// logwhence - platform/stack.rs
//
// Live call-stack capture for the current thread.
//
// Uses the `backtrace` crate to walk and symbolize frames. Inlined functions
// appear as their own logical frames, innermost first. Frames whose symbol
// cannot be resolved (stripped binaries, foreign code without debug info)
// are dropped, as is the stack-walker's own leading run of frames, so the
// first frame returned is the caller of `capture`'s machinery.

use crate::core::locator::StackSource;
use crate::core::model::StackFrame;
use crate::util::constants::BACKTRACE_FRAME_PREFIX;

/// Captures the calling thread's stack on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiveStack;

impl StackSource for LiveStack {
    #[inline(never)]
    fn capture(&self) -> Vec<StackFrame> {
        let mut frames = Vec::new();
        backtrace::trace(|frame| {
            backtrace::resolve_frame(frame, |symbol| {
                if let Some(name) = symbol.name() {
                    let demangled = format!("{name:#}");
                    let file = symbol
                        .filename()
                        .map(|path| path.to_string_lossy().into_owned());
                    frames.push(StackFrame::from_symbol(
                        &demangled,
                        file.as_deref(),
                        symbol.lineno().unwrap_or(0),
                    ));
                }
            });
            true
        });

        let own = frames
            .iter()
            .take_while(|f| f.class_name.starts_with(BACKTRACE_FRAME_PREFIX))
            .count();
        frames.drain(..own);
        frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::locator::locate;
    use crate::core::model::SkipPolicy;

    #[inline(never)]
    fn captured_here() -> Vec<StackFrame> {
        LiveStack.capture()
    }

    #[test]
    fn test_capture_sees_caller() {
        let frames = captured_here();
        assert!(
            frames.iter().any(|f| f.method_name == "captured_here"),
            "caller missing from {frames:?}"
        );
        assert!(frames
            .first()
            .map_or(true, |f| !f.class_name.starts_with(BACKTRACE_FRAME_PREFIX)));
    }

    #[test]
    fn test_capture_demangles_without_hash() {
        let frames = captured_here();
        let ours = frames
            .iter()
            .find(|f| f.method_name == "captured_here")
            .expect("caller frame");
        assert_eq!(ours.class_name, "logwhence::platform::stack::tests");
    }

    #[test]
    fn test_exclusions_skip_crate_frames_on_live_stack() {
        // Everything inside this crate is machinery; the first survivor
        // belongs to the test harness or std.
        let policy = SkipPolicy::new(0, ["logwhence::"]);
        let loc = locate(&policy, None, &LiveStack);
        assert!(
            !loc.class_name().unwrap_or("").starts_with("logwhence::"),
            "attributed to own frame: {loc:?}"
        );
    }
}
