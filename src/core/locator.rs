// logwhence - core/locator.rs
//
// Stack-frame attribution: find the first frame that is not part of the
// logging machinery.
//
// Two modes:
//   - Live stack (no throwable): capture the current stack through a
//     `StackSource`, drop `skip_frames` innermost frames, then drop frames
//     whose owner starts with an exclusion prefix.
//   - Exception: the throwable's own trace is used as-is; its innermost
//     frame is the answer. Skip count and exclusions do not apply because
//     the trace was captured before the logging call ran.
//
// Every path ends in a `SourceLocation`; exhaustion yields the unknown
// sentinel. Nothing in here panics or returns an error.

use crate::core::model::{ExceptionMode, SkipPolicy, SourceLocation, StackFrame, Throwable};
use crate::util::constants::MAX_CAUSE_DEPTH;

/// Something that can produce the current call stack, innermost frame first.
pub trait StackSource: Send + Sync {
    fn capture(&self) -> Vec<StackFrame>;
}

/// A stack source that always yields the same frames.
///
/// Used by hosts that hand in a stack they captured themselves, and by tests
/// that need deterministic attribution.
#[derive(Debug, Clone, Default)]
pub struct FixedStack {
    frames: Vec<StackFrame>,
}

impl FixedStack {
    pub fn new(frames: Vec<StackFrame>) -> Self {
        Self { frames }
    }
}

impl StackSource for FixedStack {
    fn capture(&self) -> Vec<StackFrame> {
        self.frames.clone()
    }
}

/// Walk `frames` (innermost first): skip `skip_frames` unconditionally, then
/// skip excluded owners, and return the first survivor.
pub fn locate_in(frames: &[StackFrame], skip_frames: usize, exclusions: &[String]) -> SourceLocation {
    frames
        .iter()
        .skip(skip_frames)
        .find(|frame| !frame.is_excluded(exclusions))
        .map(SourceLocation::from_frame)
        .unwrap_or_else(SourceLocation::unknown)
}

/// Attribute an event.
///
/// With a throwable, attribution comes from its captured trace (see
/// [`locate_exception`]); otherwise the live stack from `stack` is walked
/// with the policy's skip count and exclusions.
pub fn locate(
    policy: &SkipPolicy,
    throwable: Option<&Throwable>,
    stack: &dyn StackSource,
) -> SourceLocation {
    match throwable {
        Some(t) => locate_exception(t, policy),
        None => {
            let frames = stack.capture();
            let location = locate_in(&frames, policy.skip_frames, &policy.exclusion_prefixes);
            if location.is_unknown() {
                tracing::trace!(
                    depth = frames.len(),
                    skip = policy.skip_frames,
                    "Live stack exhausted before a qualifying frame"
                );
            }
            location
        }
    }
}

/// Exception-mode attribution.
///
/// `ExceptionMode::Outer` takes the outer throwable's first frame
/// unconditionally. `ExceptionMode::SkipExcluded` moves down the cause chain
/// while the current first frame is excluded, falling back to the outer
/// first frame when every candidate is excluded.
pub fn locate_exception(throwable: &Throwable, policy: &SkipPolicy) -> SourceLocation {
    let outer = throwable.first_frame();
    let frame = match policy.exception_mode {
        ExceptionMode::Outer => outer,
        ExceptionMode::SkipExcluded => throwable
            .chain()
            .take(MAX_CAUSE_DEPTH)
            .filter_map(Throwable::first_frame)
            .find(|frame| !frame.is_excluded(&policy.exclusion_prefixes))
            .or(outer),
    };
    frame
        .map(SourceLocation::from_frame)
        .unwrap_or_else(SourceLocation::unknown)
}
