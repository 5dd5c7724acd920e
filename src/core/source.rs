// logwhence - core/source.rs
//
// Read-only source-location capability and the ways to obtain one.
//
// Construction routes, all converging on `SourceLocation`:
//   1. `SourceLocation::new`            explicit tuple, no computation
//   2. `SourceLocation::from_live_stack` locator over the live stack
//   3. `ExceptionSourceProvider::new`    locator over a throwable's trace
//   4. `SourceLocation::from_frame`      adapted native frame

use crate::core::locator::{self, StackSource};
use crate::core::model::{SkipPolicy, SourceLocation, Throwable};

/// Read access to where a message originated.
///
/// `None` and line 0 mean unknown.
pub trait MessageSourceProvider {
    fn method_name(&self) -> Option<&str>;
    fn class_name(&self) -> Option<&str>;
    fn file_name(&self) -> Option<&str>;
    fn line_number(&self) -> u32;
}

impl MessageSourceProvider for SourceLocation {
    fn method_name(&self) -> Option<&str> {
        SourceLocation::method_name(self)
    }

    fn class_name(&self) -> Option<&str> {
        SourceLocation::class_name(self)
    }

    fn file_name(&self) -> Option<&str> {
        SourceLocation::file_name(self)
    }

    fn line_number(&self) -> u32 {
        SourceLocation::line_number(self)
    }
}

impl SourceLocation {
    /// Attribute to the first qualifying frame of the live stack.
    pub fn from_live_stack(policy: &SkipPolicy, stack: &dyn StackSource) -> Self {
        locator::locate(policy, None, stack)
    }

    /// Attribute to the outer exception's first frame (or, under
    /// `ExceptionMode::SkipExcluded`, the first non-excluded cause).
    pub fn from_exception(throwable: &Throwable, policy: &SkipPolicy) -> Self {
        locator::locate_exception(throwable, policy)
    }
}

/// Source provider for an exception that is logged rather than a live call.
///
/// Always uses the outer exception's first frame; the live stack at the time
/// of logging plays no part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionSourceProvider {
    location: SourceLocation,
}

impl ExceptionSourceProvider {
    pub fn new(throwable: &Throwable) -> Self {
        let policy = SkipPolicy::new(0, Vec::<String>::new());
        Self {
            location: locator::locate_exception(throwable, &policy),
        }
    }

    pub fn into_location(self) -> SourceLocation {
        self.location
    }
}

impl MessageSourceProvider for ExceptionSourceProvider {
    fn method_name(&self) -> Option<&str> {
        self.location.method_name()
    }

    fn class_name(&self) -> Option<&str> {
        self.location.class_name()
    }

    fn file_name(&self) -> Option<&str> {
        self.location.file_name()
    }

    fn line_number(&self) -> u32 {
        self.location.line_number()
    }
}
