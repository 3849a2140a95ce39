use core::fmt;

use crate::view::ViewId;

/// Failures that leave the view tree or the display unusable.
///
/// Absent bitmaps and empty clip rects are not errors; they are handled
/// where they happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XservError {
    /// The id does not name a live node.
    UnknownView(ViewId),
    /// A window-only operation was given a plain view.
    NotAWindow(ViewId),
    /// Walking up from the view never reached a root.
    NoContainingWindow(ViewId),
    /// The attach would make a view its own ancestor.
    CyclicAttach(ViewId),
    /// The view already has an owner.
    AlreadyAttached(ViewId),
    /// Graphics mode could not be entered or has been torn down.
    DisplayUnavailable,
}

impl XservError {
    pub fn as_str(&self) -> &'static str {
        match self {
            XservError::UnknownView(_) => "unknown view",
            XservError::NotAWindow(_) => "view is not a window",
            XservError::NoContainingWindow(_) => "no containing window",
            XservError::CyclicAttach(_) => "attach would create a cycle",
            XservError::AlreadyAttached(_) => "view already attached",
            XservError::DisplayUnavailable => "display unavailable",
        }
    }

    pub fn view(&self) -> Option<ViewId> {
        match *self {
            XservError::UnknownView(id)
            | XservError::NotAWindow(id)
            | XservError::NoContainingWindow(id)
            | XservError::CyclicAttach(id)
            | XservError::AlreadyAttached(id) => Some(id),
            XservError::DisplayUnavailable => None,
        }
    }
}

impl fmt::Display for XservError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.view() {
            Some(id) => write!(f, "{} ({})", self.as_str(), id),
            None => f.write_str(self.as_str()),
        }
    }
}

/// Convenience result type for tree and frame operations.
pub type XservResult<T = ()> = Result<T, XservError>;
