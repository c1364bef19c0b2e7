use std::ops::{Range, RangeFrom, RangeFull, RangeTo};

use crate::PreconditionError;

/// A range of elements, as accepted by the staging areas of buffers.
///
/// Implemented for `..`, `a..`, `..b` and `a..b`. A missing bound stands for the start or the
/// end of the object.
pub trait RangeArgument<T> {
    /// The first element, if any.
    fn start(&self) -> Option<&T>;
    /// The element after the last one, if any.
    fn end(&self) -> Option<&T>;
}

impl<T> RangeArgument<T> for RangeFull {
    fn start(&self) -> Option<&T> {
        None
    }
    fn end(&self) -> Option<&T> {
        None
    }
}

impl<T> RangeArgument<T> for RangeFrom<T> {
    fn start(&self) -> Option<&T> {
        Some(&self.start)
    }
    fn end(&self) -> Option<&T> {
        None
    }
}

impl<T> RangeArgument<T> for RangeTo<T> {
    fn start(&self) -> Option<&T> {
        None
    }
    fn end(&self) -> Option<&T> {
        Some(&self.end)
    }
}

impl<T> RangeArgument<T> for Range<T> {
    fn start(&self) -> Option<&T> {
        Some(&self.start)
    }
    fn end(&self) -> Option<&T> {
        Some(&self.end)
    }
}

/// Turns the range into a non-empty range within `0..len`.
pub(crate) fn resolve<R>(range: &R, len: usize) -> Result<Range<usize>, PreconditionError>
    where R: RangeArgument<usize>
{
    let start = range.start().cloned().unwrap_or(0);
    let end = range.end().cloned().unwrap_or(len);

    if end > len {
        return Err(PreconditionError::OutOfRange { index: end as u64, limit: len as u64 });
    }
    if start >= end {
        return Err(PreconditionError::OutOfRange { index: start as u64, limit: end as u64 });
    }

    Ok(start .. end)
}

#[cfg(test)]
mod tests {
    use super::resolve;
    use crate::PreconditionError;

    #[test]
    fn missing_bounds() {
        assert_eq!(resolve(&.., 10), Ok(0 .. 10));
        assert_eq!(resolve(&(3 ..), 10), Ok(3 .. 10));
        assert_eq!(resolve(&(.. 4), 10), Ok(0 .. 4));
    }

    #[test]
    fn invalid_ranges() {
        assert_eq!(resolve(&(2 .. 11), 10),
                   Err(PreconditionError::OutOfRange { index: 11, limit: 10 }));
        assert_eq!(resolve(&(5 .. 5), 10),
                   Err(PreconditionError::OutOfRange { index: 5, limit: 5 }));
    }
}
