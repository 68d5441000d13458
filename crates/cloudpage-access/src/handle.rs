//! Shared, reference-counted accessor handles.
//!
//! Every clone of a [`PointCloudAccessor`] refers to the same cursor, so
//! stepping through one clone moves all of them. The cursor, and with it
//! the block it holds, is released when the last clone goes away. Counts
//! are plain `Rc` counts: handles never leave the thread that created
//! them.

use std::cell::{Cell, Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use crate::cursor::AccessorCursor;

/// A handle to a point cursor over a [`PointCloudElement`](crate::PointCloudElement).
///
/// A handle may have no cursor at all (see [`invalid`](Self::invalid)),
/// which is how failed accessor construction is reported. Check
/// [`is_valid`](Self::is_valid) before touching the cursor.
#[derive(Clone, Default)]
pub struct PointCloudAccessor<'a> {
    cursor: Option<Rc<SharedCursor<'a>>>,
}

/// The allocation every clone of one accessor points at.
struct SharedCursor<'a> {
    cursor: RefCell<AccessorCursor<'a>>,
    // Mirrors the cursor's Attached state; readable while the cursor is
    // borrowed.
    attached: Rc<Cell<bool>>,
}

impl<'a> PointCloudAccessor<'a> {
    pub(crate) fn new(cursor: AccessorCursor<'a>) -> Self {
        Self {
            cursor: Some(Rc::new(SharedCursor {
                attached: cursor.attached_flag(),
                cursor: RefCell::new(cursor),
            })),
        }
    }

    /// A handle with no cursor.
    pub fn invalid() -> Self {
        Self { cursor: None }
    }

    /// Whether the handle has a cursor and that cursor holds a block.
    ///
    /// Safe to call while a [`cursor`](Self::cursor) guard is alive.
    pub fn is_valid(&self) -> bool {
        self.cursor
            .as_ref()
            .is_some_and(|shared| shared.attached.get())
    }

    /// Whether the handle has a cursor, attached or not.
    pub fn has_cursor(&self) -> bool {
        self.cursor.is_some()
    }

    /// Mutable access to the shared cursor.
    ///
    /// # Panics
    ///
    /// Panics if the handle has no cursor, or if the cursor is already
    /// borrowed through another clone.
    pub fn cursor(&self) -> RefMut<'_, AccessorCursor<'a>> {
        match &self.cursor {
            Some(shared) => shared.cursor.borrow_mut(),
            None => panic!("accessor handle has no cursor"),
        }
    }

    /// Shared access to the cursor, or `None` if the handle has none or
    /// the cursor is mutably borrowed.
    pub fn try_cursor(&self) -> Option<Ref<'_, AccessorCursor<'a>>> {
        self.cursor
            .as_ref()
            .and_then(|shared| shared.cursor.try_borrow().ok())
    }

    /// Number of handles sharing this handle's cursor (zero without one).
    pub fn ref_count(&self) -> usize {
        self.cursor.as_ref().map_or(0, Rc::strong_count)
    }

    /// Whether `self` and `other` share one cursor.
    pub fn shares_cursor_with(&self, other: &Self) -> bool {
        match (&self.cursor, &other.cursor) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for PointCloudAccessor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.cursor {
            Some(shared) => f
                .debug_struct("PointCloudAccessor")
                .field("refs", &Rc::strong_count(shared))
                .field("attached", &shared.attached.get())
                .field("cursor", &shared.cursor.try_borrow().ok())
                .finish(),
            None => f.write_str("PointCloudAccessor(invalid)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ElementConfig;
    use crate::element::PointCloudElement;
    use cloudpage_core::{EncodingType, PointCloudDataDescriptor};

    fn element() -> PointCloudElement {
        let desc = PointCloudDataDescriptor::new(8).with_spatial_type(EncodingType::Flt4Bytes);
        let mut elem = PointCloudElement::new("handles", desc, ElementConfig::new()).unwrap();
        elem.create_in_memory_pager().unwrap();
        elem
    }

    #[test]
    fn invalid_handle_has_no_cursor() {
        let acc = PointCloudAccessor::invalid();
        assert!(!acc.is_valid());
        assert_eq!(acc.ref_count(), 0);
        assert!(acc.try_cursor().is_none());
    }

    #[test]
    fn clones_share_one_cursor() {
        let elem = element();
        let a = elem.get_point_cloud_accessor(None);
        let b = a.clone();
        assert_eq!(a.ref_count(), 2);
        assert!(a.shares_cursor_with(&b));

        b.cursor().to_index(5);
        assert_eq!(a.cursor().current_index(), 5);

        drop(b);
        assert_eq!(a.ref_count(), 1);
        assert!(a.is_valid());
    }

    #[test]
    fn separate_accessors_do_not_share() {
        let elem = element();
        let a = elem.get_point_cloud_accessor(None);
        let b = elem.get_point_cloud_accessor(None);
        assert!(!a.shares_cursor_with(&b));
        assert!(!a.shares_cursor_with(&PointCloudAccessor::invalid()));
    }

    #[test]
    fn validity_readable_while_cursor_borrowed() {
        let elem = element();
        let acc = elem.get_point_cloud_accessor(None);
        let mut cursor = acc.cursor();
        let mut steps = 0;
        while acc.is_valid() {
            cursor.next_point();
            steps += 1;
        }
        assert_eq!(steps, 8);
        assert!(!cursor.is_valid());
        assert!(acc.try_cursor().is_none());
        drop(cursor);
        assert!(acc.try_cursor().is_some());
    }

    #[test]
    #[should_panic(expected = "no cursor")]
    fn dereferencing_invalid_handle_panics() {
        let _ = PointCloudAccessor::invalid().cursor();
    }
}
