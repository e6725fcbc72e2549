//! Zero-copy views into shared byte buffers.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Deref, Range};
use std::sync::Arc;

/// Immutable view of `buf[begin..end]`.
///
/// Cloning a view clones the `Arc`, never the bytes. Equality and hashing
/// look at the viewed bytes only.
#[derive(Clone)]
pub struct ByteView {
    buf: Arc<[u8]>,
    begin: usize,
    end: usize,
}

impl ByteView {
    /// View `range` of `buf`.
    ///
    /// # Panics
    /// Panics if `range` is reversed or out of bounds.
    pub fn new(buf: Arc<[u8]>, range: Range<usize>) -> Self {
        assert!(
            range.start <= range.end && range.end <= buf.len(),
            "byte view {range:?} out of bounds for buffer of {} bytes",
            buf.len()
        );
        Self {
            buf,
            begin: range.start,
            end: range.end,
        }
    }

    /// View an entire buffer.
    pub fn whole(buf: Arc<[u8]>) -> Self {
        let end = buf.len();
        Self { buf, begin: 0, end }
    }

    pub fn begin(&self) -> usize {
        self.begin
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.begin
    }

    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[self.begin..self.end]
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }

    /// Shared backing buffer.
    pub fn backing(&self) -> &Arc<[u8]> {
        &self.buf
    }

    /// Narrow the view; `range` is relative to this view.
    ///
    /// # Panics
    /// Panics if `range` is reversed or exceeds this view.
    pub fn slice(&self, range: Range<usize>) -> Self {
        assert!(
            range.start <= range.end && range.end <= self.len(),
            "sub-view {range:?} out of bounds for view of {} bytes",
            self.len()
        );
        Self {
            buf: Arc::clone(&self.buf),
            begin: self.begin + range.start,
            end: self.begin + range.end,
        }
    }
}

impl From<Vec<u8>> for ByteView {
    fn from(bytes: Vec<u8>) -> Self {
        Self::whole(bytes.into())
    }
}

impl From<&[u8]> for ByteView {
    fn from(bytes: &[u8]) -> Self {
        Self::whole(bytes.into())
    }
}

impl Deref for ByteView {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl AsRef<[u8]> for ByteView {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl PartialEq for ByteView {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for ByteView {}

impl PartialEq<[u8]> for ByteView {
    fn eq(&self, other: &[u8]) -> bool {
        self.as_bytes() == other
    }
}

impl Hash for ByteView {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_bytes().hash(state);
    }
}

impl fmt::Debug for ByteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "b\"{}\"", self.as_bytes().escape_ascii())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn views_share_backing_buffer() {
        let buf: Arc<[u8]> = Arc::from(&b"key=value"[..]);
        let key = ByteView::new(Arc::clone(&buf), 0..3);
        let value = ByteView::new(Arc::clone(&buf), 4..9);

        assert_eq!(key.as_bytes(), b"key");
        assert_eq!(value.to_vec(), b"value".to_vec());
        assert!(Arc::ptr_eq(key.backing(), value.backing()));
        assert_eq!((value.begin(), value.end(), value.len()), (4, 9, 5));
    }

    #[test]
    fn slice_is_relative() {
        let view = ByteView::new(Arc::from(&b"abcdef"[..]), 1..5);
        let inner = view.slice(1..3);

        assert_eq!(inner.as_bytes(), b"cd");
        assert_eq!(inner.begin(), 2);
    }

    #[test]
    fn equality_ignores_position() {
        let a = ByteView::new(Arc::from(&b"xxab"[..]), 2..4);
        let b = ByteView::from(b"ab".to_vec());

        assert_eq!(a, b);
        assert_eq!(format!("{a:?}"), r#"b"ab""#);
    }

    #[test]
    fn empty_view() {
        let view = ByteView::new(Arc::from(&b"abc"[..]), 3..3);
        assert!(view.is_empty());
        assert_eq!(view.as_bytes(), b"");
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn out_of_bounds_view_panics() {
        ByteView::new(Arc::from(&b"abc"[..]), 1..4);
    }
}
