//! Contiguous grouping of ledger rows.
//!
//! Legs of one trade sit next to each other in an exchange statement and share
//! a trade id. [`EventGrouper`] walks the stream once and collects each run of
//! same-key items into a [`Grouped::Group`]. Items whose key function returns
//! `None` belong to no group and pass through as [`Grouped::Standalone`].
//!
//! Grouping relies on input order only: two runs with the same key separated
//! by a different key are two groups.

/// One unit of grouper output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Grouped<T> {
    /// A run of items sharing a key (never empty).
    Group(Vec<T>),
    /// An item without a key.
    Standalone(T),
}

impl<T> Grouped<T> {
    /// Number of items carried.
    pub fn len(&self) -> usize {
        match self {
            Self::Group(items) => items.len(),
            Self::Standalone(_) => 1,
        }
    }

    /// Always false; groups are never empty.
    pub const fn is_empty(&self) -> bool {
        false
    }
}

/// Iterator adapter that groups contiguous items by key.
///
/// # Examples
///
/// ```
/// use lotbook_booking::{GroupContiguous, Grouped};
///
/// let rows = vec![(Some(1), 'a'), (Some(1), 'b'), (None, 'x'), (Some(2), 'c')];
/// let grouped: Vec<_> = rows.into_iter().group_contiguous(|r| r.0).collect();
///
/// assert_eq!(
///     grouped,
///     vec![
///         Grouped::Group(vec![(Some(1), 'a'), (Some(1), 'b')]),
///         Grouped::Standalone((None, 'x')),
///         Grouped::Group(vec![(Some(2), 'c')]),
///     ]
/// );
/// ```
pub struct EventGrouper<I, F, K>
where
    I: Iterator,
{
    iter: I,
    key_fn: F,
    buffer: Vec<I::Item>,
    buffer_key: Option<K>,
    pending: Option<Grouped<I::Item>>,
}

impl<I, F, K> EventGrouper<I, F, K>
where
    I: Iterator,
    F: FnMut(&I::Item) -> Option<K>,
    K: PartialEq,
{
    /// Wrap an iterator. `key_fn` returns `None` for items that belong to no
    /// group.
    pub fn new(iter: I, key_fn: F) -> Self {
        Self {
            iter,
            key_fn,
            buffer: Vec::new(),
            buffer_key: None,
            pending: None,
        }
    }

    fn flush(&mut self) -> Option<Grouped<I::Item>> {
        self.buffer_key = None;
        if self.buffer.is_empty() {
            None
        } else {
            Some(Grouped::Group(std::mem::take(&mut self.buffer)))
        }
    }
}

impl<I, F, K> Iterator for EventGrouper<I, F, K>
where
    I: Iterator,
    F: FnMut(&I::Item) -> Option<K>,
    K: PartialEq,
{
    type Item = Grouped<I::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(pending) = self.pending.take() {
            return Some(pending);
        }

        loop {
            let Some(item) = self.iter.next() else {
                return self.flush();
            };

            let Some(key) = (self.key_fn)(&item) else {
                let standalone = Grouped::Standalone(item);
                return match self.flush() {
                    Some(group) => {
                        self.pending = Some(standalone);
                        Some(group)
                    }
                    None => Some(standalone),
                };
            };

            if self.buffer.is_empty() || self.buffer_key.as_ref() == Some(&key) {
                self.buffer_key = Some(key);
                self.buffer.push(item);
                continue;
            }

            let finished = self.flush();
            self.buffer_key = Some(key);
            self.buffer.push(item);
            return finished;
        }
    }
}

/// Extension trait adding [`group_contiguous`](GroupContiguous::group_contiguous)
/// to every iterator.
pub trait GroupContiguous: Iterator + Sized {
    /// Group contiguous items by key; see [`EventGrouper`].
    fn group_contiguous<F, K>(self, key_fn: F) -> EventGrouper<Self, F, K>
    where
        F: FnMut(&Self::Item) -> Option<K>,
        K: PartialEq,
    {
        EventGrouper::new(self, key_fn)
    }
}

impl<I: Iterator> GroupContiguous for I {}
