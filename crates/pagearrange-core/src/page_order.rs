//! Display order of the loaded pages
//!
//! The order is always a permutation of `0..page_count`: entries move, but
//! are never added or removed after load.

use serde::{Deserialize, Serialize};

use crate::error::ReorderError;

/// Stable identifier of a page: its 0-based index in the source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(pub u32);

impl PageId {
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// 1-based page number in the source document
    pub fn page_number(self) -> u32 {
        self.0 + 1
    }
}

impl std::fmt::Display for PageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageOrder {
    pages: Vec<PageId>,
}

impl PageOrder {
    /// Identity order for a freshly loaded document
    pub fn new(page_count: u32) -> Self {
        Self {
            pages: (0..page_count).map(PageId).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn pages(&self) -> &[PageId] {
        &self.pages
    }

    pub fn iter(&self) -> impl Iterator<Item = PageId> + '_ {
        self.pages.iter().copied()
    }

    /// Display position of a page, if it exists
    pub fn position_of(&self, id: PageId) -> Option<usize> {
        self.pages.iter().position(|&p| p == id)
    }

    pub fn contains(&self, id: PageId) -> bool {
        id.index() < self.pages.len()
    }

    /// Move the page at `from` so that it ends up at position `to`.
    ///
    /// A `None` target (a drop outside any valid target) is ignored.
    /// Returns whether the order changed.
    pub fn move_page(&mut self, from: usize, to: Option<usize>) -> Result<bool, ReorderError> {
        let Some(to) = to else {
            return Ok(false);
        };

        let len = self.pages.len();
        for position in [from, to] {
            if position >= len {
                return Err(ReorderError::OutOfRange { position, len });
            }
        }

        if from == to {
            return Ok(false);
        }

        let page = self.pages.remove(from);
        self.pages.insert(to, page);
        Ok(true)
    }

    /// Replace the whole order with an explicit permutation.
    pub fn reorder(&mut self, new_order: &[PageId]) -> Result<(), ReorderError> {
        let len = self.pages.len();
        if new_order.len() != len {
            return Err(ReorderError::WrongLength {
                expected: len,
                actual: new_order.len(),
            });
        }

        let mut seen = vec![false; len];
        for &id in new_order {
            let slot = seen
                .get_mut(id.index())
                .ok_or(ReorderError::UnknownPage(id))?;
            if *slot {
                return Err(ReorderError::DuplicatePage(id));
            }
            *slot = true;
        }

        self.pages = new_order.to_vec();
        Ok(())
    }

    /// Restore load order
    pub fn reset(&mut self) {
        let len = self.pages.len() as u32;
        self.pages = (0..len).map(PageId).collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn ids(raw: &[u32]) -> Vec<PageId> {
        raw.iter().copied().map(PageId).collect()
    }

    #[test]
    fn test_new_order_is_identity() {
        let order = PageOrder::new(4);
        assert_eq!(order.pages(), ids(&[0, 1, 2, 3]).as_slice());
    }

    #[test]
    fn test_move_last_to_first() {
        let mut order = PageOrder::new(3);
        assert_eq!(order.move_page(2, Some(0)), Ok(true));
        assert_eq!(order.pages(), ids(&[2, 0, 1]).as_slice());
    }

    #[test]
    fn test_move_first_to_last() {
        let mut order = PageOrder::new(4);
        order.move_page(0, Some(3)).unwrap();
        assert_eq!(order.pages(), ids(&[1, 2, 3, 0]).as_slice());
    }

    #[test]
    fn test_cancelled_drop_is_ignored() {
        let mut order = PageOrder::new(3);
        assert_eq!(order.move_page(1, None), Ok(false));
        assert_eq!(order, PageOrder::new(3));
    }

    #[test]
    fn test_move_out_of_range_rejected() {
        let mut order = PageOrder::new(3);
        assert_eq!(
            order.move_page(0, Some(3)),
            Err(ReorderError::OutOfRange { position: 3, len: 3 })
        );
        assert_eq!(
            order.move_page(5, Some(0)),
            Err(ReorderError::OutOfRange { position: 5, len: 3 })
        );
        assert_eq!(order, PageOrder::new(3));
    }

    #[test]
    fn test_position_of_tracks_moves() {
        let mut order = PageOrder::new(3);
        order.move_page(0, Some(2)).unwrap();
        assert_eq!(order.position_of(PageId(0)), Some(2));
        assert_eq!(order.position_of(PageId(7)), None);
    }

    #[test]
    fn test_reorder_accepts_permutation() {
        let mut order = PageOrder::new(3);
        order.reorder(&ids(&[1, 2, 0])).unwrap();
        assert_eq!(order.pages(), ids(&[1, 2, 0]).as_slice());
        order.reset();
        assert_eq!(order, PageOrder::new(3));
    }

    #[test]
    fn test_reorder_rejects_invalid_orders() {
        let mut order = PageOrder::new(3);
        assert_eq!(
            order.reorder(&ids(&[0, 1])),
            Err(ReorderError::WrongLength {
                expected: 3,
                actual: 2
            })
        );
        assert_eq!(
            order.reorder(&ids(&[0, 1, 3])),
            Err(ReorderError::UnknownPage(PageId(3)))
        );
        assert_eq!(
            order.reorder(&ids(&[0, 1, 1])),
            Err(ReorderError::DuplicatePage(PageId(1)))
        );
        assert_eq!(order, PageOrder::new(3));
    }

    fn order_and_moves() -> impl Strategy<Value = (u32, Vec<(usize, usize)>)> {
        (1u32..40).prop_flat_map(|len| {
            let pos = 0..len as usize;
            (
                Just(len),
                proptest::collection::vec((pos.clone(), pos), 0..20),
            )
        })
    }

    proptest! {
        #[test]
        fn move_then_inverse_restores_order(len in 1u32..50, from in 0usize..50, to in 0usize..50) {
            let from = from % len as usize;
            let to = to % len as usize;
            let mut order = PageOrder::new(len);
            let before = order.clone();
            order.move_page(from, Some(to)).unwrap();
            order.move_page(to, Some(from)).unwrap();
            prop_assert_eq!(order, before);
        }

        #[test]
        fn moves_preserve_permutation((len, moves) in order_and_moves()) {
            let mut order = PageOrder::new(len);
            for (from, to) in moves {
                order.move_page(from, Some(to)).unwrap();
            }
            let mut sorted = order.pages().to_vec();
            sorted.sort();
            prop_assert_eq!(sorted, PageOrder::new(len).pages().to_vec());
        }
    }
}
