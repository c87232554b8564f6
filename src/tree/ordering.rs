//! Single-element list moves, the arithmetic behind drag-and-drop reordering.

use std::fmt::Display;

/// Why a reorder request was dropped without touching the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The item was dropped onto itself.
    SameItem,
    /// The dragged item is not in the sibling list.
    ActiveNotFound,
    /// The drop target is not in the sibling list.
    OverNotFound,
    /// The parent is unknown or its children have not been loaded.
    ListNotLoaded,
}

impl Display for IgnoreReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            IgnoreReason::SameItem => "active and over are the same item",
            IgnoreReason::ActiveNotFound => "active item not in list",
            IgnoreReason::OverNotFound => "over item not in list",
            IgnoreReason::ListNotLoaded => "sibling list not loaded",
        };
        f.write_str(reason)
    }
}

/// Resolves a drag-end event to `(old_index, new_index)`.
///
/// `new_index` is the current position of `over`, which is where `active`
/// ends up after [`move_item`].
pub fn plan_move<T: PartialEq>(
    items: &[T],
    active: &T,
    over: &T,
) -> Result<(usize, usize), IgnoreReason> {
    if active == over {
        return Err(IgnoreReason::SameItem);
    }
    let old_index = items
        .iter()
        .position(|item| item == active)
        .ok_or(IgnoreReason::ActiveNotFound)?;
    let new_index = items
        .iter()
        .position(|item| item == over)
        .ok_or(IgnoreReason::OverNotFound)?;
    Ok((old_index, new_index))
}

/// Returns a copy of `items` with the element at `from` removed and
/// reinserted at `to`. Everything else keeps its relative order.
///
/// Out-of-range indices yield an unchanged copy.
pub fn move_item<T: Clone>(items: &[T], from: usize, to: usize) -> Vec<T> {
    let mut moved = items.to_vec();
    if from >= moved.len() || to >= moved.len() || from == to {
        return moved;
    }
    let item = moved.remove(from);
    moved.insert(to, item);
    moved
}
