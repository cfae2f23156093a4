/// Move the element at `source` so it ends up at `destination`.
///
/// The element is removed first and then inserted at `destination` in the
/// shortened sequence, so this is a list move rather than a swap. Every other
/// element keeps its relative order. Returns `None` when either index is out of
/// range.
pub fn move_item<T: Clone>(items: &[T], source: usize, destination: usize) -> Option<Vec<T>> {
    if source >= items.len() || destination >= items.len() {
        return None;
    }
    let mut ordered = items.to_vec();
    let moved = ordered.remove(source);
    ordered.insert(destination, moved);
    Some(ordered)
}
