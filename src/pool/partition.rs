use std::num::NonZeroUsize;

/// Splits `items` into `n` contiguous shards
///
/// Shard sizes differ by at most one; the first `len % n` shards take the extra
/// item. With fewer items than shards the trailing shards are empty. Concatenating
/// the shards gives back `items`.
///
/// # Examples
///
/// ```
/// use anime_harvest::partition;
/// use std::num::NonZeroUsize;
///
/// let shards = partition(&[1, 2, 3, 4, 5], NonZeroUsize::new(2).unwrap());
/// assert_eq!(shards, vec![vec![1, 2, 3], vec![4, 5]]);
/// ```
pub fn partition<T: Clone>(items: &[T], n: NonZeroUsize) -> Vec<Vec<T>> {
    let n = n.get();
    let base = items.len() / n;
    let extra = items.len() % n;

    let mut shards = Vec::with_capacity(n);
    let mut start = 0;
    for i in 0..n {
        let size = base + usize::from(i < extra);
        shards.push(items[start..start + size].to_vec());
        start += size;
    }
    shards
}
