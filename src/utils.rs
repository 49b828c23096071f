/// Bits in one KiB.
pub const KIB: u64 = 1024 * 8;

// checks whether the given number n is a power of two.
pub const fn is_power_of_two(n: usize) -> bool {
    n != 0 && n.is_power_of_two()
}

/// `ceil(log2(n))`, with `ceil_log2(1) = 0`.
pub const fn ceil_log2(n: usize) -> u32 {
    assert!(n > 0);
    usize::BITS - (n - 1).leading_zeros()
}

/// Size in bits of one opened leaf together with its authentication path.
///
/// The tree has `num_leafs` leaves, each holding `tuple_size` elements of
/// `element_size_bits`. The sibling leaf is sent in full unless hashing it
/// is shorter.
pub fn merkle_path_size_bits(
    num_leafs: usize,
    tuple_size: usize,
    element_size_bits: usize,
    hash_size_bits: usize,
) -> u64 {
    let leaf = (tuple_size as u64).saturating_mul(element_size_bits as u64);
    let sibling = leaf.min(hash_size_bits as u64);
    let depth = u64::from(ceil_log2(num_leafs.max(1)));
    let co_path = depth.saturating_sub(1).saturating_mul(hash_size_bits as u64);
    leaf.saturating_add(sibling).saturating_add(co_path)
}
