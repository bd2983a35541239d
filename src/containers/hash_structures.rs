use fnv::FnvBuildHasher;

/// A [`std::collections::HashMap`] with the FNV hasher; the solver hashes
/// small keys (handles and indices) for which FNV is measurably faster than
/// the default SipHash.
pub type HashMap<K, V, Hasher = FnvBuildHasher> = std::collections::HashMap<K, V, Hasher>;
/// A [`std::collections::HashSet`] with the FNV hasher.
pub type HashSet<K, Hasher = FnvBuildHasher> = std::collections::HashSet<K, Hasher>;
