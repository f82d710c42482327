use std::alloc::Layout;

/// Backing storage for a table could not be obtained.
///
/// The table the failing operation was called on stays valid and keeps all of its entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AllocError {
    /// The requested number of buckets, slots or nodes does not fit in the address space.
    #[error("requested table storage exceeds the addressable capacity")]
    CapacityOverflow,
    /// The allocator refused to provide the requested storage.
    #[error("failed to allocate {bytes} bytes of table storage")]
    AllocFailed {
        /// Size of the failed request.
        bytes: usize,
    },
}

impl AllocError {
    fn for_array<T>(len: usize) -> Self {
        match Layout::array::<T>(len) {
            Ok(layout) => AllocError::AllocFailed {
                bytes: layout.size(),
            },
            Err(_) => AllocError::CapacityOverflow,
        }
    }
}

/// Allocates a vector of exactly `len` items produced by `fill`.
pub(crate) fn try_alloc_vec<T>(len: usize, fill: impl FnMut() -> T) -> Result<Vec<T>, AllocError> {
    let mut vec = Vec::new();
    vec.try_reserve_exact(len)
        .map_err(|_| AllocError::for_array::<T>(len))?;
    vec.resize_with(len, fill);
    Ok(vec)
}

/// Reserves room for `additional` more items, growing amortized.
pub(crate) fn try_reserve<T>(vec: &mut Vec<T>, additional: usize) -> Result<(), AllocError> {
    vec.try_reserve(additional)
        .map_err(|_| AllocError::for_array::<T>(vec.len().saturating_add(additional)))
}
