use crate::shared::filter_error::FilterError;

/// Side length of the square averaging neighborhood.
///
/// Always odd and positive so the neighborhood has a center pixel. Even
/// sizes are rejected rather than rounded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KernelSize(u32);

impl KernelSize {
    pub fn new(size: i64) -> Result<Self, FilterError> {
        if size <= 0 || size % 2 == 0 || size > u32::MAX as i64 {
            return Err(FilterError::InvalidKernelSize(size));
        }
        Ok(Self(size as u32))
    }

    pub fn get(&self) -> u32 {
        self.0
    }

    /// Neighborhood radius: `size / 2`.
    pub fn pad(&self) -> u32 {
        self.0 / 2
    }
}

impl TryFrom<i64> for KernelSize {
    type Error = FilterError;

    fn try_from(size: i64) -> Result<Self, Self::Error> {
        Self::new(size)
    }
}
