//! Target memory address type.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Strongly typed address in the inspected process
///
/// This wrapper around `u64` keeps addresses apart from element counts and
/// offsets, which are also `u64` throughout the printers.
///
/// ## Example
///
/// ```rust
/// use loupe_core::types::Address;
///
/// let base = Address::from(0x1000);
/// assert_eq!(base.element(3, 4), Some(Address::from(0x100c)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(u64);

impl Address
{
    /// The null address (0x0)
    pub const ZERO: Self = Address(0);

    /// Create a new address from a `u64` value
    pub const fn new(value: u64) -> Self
    {
        Address(value)
    }

    /// Get the raw `u64` value of this address
    pub const fn value(self) -> u64
    {
        self.0
    }

    /// Returns `true` for the null address.
    pub const fn is_null(self) -> bool
    {
        self.0 == 0
    }

    /// Add an offset to this address, checking for overflow
    ///
    /// ```rust
    /// use loupe_core::types::Address;
    ///
    /// let addr = Address::from(0x1000);
    /// assert_eq!(addr.checked_add(0x100), Some(Address::from(0x1100)));
    /// assert_eq!(addr.checked_add(u64::MAX), None);
    /// ```
    pub fn checked_add(self, offset: u64) -> Option<Self>
    {
        self.0.checked_add(offset).map(Address)
    }

    /// Address of element `index` in an array of `stride`-byte elements
    /// starting at this address. `None` on overflow.
    pub fn element(self, index: u64, stride: u64) -> Option<Self>
    {
        index.checked_mul(stride).and_then(|offset| self.checked_add(offset))
    }
}

impl From<u64> for Address
{
    fn from(value: u64) -> Self
    {
        Address(value)
    }
}

impl From<Address> for u64
{
    fn from(address: Address) -> Self
    {
        address.0
    }
}

impl fmt::Display for Address
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "0x{:016x}", self.0)
    }
}
