//! DeviceAddress - Cheap-to-clone OSC address identifier
//!
//! Uses Arc<str> internally for O(1) clone operations.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

/// OSC device address with cheap cloning.
///
/// Internally uses `Arc<str>` so cloning only increments a reference count
/// instead of allocating new memory. Addresses are created once at
/// configuration time and cloned on every received packet, so this matters.
///
/// # Examples
/// ```
/// use contracts::DeviceAddress;
///
/// let addr: DeviceAddress = "/HMD".into();
/// let addr2 = addr.clone();  // O(1) - just increments ref count
/// assert_eq!(addr, addr2);
/// assert_eq!(addr.device_name(), "HMD");
/// ```
#[derive(Clone, Default)]
pub struct DeviceAddress(Arc<str>);

impl DeviceAddress {
    /// Create a new DeviceAddress from a string slice.
    #[inline]
    pub fn new(s: &str) -> Self {
        Self(Arc::from(s))
    }

    /// Get the underlying string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Address with the leading `/` stripped, as written to the device column.
    #[inline]
    pub fn device_name(&self) -> &str {
        self.0.trim_start_matches('/')
    }
}

// Deref to &str for easy string operations
impl Deref for DeviceAddress {
    type Target = str;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for DeviceAddress {
    #[inline]
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for DeviceAddress {
    #[inline]
    fn borrow(&self) -> &str {
        &self.0
    }
}

// Conversions
impl From<&str> for DeviceAddress {
    #[inline]
    fn from(s: &str) -> Self {
        Self(Arc::from(s))
    }
}

impl From<String> for DeviceAddress {
    #[inline]
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

impl From<Arc<str>> for DeviceAddress {
    #[inline]
    fn from(s: Arc<str>) -> Self {
        Self(s)
    }
}

// Display and Debug
impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeviceAddress({:?})", self.0)
    }
}

// Equality - can compare with &str, String, etc.
impl PartialEq for DeviceAddress {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        // Fast path: same Arc pointer
        Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl Eq for DeviceAddress {}

impl PartialEq<str> for DeviceAddress {
    #[inline]
    fn eq(&self, other: &str) -> bool {
        self.0.as_ref() == other
    }
}

impl PartialEq<&str> for DeviceAddress {
    #[inline]
    fn eq(&self, other: &&str) -> bool {
        self.0.as_ref() == *other
    }
}

impl PartialEq<String> for DeviceAddress {
    #[inline]
    fn eq(&self, other: &String) -> bool {
        self.0.as_ref() == other
    }
}

// Hash - same as str hash for HashMap compatibility
impl Hash for DeviceAddress {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state)
    }
}

// Serde support
impl Serialize for DeviceAddress {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for DeviceAddress {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_clone_is_cheap() {
        let a1: DeviceAddress = "/HMD".into();
        let a2 = a1.clone();

        // Both should point to same underlying data (Arc clone is O(1))
        assert_eq!(a1.as_str().as_ptr(), a2.as_str().as_ptr());
    }

    #[test]
    fn test_equality() {
        let addr: DeviceAddress = "/Controller".into();
        assert_eq!(addr, "/Controller");
        assert_eq!(addr, String::from("/Controller"));
        assert_eq!(addr, DeviceAddress::from("/Controller"));
    }

    #[test]
    fn test_device_name_strips_slash() {
        let addr: DeviceAddress = "/Hand_L".into();
        assert_eq!(addr.device_name(), "Hand_L");
    }

    #[test]
    fn test_hashmap_key() {
        let mut map: HashMap<DeviceAddress, i32> = HashMap::new();
        map.insert("/HMD".into(), 1);
        map.insert("/Hand_R".into(), 2);

        // Can lookup with &str
        assert_eq!(map.get("/HMD"), Some(&1));
        assert_eq!(map.get("/Hand_R"), Some(&2));
    }

    #[test]
    fn test_serde() {
        let addr: DeviceAddress = "/HMD".into();
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, "\"/HMD\"");

        let parsed: DeviceAddress = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, addr);
    }
}
