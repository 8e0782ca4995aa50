//! Deterministic hash-based type identity.
//!
//! [`TypeHash`] identifies a canonical type by its structural name. Two
//! types with the same structural name always hash the same, which is what
//! lets the type pool hand back one shared instance per distinct type.
//!
//! Function types are hashed in their own domain so that a function and a
//! struct sharing a name never collide in the pool.
//!
//! ```
//! use quill_core::TypeHash;
//!
//! assert_eq!(TypeHash::from_type_name("Int"), TypeHash::from_type_name("Int"));
//! assert_ne!(TypeHash::from_type_name("foo"), TypeHash::from_function_name("foo"));
//! ```

use std::fmt;
use xxhash_rust::xxh64::xxh64;

/// Domain mixing constants.
pub mod hash_constants {
    /// Domain marker for struct, array, nullable and builtin types.
    pub const TYPE: u64 = 0x2fac10b63a6cc57c;

    /// Domain marker for function types.
    pub const FUNCTION: u64 = 0x5ea77ffbcdf5f302;
}

/// A 64-bit structural identity for a canonical type.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeHash(pub u64);

impl TypeHash {
    /// Hash of a non-function type from its structural name
    /// (`Int`, `Tree`, `Tree?`, `[Int,Int]`, ...).
    #[inline]
    pub fn from_type_name(name: &str) -> Self {
        TypeHash(hash_constants::TYPE ^ xxh64(name.as_bytes(), 0))
    }

    /// Hash of a function type from the function's name.
    #[inline]
    pub fn from_function_name(name: &str) -> Self {
        TypeHash(hash_constants::FUNCTION ^ xxh64(name.as_bytes(), 0))
    }
}

impl fmt::Debug for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeHash({:#018x})", self.0)
    }
}
