//
// Copyright 2026 cfplist Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! # Scoped ownership of native values.
//!
//! Every native value acquired during an encode, decode or parse is held in a
//! [`ScopedRef`] so that unwinding out of a failed call releases everything
//! the call created. The single moment ownership transfers elsewhere (the
//! document root, a container that retains on insertion) goes through
//! [`ScopedRef::disown`]; there is no other way ownership leaves a handle,
//! and handles cannot be copied.

use std::marker::PhantomData;

use crate::engine::{self, Raw};

mod sealed {
    pub trait Sealed {}
}

/// Marker for the kind of native value a [`ScopedRef`] is known to hold.
pub trait ValueKind: sealed::Sealed {}

macro_rules! value_kind {
    ($(#[$doc:meta] $name:ident),+ $(,)?) => {
        $(
            #[$doc]
            pub enum $name {}
            impl sealed::Sealed for $name {}
            impl ValueKind for $name {}
        )+
    };
}

value_kind![
    /// A native value of statically unknown kind.
    AnyValue,
    /// A native string value.
    StringValue,
    /// A native integer or floating point value.
    NumberValue,
    /// A native ordered array value.
    ArrayValue,
    /// A native dictionary value.
    DictionaryValue,
];

/// An owning wrapper around at most one native value reference.
///
/// The default state is empty. Construction from a raw reference takes
/// ownership unless [`ScopedRef::shared`] is used, which wraps a reference
/// the caller must not release (the boolean singletons). Dropping the handle
/// releases the reference if and only if it is still owned and non-empty.
pub struct ScopedRef<K: ValueKind = AnyValue> {
    raw: Option<Raw>,
    owned: bool,
    kind: PhantomData<K>,
}

impl<K: ValueKind> ScopedRef<K> {
    /// Returns an empty handle.
    pub fn null() -> Self {
        ScopedRef {
            raw: None,
            owned: false,
            kind: PhantomData,
        }
    }

    /// Takes ownership of a reference; it is released when the handle drops.
    pub fn owned(raw: Raw) -> Self {
        ScopedRef {
            raw: Some(raw),
            owned: true,
            kind: PhantomData,
        }
    }

    /// Wraps a reference owned elsewhere; dropping the handle releases nothing.
    pub fn shared(raw: Raw) -> Self {
        ScopedRef {
            raw: Some(raw),
            owned: false,
            kind: PhantomData,
        }
    }

    /// Returns the wrapped reference, if any, without transferring ownership.
    pub fn get(&self) -> Option<Raw> {
        self.raw
    }

    pub fn is_null(&self) -> bool {
        self.raw.is_none()
    }

    /// Hands the reference to a new owner, leaving the handle empty so the
    /// reference is not released again on drop.
    pub fn disown(mut self) -> Option<Raw> {
        self.raw.take()
    }

    /// Moves the reference into a handle of the most general kind,
    /// transferring ownership and leaving nothing behind to double-release.
    pub fn upcast(mut self) -> ScopedRef<AnyValue> {
        ScopedRef {
            raw: self.raw.take(),
            owned: self.owned,
            kind: PhantomData,
        }
    }
}

impl<K: ValueKind> Drop for ScopedRef<K> {
    fn drop(&mut self) {
        if self.owned {
            if let Some(raw) = self.raw {
                engine::release(raw);
            }
        }
    }
}
