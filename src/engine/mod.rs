//
// Copyright 2026 cfplist Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! # The native property list value engine.
//!
//! Values are heap-allocated, reference-counted nodes addressed through the
//! `Raw` handle. The functions in this module mirror the surface the
//! CoreFoundation plist engine presents to its callers:
//!
//! 1. Typed constructors following the Create Rule (the caller owns one
//!    reference to the result).
//! 2. `retain` and `release`; releasing the last reference destroys the node
//!    and releases its children.
//! 3. Accessors following the Get Rule (no ownership is transferred).
//!
//! Dictionary keys are themselves native values and are not restricted to
//! strings at this layer; parsed binary input may legally carry non-string
//! keys, and rejecting them is the decode engine's job.
//!
//! # References
//!
//! 1. https://github.com/opensource-apple/CF/blob/master/ForFoundationOnly.h
//! 2. https://developer.apple.com/documentation/corefoundation/cfpropertylist

pub mod handle;

use std::cell::RefCell;
use std::ptr::NonNull;
use std::sync::atomic::{fence, AtomicUsize, Ordering};
use std::sync::OnceLock;

/// A reference to a native property list value of any kind.
///
/// Handles are plain copies of the underlying pointer and carry no ownership
/// information; ownership is tracked by retain counts and, on the caller's
/// side, by [`handle::ScopedRef`]. A handle must not be used after the last
/// reference to its value has been released.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Raw(NonNull<NativeValue>);

/// Discriminates the kind of a native value.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum TypeTag {
    String,
    Boolean,
    Integer,
    Real,
    Data,
    Array,
    Dictionary,
}

struct NativeValue {
    retain_count: AtomicUsize,
    kind: Kind,
}

enum Kind {
    String(String),
    Boolean(bool),
    Integer(i64),
    Real(f64),
    Data(Vec<u8>),
    Array(RefCell<Vec<Raw>>),
    Dictionary(RefCell<Vec<(Raw, Raw)>>),
}

thread_local! {
    /// Number of values allocated and not yet destroyed by this thread.
    /// Thread-local so leak assertions in parallel tests stay independent;
    /// a value graph never migrates between threads (`Raw` is not `Send`).
    static LIVE_VALUES: std::cell::Cell<usize> = std::cell::Cell::new(0);
}

fn allocate(kind: Kind) -> Raw {
    LIVE_VALUES.with(|count| count.set(count.get() + 1));
    let value = Box::new(NativeValue {
        retain_count: AtomicUsize::new(1),
        kind,
    });
    Raw(NonNull::from(Box::leak(value)))
}

impl Raw {
    fn value(&self) -> &NativeValue {
        // The node outlives every handle to it by the retain count contract.
        unsafe { self.0.as_ref() }
    }

    fn array_items(&self) -> &RefCell<Vec<Raw>> {
        match &self.value().kind {
            Kind::Array(items) => items,
            _ => panic!("native value is not an array"),
        }
    }

    fn dictionary_entries(&self) -> &RefCell<Vec<(Raw, Raw)>> {
        match &self.value().kind {
            Kind::Dictionary(entries) => entries,
            _ => panic!("native value is not a dictionary"),
        }
    }
}

/// Returns the number of native values allocated by this thread and still
/// alive. A boolean singleton counts against the thread that first used it.
#[cfg(test)]
pub fn live_value_count() -> usize {
    LIVE_VALUES.with(|count| count.get())
}

/// Increments the retain count of a value.
pub fn retain(value: Raw) {
    value.value().retain_count.fetch_add(1, Ordering::Relaxed);
}

/// Decrements the retain count of a value, destroying it when the count
/// reaches zero. Children of a destroyed container are released in turn.
pub fn release(value: Raw) {
    if value.value().retain_count.fetch_sub(1, Ordering::Release) != 1 {
        return;
    }
    fence(Ordering::Acquire);
    destroy(value);
}

fn destroy(value: Raw) {
    LIVE_VALUES.with(|count| count.set(count.get() - 1));
    let boxed = unsafe { Box::from_raw(value.0.as_ptr()) };
    match boxed.kind {
        Kind::Array(items) => {
            for item in items.into_inner() {
                release(item);
            }
        }
        Kind::Dictionary(entries) => {
            for (key, entry_value) in entries.into_inner() {
                release(key);
                release(entry_value);
            }
        }
        _ => {}
    }
}

/// Returns the type tag of a value.
pub fn type_of(value: Raw) -> TypeTag {
    match &value.value().kind {
        Kind::String(_) => TypeTag::String,
        Kind::Boolean(_) => TypeTag::Boolean,
        Kind::Integer(_) => TypeTag::Integer,
        Kind::Real(_) => TypeTag::Real,
        Kind::Data(_) => TypeTag::Data,
        Kind::Array(_) => TypeTag::Array,
        Kind::Dictionary(_) => TypeTag::Dictionary,
    }
}

pub fn string_create(contents: &str) -> Raw {
    allocate(Kind::String(contents.to_owned()))
}

pub fn integer_create(value: i64) -> Raw {
    allocate(Kind::Integer(value))
}

pub fn real_create(value: f64) -> Raw {
    allocate(Kind::Real(value))
}

pub fn data_create(bytes: Vec<u8>) -> Raw {
    allocate(Kind::Data(bytes))
}

pub fn array_create(capacity: usize) -> Raw {
    allocate(Kind::Array(RefCell::new(Vec::with_capacity(capacity))))
}

pub fn dictionary_create(capacity: usize) -> Raw {
    allocate(Kind::Dictionary(RefCell::new(Vec::with_capacity(capacity))))
}

struct SharedValue(Raw);

// The singleton nodes are immutable and their retain counts are atomic.
unsafe impl Send for SharedValue {}
unsafe impl Sync for SharedValue {}

static BOOLEAN_TRUE: OnceLock<SharedValue> = OnceLock::new();
static BOOLEAN_FALSE: OnceLock<SharedValue> = OnceLock::new();

/// Returns the process-wide shared boolean value.
///
/// The reference is not owned by the caller; the engine holds the initial
/// reference for the lifetime of the process, so the singletons are never
/// destroyed. Containers that insert one retain it like any other value.
pub fn boolean(value: bool) -> Raw {
    let cell = if value { &BOOLEAN_TRUE } else { &BOOLEAN_FALSE };
    cell.get_or_init(|| SharedValue(allocate(Kind::Boolean(value)))).0
}

pub fn string_value(value: Raw) -> String {
    match &value.value().kind {
        Kind::String(contents) => contents.clone(),
        _ => panic!("native value is not a string"),
    }
}

pub fn boolean_value(value: Raw) -> bool {
    match &value.value().kind {
        Kind::Boolean(inner) => *inner,
        _ => panic!("native value is not a boolean"),
    }
}

pub fn integer_value(value: Raw) -> i64 {
    match &value.value().kind {
        Kind::Integer(inner) => *inner,
        _ => panic!("native value is not an integer"),
    }
}

pub fn real_value(value: Raw) -> f64 {
    match &value.value().kind {
        Kind::Real(inner) => *inner,
        _ => panic!("native value is not a real"),
    }
}

pub fn data_value(value: Raw) -> Vec<u8> {
    match &value.value().kind {
        Kind::Data(bytes) => bytes.clone(),
        _ => panic!("native value is not a data"),
    }
}

pub fn array_len(array: Raw) -> usize {
    array.array_items().borrow().len()
}

/// Returns the item at `index` without transferring ownership.
pub fn array_get(array: Raw, index: usize) -> Option<Raw> {
    array.array_items().borrow().get(index).copied()
}

/// Appends an item to an array, retaining it on behalf of the array.
pub fn array_push(array: Raw, item: Raw) {
    retain(item);
    array.array_items().borrow_mut().push(item);
}

pub fn dictionary_len(dictionary: Raw) -> usize {
    dictionary.dictionary_entries().borrow().len()
}

/// Looks up a string key without transferring ownership of the result.
/// Entries under non-string keys are never matched.
pub fn dictionary_get(dictionary: Raw, key: &str) -> Option<Raw> {
    let entries = dictionary.dictionary_entries().borrow();
    entries.iter().find_map(|(entry_key, entry_value)| {
        match &entry_key.value().kind {
            Kind::String(contents) if contents == key => Some(*entry_value),
            _ => None,
        }
    })
}

/// Inserts or replaces an entry, retaining both the key and the value on
/// behalf of the dictionary. A displaced entry is released.
pub fn dictionary_set(dictionary: Raw, key: Raw, value: Raw) {
    retain(key);
    retain(value);
    let displaced = {
        let mut entries = dictionary.dictionary_entries().borrow_mut();
        match entries.iter().position(|entry| value_equal(entry.0, key)) {
            Some(index) => Some(std::mem::replace(&mut entries[index], (key, value))),
            None => {
                entries.push((key, value));
                None
            }
        }
    };
    if let Some((old_key, old_value)) = displaced {
        release(old_key);
        release(old_value);
    }
}

/// Returns all entries in insertion order without transferring ownership.
pub fn dictionary_pairs(dictionary: Raw) -> Vec<(Raw, Raw)> {
    dictionary.dictionary_entries().borrow().clone()
}

/// Scalar values compare by contents, containers by identity.
fn value_equal(a: Raw, b: Raw) -> bool {
    if a == b {
        return true;
    }
    match (&a.value().kind, &b.value().kind) {
        (Kind::String(x), Kind::String(y)) => x == y,
        (Kind::Boolean(x), Kind::Boolean(y)) => x == y,
        (Kind::Integer(x), Kind::Integer(y)) => x == y,
        (Kind::Real(x), Kind::Real(y)) => x == y,
        (Kind::Data(x), Kind::Data(y)) => x == y,
        _ => false,
    }
}
