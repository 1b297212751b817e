//
// Copyright 2026 cfplist Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! # The bidirectional conversion engine.
//!
//! [`encode_value`] walks a managed [`crate::Value`] graph and produces an
//! equivalent native value graph; [`decode_value`] mirrors it in the other
//! direction. Both directions fail as a whole: a fault at any recursion
//! level unwinds the entire call, and the scoped handles release every
//! native value the call had constructed up to that point.

mod decode;
mod encode;

pub use decode::decode_value;
pub use encode::{encode_array, encode_dictionary, encode_value};

use crate::engine::{self, Raw};
use crate::error::{Error, Result};

/// Nesting depth cap for both conversion directions. The depth of a value
/// graph is otherwise bounded only by the input, and a hostile document can
/// nest containers arbitrarily.
pub const MAX_DEPTH: usize = 512;

/// Per-call state for one top-level encode.
///
/// Caches the resolved boolean singleton references so a deep recursive walk
/// does not re-resolve them per leaf, and carries the recursion depth.
/// A context is constructed fresh for every top-level call and is never
/// shared across calls.
pub struct EncodeContext {
    true_value: Raw,
    false_value: Raw,
    depth: usize,
}

impl EncodeContext {
    pub fn new() -> Self {
        EncodeContext {
            true_value: engine::boolean(true),
            false_value: engine::boolean(false),
            depth: 0,
        }
    }

    /// Returns the shared singleton for the given boolean; never a fresh
    /// allocation, and never owned by the caller.
    fn boolean(&self, value: bool) -> Raw {
        if value {
            self.true_value
        } else {
            self.false_value
        }
    }

    fn enter(&mut self) -> Result<()> {
        if self.depth == MAX_DEPTH {
            return Err(Error::NestingTooDeep);
        }
        self.depth += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }
}

impl Default for EncodeContext {
    fn default() -> Self {
        EncodeContext::new()
    }
}
