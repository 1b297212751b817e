//
// Copyright 2026 cfplist Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! # cfplist
//!
//! Property list documents behind a reference-counted native value engine.
//!
//! A [`Document`] wraps a dictionary-rooted native value graph. Documents are
//! parsed from and serialized to the two interchangeable wire formats
//! (PropertyList-1.0 XML and bplist00 binary), and individual entries cross
//! the API boundary as managed [`Value`]s.

mod codec;
mod convert;
mod document;
mod engine;
mod error;

pub mod value;
pub use value::Value;

pub use codec::Format;
pub use document::{Document, OutputFormat};
pub use error::{Error, Result};
