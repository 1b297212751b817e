//
// Copyright 2026 cfplist Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.
//

//! The bplist00 binary property list codec.

pub mod format;
pub mod reader;
pub mod writer;

mod objects;
mod structure;
mod utils;
