// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A decoder and encoder for Clojure style data literals (EDN):
//! vectors, lists, sets, maps, keywords, characters, strings,
//! numbers (including `M` decimals), `#inst` timestamps and `#uuid`
//! identifiers.
//!
//! * Decoding is single pass and streaming: characters are pulled
//!   from any `Read` as needed, atoms are converted as they are
//!   recognized, and nesting is tracked with an explicit stack, so
//!   input nesting depth is not limited by the call stack.
//!
//! * Keywords and characters decode to strings, vectors and lists
//!   both decode to sequences, map keys are always strings (a
//!   namespaced map `#:ns{:a 1}` gives the key `"ns/a"`).
//!
//! * Encoding is deterministic: single spaces, map entries in key
//!   order, set members in the order of their text. A collection met
//!   twice during one encode (a cycle, or sharing) is an error.
//!
//! Good error reporting is a goal: decoding errors carry the
//! position (line and column) where the problem was detected.

pub mod chars;
pub mod decode;
pub mod encode;
pub mod escape;
pub mod number;
pub mod pos;
pub mod read;
pub mod value;

pub use read::{decode_from_stream, decode_from_text, decode_file,
               encode_to_stream, encode_to_text, encode_file};
pub use value::{Atom, Value};
