// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The entry points: decoding from / encoding to streams, strings
//! and files. Streams are never opened or closed here, except for
//! the file variants.

use crate::decode::{Decoder, DecodeErrorWithPos};
use crate::encode::{Encoder, EncodeError};
use crate::value::Value;
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Where a stream comes from or goes to, for error messages.
#[derive(Debug, Clone)]
pub enum Origin {
    File(PathBuf),
    /// A stream without a path, like stdin
    Named(String),
}

impl Display for Origin {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            Origin::File(path) => f.write_fmt(format_args!("{:?}", path)),
            Origin::Named(name) => f.write_fmt(format_args!("({})", name)),
        }
    }
}

/// An error together with the stream it happened on.
#[derive(Error, Debug)]
pub enum LocatedError {
    #[error("{1}: {0}")]
    IO(std::io::Error, Origin),
    // Pos directly follows the origin, Emacs style
    #[error("{} in {}{}", .0.err, .1, .0.pos)]
    Decode(DecodeErrorWithPos, Origin),
    #[error("{0} while writing {1}")]
    Encode(EncodeError, Origin),
}

impl DecodeErrorWithPos {
    pub fn located(self, origin: Origin) -> LocatedError {
        LocatedError::Decode(self, origin)
    }
}

impl EncodeError {
    pub fn located(self, origin: Origin) -> LocatedError {
        LocatedError::Encode(self, origin)
    }
}

/// Read one value from `inp`, leaving it positioned right after the
/// value's last character (or the delimiter that ended it).
pub fn decode_from_stream(inp: impl Read) -> Result<Value, DecodeErrorWithPos> {
    Decoder::new(inp).decode()
}

pub fn decode_from_text(s: &str) -> Result<Value, DecodeErrorWithPos> {
    decode_from_stream(s.as_bytes())
}

pub fn decode_file(path: &Path) -> Result<Value, LocatedError> {
    let origin = || Origin::File(path.to_path_buf());
    let fh = File::open(path).map_err(|e| LocatedError::IO(e, origin()))?;
    decode_from_stream(BufReader::new(fh)).map_err(|e| e.located(origin()))
}

pub fn encode_to_stream(v: &Value, out: impl Write) -> Result<(), EncodeError> {
    Encoder::new(out).encode(v)
}

pub fn encode_to_text(v: &Value) -> Result<String, EncodeError> {
    let mut out = Vec::new();
    encode_to_stream(v, &mut out)?;
    // only ever ASCII
    Ok(String::from_utf8_lossy(&out).into_owned())
}

pub fn encode_file(path: &Path, v: &Value) -> Result<(), LocatedError> {
    let origin = || Origin::File(path.to_path_buf());
    let fh = File::create(path).map_err(|e| LocatedError::IO(e, origin()))?;
    let mut out = BufWriter::new(fh);
    encode_to_stream(v, &mut out).map_err(|e| e.located(origin()))?;
    out.flush().map_err(|e| LocatedError::IO(e, origin()))
}
