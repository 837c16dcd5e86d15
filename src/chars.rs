// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Get characters and their positions from anything implementing
//! `Read`.

//! Bytes are pulled one at a time, so that the underlying reader is
//! never advanced past the last character the decoder asked for.
//! Wrap unbuffered sources (files, sockets) in a `BufReader` for
//! speed. Characters that were looked at but not used can be handed
//! back via `unread`.

use crate::pos::Pos;
use std::io::{self, Read};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CharError {
    #[error("IO error ({0})")]
    IO(io::Error),
    #[error("invalid UTF-8 sequence {0:?}")]
    InvalidUtf8(Vec<u8>),
}

pub struct Chars<R> {
    inp: R,
    pos: Pos,
    pushback: Vec<(char, Pos)>,
}

impl<R: Read> Chars<R> {
    pub fn new(inp: R) -> Chars<R> {
        Chars {
            inp,
            pos: Pos::default(),
            pushback: Vec::new(),
        }
    }

    /// The position of the character that `next` would return.
    pub fn pos(&self) -> Pos {
        if let Some((_, p)) = self.pushback.last() {
            *p
        } else {
            self.pos
        }
    }

    fn read_byte(&mut self) -> Result<Option<u8>, CharError> {
        let mut buf = [0u8; 1];
        loop {
            match self.inp.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(buf[0])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(CharError::IO(e)),
            }
        }
    }

    fn read_char(&mut self) -> Result<Option<char>, CharError> {
        let b = match self.read_byte()? {
            None => return Ok(None),
            Some(b) => b,
        };
        if b.is_ascii() {
            return Ok(Some(b as char))
        }
        let mut incomplete = match utf8::decode(&[b]) {
            Ok(s) => return Ok(s.chars().next()),
            Err(utf8::DecodeError::Incomplete { incomplete_suffix, .. }) =>
                incomplete_suffix,
            Err(utf8::DecodeError::Invalid { invalid_sequence, .. }) =>
                return Err(CharError::InvalidUtf8(invalid_sequence.to_vec())),
        };
        loop {
            let b = match self.read_byte()? {
                Some(b) => b,
                None => {
                    let len = incomplete.buffer_len as usize;
                    return Err(CharError::InvalidUtf8(
                        incomplete.buffer[..len].to_vec()))
                }
            };
            match incomplete.try_complete(&[b]) {
                None => {}
                Some((Ok(s), _)) => return Ok(s.chars().next()),
                Some((Err(bad), _)) =>
                    return Err(CharError::InvalidUtf8(bad.to_vec())),
            }
        }
    }

    /// Returns `Ok(None)` at EOF.
    pub fn next(&mut self) -> Result<Option<(char, Pos)>, CharError> {
        if let Some(cp) = self.pushback.pop() {
            return Ok(Some(cp))
        }
        if let Some(c) = self.read_char()? {
            let pos = self.pos;
            self.pos = pos.after(c);
            Ok(Some((c, pos)))
        } else {
            Ok(None)
        }
    }

    /// Hand back a character (with the position it was read at) so
    /// that the next call to `next` returns it again.
    pub fn unread(&mut self, cp: (char, Pos)) {
        self.pushback.push(cp);
    }

    pub fn peek(&mut self) -> Result<Option<char>, CharError> {
        if let Some(cp) = self.next()? {
            self.unread(cp);
            Ok(Some(cp.0))
        } else {
            Ok(None)
        }
    }

    /// Consume `word` if the upcoming characters spell it out;
    /// otherwise leave the stream as it was.
    pub fn accept(&mut self, word: &str) -> Result<bool, CharError> {
        let mut seen = Vec::new();
        for w in word.chars() {
            match self.next()? {
                Some(cp) => {
                    seen.push(cp);
                    if cp.0 != w {
                        break
                    }
                }
                None => break,
            }
        }
        let matched = seen.len() == word.chars().count()
            && seen.iter().map(|cp| cp.0).eq(word.chars());
        if !matched {
            while let Some(cp) = seen.pop() {
                self.unread(cp);
            }
        }
        Ok(matched)
    }
}
