// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Translating a character stream directly into a [Value](Value),
//! without an intermediate token list. Atoms are recognized and
//! converted as they are read; nesting is tracked with an explicit
//! stack of open collections ("frames") instead of recursion, so the
//! depth of the input has no bearing on the depth of the call stack.

use crate::chars::{CharError, Chars};
use crate::escape::resolve_escapes;
use crate::number::{parse_number, Number};
use crate::pos::Pos;
use crate::value::{name2char, shared, Atom, Parenkind, Value};
use chrono::DateTime;
use kstring::KString;
use std::collections::{BTreeMap, HashSet};
use std::io::Read;
use thiserror::Error;
use tracing::{debug, trace};
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("{0} after")]
    Char(CharError),
    #[error("unexpected EOF")]
    UnexpectedEof,
    #[error("premature EOF while expecting closing character '{}' for '{}'",
            .0.closing(), .0.opening())]
    PrematureEofExpectingClosingParen(Parenkind),
    #[error("unexpected EOF in string starting")]
    UnexpectedEofInString,
    #[error("expected '{0}', got '{1}'")]
    ExpectedLiteral(&'static str, String),
    #[error("'{}' {1} expects '{}', got '{}'",
            .0.opening(), .0.closing(), .2.closing())]
    ParenMismatch(Parenkind, Pos, Parenkind),
    #[error("unexpected closing character '{}'", .0.closing())]
    UnexpectedClosingParen(Parenkind),
    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
    #[error("invalid character literal '\\{0}'")]
    InvalidCharLiteral(String),
    #[error("keyword without a name")]
    EmptyKeyword,
    #[error("invalid '#' token")]
    InvalidHashToken,
    #[error("#{0} expects a string, got '{1}'")]
    TagPayloadNotString(&'static str, char),
    #[error("invalid #inst timestamp {0:?} ({1})")]
    InvalidInst(String, chrono::ParseError),
    #[error("invalid #uuid {0:?} ({1})")]
    InvalidUuid(String, uuid::Error),
    #[error("map needs an even number of forms, got {0}")]
    OddMapForms(usize),
    #[error("a {0} can't be a map key")]
    InvalidMapKey(&'static str),
}

/// A decode failure with the position it was detected at; this is
/// the error type of all decoding entry points.
#[derive(Error, Debug)]
#[error("{err} {pos}")]
pub struct DecodeErrorWithPos {
    pub err: DecodeError,
    pub pos: Pos
}

impl DecodeError {
    fn at(self, p: Pos) -> DecodeErrorWithPos {
        DecodeErrorWithPos {
            err: self,
            pos: p
        }
    }
}

impl From<CharError> for DecodeError {
    fn from(e: CharError) -> DecodeError {
        DecodeError::Char(e)
    }
}

trait At<T> {
    fn at(self, p: Pos) -> Result<T, DecodeErrorWithPos>;
}

impl<T, E: Into<DecodeError>> At<T> for Result<T, E> {
    fn at(self, p: Pos) -> Result<T, DecodeErrorWithPos> {
        match self {
            Err(e) => Err(e.into().at(p)),
            Ok(v) => Ok(v)
        }
    }
}

fn is_stop_char(c: char) -> bool {
    matches!(c, ' ' | ',' | '\n' | '\r' | '\t')
}

fn is_number_char(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E' | 'M' | 'N')
}

/// Characters that may directly follow an atom and start the next
/// form.
fn is_opener(c: char) -> bool {
    matches!(c, '#' | '[' | '{' | '(' | '"')
}

/// Where keywords, character literals and `##` names end.
fn is_token_end(c: char) -> bool {
    is_stop_char(c)
        || Parenkind::from_closing(c).is_some()
        || matches!(c, '[' | '{' | '(' | '"')
}

/// What a form is, judging from its first character(s).
#[derive(Debug, Clone, Copy, PartialEq)]
enum Lead {
    Number,
    Boolean(bool),
    Nil,
    Char,
    Keyword,
    String,
    Set,
    NamespacedMap,
    Inst,
    Uuid,
    Map,
    /// Vector (`Square`) or list (`Round`)
    List(Parenkind),
    /// `##Inf` and friends
    Symbolic,
    Close(Parenkind),
}

#[derive(Debug, Clone, PartialEq)]
enum FrameKind {
    Sequence,
    Set,
    Map,
    NamespacedMap(KString),
}

/// An open collection and the members read so far.
#[derive(Debug)]
struct Frame {
    kind: FrameKind,
    paren: Parenkind,
    start: Pos,
    items: Vec<Value>,
}

fn map_key(k: &Value) -> Result<KString, DecodeError> {
    match k {
        Value::Atom(Atom::String(s)) => Ok(s.clone()),
        Value::Atom(a) => Ok(KString::from(a.to_string())),
        other => Err(DecodeError::InvalidMapKey(other.kind())),
    }
}

impl Frame {
    /// Turn the members into the collection value.
    fn fold(self) -> Result<Value, DecodeError> {
        let Frame { kind, items, .. } = self;
        match kind {
            FrameKind::Sequence => Ok(Value::Seq(shared(items))),
            FrameKind::Set => {
                if items.iter().all(|v| v.as_atom().is_some()) {
                    let set: HashSet<Atom> =
                        items.iter().filter_map(|v| v.as_atom().cloned()).collect();
                    Ok(Value::Set(shared(set)))
                } else {
                    // Only atoms can be hashed; keep the members in
                    // order instead of failing.
                    debug!("set with {} members contains collections, \
                            decoding it as a sequence", items.len());
                    Ok(Value::Seq(shared(items)))
                }
            }
            FrameKind::Map | FrameKind::NamespacedMap(_) => {
                if items.len() % 2 != 0 {
                    return Err(DecodeError::OddMapForms(items.len()))
                }
                let ns = match &kind {
                    FrameKind::NamespacedMap(ns) if !ns.is_empty() => Some(ns),
                    _ => None,
                };
                let mut map = BTreeMap::new();
                let mut it = items.into_iter();
                while let (Some(k), Some(v)) = (it.next(), it.next()) {
                    let k = map_key(&k)?;
                    let k = match ns {
                        Some(ns) => KString::from(format!("{}/{}", ns, k)),
                        None => k,
                    };
                    map.insert(k, v);
                }
                Ok(Value::Map(shared(map)))
            }
        }
    }
}

/// Reads values from `R`. All state of a `decode` call (the frame
/// stack) is dropped when the call returns; only the characters
/// looked at but not used (at most a few) stay with the decoder.
pub struct Decoder<R> {
    cs: Chars<R>,
    stack: Vec<Frame>,
    tmp: String,
}

impl<R: Read> Decoder<R> {
    pub fn new(inp: R) -> Decoder<R> {
        Decoder {
            cs: Chars::new(inp),
            stack: Vec::new(),
            tmp: String::new(),
        }
    }

    fn next(&mut self) -> Result<Option<(char, Pos)>, DecodeErrorWithPos> {
        let pos = self.cs.pos();
        self.cs.next().at(pos)
    }

    fn peek(&mut self) -> Result<Option<char>, DecodeErrorWithPos> {
        let pos = self.cs.pos();
        self.cs.peek().at(pos)
    }

    fn accept(&mut self, word: &str) -> Result<bool, DecodeErrorWithPos> {
        let pos = self.cs.pos();
        self.cs.accept(word).at(pos)
    }

    fn skip_whitespace(&mut self) -> Result<Option<(char, Pos)>, DecodeErrorWithPos> {
        loop {
            match self.next()? {
                Some((c, _)) if is_stop_char(c) => {}
                other => return Ok(other),
            }
        }
    }

    fn eof_error(&self) -> DecodeErrorWithPos {
        if let Some(frame) = self.stack.last() {
            DecodeError::PrematureEofExpectingClosingParen(frame.paren)
                .at(frame.start)
        } else {
            DecodeError::UnexpectedEof.at(self.cs.pos())
        }
    }

    fn classify(&mut self, c: char, pos: Pos) -> Result<Lead, DecodeErrorWithPos> {
        Ok(match c {
            '0'..='9' | '-' => Lead::Number,
            't' => Lead::Boolean(true),
            'f' => Lead::Boolean(false),
            'n' => Lead::Nil,
            '\\' => Lead::Char,
            ':' => Lead::Keyword,
            '"' => Lead::String,
            '{' => Lead::Map,
            '(' => Lead::List(Parenkind::Round),
            '[' => Lead::List(Parenkind::Square),
            '#' => match self.peek()? {
                Some('{') => Lead::Set,
                Some(':') => Lead::NamespacedMap,
                Some('#') => Lead::Symbolic,
                _ => {
                    if self.accept("inst")? {
                        Lead::Inst
                    } else if self.accept("uuid")? {
                        Lead::Uuid
                    } else {
                        return Err(DecodeError::InvalidHashToken.at(pos))
                    }
                }
            },
            _ => {
                if let Some(pk) = Parenkind::from_closing(c) {
                    Lead::Close(pk)
                } else {
                    return Err(DecodeError::UnexpectedChar(c).at(pos))
                }
            }
        })
    }

    /// Look at the character that ended an atom: whitespace and EOF
    /// are fine, a closing character is handed to the caller, the
    /// start of another form is put back.
    fn delimit(
        &mut self,
        end: Option<(char, Pos)>
    ) -> Result<Option<(Parenkind, Pos)>, DecodeErrorWithPos> {
        match end {
            None => Ok(None),
            Some((c, pos)) => {
                if is_stop_char(c) {
                    Ok(None)
                } else if let Some(pk) = Parenkind::from_closing(c) {
                    Ok(Some((pk, pos)))
                } else if is_opener(c) {
                    // e.g. the second vector in [23[12]]
                    self.cs.unread((c, pos));
                    Ok(None)
                } else {
                    Err(DecodeError::UnexpectedChar(c).at(pos))
                }
            }
        }
    }

    /// Collect characters into `self.tmp` (after clearing it) until
    /// `stop` says so; returns the stopping character.
    fn read_until(
        &mut self,
        stop: fn(char) -> bool
    ) -> Result<Option<(char, Pos)>, DecodeErrorWithPos> {
        self.tmp.clear();
        loop {
            match self.next()? {
                Some((c, _)) if !stop(c) => self.tmp.push(c),
                other => return Ok(other),
            }
        }
    }

    /// The rest of `true`, `false` or `nil`, the first character
    /// having been read already.
    fn read_literal(
        &mut self,
        word: &'static str,
        pos: Pos
    ) -> Result<Option<(Parenkind, Pos)>, DecodeErrorWithPos> {
        let mut got = String::new();
        for expected in word.chars() {
            if got.is_empty() {
                got.push(expected);
                continue
            }
            match self.next()? {
                Some((c, _)) => {
                    got.push(c);
                    if c != expected {
                        return Err(DecodeError::ExpectedLiteral(word, got).at(pos))
                    }
                }
                None => return Err(DecodeError::ExpectedLiteral(word, got).at(pos)),
            }
        }
        let end = self.next()?;
        self.delimit(end)
    }

    fn read_number(
        &mut self,
        c: char,
        pos: Pos
    ) -> Result<(Value, Option<(Parenkind, Pos)>), DecodeErrorWithPos> {
        let end = self.read_until(|c| !is_number_char(c))?;
        self.tmp.insert(0, c);
        let n = match parse_number(&self.tmp) {
            Some(n) => n,
            None => return Err(DecodeError::InvalidNumber(self.tmp.clone()).at(pos)),
        };
        Ok((Value::from(n), self.delimit(end)?))
    }

    /// After the backslash: a single character, a name like
    /// `newline`, `uXXXX` or `oNNN`.
    fn read_char_literal(
        &mut self,
        pos: Pos
    ) -> Result<(Value, Option<(Parenkind, Pos)>), DecodeErrorWithPos> {
        let first = match self.next()? {
            Some((c, _)) => c,
            None => return Err(DecodeError::UnexpectedEof.at(pos)),
        };
        let end = self.read_until(is_token_end)?;
        let c = if self.tmp.is_empty() {
            Some(first)
        } else {
            self.tmp.insert(0, first);
            let digits = &self.tmp[first.len_utf8()..];
            match first {
                'u' if digits.len() == 4 =>
                    u32::from_str_radix(digits, 16).ok().and_then(char::from_u32),
                'o' if digits.len() <= 3 =>
                    u32::from_str_radix(digits, 8).ok().and_then(char::from_u32),
                _ => name2char(&self.tmp),
            }
        };
        match c {
            Some(c) => {
                let mut buf = [0u8; 4];
                Ok((Value::from(&*c.encode_utf8(&mut buf)), self.delimit(end)?))
            }
            None => Err(DecodeError::InvalidCharLiteral(self.tmp.clone()).at(pos)),
        }
    }

    fn read_keyword(
        &mut self,
        pos: Pos
    ) -> Result<(Value, Option<(Parenkind, Pos)>), DecodeErrorWithPos> {
        let end = self.read_until(is_token_end)?;
        if self.tmp.is_empty() {
            return Err(DecodeError::EmptyKeyword.at(pos))
        }
        let v = Value::from(self.tmp.as_str());
        Ok((v, self.delimit(end)?))
    }

    /// The body of a string literal, after the opening quote. A quote
    /// ends it unless it's preceded by an odd number of backslashes.
    fn read_string(&mut self, pos: Pos) -> Result<KString, DecodeErrorWithPos> {
        self.tmp.clear();
        let mut backslashes = 0;
        loop {
            match self.next()? {
                Some(('"', _)) if backslashes % 2 == 0 => break,
                Some((c, _)) => {
                    if c == '\\' {
                        backslashes += 1;
                    } else {
                        backslashes = 0;
                    }
                    self.tmp.push(c);
                }
                None => return Err(DecodeError::UnexpectedEofInString.at(pos)),
            }
        }
        Ok(KString::from_ref(&resolve_escapes(&self.tmp)))
    }

    /// The string following a `#inst` or `#uuid` tag.
    fn read_tag_payload(
        &mut self,
        tag: &'static str,
    ) -> Result<(String, Pos), DecodeErrorWithPos> {
        match self.skip_whitespace()? {
            Some(('"', pos)) => Ok((self.read_string(pos)?.to_string(), pos)),
            Some((c, pos)) => Err(DecodeError::TagPayloadNotString(tag, c).at(pos)),
            None => Err(self.eof_error()),
        }
    }

    fn read_inst(&mut self) -> Result<Value, DecodeErrorWithPos> {
        let (s, pos) = self.read_tag_payload("inst")?;
        match DateTime::parse_from_rfc3339(&s) {
            Ok(t) => Ok(Value::Atom(Atom::Inst(t))),
            Err(e) => Err(DecodeError::InvalidInst(s, e).at(pos)),
        }
    }

    fn read_uuid(&mut self) -> Result<Value, DecodeErrorWithPos> {
        let (s, pos) = self.read_tag_payload("uuid")?;
        match Uuid::parse_str(&s) {
            Ok(u) => Ok(Value::Atom(Atom::Uuid(u))),
            Err(e) => Err(DecodeError::InvalidUuid(s, e).at(pos)),
        }
    }

    /// `##Inf`, `##-Inf`, `##NaN`; the first `#` has been read.
    fn read_symbolic(
        &mut self,
        pos: Pos
    ) -> Result<(Value, Option<(Parenkind, Pos)>), DecodeErrorWithPos> {
        self.next()?;
        let end = self.read_until(is_token_end)?;
        let x = match self.tmp.as_str() {
            "Inf" => f64::INFINITY,
            "-Inf" => f64::NEG_INFINITY,
            "NaN" => f64::NAN,
            _ => return Err(DecodeError::InvalidHashToken.at(pos)),
        };
        Ok((Value::from(Number::Float(x)), self.delimit(end)?))
    }

    /// The namespace of `#:ns{`, the `#` having been read.
    fn read_namespace(&mut self, pos: Pos) -> Result<KString, DecodeErrorWithPos> {
        self.next()?;
        self.tmp.clear();
        loop {
            match self.next()? {
                Some(('{', _)) => break,
                Some((c, p)) => {
                    if is_stop_char(c) || !is_token_end(c) {
                        self.tmp.push(c);
                    } else {
                        return Err(DecodeError::UnexpectedChar(c).at(p))
                    }
                }
                None => return Err(DecodeError::UnexpectedEof.at(pos)),
            }
        }
        let ns = self.tmp.trim();
        if ns.is_empty() || ns.contains(is_stop_char) {
            return Err(DecodeError::InvalidHashToken.at(pos))
        }
        Ok(KString::from_ref(ns))
    }

    fn open(&mut self, kind: FrameKind, paren: Parenkind, start: Pos) {
        trace!("open {:?} at depth {}", kind, self.stack.len());
        self.stack.push(Frame { kind, paren, start, items: Vec::new() });
    }

    /// Add a finished value to the innermost frame, or hand it back
    /// if there is none (it's the root).
    fn emit(&mut self, v: Value) -> Option<Value> {
        if let Some(frame) = self.stack.last_mut() {
            frame.items.push(v);
            None
        } else {
            Some(v)
        }
    }

    /// A closing character was read: it has to match the innermost
    /// frame, which is then folded into its collection value.
    fn close(
        &mut self,
        pk: Parenkind,
        pos: Pos
    ) -> Result<Option<Value>, DecodeErrorWithPos> {
        let frame = match self.stack.pop() {
            Some(frame) => frame,
            None => return Err(DecodeError::UnexpectedClosingParen(pk).at(pos)),
        };
        if frame.paren != pk {
            return Err(DecodeError::ParenMismatch(frame.paren, frame.start, pk)
                       .at(pos))
        }
        trace!("close {:?} with {} items at depth {}",
               frame.kind, frame.items.len(), self.stack.len());
        let start = frame.start;
        let v = frame.fold().at(start)?;
        Ok(self.emit(v))
    }

    /// Read exactly one value.
    pub fn decode(&mut self) -> Result<Value, DecodeErrorWithPos> {
        self.stack.clear();
        loop {
            let (c, pos) = match self.skip_whitespace()? {
                Some(cp) => cp,
                None => return Err(self.eof_error()),
            };
            let (v, end) = match self.classify(c, pos)? {
                Lead::List(pk) => {
                    self.open(FrameKind::Sequence, pk, pos);
                    continue
                }
                Lead::Map => {
                    self.open(FrameKind::Map, Parenkind::Curly, pos);
                    continue
                }
                Lead::Set => {
                    self.next()?;
                    self.open(FrameKind::Set, Parenkind::Curly, pos);
                    continue
                }
                Lead::NamespacedMap => {
                    let ns = self.read_namespace(pos)?;
                    self.open(FrameKind::NamespacedMap(ns), Parenkind::Curly, pos);
                    continue
                }
                Lead::Close(pk) => {
                    if let Some(root) = self.close(pk, pos)? {
                        debug!("decoded a {}", root.kind());
                        return Ok(root)
                    }
                    continue
                }
                Lead::Boolean(b) => {
                    let word = if b { "true" } else { "false" };
                    (Value::from(b), self.read_literal(word, pos)?)
                }
                Lead::Nil => (Value::nil(), self.read_literal("nil", pos)?),
                Lead::Number => self.read_number(c, pos)?,
                Lead::Char => self.read_char_literal(pos)?,
                Lead::Keyword => self.read_keyword(pos)?,
                Lead::String => (Value::Atom(Atom::String(self.read_string(pos)?)), None),
                Lead::Inst => (self.read_inst()?, None),
                Lead::Uuid => (self.read_uuid()?, None),
                Lead::Symbolic => self.read_symbolic(pos)?,
            };
            if let Some(root) = self.emit(v) {
                if let Some((pk, p)) = end {
                    return Err(DecodeError::UnexpectedClosingParen(pk).at(p))
                }
                debug!("decoded a {}", root.kind());
                return Ok(root)
            }
            if let Some((pk, p)) = end {
                if let Some(root) = self.close(pk, p)? {
                    debug!("decoded a {}", root.kind());
                    return Ok(root)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use bigdecimal::BigDecimal;
    use std::str::FromStr;

    fn decode(s: &str) -> Result<Value, DecodeErrorWithPos> {
        Decoder::new(s.as_bytes()).decode()
    }

    fn ints(ns: &[i64]) -> Value {
        Value::seq(ns.iter().map(|n| Value::from(*n)))
    }

    #[test]
    fn scalars() -> Result<()> {
        assert_eq!(decode("\"helloworld\"")?, Value::from("helloworld"));
        assert_eq!(decode("23")?, Value::from(23));
        assert_eq!(decode("23.11")?, Value::from(23.11));
        assert_eq!(decode("true")?, Value::from(true));
        assert_eq!(decode("false")?, Value::from(false));
        assert_eq!(decode("nil")?, Value::nil());
        assert_eq!(decode(":hello")?, Value::from("hello"));
        assert_eq!(decode(r#""string\"ing""#)?, Value::from("string\"ing"));
        assert_eq!(decode(r#""string\n""#)?, Value::from("string\n"));
        assert_eq!(decode("12.34M")?,
                   Value::from(Number::Decimal(BigDecimal::from_str("12.34")?)));
        Ok(())
    }

    #[test]
    fn vectors_and_lists_are_the_same() -> Result<()> {
        assert_eq!(decode("[1 2 3]")?, ints(&[1, 2, 3]));
        assert_eq!(decode("(1 2 3)")?, ints(&[1, 2, 3]));
        assert_eq!(decode("[1     2 3,4]")?, ints(&[1, 2, 3, 4]));
        assert_eq!(decode("[]")?, ints(&[]));
        Ok(())
    }

    #[test]
    fn nesting_without_whitespace() -> Result<()> {
        assert_eq!(decode("[23[12]]")?,
                   Value::seq([Value::from(23), ints(&[12])]));
        assert_eq!(decode("[[1]]")?, Value::seq([ints(&[1])]));
        assert_eq!(decode("[1(2)#{3}]")?,
                   Value::seq([Value::from(1), ints(&[2]),
                               Value::set([Atom::from(3)])]));
        assert_eq!(decode("[:a\"b\"]")?,
                   Value::seq([Value::from("a"), Value::from("b")]));
        Ok(())
    }

    #[test]
    fn maps() -> Result<()> {
        assert_eq!(decode("{:a 1 :b 2}")?,
                   Value::map([("a", Value::from(1)), ("b", Value::from(2))]));
        assert_eq!(decode("#:ns{:a 1}")?, Value::map([("ns/a", Value::from(1))]));
        assert_eq!(decode("{:a [1 2 3] :b #{23.1 43.1 33.1}}")?,
                   Value::map([("a", ints(&[1, 2, 3])),
                               ("b", Value::set([Atom::from(23.1),
                                                 Atom::from(43.1),
                                                 Atom::from(33.1)]))]));
        assert_eq!(decode("{1 :one nil :none}")?,
                   Value::map([("1", Value::from("one")),
                               ("nil", Value::from("none"))]));
        assert_eq!(decode("{}")?, Value::map::<&str>([]));
        Ok(())
    }

    #[test]
    fn sets() -> Result<()> {
        assert_eq!(decode("#{true \"hello\" 12}")?,
                   Value::set([Atom::Bool(true), Atom::from("hello"), Atom::from(12)]));
        assert_eq!(decode("#{1 1 2}")?, Value::set([Atom::from(1), Atom::from(2)]));
        Ok(())
    }

    #[test]
    fn set_of_collections_degrades_to_sequence() -> Result<()> {
        assert_eq!(decode("#{[1] 2}")?, Value::seq([ints(&[1]), Value::from(2)]));
        Ok(())
    }

    #[test]
    fn characters() -> Result<()> {
        assert_eq!(decode("(\\a \\b \\c \\d)")?,
                   Value::seq(["a", "b", "c", "d"].map(Value::from)));
        assert_eq!(decode("[\\newline \\space \\u00e9 \\o101 \\(]")?,
                   Value::seq(["\n", " ", "é", "A", "("].map(Value::from)));
        assert!(matches!(decode("\\foo").map_err(|e| e.err),
                         Err(DecodeError::InvalidCharLiteral(_))));
        Ok(())
    }

    #[test]
    fn tagged_literals() -> Result<()> {
        let t = DateTime::parse_from_rfc3339("1985-04-12T23:20:50.52Z")?;
        assert_eq!(decode("#inst \"1985-04-12T23:20:50.52Z\"")?,
                   Value::Atom(Atom::Inst(t)));
        let u = Uuid::parse_str("f81d4fae-7dec-11d0-a765-00a0c91e6bf6")?;
        assert_eq!(decode("[#uuid \"f81d4fae-7dec-11d0-a765-00a0c91e6bf6\" 1]")?,
                   Value::seq([Value::from(u), Value::from(1)]));
        assert!(matches!(decode("#inst 12").map_err(|e| e.err),
                         Err(DecodeError::TagPayloadNotString("inst", '1'))));
        assert!(matches!(decode("#uuid \"nope\"").map_err(|e| e.err),
                         Err(DecodeError::InvalidUuid(..))));
        Ok(())
    }

    #[test]
    fn symbolic_floats() -> Result<()> {
        assert_eq!(decode("##Inf")?, Value::from(f64::INFINITY));
        assert_eq!(decode("[##-Inf]")?, Value::seq([Value::from(f64::NEG_INFINITY)]));
        assert_eq!(decode("##NaN")?, Value::from(f64::NAN));
        Ok(())
    }

    #[test]
    fn string_ending_in_escaped_backslash() -> Result<()> {
        assert_eq!(decode(r#"["a\\" "b"]"#)?,
                   Value::seq([Value::from("a\\"), Value::from("b")]));
        Ok(())
    }

    #[test]
    fn errors() {
        let err = |s: &str| decode(s).unwrap_err();
        assert!(matches!(err("[1 2").err,
                         DecodeError::PrematureEofExpectingClosingParen(Parenkind::Square)));
        assert!(matches!(err("truX").err, DecodeError::ExpectedLiteral("true", _)));
        assert!(matches!(err("nul").err, DecodeError::ExpectedLiteral("nil", _)));
        assert!(matches!(err("[1 2)").err, DecodeError::ParenMismatch(..)));
        assert!(matches!(err("[(1]").err, DecodeError::ParenMismatch(..)));
        assert!(matches!(err("]").err, DecodeError::UnexpectedClosingParen(_)));
        assert!(matches!(err("@").err, DecodeError::UnexpectedChar('@')));
        assert!(matches!(err("\"abc").err, DecodeError::UnexpectedEofInString));
        assert!(matches!(err("").err, DecodeError::UnexpectedEof));
        assert!(matches!(err("12x").err, DecodeError::UnexpectedChar('x')));
        assert!(matches!(err("1-2").err, DecodeError::InvalidNumber(_)));
        assert!(matches!(err("{:a}").err, DecodeError::OddMapForms(1)));
        assert!(matches!(err("{[1] 2}").err, DecodeError::InvalidMapKey("sequence")));
        assert!(matches!(err("#foo").err, DecodeError::InvalidHashToken));
    }

    #[test]
    fn error_positions() {
        let e = decode("[1\n 2 )").unwrap_err();
        assert_eq!(e.pos, Pos { line: 1, col: 3 });
        assert_eq!(e.to_string(), "'[' @1.0 expects ']', got ')' @2.3");
    }

    #[test]
    fn stops_right_after_the_value() -> Result<()> {
        let mut inp = "[1 2] rest".as_bytes();
        let v = Decoder::new(&mut inp).decode()?;
        assert_eq!(v, ints(&[1, 2]));
        assert_eq!(inp, b" rest");
        Ok(())
    }

    #[test]
    fn successive_values() -> Result<()> {
        let mut d = Decoder::new("1 [2] :x".as_bytes());
        assert_eq!(d.decode()?, Value::from(1));
        assert_eq!(d.decode()?, ints(&[2]));
        assert_eq!(d.decode()?, Value::from("x"));
        Ok(())
    }

    #[test]
    fn deep_nesting() -> Result<()> {
        let depth = 100_000;
        let text = format!("{}{}", "[".repeat(depth), "]".repeat(depth));
        let v = decode(&text)?;
        let mut d = 0;
        let mut cur = v.clone();
        loop {
            let next = match &cur {
                Value::Seq(items) => items.borrow().first().cloned(),
                _ => None,
            };
            d += 1;
            match next {
                Some(n) => cur = n,
                None => break,
            }
        }
        assert_eq!(d, depth);
        drop(cur);
        drop(v);
        Ok(())
    }

    #[test]
    fn deep_nesting_with_errors() {
        let depth = 100_000;
        let open = "[".repeat(depth);
        let close = "]".repeat(depth);
        let e = decode(&format!("[{}{})", open, close)).unwrap_err();
        assert!(matches!(e.err, DecodeError::ParenMismatch(Parenkind::Square, _,
                                                            Parenkind::Round)));
        let e = decode(&format!("{{{}{}}}", open, close)).unwrap_err();
        assert!(matches!(e.err, DecodeError::OddMapForms(1)));
        let e = decode(&format!("{{{}{} 1}}", open, close)).unwrap_err();
        assert!(matches!(e.err, DecodeError::InvalidMapKey("sequence")));
        let e = decode(&format!("[{}{}", open, close)).unwrap_err();
        assert!(matches!(e.err, DecodeError::PrematureEofExpectingClosingParen(_)));
    }
}
