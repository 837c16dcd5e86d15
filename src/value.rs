// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Runtime data types representing a decoded value.

//! Whereas [Atom](Atom) does not include collections, [Value](Value)
//! adds vectors/lists, sets and maps. Collections are held through
//! shared handles ([Shared](Shared)), which gives them an identity
//! separate from their contents; this is what the encoder uses to
//! detect cycles. Equality compares contents (except for
//! [Opaque](Opaque)). Neither comparing nor dropping a value recurses,
//! so arbitrarily deep values are fine.

use crate::escape::{write_quoted, Quoted};
use crate::number::Number;
use chrono::{DateTime, FixedOffset, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use kstring::KString;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};
use std::fmt::{self, Debug, Display};
use std::rc::Rc;
use uuid::Uuid;

pub type Shared<T> = Rc<RefCell<T>>;

pub fn shared<T>(v: T) -> Shared<T> {
    Rc::new(RefCell::new(v))
}

/// The scalars. Only atoms can be members of a set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Atom {
    Nil,
    Bool(bool),
    Number(Number),
    /// Also what keywords (`:foo`) and characters (`\a`) decode to
    String(KString),
    /// `#inst`
    Inst(DateTime<FixedOffset>),
    /// `#uuid`
    Uuid(Uuid),
}

/// The canonical literal text.
impl Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Atom::Nil => f.write_str("nil"),
            Atom::Bool(b) => f.write_str(if *b { "true" } else { "false" }),
            Atom::Number(n) => Display::fmt(n, f),
            Atom::String(s) => write_quoted(f, s),
            Atom::Inst(t) => f.write_fmt(format_args!(
                "#inst {}",
                Quoted(&t.to_rfc3339_opts(SecondsFormat::AutoSi, true)))),
            Atom::Uuid(u) => f.write_fmt(format_args!("#uuid \"{}\"", u.hyphenated())),
        }
    }
}

/// Something the codec has no literal syntax for; written out as a
/// string holding its `Display` text, and read back as that string.
#[derive(Clone)]
pub struct Opaque(pub Rc<dyn Display>);

impl Debug for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("Opaque({})", self.0))
    }
}

/// Opaque values have no contents the codec knows about, so two of
/// them are only equal if they are the same object.
impl PartialEq for Opaque {
    fn eq(&self, other: &Opaque) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

#[derive(Debug, Clone)]
pub enum Value {
    Atom(Atom),
    /// Both `[..]` and `(..)`
    Seq(Shared<Vec<Value>>),
    /// `#{..}`
    Set(Shared<HashSet<Atom>>),
    /// `{..}` and `#:ns{..}`
    Map(Shared<BTreeMap<KString, Value>>),
    Opaque(Opaque),
}

impl Value {
    pub fn nil() -> Value {
        Value::Atom(Atom::Nil)
    }

    pub fn seq(items: impl IntoIterator<Item = Value>) -> Value {
        Value::Seq(shared(items.into_iter().collect()))
    }

    pub fn set(items: impl IntoIterator<Item = Atom>) -> Value {
        Value::Set(shared(items.into_iter().collect()))
    }

    pub fn map<K: Into<KString>>(
        entries: impl IntoIterator<Item = (K, Value)>
    ) -> Value {
        Value::Map(shared(entries.into_iter()
                          .map(|(k, v)| (k.into(), v))
                          .collect()))
    }

    pub fn opaque(x: impl Display + 'static) -> Value {
        Value::Opaque(Opaque(Rc::new(x)))
    }

    pub fn as_atom(&self) -> Option<&Atom> {
        match self {
            Value::Atom(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Atom(Atom::String(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Short name of the variant, for messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Atom(a) => match a {
                Atom::Nil => "nil",
                Atom::Bool(_) => "boolean",
                Atom::Number(Number::Integer(_)) => "integer",
                Atom::Number(Number::Float(_)) => "float",
                Atom::Number(Number::Decimal(_)) => "decimal",
                Atom::String(_) => "string",
                Atom::Inst(_) => "inst",
                Atom::Uuid(_) => "uuid",
            },
            Value::Seq(_) => "sequence",
            Value::Set(_) => "set",
            Value::Map(_) => "map",
            Value::Opaque(_) => "opaque",
        }
    }
}

/// Move the members out of `v` if nothing else holds its collection.
fn take_members(v: &mut Value, out: &mut Vec<Value>) {
    match v {
        Value::Seq(items) => {
            if let Some(items) = Rc::get_mut(items) {
                out.append(items.get_mut());
            }
        }
        Value::Map(entries) => {
            if let Some(entries) = Rc::get_mut(entries) {
                out.extend(std::mem::take(entries.get_mut()).into_values());
            }
        }
        _ => {}
    }
}

impl Drop for Value {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        take_members(self, &mut pending);
        while let Some(mut v) = pending.pop() {
            take_members(&mut v, &mut pending);
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        let mut pending = vec![(self.clone(), other.clone())];
        while let Some((a, b)) = pending.pop() {
            match (&a, &b) {
                (Value::Atom(x), Value::Atom(y)) => {
                    if x != y {
                        return false
                    }
                }
                (Value::Opaque(x), Value::Opaque(y)) => {
                    if x != y {
                        return false
                    }
                }
                (Value::Set(x), Value::Set(y)) => {
                    if !Rc::ptr_eq(x, y) && *x.borrow() != *y.borrow() {
                        return false
                    }
                }
                (Value::Seq(x), Value::Seq(y)) => {
                    if Rc::ptr_eq(x, y) {
                        continue
                    }
                    let (x, y) = (x.borrow(), y.borrow());
                    if x.len() != y.len() {
                        return false
                    }
                    pending.extend(x.iter().cloned().zip(y.iter().cloned()));
                }
                (Value::Map(x), Value::Map(y)) => {
                    if Rc::ptr_eq(x, y) {
                        continue
                    }
                    let (x, y) = (x.borrow(), y.borrow());
                    if x.len() != y.len() {
                        return false
                    }
                    for ((kx, vx), (ky, vy)) in x.iter().zip(y.iter()) {
                        if kx != ky {
                            return false
                        }
                        pending.push((vx.clone(), vy.clone()));
                    }
                }
                _ => return false,
            }
        }
        true
    }
}

impl From<Atom> for Value {
    fn from(a: Atom) -> Value {
        Value::Atom(a)
    }
}

impl From<Number> for Atom {
    fn from(n: Number) -> Atom {
        Atom::Number(n)
    }
}

impl From<i32> for Atom {
    fn from(n: i32) -> Atom {
        Atom::Number(Number::from(n))
    }
}

impl From<i64> for Atom {
    fn from(n: i64) -> Atom {
        Atom::Number(Number::from(n))
    }
}

impl From<f64> for Atom {
    fn from(x: f64) -> Atom {
        Atom::Number(Number::Float(x))
    }
}

impl From<&str> for Atom {
    fn from(s: &str) -> Atom {
        Atom::String(KString::from_ref(s))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Value {
        Value::Atom(Atom::Bool(b))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Value {
        Value::Atom(Atom::String(KString::from_ref(s)))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Value {
        Value::Atom(Atom::String(KString::from(s)))
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Value {
        Value::Atom(Atom::Number(n))
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Value {
        Value::Atom(Atom::from(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Value {
        Value::Atom(Atom::from(n))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Value {
        Value::Atom(Atom::from(x))
    }
}

impl From<Uuid> for Value {
    fn from(u: Uuid) -> Value {
        Value::Atom(Atom::Uuid(u))
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Value {
    fn from(t: DateTime<Tz>) -> Value {
        Value::Atom(Atom::Inst(t.fixed_offset()))
    }
}

/// A timestamp without offset is taken to be in UTC.
impl From<NaiveDateTime> for Value {
    fn from(t: NaiveDateTime) -> Value {
        Value::from(Utc.from_utc_datetime(&t))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parenkind {
    Round,
    Square,
    Curly
}

impl Parenkind {
    pub fn opening(self) -> char {
        match self {
            Parenkind::Round => '(',
            Parenkind::Square => '[',
            Parenkind::Curly => '{'
        }
    }
    pub fn closing(self) -> char {
        match self {
            Parenkind::Round => ')',
            Parenkind::Square => ']',
            Parenkind::Curly => '}'
        }
    }
    pub fn from_closing(c: char) -> Option<Parenkind> {
        match c {
            ')' => Some(Parenkind::Round),
            ']' => Some(Parenkind::Square),
            '}' => Some(Parenkind::Curly),
            _ => None
        }
    }
}

// Clojure's names for character literals, `\newline` etc.

pub fn name2char(s: &str) -> Option<char> {
    match s {
        "backspace" => Some('\x08'),
        "formfeed" => Some('\x0C'),
        "newline" => Some('\n'),
        "return" => Some('\r'),
        "space" => Some(' '),
        "tab" => Some('\t'),
        _ => None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_is_by_content() {
        let a = Value::seq([Value::from(1), Value::from("x")]);
        let b = Value::seq([Value::from(1), Value::from("x")]);
        assert_eq!(a, b);
        if let (Value::Seq(a), Value::Seq(b)) = (&a, &b) {
            assert!(!Rc::ptr_eq(a, b));
        }
        assert_ne!(Value::from(1), Value::from(1.0));
    }

    #[test]
    fn opaque_equality_is_identity() {
        let a = Value::opaque("x");
        assert_eq!(a, a.clone());
        assert_ne!(a, Value::opaque("x"));
        assert_ne!(a, Value::from("x"));
    }

    fn deep(depth: usize) -> Value {
        let mut v = Value::seq([]);
        for i in 0..depth {
            v = if i % 2 == 0 {
                Value::seq([Value::from(1), v])
            } else {
                Value::map([("k", v)])
            };
        }
        v
    }

    #[test]
    fn deep_values_compare_and_drop() {
        let a = deep(200_000);
        let b = deep(200_000);
        assert!(a == b);
        assert!(a != deep(199_999));
        drop(a);
        drop(b);
    }

    #[test]
    fn shared_members_survive_dropping_a_holder() {
        let inner = Value::seq([Value::from(1), Value::from(2)]);
        let outer = Value::seq([inner.clone()]);
        drop(outer);
        assert_eq!(inner, Value::seq([Value::from(1), Value::from(2)]));
    }

    #[test]
    fn naive_timestamps_are_utc() {
        let naive = NaiveDateTime::parse_from_str("2020-01-02 03:04:05",
                                                  "%Y-%m-%d %H:%M:%S").unwrap();
        match Value::from(naive) {
            Value::Atom(Atom::Inst(t)) => {
                assert_eq!(t.offset().local_minus_utc(), 0);
                assert_eq!(t.naive_utc(), naive);
            }
            v => panic!("unexpected {:?}", v),
        }
    }

    #[test]
    fn char_names() {
        assert_eq!(name2char("newline"), Some('\n'));
        assert_eq!(name2char("space"), Some(' '));
        assert_eq!(name2char("alarm"), None);
    }
}
