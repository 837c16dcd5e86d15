// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Writing a [Value](Value) in canonical notation: single spaces
//! between items, map entries in key order, set members in the order
//! of their text.

use crate::escape::Quoted;
use crate::value::{Shared, Value};
use kstring::KString;
use std::collections::HashSet;
use std::io::{self, Write};
use std::rc::Rc;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("circular reference detected")]
    CircularReference,
    #[error("IO error ({0})")]
    IO(io::Error),
}

impl From<io::Error> for EncodeError {
    fn from(e: io::Error) -> EncodeError {
        EncodeError::IO(e)
    }
}

/// Writes values to `W`. Output is not buffered here, and whatever
/// was written before an error stays written.
pub struct Encoder<W> {
    out: W,
    /// Identities of the collections entered during the current
    /// `encode` call
    seen: HashSet<usize>,
}

impl<W: Write> Encoder<W> {
    pub fn new(out: W) -> Encoder<W> {
        Encoder {
            out,
            seen: HashSet::new(),
        }
    }

    /// Write `v`. Fails if any collection is reached a second time,
    /// whether through a cycle or by being shared between two places
    /// in `v`.
    pub fn encode(&mut self, v: &Value) -> Result<(), EncodeError> {
        self.seen.clear();
        let r = self.write_value(v);
        self.seen.clear();
        r
    }

    fn enter<T>(&mut self, coll: &Shared<T>) -> Result<(), EncodeError> {
        let id = Rc::as_ptr(coll) as *const () as usize;
        if self.seen.insert(id) {
            Ok(())
        } else {
            debug!("collection at {:#x} reached twice", id);
            Err(EncodeError::CircularReference)
        }
    }

    fn write_value(&mut self, v: &Value) -> Result<(), EncodeError> {
        // What is still to be written, last first
        let mut todo = vec![Step::Value(v.clone())];
        while let Some(step) = todo.pop() {
            match step {
                Step::Text(s) => self.out.write_all(s.as_bytes())?,
                Step::Key(k) => write!(self.out, "{} ", Quoted(&k))?,
                Step::Value(v) => match &v {
                    Value::Atom(a) => write!(self.out, "{}", a)?,
                    Value::Opaque(o) => {
                        let text = o.0.to_string();
                        write!(self.out, "{}", Quoted(&text))?
                    }
                    Value::Seq(items) => {
                        self.enter(items)?;
                        self.out.write_all(b"[")?;
                        todo.push(Step::Text("]"));
                        for (i, item) in items.borrow().iter().enumerate().rev() {
                            todo.push(Step::Value(item.clone()));
                            if i > 0 {
                                todo.push(Step::Text(" "));
                            }
                        }
                    }
                    Value::Set(members) => {
                        self.enter(members)?;
                        let mut texts: Vec<String> =
                            members.borrow().iter().map(|a| a.to_string()).collect();
                        texts.sort();
                        write!(self.out, "#{{{}}}", texts.join(" "))?;
                    }
                    Value::Map(entries) => {
                        self.enter(entries)?;
                        self.out.write_all(b"{")?;
                        todo.push(Step::Text("}"));
                        for (i, (k, v)) in entries.borrow().iter().enumerate().rev() {
                            todo.push(Step::Value(v.clone()));
                            todo.push(Step::Key(k.clone()));
                            if i > 0 {
                                todo.push(Step::Text(" "));
                            }
                        }
                    }
                },
            }
        }
        Ok(())
    }
}

enum Step {
    Text(&'static str),
    Key(KString),
    Value(Value),
}
