// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Not an example, but a program to show the struct sizes for
//! possible optimization.

use ednio::{decode::{DecodeError, DecodeErrorWithPos},
            encode::EncodeError,
            number::Number,
            pos::Pos,
            read::{LocatedError, Origin},
            value::{Atom, Value, Opaque, Parenkind}};
use kstring::KString;
use num::BigInt;

fn pr(ctx: &str, nam: &str, siz: usize) {
    println!("{siz}\t{ctx}\t{nam}")
}

const FQTY : bool = false;

macro_rules! ctx {
    ( $ctx:expr ) => {
        macro_rules! p {
            ( $t:ty ) => {
                let typename =
                    if FQTY {
                        std::any::type_name::<$t>()
                    } else {
                        stringify!($t)
                    };
                pr($ctx, typename, std::mem::size_of::<$t>())
            }
        }
    }
}

fn main() {
    {
        ctx!("value");
        p!{Pos};
        p!{BigInt};
        p!{Number};
        p!{KString};
        p!{Atom};
        p!{Opaque};
        p!{Value};
        p!{Parenkind};
    }

    {
        ctx!("decode");
        p!{DecodeError};
        p!{DecodeErrorWithPos};
        p!{Result<Value, DecodeErrorWithPos>};
        p!{Result<Option<char>, DecodeErrorWithPos>};
    }

    {
        ctx!("encode");
        p!{std::io::Error};
        p!{EncodeError};
        p!{Origin};
        p!{LocatedError};
        p!{Result<Value, LocatedError>};
    }
}
