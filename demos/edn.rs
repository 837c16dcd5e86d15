// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use ednio::read::{decode_file, decode_from_stream, encode_to_stream, Origin};
use ednio::value::Value;
use clap::Parser as ClapParser;
use std::io::{stdin, stdout, BufWriter, Write};
use std::path::PathBuf;
use anyhow::Result;
use tracing_subscriber::EnvFilter;

#[derive(clap::Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Write the value back out in canonical form (default: just
    /// report what kind of value it is)
    #[clap(long, value_parser)]
    print: bool,
    /// Path to the input file (default: stdin)
    #[clap(value_parser)]
    input_path: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let v: Value = match &args.input_path {
        Some(path) => decode_file(path)?,
        None => decode_from_stream(stdin().lock())
            .map_err(|e| e.located(Origin::Named("stdin".into())))?,
    };

    if args.print {
        let mut out = BufWriter::new(stdout());
        encode_to_stream(&v, &mut out)
            .map_err(|e| e.located(Origin::Named("stdout".into())))?;
        out.write_all(b"\n")?;
        out.flush()?;
    } else {
        println!(";; {}", v.kind());
    }
    Ok(())
}
