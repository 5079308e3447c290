use std::fs::File;
use std::io::BufReader;

use anyhow::{Context, Result};
use tracing::info;

use crate::{Seg2Reader, StringHeaders, read_su_file};

pub fn execute_seg2(input: &str, summary: bool) -> Result<()> {
    info!("Reading SEG2 file: {}", input);

    let file = File::open(input).with_context(|| format!("Failed to open {}", input))?;
    let mut reader = Seg2Reader::open(BufReader::new(file))
        .with_context(|| format!("Failed to read SEG2 header from {}", input))?;

    println!("{}", reader.file_header());
    if summary {
        return Ok(());
    }

    let file_strings = reader
        .file_strings()
        .with_context(|| "Failed to read file descriptor strings")?;
    print_strings("  ", &file_strings);

    for i in 0..reader.trace_count() {
        let trace = reader
            .read_trace(i)
            .with_context(|| format!("Failed to read trace {}", i))?;
        println!("[{}] {}", i, trace);
        print_strings("    ", &trace.headers);
    }
    Ok(())
}

pub fn execute_su(input: &str) -> Result<()> {
    info!("Reading SU file: {}", input);

    let traces = read_su_file(input).with_context(|| format!("Failed to read {}", input))?;
    for (i, trace) in traces.iter().enumerate() {
        println!("[{}] {}", i, trace);
    }
    println!("{} traces", traces.len());
    Ok(())
}

fn print_strings(indent: &str, headers: &StringHeaders) {
    for (key, values) in headers {
        println!("{}{} {}", indent, key, values.join(" "));
    }
}
