use std::fs::File;
use std::io::{BufReader, BufWriter, Write};

use anyhow::{Context, Result};
use tracing::info;

use crate::convert_seg2_to_su;

pub fn execute(input: &str, output: &str) -> Result<()> {
    info!("Converting {} -> {}", input, output);

    let reader = BufReader::new(
        File::open(input).with_context(|| format!("Failed to open input file: {}", input))?,
    );
    let mut writer = BufWriter::new(
        File::create(output).with_context(|| format!("Failed to create output file: {}", output))?,
    );

    let summary = convert_seg2_to_su(reader, &mut writer)
        .with_context(|| format!("Failed to convert {}", input))?;
    writer
        .flush()
        .with_context(|| format!("Failed to write output file: {}", output))?;

    println!(
        "Converted {} traces ({} bytes) to {}",
        summary.traces, summary.bytes_written, output
    );
    Ok(())
}
