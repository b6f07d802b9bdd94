//! Convert a small symmetric Matrix Market file to MTB and read it back

use mtb::{convert_with_config, read_mtb, ConvertConfig, NoProgress, Triplet};
use std::time::Instant;

const MATRIX: &str = "%%MatrixMarket matrix coordinate real symmetric
% 4x4 tridiagonal, lower triangle only
4 4 7
1 1 2.0
2 1 -1.0
2 2 2.0
3 2 -1.0
3 3 2.0
4 3 -1.0
4 4 2.0
";

fn main() -> mtb::Result<()> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("example.mtx");
    let output = dir.path().join("example.mtb");
    std::fs::write(&input, MATRIX)?;

    println!("Converting '{}'...", input.display());
    let start = Instant::now();
    let summary = convert_with_config(&input, &output, &ConvertConfig::sorted(), &mut NoProgress)?;
    println!(
        "Wrote {} records from {} entries in {:.3}ms",
        summary.records,
        summary.entries,
        start.elapsed().as_secs_f64() * 1000.0
    );

    let (header, triplets) = read_mtb::<f64>(&output)?;

    println!("\nFile = {}", output.display());
    println!(
        "Header: matrix type = {} | values = {}",
        header.matrix_type()?,
        header.value_encoding()?
    );
    println!(
        "Matrix parameters: nrows = {} | ncols = {} | nonzeros = {}",
        header.nrows, header.ncols, header.nz
    );

    println!("Data:");
    for Triplet { row, col, val } in &triplets {
        println!("   ({row}, {col}) {val}");
    }

    Ok(())
}
