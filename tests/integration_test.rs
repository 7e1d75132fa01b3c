use std::fs::File;
use std::io::BufReader;

use approx::assert_abs_diff_eq;
use ndarray::Ix4;

use tensorgrab::dump::{read_block_from_file, read_packed_from_file, BlockReaderOptions};
use tensorgrab::expansion::populated_mask;
use tensorgrab::{expand, read_block, read_packed, TensorGrabError};

const ROOT: &str = env!("CARGO_MANIFEST_DIR");

#[test]
fn test_h2_packed_expands_to_block() {
    let packed = read_packed(
        BufReader::new(File::open(format!("{ROOT}/tests/dumps/h2_packed.out")).unwrap()),
        "V",
    )
    .unwrap();
    assert_eq!(packed.shape(), &[2, 3, 3]);
    assert_eq!(packed[[1, 2, 2]], 0.65);

    let block = read_block(
        BufReader::new(File::open(format!("{ROOT}/tests/dumps/h2_block.out")).unwrap()),
        "VF[mnij]",
    )
    .unwrap()
    .into_dimensionality::<Ix4>()
    .unwrap();
    let (n0, n1, n2, n3) = block.dim();
    let full = expand(&packed, [n0, n1, n2, n3]).unwrap();
    let mask = populated_mask(&packed, [n0, n1, n2, n3]).unwrap();

    for ((i, j, k, l), &value) in full.indexed_iter() {
        if mask[[i, j, k, l]] {
            assert_abs_diff_eq!(value, block[[i, j, k, l]], epsilon = 1e-12);
        } else {
            assert_eq!(value, 0.0);
        }
    }
}

#[test]
fn test_h2_file_readers() {
    let packed = read_packed_from_file(format!("{ROOT}/tests/dumps/h2_packed.out"), "W").unwrap();
    assert_eq!(packed.shape(), &[2, 1, 1]);
    assert_eq!(packed[[1, 0, 0]], 3.0);

    let block = read_block_from_file(
        format!("{ROOT}/tests/dumps/h2_block.out"),
        "R3[mni]",
        &BlockReaderOptions::default(),
    )
    .unwrap();
    assert_eq!(block.shape(), &[2, 2, 1]);
    assert_eq!(block.sum(), 2.0);
}

#[test]
fn test_h2_missing_tensors() {
    let res = read_packed_from_file(format!("{ROOT}/tests/dumps/h2_packed.out"), "VF");
    assert!(matches!(res, Err(TensorGrabError::NotFound(_))));

    let res = read_block_from_file(
        format!("{ROOT}/tests/dumps/h2_block.out"),
        "V[mnij]",
        &BlockReaderOptions::default(),
    );
    assert!(matches!(res, Err(TensorGrabError::NotFound(_))));

    let res = read_packed_from_file(format!("{ROOT}/tests/dumps/nonexistent.out"), "V");
    assert!(matches!(res, Err(TensorGrabError::Io(_))));
}
