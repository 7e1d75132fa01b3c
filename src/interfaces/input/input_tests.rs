use std::path::PathBuf;

use crate::drivers::tensor_comparison::ComparisonScope;
use crate::dump::IndexBase;
use crate::interfaces::InputHandle;
use crate::io::read_tensorgrab_yaml;

use super::Input;

const ROOT: &str = env!("CARGO_MANIFEST_DIR");

#[test]
fn test_interfaces_input_h2_comparisons() {
    let name = format!("{ROOT}/tests/input/h2_comparisons.yml");
    let inp = read_tensorgrab_yaml::<Input, _>(&name).unwrap();
    assert_eq!(inp.comparisons.len(), 2);

    let tc_params = &inp.comparisons[0];
    assert_eq!(tc_params.packed_file, PathBuf::from("tests/dumps/h2_packed.out"));
    assert_eq!(tc_params.packed_name, "V");
    assert_eq!(tc_params.block_name, "VF[mnij]");
    assert_eq!(tc_params.threshold, 1e-8);
    assert_eq!(tc_params.scope, ComparisonScope::Populated);
    assert_eq!(tc_params.block_options.leading_index_base, IndexBase::Zero);
    assert_eq!(tc_params.block_options.trailing_index_base, IndexBase::Zero);
    assert!(tc_params.expanded_save_name.is_none());

    let tc_params = &inp.comparisons[1];
    assert_eq!(tc_params.block_name, "VF_extra[mnij]");
    assert_eq!(tc_params.threshold, 1e-10);

    inp.handle().unwrap();
}

#[test]
fn test_interfaces_input_h2_comparisons_mismatch() {
    let name = format!("{ROOT}/tests/input/h2_comparisons_mismatch.yml");
    let inp = read_tensorgrab_yaml::<Input, _>(&name).unwrap();
    assert_eq!(inp.comparisons[1].scope, ComparisonScope::All);
    assert!(inp.handle().is_err());
}

#[test]
fn test_interfaces_input_default_roundtrip() {
    let inp = Input::default();
    let yaml = serde_yaml::to_string(&inp).unwrap();
    let read_inp: Input = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(read_inp.comparisons.len(), 1);
    assert_eq!(read_inp.comparisons[0].packed_name, "V");
    assert_eq!(read_inp.comparisons[0].block_name, "VF[mnij]");
    assert_eq!(read_inp.comparisons[0].threshold, 1e-10);

    let empty: Input = serde_yaml::from_str("{}").unwrap();
    assert!(empty.comparisons.is_empty());
    empty.handle().unwrap();
}
