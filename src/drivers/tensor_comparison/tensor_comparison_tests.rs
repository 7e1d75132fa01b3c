use approx::assert_abs_diff_eq;
use env_logger;

use crate::drivers::tensor_comparison::{
    ComparisonScope, TensorComparisonDriver, TensorComparisonParams,
};
use crate::drivers::TensorGrabDriver;
use crate::error::TensorGrabError;
use crate::io::{expanded_tensor_path, read_expanded_tensor};

const ROOT: &str = env!("CARGO_MANIFEST_DIR");

fn h2_params(block_name: &str, scope: ComparisonScope) -> TensorComparisonParams {
    TensorComparisonParams::builder()
        .packed_file(format!("{ROOT}/tests/dumps/h2_packed.out"))
        .packed_name("V")
        .block_file(format!("{ROOT}/tests/dumps/h2_block.out"))
        .block_name(block_name)
        .threshold(1e-8)
        .scope(scope)
        .build()
        .unwrap()
}

#[test]
fn test_drivers_tensor_comparison_h2_agreement() {
    let _ = env_logger::builder().is_test(true).try_init();
    let params = h2_params("VF[mnij]", ComparisonScope::Populated);
    let mut tc_driver = TensorComparisonDriver::builder()
        .parameters(&params)
        .build()
        .unwrap();
    assert!(tc_driver.result().is_err());
    tc_driver.run().unwrap();
    let tc_res = tc_driver.result().unwrap();
    assert!(tc_res.agrees());
    assert_eq!(tc_res.n_compared, 8);
    assert_eq!(tc_res.n_mismatches, 0);
    assert!(tc_res.max_deviation < 1e-12);
    assert_eq!(tc_res.expanded.shape(), &[2, 2, 2, 2]);
    assert_abs_diff_eq!(tc_res.expanded[[1, 0, 1, 0]], 0.7, epsilon = 1e-14);
    assert_abs_diff_eq!(tc_res.expanded[[0, 1, 1, 0]], 0.05, epsilon = 1e-14);

    let params = h2_params("VF[mnij]", ComparisonScope::All);
    let mut tc_driver = TensorComparisonDriver::builder()
        .parameters(&params)
        .build()
        .unwrap();
    tc_driver.run().unwrap();
    let tc_res = tc_driver.result().unwrap();
    assert!(tc_res.agrees());
    assert_eq!(tc_res.n_compared, 16);
}

#[test]
fn test_drivers_tensor_comparison_h2_mismatch() {
    let _ = env_logger::builder().is_test(true).try_init();
    let params = h2_params("VF_bad[mnij]", ComparisonScope::Populated);
    let mut tc_driver = TensorComparisonDriver::builder()
        .parameters(&params)
        .build()
        .unwrap();
    tc_driver.run().unwrap();
    let tc_res = tc_driver.result().unwrap();
    assert!(!tc_res.agrees());
    assert_eq!(tc_res.n_mismatches, 1);
    assert_eq!(tc_res.max_deviation_index, Some([1, 0, 1, 0]));
    assert_abs_diff_eq!(tc_res.max_deviation, 1e-3, epsilon = 1e-10);
}

#[test]
fn test_drivers_tensor_comparison_h2_scope() {
    let _ = env_logger::builder().is_test(true).try_init();
    let params = h2_params("VF_extra[mnij]", ComparisonScope::Populated);
    let mut tc_driver = TensorComparisonDriver::builder()
        .parameters(&params)
        .build()
        .unwrap();
    tc_driver.run().unwrap();
    assert!(tc_driver.result().unwrap().agrees());

    let params = h2_params("VF_extra[mnij]", ComparisonScope::All);
    let mut tc_driver = TensorComparisonDriver::builder()
        .parameters(&params)
        .build()
        .unwrap();
    tc_driver.run().unwrap();
    let tc_res = tc_driver.result().unwrap();
    assert_eq!(tc_res.n_mismatches, 1);
    assert_eq!(tc_res.max_deviation_index, Some([0, 0, 1, 0]));
}

#[test]
fn test_drivers_tensor_comparison_errors() {
    let _ = env_logger::builder().is_test(true).try_init();
    let params = h2_params("VF_missing[mnij]", ComparisonScope::Populated);
    let mut tc_driver = TensorComparisonDriver::builder()
        .parameters(&params)
        .build()
        .unwrap();
    let err = tc_driver.run().unwrap_err();
    assert!(matches!(
        err.root_cause().downcast_ref::<TensorGrabError>(),
        Some(TensorGrabError::NotFound(_))
    ));
    assert!(tc_driver.result().is_err());

    let params = h2_params("R3[mni]", ComparisonScope::Populated);
    let mut tc_driver = TensorComparisonDriver::builder()
        .parameters(&params)
        .build()
        .unwrap();
    let err = tc_driver.run().unwrap_err();
    assert!(matches!(
        err.downcast_ref::<TensorGrabError>(),
        Some(TensorGrabError::ShapeMismatch(_))
    ));

    let mut params = h2_params("VF[mnij]", ComparisonScope::Populated);
    params.packed_name = "W".to_string();
    let mut tc_driver = TensorComparisonDriver::builder()
        .parameters(&params)
        .build()
        .unwrap();
    let err = tc_driver.run().unwrap_err();
    assert!(matches!(
        err.root_cause().downcast_ref::<TensorGrabError>(),
        Some(TensorGrabError::ShapeMismatch(_))
    ));
}

#[test]
fn test_drivers_tensor_comparison_invalid_threshold() {
    let mut params = h2_params("VF[mnij]", ComparisonScope::Populated);
    params.threshold = -1.0;
    assert!(TensorComparisonDriver::builder()
        .parameters(&params)
        .build()
        .is_err());
}

#[test]
fn test_drivers_tensor_comparison_save_expanded() {
    let _ = env_logger::builder().is_test(true).try_init();
    let save_name = std::env::temp_dir()
        .join(format!("tensorgrab_h2_{}", std::process::id()))
        .to_string_lossy()
        .to_string();
    let mut params = h2_params("VF[mnij]", ComparisonScope::Populated);
    params.expanded_save_name = Some(save_name.clone());
    let mut tc_driver = TensorComparisonDriver::builder()
        .parameters(&params)
        .build()
        .unwrap();
    tc_driver.run().unwrap();
    let saved = read_expanded_tensor(&save_name).unwrap();
    assert_eq!(&saved, &tc_driver.result().unwrap().expanded);
    std::fs::remove_file(expanded_tensor_path(&save_name)).unwrap();
}
