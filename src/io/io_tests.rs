use std::collections::BTreeMap;
use std::path::PathBuf;

use ndarray::Array4;

use crate::io::{
    expanded_tensor_path, read_expanded_tensor, read_tensorgrab_yaml, write_expanded_tensor,
    write_tensorgrab_yaml,
};

#[test]
fn test_io_expanded_tensor_path() {
    assert_eq!(expanded_tensor_path("h2"), PathBuf::from("h2.tgrab.full"));
    assert_eq!(
        expanded_tensor_path("out/h2.ccsd"),
        PathBuf::from("out/h2.ccsd.tgrab.full")
    );
}

#[test]
fn test_io_expanded_tensor() {
    let pid = std::process::id();
    let name = std::env::temp_dir().join(format!("tensorgrab_io_test_{pid}.vf"));
    let full = Array4::from_shape_fn((2, 2, 3, 3), |(i, j, k, l)| {
        (1000 * i + 100 * j + 10 * k + l) as f64 * 0.5
    });
    let path = write_expanded_tensor(&name, &full).unwrap();
    assert_eq!(path, expanded_tensor_path(&name));
    assert!(path.to_string_lossy().ends_with(".vf.tgrab.full"));

    let read_full = read_expanded_tensor(&name).unwrap();
    assert_eq!(read_full, full);
    std::fs::remove_file(path).unwrap();
}

#[test]
fn test_io_yaml() {
    let name = std::env::temp_dir().join(format!("tensorgrab_yaml_test_{}", std::process::id()));
    let mut value = BTreeMap::new();
    value.insert("threshold".to_string(), 1e-8);
    value.insert("scale".to_string(), 0.5);
    let path = write_tensorgrab_yaml(&name, &value).unwrap();
    assert_eq!(path.extension().and_then(|ext| ext.to_str()), Some("yml"));

    let read_value: BTreeMap<String, f64> = read_tensorgrab_yaml(&path).unwrap();
    assert_eq!(read_value, value);
    std::fs::remove_file(path).unwrap();
}

#[test]
fn test_io_missing_files() {
    let res = read_tensorgrab_yaml::<BTreeMap<String, f64>, _>("/nonexistent/tensorgrab.yml");
    assert!(res.is_err());

    let err = read_expanded_tensor("/nonexistent/tensorgrab").unwrap_err();
    assert!(format!("{err:#}").contains("/nonexistent/tensorgrab.tgrab.full"));
}
