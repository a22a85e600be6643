use std::fs;

use assert_cmd::Command;

fn profile_json(mb_1d: f64, mb_2d: f64, mb_3d: f64) -> String {
    format!(
        r#"{{"files": {{"fft_convolution.py": {{"functions": [
            {{"line": "fft_convolution_1d", "n_peak_mb": {mb_1d}}},
            {{"line": "fft_convolution_2d", "n_peak_mb": {mb_2d}}},
            {{"line": "fft_convolution_3d", "n_peak_mb": {mb_3d}}}
        ]}}}}}}"#
    )
}

#[test]
fn figure1_save_writes_fixed_file() {
    let tmp = tempfile::tempdir().unwrap();
    Command::cargo_bin("figure1")
        .unwrap()
        .current_dir(tmp.path())
        .arg("--save")
        .assert()
        .success()
        .stdout("");
    let png = tmp.path().join("effect_of_operations_on_1D_signal.png");
    let bytes = fs::read(png).unwrap();
    assert_eq!(&bytes[1..4], b"PNG");
}

#[test]
fn figure1_without_flags_writes_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    Command::cargo_bin("figure1")
        .unwrap()
        .current_dir(tmp.path())
        .assert()
        .success();
    assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 0);
}

#[test]
fn fft_convolution_is_silent_by_default() {
    Command::cargo_bin("fft-convolution")
        .unwrap()
        .args(["12", "--seed", "7"])
        .assert()
        .success()
        .stdout("");
}

#[test]
fn fft_convolution_report_lists_each_driver() {
    let out = Command::cargo_bin("fft-convolution")
        .unwrap()
        .args(["10", "--seed", "1", "--report"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let text = String::from_utf8(out.stdout).unwrap();
    for name in ["fft_convolution_1d", "fft_convolution_2d", "fft_convolution_3d"] {
        assert!(text.contains(name), "{}", text);
    }
}

#[test]
fn fft_convolution_rejects_zero_and_garbage() {
    Command::cargo_bin("fft-convolution")
        .unwrap()
        .arg("0")
        .assert()
        .failure();
    Command::cargo_bin("fft-convolution")
        .unwrap()
        .arg("many")
        .assert()
        .failure();
}

#[test]
fn plot_memory_usage_renders_profiles() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("scalene");
    fs::create_dir(&dir).unwrap();
    fs::write(dir.join("scalene_profile_n100.json"), profile_json(1.5, 2.0, 1.4)).unwrap();
    fs::write(dir.join("scalene_profile_n200.json"), profile_json(4.0, 6.5, 3.9)).unwrap();
    fs::write(dir.join("README.txt"), "not a profile").unwrap();
    Command::cargo_bin("plot-memory-usage")
        .unwrap()
        .current_dir(tmp.path())
        .assert()
        .success();
    assert!(tmp.path().join("memory_fft.png").exists());
}

#[test]
fn plot_memory_usage_fails_on_malformed_json() {
    let tmp = tempfile::tempdir().unwrap();
    fs::write(tmp.path().join("scalene_profile_n10.json"), "{\"files\": ").unwrap();
    let out = tmp.path().join("out.png");
    Command::cargo_bin("plot-memory-usage")
        .unwrap()
        .arg("--dir")
        .arg(tmp.path())
        .arg("--output")
        .arg(&out)
        .assert()
        .failure();
    assert!(!out.exists());
}

#[test]
fn plot_memory_usage_fails_without_profiles() {
    let tmp = tempfile::tempdir().unwrap();
    Command::cargo_bin("plot-memory-usage")
        .unwrap()
        .arg("--dir")
        .arg(tmp.path())
        .assert()
        .failure();
}
