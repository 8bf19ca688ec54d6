use std::io::Write;
use std::process::Command;

fn bin_path() -> String {
    env!("CARGO_BIN_EXE_gosling").to_string()
}

#[test]
fn eval_prints_the_result() {
    let output = Command::new(bin_path())
        .args(["eval", "1 + 2 * 3"])
        .output()
        .expect("failed to run gosling eval");
    assert!(
        output.status.success(),
        "eval failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), "7");
}

#[test]
fn eval_json_output() {
    let output = Command::new(bin_path())
        .args(["eval", "--json", "[]int{1, 2, 3}"])
        .output()
        .expect("failed to run gosling eval --json");
    assert!(
        output.status.success(),
        "eval failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), "[1,2,3]");
}

#[test]
fn run_evaluates_a_script_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("sum.gos");
    let mut file = std::fs::File::create(&path).expect("create script");
    write!(
        file,
        r#"
func (A, B) {{
	C := 10
	return A + B + C
}} ( 1 , 2)
"#
    )
    .expect("write script");

    let output = Command::new(bin_path())
        .arg("run")
        .arg(&path)
        .output()
        .expect("failed to run gosling run");
    assert!(
        output.status.success(),
        "run failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), "13");
}

#[test]
fn parse_errors_exit_nonzero() {
    let output = Command::new(bin_path())
        .args(["eval", "func( {"])
        .output()
        .expect("failed to run gosling eval");
    assert!(!output.status.success(), "expected a failing exit status");
    assert!(!output.stderr.is_empty(), "expected a diagnostic on stderr");
}

#[test]
fn max_depth_flag_bounds_recursion() {
    let output = Command::new(bin_path())
        .args([
            "eval",
            "--max-depth",
            "32",
            "func() { F := func() { return F() }; return F() }()",
        ])
        .output()
        .expect("failed to run gosling eval");
    assert!(!output.status.success(), "expected a failing exit status");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("depth exceeded"),
        "missing depth error: {stderr}"
    );
}
