use std::process::Command;

#[test]
fn sim_binary_smoke() {
    let output = Command::new("cargo")
        .args([
            "run", "--quiet", "--bin", "sim", "--", "--seed", "7", "--clients", "2",
        ])
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .output()
        .expect("failed to run sim binary");
    assert!(
        output.status.success(),
        "sim failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8(output.stdout).expect("non utf8 output");
    let v: serde_json::Value = serde_json::from_str(stdout.trim()).expect("invalid json");
    assert_eq!(v["clients"], 2);
    assert_eq!(v["paused"], true);
    assert_eq!(v["resumed"], true);
    assert_eq!(v["converged"], true);
    let toasts = v["toasts"].as_array().expect("toasts array");
    assert_eq!(toasts.len(), 2);
    assert!(toasts[0].as_str().unwrap().ends_with("paused the game."));
    assert!(v["total"].is_object());
}
