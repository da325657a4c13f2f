use std::process::Command;

#[test]
fn cli_compiles_without_warnings() {
    let status = Command::new(env!("CARGO"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args(["check", "--quiet", "--bin", "maze-crawl"])
        .status()
        .expect("failed to invoke cargo check for maze-crawl CLI binary");

    assert!(status.success(), "cargo check --bin maze-crawl should succeed");
}

#[test]
fn help_lists_every_flag() {
    let output = Command::new(env!("CARGO_BIN_EXE_maze-crawl"))
        .arg("--help")
        .output()
        .expect("failed to run maze-crawl --help");

    assert!(output.status.success());
    let help = String::from_utf8_lossy(&output.stdout);
    for flag in ["--channel", "--transport", "--renderer", "--config", "--seed"] {
        assert!(help.contains(flag), "help is missing {flag}");
    }
}
