use std::path::Path;
use std::process::{Command, Output};

use pretty_assertions::assert_eq;
use tempfile::TempDir;

const TWO_WORDS: &str = ":0400000001020304F2\n:0400040005060708DE\n:00000001FF\n";

/// Runs the tool inside `dir`, with `dir` also acting as the home directory so no user
/// configuration leaks into the test.
fn hexcrc(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_hexcrc"))
        .args(args)
        .current_dir(dir)
        .env("HOME", dir)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

/// The exit code as the OS reports it.
fn exit_code(code: i32) -> i32 {
    if cfg!(unix) {
        code & 0xFF
    } else {
        code
    }
}

fn workspace(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (name, content) in files {
        std::fs::write(dir.path().join(name), content).unwrap();
    }
    dir
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn no_parameters() {
    let dir = workspace(&[]);
    assert_eq!(hexcrc(dir.path(), &[]).status.code(), Some(exit_code(-1)));
}

#[test]
fn unknown_flag() {
    let dir = workspace(&[]);
    assert_eq!(
        hexcrc(dir.path(), &["-x"]).status.code(),
        Some(exit_code(-3))
    );
}

#[test]
fn help_succeeds() {
    let dir = workspace(&[]);
    let output = hexcrc(dir.path(), &["-h"]);

    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("--polynomial"));
}

#[test]
fn wrong_extension() {
    let dir = workspace(&[("firmware.bin", TWO_WORDS)]);
    assert_eq!(
        hexcrc(dir.path(), &["-i", "firmware.bin"]).status.code(),
        Some(exit_code(-2))
    );
}

#[test]
fn wrong_output_extension() {
    let dir = workspace(&[("firmware.hex", TWO_WORDS)]);
    assert_eq!(
        hexcrc(dir.path(), &["-i", "firmware", "-w", "-o", "out.bin"])
            .status
            .code(),
        Some(exit_code(-2))
    );
}

#[test]
fn missing_input_flag() {
    let dir = workspace(&[]);
    assert_eq!(
        hexcrc(dir.path(), &["-w"]).status.code(),
        Some(exit_code(-4))
    );
}

#[test]
fn missing_input_file() {
    let dir = workspace(&[]);
    assert_eq!(
        hexcrc(dir.path(), &["-i", "missing"]).status.code(),
        Some(exit_code(-7))
    );
}

#[test]
fn bad_line_checksum() {
    let dir = workspace(&[("firmware.hex", ":0200000048690C\n:00000001FF\n")]);
    let output = hexcrc(dir.path(), &["-i", "firmware"]);

    assert_eq!(output.status.code(), Some(exit_code(-5)));
    assert!(String::from_utf8_lossy(&output.stderr).contains(":0200000048690C"));
    assert!(!stdout(&output).contains("CRC"));
}

#[test]
fn segment_addressing() {
    let dir = workspace(&[(
        "firmware.hex",
        ":020000021000EC\n:0200000048694D\n:00000001FF\n",
    )]);
    assert_eq!(
        hexcrc(dir.path(), &["-i", "firmware"]).status.code(),
        Some(exit_code(-6))
    );
}

#[test]
fn crc_only_leaves_file_alone() {
    let dir = workspace(&[("firmware.hex", TWO_WORDS)]);
    let output = hexcrc(dir.path(), &["-i", "firmware"]);

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "CRC = 0x4FE7AB1D\nDone\n");
    assert_eq!(
        std::fs::read_to_string(dir.path().join("firmware.hex")).unwrap(),
        TWO_WORDS
    );
}

#[test]
fn write_to_output_file() {
    let dir = workspace(&[("firmware.hex", ":0200000048694D\n:00000001FF\n")]);
    let output = hexcrc(dir.path(), &["-i", "firmware", "-w", "-o", "patched"]);

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "CRC = 0xFFFFFFFF\nDone\n");
    assert_eq!(
        std::fs::read_to_string(dir.path().join("patched.hex")).unwrap(),
        ":020000040000FA\n:04000000FFFFFFFF00\n:00000001FF\n"
    );
}

#[test]
fn write_overwrites_input() {
    let dir = workspace(&[("firmware.hex", TWO_WORDS)]);
    let output = hexcrc(dir.path(), &["-w", "-i", "firmware.hex"]);

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        std::fs::read_to_string(dir.path().join("firmware.hex")).unwrap(),
        ":020000040000FA\n:08000000010203044FE7AB1DF0\n:00000001FF\n"
    );
}

#[test]
fn custom_polynomial() {
    let dir = workspace(&[("firmware.hex", TWO_WORDS)]);
    let output = hexcrc(dir.path(), &["-i", "firmware", "-p", "0x1EDC6F41"]);

    assert_eq!(stdout(&output), "CRC = 0x8A7855AA\nDone\n");
}

#[test]
fn invalid_polynomial_falls_back() {
    let dir = workspace(&[("firmware.hex", TWO_WORDS)]);
    let output = hexcrc(dir.path(), &["-i", "firmware", "-p", "crc32c"]);

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "CRC = 0x4FE7AB1D\nDone\n");
    assert!(String::from_utf8_lossy(&output.stderr).contains("crc32c"));
}

#[test]
fn polynomial_from_config_file() {
    let dir = workspace(&[
        ("firmware.hex", TWO_WORDS),
        (".hexcrc.toml", "polynomial = 0x1EDC6F41\n"),
    ]);
    let output = hexcrc(dir.path(), &["-i", "firmware"]);

    assert_eq!(stdout(&output), "CRC = 0x8A7855AA\nDone\n");
}

#[test]
fn extra_parameters_are_ignored() {
    let dir = workspace(&[("firmware.hex", TWO_WORDS)]);
    let output = hexcrc(dir.path(), &["-i", "firmware", "leftover"]);

    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stderr).contains("leftover"));
}
