use std::env;
use std::process::Command;

const PREFIX: &str = "EXPENSE_SPLIT_BUILD";

fn main() {
    for watched in ["build.rs", ".git/HEAD", ".git/refs"] {
        println!("cargo:rerun-if-changed={watched}");
    }

    let rustc = env::var("RUSTC").unwrap_or_else(|_| "rustc".into());
    let status = stdout_of("git", &["status", "--porcelain"]).map(|changes| {
        if changes.is_empty() {
            "clean"
        } else {
            "dirty"
        }
    });
    let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);

    let entries = [
        ("HASH", stdout_of("git", &["rev-parse", "--short", "HEAD"])),
        ("STATUS", status.map(str::to_string)),
        ("TIMESTAMP", Some(timestamp)),
        ("TARGET", env::var("TARGET").ok()),
        ("PROFILE", env::var("PROFILE").ok()),
        ("RUSTC", stdout_of(&rustc, &["--version"])),
    ];
    for (key, value) in entries {
        let value = value.unwrap_or_else(|| "unknown".into());
        println!("cargo:rustc-env={PREFIX}_{key}={value}");
    }
}

/// Trimmed stdout of a successful command. `None` when it cannot run or fails.
fn stdout_of(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    Some(text.trim().to_string())
}
