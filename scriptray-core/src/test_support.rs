//! Shared helpers for unit tests.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Write an executable `/bin/sh` script into `dir`.
///
/// Sleeps briefly afterwards: a child forked by another test thread can
/// still hold our write descriptor until it execs, and exec'ing the script
/// in that window fails with ETXTBSY.
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    std::thread::sleep(Duration::from_millis(50));
    path
}
