//! End-to-end copy behavior through the library entry point

use std::fs;
use std::path::Path;
use tempfile::TempDir;
use zcp::commands::copy::run;
use zcp::Config;

fn test_config(source: &Path, destination: &Path) -> Config {
    Config {
        source: source.to_path_buf(),
        destination: destination.to_path_buf(),
        chunk_size: 64 * 1024,
        preserve_permissions: true,
        report_progress: false,
        calibrate_speed: false,
        overwrite_existing: true,
        update_interval: 1.0 / 60.0,
    }
}

#[cfg(unix)]
fn mode_of(path: &Path) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path)
        .expect("stat path")
        .permissions()
        .mode()
        & 0o777
}

#[cfg(unix)]
fn running_as_root() -> bool {
    // Permission-denied fixtures are meaningless for root.
    unsafe { libc::geteuid() == 0 }
}

#[test]
fn test_copy_tree_preserves_shape_and_content() {
    let src = TempDir::new().expect("create src tempdir");
    let dst = TempDir::new().expect("create dst tempdir");

    fs::create_dir_all(src.path().join("sub/deeper")).expect("create dirs");
    fs::write(src.path().join("a.txt"), b"hello, zcp!").expect("write a.txt");
    fs::write(src.path().join("sub/b.bin"), vec![9u8; 4096]).expect("write b.bin");
    fs::write(src.path().join("sub/deeper/c.dat"), b"deep").expect("write c.dat");

    let stats = run(&test_config(src.path(), dst.path())).expect("copy run");

    assert_eq!(stats.files_copied, 3);
    assert_eq!(stats.dirs_created, 2);
    assert_eq!(stats.bytes_copied, 11 + 4096 + 4);

    assert_eq!(
        fs::read(dst.path().join("a.txt")).expect("read a.txt"),
        b"hello, zcp!"
    );
    assert_eq!(
        fs::read(dst.path().join("sub/b.bin")).expect("read b.bin"),
        vec![9u8; 4096]
    );
    assert_eq!(
        fs::read(dst.path().join("sub/deeper/c.dat")).expect("read c.dat"),
        b"deep"
    );
}

#[test]
fn test_copy_multi_chunk_file_is_byte_identical() {
    let src = TempDir::new().expect("create src tempdir");
    let dst = TempDir::new().expect("create dst tempdir");

    // ~5 MB across many 64 KiB chunks
    let content: Vec<u8> = (0..5_000_000u32).map(|i| (i % 241) as u8).collect();
    fs::write(src.path().join("big.bin"), &content).expect("write big.bin");

    run(&test_config(src.path(), dst.path())).expect("copy run");

    assert_eq!(
        fs::read(dst.path().join("big.bin")).expect("read big.bin"),
        content
    );
}

#[test]
fn test_copy_with_calibration_is_byte_identical() {
    let src = TempDir::new().expect("create src tempdir");
    let dst = TempDir::new().expect("create dst tempdir");

    let content: Vec<u8> = (0..2_000_000u32).map(|i| (i % 199) as u8).collect();
    fs::write(src.path().join("big.bin"), &content).expect("write big.bin");

    let config = Config {
        calibrate_speed: true,
        chunk_size: 32 * 1024,
        ..test_config(src.path(), dst.path())
    };
    run(&config).expect("copy run");

    assert_eq!(
        fs::read(dst.path().join("big.bin")).expect("read big.bin"),
        content
    );
}

#[test]
fn test_zero_length_file_copies_to_zero_length() {
    let src = TempDir::new().expect("create src tempdir");
    let dst = TempDir::new().expect("create dst tempdir");

    fs::write(src.path().join("empty.txt"), b"").expect("write empty.txt");
    // Stale destination content must not survive.
    fs::write(dst.path().join("empty.txt"), b"leftover").expect("write stale dst");

    let stats = run(&test_config(src.path(), dst.path())).expect("copy run");

    assert_eq!(stats.files_copied, 1);
    assert_eq!(stats.bytes_copied, 0);
    let metadata = fs::metadata(dst.path().join("empty.txt")).expect("stat empty.txt");
    assert_eq!(metadata.len(), 0);
}

#[test]
fn test_no_clobber_skips_existing_destination() {
    let src = TempDir::new().expect("create src tempdir");
    let dst = TempDir::new().expect("create dst tempdir");

    fs::write(src.path().join("keep.txt"), b"new content").expect("write src");
    fs::write(dst.path().join("keep.txt"), b"old").expect("write dst");

    let config = Config {
        overwrite_existing: false,
        ..test_config(src.path(), dst.path())
    };
    let stats = run(&config).expect("copy run");

    assert_eq!(stats.files_copied, 0);
    assert_eq!(stats.files_skipped, 1);
    assert_eq!(
        fs::read(dst.path().join("keep.txt")).expect("read dst"),
        b"old"
    );
}

#[test]
fn test_no_clobber_second_run_is_idempotent() {
    let src = TempDir::new().expect("create src tempdir");
    let dst = TempDir::new().expect("create dst tempdir");

    fs::create_dir(src.path().join("sub")).expect("create dir");
    fs::write(src.path().join("a.txt"), b"first").expect("write a.txt");
    fs::write(src.path().join("sub/b.txt"), b"second").expect("write b.txt");

    let config = Config {
        overwrite_existing: false,
        ..test_config(src.path(), dst.path())
    };
    run(&config).expect("first run");

    // Mutate the source; the second no-clobber run must not propagate it.
    fs::write(src.path().join("a.txt"), b"changed").expect("rewrite a.txt");

    let stats = run(&config).expect("second run");
    assert_eq!(stats.files_copied, 0);
    assert_eq!(stats.files_skipped, 2);
    assert_eq!(
        fs::read(dst.path().join("a.txt")).expect("read a.txt"),
        b"first"
    );
    assert_eq!(
        fs::read(dst.path().join("sub/b.txt")).expect("read b.txt"),
        b"second"
    );
}

#[test]
fn test_single_file_into_existing_directory() {
    let src = TempDir::new().expect("create src tempdir");
    let dst = TempDir::new().expect("create dst tempdir");

    fs::write(src.path().join("report.txt"), b"contents").expect("write src");

    let config = test_config(&src.path().join("report.txt"), dst.path());
    let stats = run(&config).expect("copy run");

    assert_eq!(stats.files_copied, 1);
    assert_eq!(
        fs::read(dst.path().join("report.txt")).expect("read dst"),
        b"contents"
    );
}

#[test]
fn test_single_file_to_explicit_path() {
    let src = TempDir::new().expect("create src tempdir");
    let dst = TempDir::new().expect("create dst tempdir");

    fs::write(src.path().join("report.txt"), b"contents").expect("write src");
    let target = dst.path().join("renamed.txt");

    let config = test_config(&src.path().join("report.txt"), &target);
    run(&config).expect("copy run");

    assert_eq!(fs::read(&target).expect("read dst"), b"contents");
}

#[test]
#[cfg(unix)]
fn test_permissions_propagate_to_files_and_directories() {
    use std::os::unix::fs::PermissionsExt;

    let src = TempDir::new().expect("create src tempdir");
    let dst = TempDir::new().expect("create dst tempdir");

    fs::create_dir(src.path().join("locked")).expect("create dir");
    fs::write(src.path().join("locked/script.sh"), b"#!/bin/sh\n").expect("write script");
    fs::set_permissions(
        src.path().join("locked/script.sh"),
        fs::Permissions::from_mode(0o750),
    )
    .expect("chmod script");
    fs::set_permissions(src.path().join("locked"), fs::Permissions::from_mode(0o770))
        .expect("chmod dir");

    run(&test_config(src.path(), dst.path())).expect("copy run");

    assert_eq!(mode_of(&dst.path().join("locked")), 0o770);
    assert_eq!(mode_of(&dst.path().join("locked/script.sh")), 0o750);
}

#[test]
#[cfg(unix)]
fn test_disregard_permissions_leaves_umask_defaults() {
    use std::os::unix::fs::PermissionsExt;

    let src = TempDir::new().expect("create src tempdir");
    let dst = TempDir::new().expect("create dst tempdir");

    fs::write(src.path().join("secret.txt"), b"payload").expect("write src");
    fs::set_permissions(
        src.path().join("secret.txt"),
        fs::Permissions::from_mode(0o600),
    )
    .expect("chmod src");

    let config = Config {
        preserve_permissions: false,
        ..test_config(src.path(), dst.path())
    };
    run(&config).expect("copy run");

    // Not asserting a specific mode (umask-dependent) - only that the
    // source's restrictive bits were not forced onto the destination file
    // by us; content still matches.
    assert_eq!(
        fs::read(dst.path().join("secret.txt")).expect("read dst"),
        b"payload"
    );
}

#[test]
#[cfg(unix)]
fn test_unreadable_file_is_skipped_not_fatal() {
    use std::os::unix::fs::PermissionsExt;

    if running_as_root() {
        return;
    }

    let src = TempDir::new().expect("create src tempdir");
    let dst = TempDir::new().expect("create dst tempdir");

    fs::write(src.path().join("a.txt"), b"readable me!").expect("write a.txt");
    fs::create_dir(src.path().join("sub")).expect("create dir");
    fs::write(src.path().join("sub/b.bin"), vec![3u8; 5_000_000]).expect("write b.bin");
    fs::write(src.path().join("locked.txt"), b"no access").expect("write locked");
    fs::set_permissions(
        src.path().join("locked.txt"),
        fs::Permissions::from_mode(0o000),
    )
    .expect("chmod locked");

    let result = run(&test_config(src.path(), dst.path()));

    // Restore before asserting so the tempdir can clean up.
    fs::set_permissions(
        src.path().join("locked.txt"),
        fs::Permissions::from_mode(0o644),
    )
    .expect("chmod back");

    result.expect("unreadable entries must not abort the run");
    assert_eq!(
        fs::read(dst.path().join("a.txt")).expect("read a.txt"),
        b"readable me!"
    );
    assert_eq!(
        fs::read(dst.path().join("sub/b.bin")).expect("read b.bin"),
        vec![3u8; 5_000_000]
    );
    assert!(!dst.path().join("locked.txt").exists());
}

#[test]
fn test_source_neither_file_nor_directory_is_config_error() {
    let dst = TempDir::new().expect("create dst tempdir");
    let config = test_config(Path::new("/nonexistent/source"), dst.path());

    let result = run(&config);
    assert!(matches!(result, Err(zcp::CopyError::Config(_))));
}
