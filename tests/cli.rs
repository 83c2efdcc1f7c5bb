//! End-to-end runs of the request / respond / receive commands on files.

use std::fs;
use std::path::Path;

use clap::Parser;
use ephemeral::cli::{run, Cli};
use ephemeral::{Envelope, PrivateRequest, PublicRequest};

fn exec(args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["ephemeral"];
    argv.extend_from_slice(args);
    run(Cli::parse_from(argv))
}

fn path(dir: &Path, name: &str) -> String {
    dir.join(name).to_string_lossy().into_owned()
}

#[test]
fn request_respond_receive() {
    let dir = tempfile::tempdir().unwrap();
    let private = path(dir.path(), "secret.txt");
    let public = path(dir.path(), "request.txt");
    let data = path(dir.path(), "password.txt");
    let response = path(dir.path(), "response.txt");
    let recovered = path(dir.path(), "recovered.txt");

    fs::write(&data, b"swordfish").unwrap();

    exec(&["request", "-v", &private, "-b", &public, "-d", "The database password"]).unwrap();
    exec(&["respond", "-b", &public, "-d", &data, "-r", &response]).unwrap();
    exec(&["receive", "-v", &private, "-r", &response, "-s", &recovered]).unwrap();

    assert_eq!(fs::read(&recovered).unwrap(), b"swordfish");
}

#[test]
fn request_files_are_labelled_envelopes() {
    let dir = tempfile::tempdir().unwrap();
    let private = path(dir.path(), "secret.txt");
    let public = path(dir.path(), "request.txt");

    exec(&["request", "--private", &private, "--public", &public, "--description", "API token"]).unwrap();

    let private_text = fs::read_to_string(&private).unwrap();
    let public_text = fs::read_to_string(&public).unwrap();
    assert!(private_text.starts_with("API token\n----- BEGIN PRIVATE REQUEST -----\n"));
    assert!(public_text.starts_with("API token\n----- BEGIN PUBLIC REQUEST -----\n"));

    let p: PrivateRequest = Envelope::unmarshal(&private_text).unwrap().open().unwrap();
    let q: PublicRequest = Envelope::unmarshal(&public_text).unwrap().open().unwrap();
    assert_eq!(p.public(), q);
}

#[cfg(unix)]
#[test]
fn private_request_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let private = path(dir.path(), "secret.txt");
    let public = path(dir.path(), "request.txt");
    fs::write(&private, b"old").unwrap();
    fs::set_permissions(&private, fs::Permissions::from_mode(0o644)).unwrap();

    exec(&["request", "-v", &private, "-b", &public]).unwrap();

    let mode = fs::metadata(&private).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[test]
fn receive_with_malformed_response_fails() {
    let dir = tempfile::tempdir().unwrap();
    let private = path(dir.path(), "secret.txt");
    let public = path(dir.path(), "request.txt");
    let response = path(dir.path(), "response.txt");
    let recovered = path(dir.path(), "recovered.txt");

    exec(&["request", "-v", &private, "-b", &public]).unwrap();
    fs::write(&response, "no armor here").unwrap();

    let err = exec(&["receive", "-v", &private, "-r", &response, "-s", &recovered]).unwrap_err();
    assert!(format!("{err:#}").contains("could not read response file"));
    assert!(!Path::new(&recovered).exists());
}

#[test]
fn missing_request_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let err = exec(&[
        "respond",
        "-b",
        &path(dir.path(), "nope.txt"),
        "-d",
        &path(dir.path(), "nope.dat"),
        "-r",
        &path(dir.path(), "out.txt"),
    ])
    .unwrap_err();
    assert!(format!("{err:#}").contains("could not read public request file"));
}
