use std::fs::write;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

/// Reads one full HTTP request (headers plus content-length body) and answers
/// it with the given JSON body.
fn serve_one_json_response(mut stream: TcpStream, body: &str) {
    let mut request = Vec::new();
    let mut chunk = [0u8; 4096];
    let mut header_end = None;
    let mut content_length = 0usize;
    loop {
        let n = stream.read(&mut chunk).expect("read request");
        if n == 0 {
            break;
        }
        request.extend_from_slice(&chunk[..n]);
        if header_end.is_none() {
            if let Some(pos) = request.windows(4).position(|w| w == b"\r\n\r\n") {
                header_end = Some(pos + 4);
                let headers = String::from_utf8_lossy(&request[..pos]).into_owned();
                content_length = headers
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())?
                    })
                    .unwrap_or(0);
            }
        }
        if let Some(start) = header_end {
            if request.len() >= start + content_length {
                break;
            }
        }
    }
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    );
    stream.write_all(response.as_bytes()).expect("write response");
    stream.flush().expect("flush response");
}

#[test]
fn help_describes_the_pin_subcommand() {
    let mut cmd = Command::cargo_bin("ipfs-backup").expect("binary exists");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("pin"));
}

#[test]
fn pin_prints_cid_and_set_output_line_on_success() {
    let root = tempdir().unwrap();
    write(root.path().join("artifact.txt"), b"payload").unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let server = thread::spawn(move || {
        let (stream, _) = listener.accept().expect("accept upload");
        serve_one_json_response(
            stream,
            r#"{"data":{"Name":"artifact.txt","Hash":"bafy123","Size":"7"}}"#,
        );
    });

    let mut cmd = Command::cargo_bin("ipfs-backup").expect("binary exists");
    cmd.arg("pin")
        .arg("--dir")
        .arg(root.path())
        .env("LIGHTHOUSE_API_KEY", "test-key")
        .env("LIGHTHOUSE_NODE_URL", format!("http://{addr}/api/v0/add"));

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Uploaded to IPFS : bafy123"))
        .stdout(predicate::str::contains("::set-output name=cid::bafy123\n"));

    server.join().expect("server thread");
}

#[test]
fn pin_exits_nonzero_when_the_service_is_unreachable() {
    let root = tempdir().unwrap();
    write(root.path().join("artifact.txt"), b"payload").unwrap();

    let mut cmd = Command::cargo_bin("ipfs-backup").expect("binary exists");
    cmd.arg("pin")
        .arg("--dir")
        .arg(root.path())
        .env("LIGHTHOUSE_API_KEY", "test-key")
        // Discard-adjacent port: nothing listens here.
        .env("LIGHTHOUSE_NODE_URL", "http://127.0.0.1:9/api/v0/add");

    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("upload failed"));
}

#[test]
fn missing_credential_is_not_rejected_before_the_upload_call() {
    let root = tempdir().unwrap();
    write(root.path().join("artifact.txt"), b"payload").unwrap();

    let mut cmd = Command::cargo_bin("ipfs-backup").expect("binary exists");
    cmd.arg("pin")
        .arg("--dir")
        .arg(root.path())
        .env_remove("LIGHTHOUSE_API_KEY")
        .env("LIGHTHOUSE_NODE_URL", "http://127.0.0.1:9/api/v0/add");

    // Failure comes from the network call itself, not credential validation.
    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("upload failed"));
}

#[test]
fn pin_exits_nonzero_for_a_missing_root_directory() {
    let root = tempdir().unwrap();
    let gone = root.path().join("no-such-dir");

    let mut cmd = Command::cargo_bin("ipfs-backup").expect("binary exists");
    cmd.arg("pin")
        .arg("--dir")
        .arg(&gone)
        .env("LIGHTHOUSE_API_KEY", "test-key")
        .env("LIGHTHOUSE_NODE_URL", "http://127.0.0.1:9/api/v0/add");

    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("failed to list directory"));
}
