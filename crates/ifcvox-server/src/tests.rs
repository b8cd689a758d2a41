//! End-to-end tests against a server bound to an OS-assigned port.

use std::fs;
use std::io::Read;
use std::path::Path;
use std::thread;
use std::time::Duration;

use crate::{JobStore, SliceServer};

/// Writes a chunked grid of one chunk (`cs` = 8, voxel size 0.1) whose
/// single chunk is given by `primitive`.
fn write_grid(job_dir: &Path, num: u32, origin: &str, primitive: &str) {
    let base = job_dir.join(format!("{num}.vox"));
    let path = |suffix: &str| format!("{}.{suffix}", base.display());
    fs::write(path("meta"), format!("CHUNK2\n0.1\n8\n{origin}\n1;1;1\n")).unwrap();
    fs::write(path("index"), [2u8]).unwrap();
    fs::write(path("contents"), b"").unwrap();
    fs::write(path("primitives"), format!("{primitive}\n")).unwrap();
}

fn start(root: &Path) -> SliceServer {
    let mut server = SliceServer::new("127.0.0.1:0");
    server.start(JobStore::new(root, 10, true)).unwrap();
    // Give server a moment to start
    thread::sleep(Duration::from_millis(100));
    server
}

/// Returns status and body, including for error statuses.
fn get(server: &SliceServer, path: &str) -> (u16, Vec<u8>, Option<String>) {
    let url = format!("http://127.0.0.1:{}{path}", server.actual_port());
    let resp = match ureq::get(&url).call() {
        Ok(resp) => resp,
        Err(ureq::Error::Status(_, resp)) => resp,
        Err(e) => panic!("request to {path} failed: {e}"),
    };
    let status = resp.status();
    let content_type = resp.header("Content-Type").map(str::to_string);
    let mut body = Vec::new();
    resp.into_reader().read_to_end(&mut body).unwrap();
    (status, body, content_type)
}

fn get_json(server: &SliceServer, path: &str) -> (u16, serde_json::Value) {
    let (status, body, _) = get(server, path);
    (status, serde_json::from_slice(&body).unwrap())
}

#[test]
fn test_health() {
    let dir = tempfile::tempdir().unwrap();
    let mut server = start(dir.path());
    let (status, body) = get_json(&server, "/health");
    assert_eq!(status, 200);
    assert_eq!(body["status"], "ok");
    server.stop();
}

#[test]
fn test_info_slice_and_count() {
    let dir = tempfile::tempdir().unwrap();
    let job = dir.path().join("abc");
    fs::create_dir(&job).unwrap();
    write_grid(&job, 0, "0;0;0", "Z=3");
    let mut server = start(dir.path());

    let (status, info) = get_json(&server, "/info/abc/0");
    assert_eq!(status, 200);
    assert_eq!(info["chunks"], serde_json::json!([1, 1, 1]));
    assert_eq!(info["chunk_size"], 8);

    let (_, count) = get_json(&server, "/count_slice/abc/0/z/3");
    assert_eq!(count["count"], 64);
    let (_, count) = get_json(&server, "/count_slice/abc/0/x/0");
    assert_eq!(count["count"], 8);

    let (status, body, content_type) = get(&server, "/slice/abc/0/z/3");
    assert_eq!(status, 200);
    assert_eq!(content_type.as_deref(), Some("image/png"));
    assert_eq!(&body[..8], b"\x89PNG\r\n\x1a\n");
    server.stop();
}

#[test]
fn test_error_statuses() {
    let dir = tempfile::tempdir().unwrap();
    let job = dir.path().join("abc");
    fs::create_dir(&job).unwrap();
    write_grid(&job, 0, "0;0;0", "CONST");
    fs::write(job.join("5.vox.meta"), "BOGUS\n").unwrap();
    let mut server = start(dir.path());

    assert_eq!(get(&server, "/slice/abc/1/z/0").0, 404);
    assert_eq!(get(&server, "/slice/abc/0/z/8").0, 400);
    assert_eq!(get(&server, "/slice/abc/0/q/0").0, 400);
    assert_eq!(get(&server, "/slice/abc/5/z/0").0, 500);
    assert_eq!(get(&server, "/slice/ab1/0/z/0").0, 404);
    assert_eq!(get(&server, "/log/abc").0, 503);
    assert_eq!(get(&server, "/nothing/here").0, 404);
    server.stop();
}

#[test]
fn test_multi_slice_composites_harmonized_grids() {
    let dir = tempfile::tempdir().unwrap();
    let job = dir.path().join("abc");
    fs::create_dir(&job).unwrap();
    write_grid(&job, 0, "0;0;0", "CONST");
    write_grid(&job, 1, "0.8;0;0", "CONST");
    // Not drawn, but widens the shared frame.
    fs::write(job.join("2.vox.meta"), "CHUNK2\n0.1\n8\n1.6;0;0\n1;1;1\n").unwrap();
    let mut server = start(dir.path());

    let (status, body, content_type) = get(&server, "/multi_slice/abc/eeeeee/z/0/0/888888/1/ff0000");
    assert_eq!(status, 200);
    assert_eq!(content_type.as_deref(), Some("image/png"));

    // IHDR width follows the 8-byte signature and the chunk header.
    let width = u32::from_be_bytes(body[16..20].try_into().unwrap());
    assert_eq!(width, 24);

    assert_eq!(get(&server, "/multi_slice/abc/eeeeee/z/0/3/888888").0, 404);
    assert_eq!(
        get(&server, "/multi_slice/abc/eeeeee/z/0/4294967295/ff0000").0,
        404
    );
    // Still serving after the rejected layer number.
    assert_eq!(get_json(&server, "/health").0, 200);
    server.stop();
}

#[test]
fn test_job_files_and_progress() {
    let dir = tempfile::tempdir().unwrap();
    let job = dir.path().join("abc");
    fs::create_dir(&job).unwrap();
    fs::write(job.join("buffer.bin"), [9u8, 8, 7]).unwrap();
    fs::write(job.join("progress"), "..").unwrap();
    fs::write(job.join("0.vox.contents"), "").unwrap();
    fs::write(job.join("log.json"), "{\"message\":\"done\"}\n").unwrap();
    let mut server = start(dir.path());

    let (status, body, content_type) = get(&server, "/safetybarriers/abc/annotation");
    assert_eq!(status, 200);
    assert_eq!(body, vec![9, 8, 7]);
    assert_eq!(content_type.as_deref(), Some("application/octet-stream"));
    assert_eq!(get(&server, "/run/abc/metadata").0, 404);

    let (_, progress) = get_json(&server, "/progress/abc");
    assert_eq!(progress, 2);
    let (_, progress) = get_json(&server, "/safetybarriers/abc/progress");
    assert_eq!(progress["progress"], 5);
    let (_, log) = get_json(&server, "/log/abc");
    assert_eq!(log[0]["message"], "done");
    server.stop();
}
