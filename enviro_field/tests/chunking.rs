//! Reply splitting across physical chunks on the files transport.

use std::fmt::Write as _;
use std::path::Path;

use enviro::consts::{FROM_FIELD_FILE, MAX_QUERIES_IN_FILE, TO_FIELD_FILE};
use enviro::protocol::ChunkFlags;
use enviro_field::{EchoField, FieldSession, TurtleSpec, run};
use enviro_ipc::channel::exchange_path;
use enviro_ipc::testing::{FileDriver, chunk_flags};
use enviro_ipc::FileChannel;
use proptest::prelude::*;
use tempfile::TempDir;

const EXT: &str = ".7";

fn request(count: usize, step: i64) -> String {
    let mut text = String::new();
    for i in 0..count {
        writeln!(text, "{i}E(A({i}))(B)").unwrap();
    }
    writeln!(text, "Control: 3 {step}").unwrap();
    text
}

fn session_with_driver(dir: &Path, script: Vec<String>) -> (FieldSession, FileDriver) {
    let driver = FileDriver::new(
        exchange_path(dir, TO_FIELD_FILE, Some(EXT)),
        exchange_path(dir, FROM_FIELD_FILE, Some(EXT)),
        script,
    )
    .unwrap();
    let channel = FileChannel::with_handshake(dir, Some(EXT), Box::new(driver.clone()));
    (
        FieldSession::new(Box::new(channel), TurtleSpec::default()),
        driver,
    )
}

fn replies(chunk: &str) -> Vec<&str> {
    chunk
        .lines()
        .filter(|line| !line.starts_with("Control:"))
        .collect()
}

#[test]
fn large_reply_is_split_and_conserved() {
    let total = 2 * MAX_QUERIES_IN_FILE + 500;
    let dir = TempDir::new().unwrap();
    let (mut session, driver) =
        session_with_driver(dir.path(), vec![request(total, 1), "Control: 4\n".into()]);

    let steps = run(&mut session, &mut EchoField::default()).unwrap();
    assert_eq!(steps, 1);

    let chunks = driver.chunks();
    let flags: Vec<_> = chunks.iter().map(|c| chunk_flags(c)).collect();
    assert_eq!(
        flags,
        [
            ChunkFlags::FIRST_CHUNK,
            ChunkFlags::empty(),
            ChunkFlags::LAST_CHUNK
        ]
    );

    let sizes: Vec<_> = chunks.iter().map(|c| replies(c).len()).collect();
    assert_eq!(sizes, [MAX_QUERIES_IN_FILE, MAX_QUERIES_IN_FILE, 500]);

    let all: Vec<String> = chunks
        .iter()
        .flat_map(|c| replies(c))
        .map(str::to_string)
        .collect();
    let expected: Vec<String> = (0..total).map(|i| format!("{i} A({i})")).collect();
    assert_eq!(all, expected);
}

#[test]
fn reply_that_fits_is_one_whole_chunk() {
    let dir = TempDir::new().unwrap();
    let (mut session, driver) = session_with_driver(
        dir.path(),
        vec![request(3, 1), request(MAX_QUERIES_IN_FILE, 2), "Control: 4\n".into()],
    );

    let steps = run(&mut session, &mut EchoField::default()).unwrap();
    assert_eq!(steps, 2);

    let chunks = driver.chunks();
    assert_eq!(chunks.len(), 2);
    assert!(chunks.iter().all(|c| chunk_flags(c) == ChunkFlags::WHOLE));
    assert_eq!(replies(&chunks[0]), ["0 A(0)", "1 A(1)", "2 A(2)"]);
    assert_eq!(replies(&chunks[1]).len(), MAX_QUERIES_IN_FILE);
    assert_eq!(session.step(), Some(2));
}

#[test]
fn split_request_gets_empty_intermediate_reply() {
    let dir = TempDir::new().unwrap();
    let (mut session, driver) = session_with_driver(
        dir.path(),
        vec![
            "0E(A)(B)\nControl: 1 3\n".into(),
            "1E(C)(D)\nControl: 2 3\n".into(),
            "Control: 4\n".into(),
        ],
    );

    run(&mut session, &mut EchoField::default()).unwrap();

    let chunks = driver.chunks();
    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0], "Control: 3\n");
    assert_eq!(chunks[1], "0 A()\n1 C()\nControl: 3\n");
}

fn expected_flags(chunks: usize) -> Vec<ChunkFlags> {
    if chunks == 1 {
        return vec![ChunkFlags::WHOLE];
    }
    (0..chunks)
        .map(|i| match i {
            0 => ChunkFlags::FIRST_CHUNK,
            i if i == chunks - 1 => ChunkFlags::LAST_CHUNK,
            _ => ChunkFlags::empty(),
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    /// Every reply lands in exactly one chunk, in order, and only the
    /// first and last chunks carry their boundary flags.
    #[test]
    fn prop_chunks_conserve_replies(total in 0usize..3200) {
        let dir = TempDir::new().unwrap();
        let (mut session, driver) =
            session_with_driver(dir.path(), vec![request(total, 1), "Control: 4\n".into()]);
        run(&mut session, &mut EchoField::default()).unwrap();

        let chunks = driver.chunks();
        let count = total.div_ceil(MAX_QUERIES_IN_FILE).max(1);
        let flags: Vec<_> = chunks.iter().map(|c| chunk_flags(c)).collect();
        prop_assert_eq!(flags, expected_flags(count));

        let indices: Vec<usize> = chunks
            .iter()
            .flat_map(|c| replies(c))
            .map(|line| line.split_once(' ').unwrap().0.parse().unwrap())
            .collect();
        prop_assert_eq!(indices, (0..total).collect::<Vec<_>>());
        prop_assert!(chunks.iter().all(|c| replies(c).len() <= MAX_QUERIES_IN_FILE));
    }
}
