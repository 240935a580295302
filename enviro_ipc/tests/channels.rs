//! Channel behaviour tests for the memory and files transports.

use enviro::consts::{CONTROL_HEADROOM, FROM_FIELD_LENGTH, MAX_QUERIES_IN_FILE};
use enviro::protocol::ChunkFlags;
use enviro_ipc::testing::{CountingHandshake, FileDriver, chunk_flags};
use enviro_ipc::{Channel, ChannelKind, FileChannel, MemoryChannel, SharedBuffer};
use tempfile::TempDir;

fn memory_channel() -> (MemoryChannel, CountingHandshake) {
    let handshake = CountingHandshake::default();
    let channel = MemoryChannel::with_parts(SharedBuffer::heap(), Box::new(handshake.clone()));
    (channel, handshake)
}

#[test]
fn memory_reads_incoming_lines() {
    let (mut channel, _) = memory_channel();
    channel
        .buffer_mut()
        .write_incoming("7E(A)(B(1,2))\nControl: 3 0\n")
        .unwrap();

    channel.open_input().unwrap();
    assert_eq!(channel.read_line().unwrap().as_deref(), Some("7E(A)(B(1,2))"));
    assert_eq!(channel.read_line().unwrap().as_deref(), Some("Control: 3 0"));
    assert_eq!(channel.read_line().unwrap(), None);
}

#[test]
fn memory_chunk_is_nul_terminated_and_signalled() {
    let (mut channel, handshake) = memory_channel();
    channel.begin_output().unwrap();
    assert_eq!(handshake.waits(), 1);

    assert!(channel.append("7 E(0.5)\n", true).unwrap());
    channel.end_output(ChunkFlags::WHOLE).unwrap();

    assert_eq!(channel.buffer().outgoing_text(), "7 E(0.5)\nControl: 3\n");
    assert_eq!(handshake.signals(), 1);
    assert_eq!(channel.kind(), ChannelKind::Memory);
}

#[test]
fn memory_rejects_item_near_capacity_until_next_chunk() {
    let (mut channel, _) = memory_channel();
    channel.begin_output().unwrap();

    let item = format!("{}\n", "x".repeat(999));
    while channel.append(&item, true).unwrap() {}

    // The rejection threshold keeps the control headroom free.
    let end = channel.out_end();
    assert!(end + item.len() + CONTROL_HEADROOM >= FROM_FIELD_LENGTH - 1);
    assert!(end + CONTROL_HEADROOM < FROM_FIELD_LENGTH);

    // Untested control line still fits.
    channel.end_output(ChunkFlags::FIRST_CHUNK).unwrap();

    channel.begin_output().unwrap();
    assert_eq!(channel.out_end(), 0);
    assert!(channel.append(&item, true).unwrap());
}

#[test]
fn memory_refuses_to_cross_buffer_end() {
    let (mut channel, _) = memory_channel();
    channel.begin_output().unwrap();
    let huge = "y".repeat(FROM_FIELD_LENGTH);
    assert!(!channel.append(&huge, true).unwrap());
    assert!(channel.append(&huge, false).is_err());
}

#[test]
fn files_use_extension_and_reopen_input() {
    let dir = TempDir::new().unwrap();
    let handshake = CountingHandshake::default();
    let mut channel =
        FileChannel::with_handshake(dir.path(), Some(".f1"), Box::new(handshake.clone()));
    assert!(channel.input_path().ends_with("to_field.f1"));
    assert!(channel.output_path().ends_with("from_field.f1"));

    std::fs::write(channel.input_path(), "1E(A)(B)\n").unwrap();
    channel.open_input().unwrap();
    assert_eq!(channel.read_line().unwrap().as_deref(), Some("1E(A)(B)"));
    assert_eq!(channel.read_line().unwrap(), None);

    std::fs::write(channel.input_path(), "2E(C)(D)\n").unwrap();
    channel.open_input().unwrap();
    assert_eq!(channel.read_line().unwrap().as_deref(), Some("2E(C)(D)"));
    channel.close_input().unwrap();
    assert_eq!(channel.read_line().unwrap(), None);
}

#[test]
fn files_missing_input_is_io_error() {
    let dir = TempDir::new().unwrap();
    let mut channel =
        FileChannel::with_handshake(dir.path(), None, Box::new(CountingHandshake::default()));
    assert!(channel.open_input().is_err());
}

#[test]
fn files_item_limit_starts_new_chunk() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("to_field");
    let output = dir.path().join("from_field");
    let driver = FileDriver::new(input, output, Vec::new()).unwrap();
    let mut channel = FileChannel::with_handshake(dir.path(), None, Box::new(driver.clone()));

    channel.begin_output().unwrap();
    for i in 0..MAX_QUERIES_IN_FILE {
        assert!(channel.append(&format!("{i} E()\n"), true).unwrap());
    }
    assert!(!channel.append("overflow E()\n", true).unwrap());
    channel.end_output(ChunkFlags::FIRST_CHUNK).unwrap();

    channel.begin_output().unwrap();
    assert!(channel.append("overflow E()\n", true).unwrap());
    channel.end_output(ChunkFlags::LAST_CHUNK).unwrap();

    let chunks = driver.chunks();
    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].lines().count(), MAX_QUERIES_IN_FILE + 1);
    assert_eq!(chunk_flags(&chunks[0]), ChunkFlags::FIRST_CHUNK);
    assert_eq!(chunks[1], "overflow E()\nControl: 2\n");
}
