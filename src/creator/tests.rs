use super::*;
use crate::constants::CREATED_BY;
use crate::metainfo::Metainfo;
use crate::piece::PieceHash;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_tree(root: &Path, files: &[(&str, &[u8])]) {
    for (name, data) in files {
        let path = root.join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, data).unwrap();
    }
}

fn pair(temp: &TempDir) -> PathBuf {
    let root = temp.path().join("pair");
    write_tree(&root, &[("a", &b"abc"[..]), ("b", &b"defgh"[..])]);
    root
}

async fn run_to_end(
    creator: &TorrentCreator,
    request: &CreationRequest,
) -> (Result<CreationStatus, CreateError>, Vec<u8>) {
    let mut seen = Vec::new();
    let result = creator
        .run(request, &CancellationToken::new(), |p| seen.push(p))
        .await;
    (result, seen)
}

async fn collect_events(handle: &mut CreationHandle) -> Vec<CreatorEvent> {
    let mut events = Vec::new();
    while let Some(event) = handle.next_event().await {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn test_creates_expected_torrent_bytes() {
    let temp = TempDir::new().unwrap();
    let input = pair(&temp);
    let output = temp.path().join("pair.torrent");

    let request = CreationRequest::new(&input, &output)
        .piece_size(4)
        .trackers(["http://a", "", "http://b"])
        .created_by("tester");

    let creator = TorrentCreator::new();
    let (result, _) = run_to_end(&creator, &request).await;
    let created = match result.unwrap() {
        CreationStatus::Created(created) => created,
        other => panic!("expected a torrent, got {other:?}"),
    };

    let mut expected = Vec::new();
    expected.extend_from_slice(b"d8:announce8:http://a13:announce-listll8:http://ael8:http://bee");
    expected.extend_from_slice(b"10:created by6:tester");
    expected.extend_from_slice(b"4:infod5:filesld6:lengthi3e4:pathl1:aeed6:lengthi5e4:pathl1:beee");
    expected.extend_from_slice(b"4:name4:pair12:piece lengthi4e6:pieces40:");
    expected.extend_from_slice(PieceHash::of(b"abcd").as_bytes());
    expected.extend_from_slice(PieceHash::of(b"efgh").as_bytes());
    expected.extend_from_slice(b"ee");

    assert_eq!(fs::read(&output).unwrap(), expected);
    assert_eq!(created.info_hash.to_hex(), "4ecbc0a6bbfa8790f9cdb9dde0d4966b52296dcc");
    assert_eq!(created.piece_count, 2);
    assert_eq!(created.total_length, 8);
    assert_eq!(created.output_path, output);
    assert_eq!(created.base_path, temp.path());
    assert_eq!(creator.state(), CreationState::Done);
}

#[tokio::test]
async fn test_repeated_runs_are_byte_identical() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("tree");
    write_tree(
        &input,
        &[
            ("z.bin", &[7u8; 3000][..]),
            ("dir/b.bin", &[1u8; 1500][..]),
            ("dir/a.bin", &[2u8; 10][..]),
            ("empty", &b""[..]),
            (".hidden", &b"secret"[..]),
        ],
    );
    let first = temp.path().join("1.torrent");
    let second = temp.path().join("2.torrent");

    let creator = TorrentCreator::new();
    let base = CreationRequest::new(&input, &first)
        .piece_size(1024)
        .comment("same")
        .url_seed("http://seed/");

    run_to_end(&creator, &base).await.0.unwrap();
    let mut again = base.clone();
    again.output_path = second.clone();
    run_to_end(&creator, &again).await.0.unwrap();

    let first_bytes = fs::read(&first).unwrap();
    assert_eq!(first_bytes, fs::read(&second).unwrap());

    let torrent = Metainfo::from_bytes(&first_bytes).unwrap();
    let paths: Vec<PathBuf> = torrent.info.files.iter().map(|f| f.path.clone()).collect();
    assert_eq!(
        paths,
        vec![
            PathBuf::from("tree/dir/a.bin"),
            PathBuf::from("tree/dir/b.bin"),
            PathBuf::from("tree/empty"),
            PathBuf::from("tree/z.bin"),
        ]
    );
    assert_eq!(torrent.info.total_length, 4510);
    assert_eq!(torrent.info.pieces.len(), 5);
    assert_eq!(torrent.created_by.as_deref(), Some(CREATED_BY));
    assert_eq!(torrent.url_list, vec!["http://seed/"]);
    assert!(torrent.creation_date.is_none());
}

#[tokio::test]
async fn test_single_file_torrent() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("abc.txt");
    fs::write(&input, b"abc").unwrap();
    let output = temp.path().join("abc.torrent");

    let request = CreationRequest::new(&input, &output)
        .private(true)
        .source("TRK")
        .creation_date(1_600_000_000);
    let creator = TorrentCreator::new();
    run_to_end(&creator, &request).await.0.unwrap();

    let torrent = Metainfo::from_bytes(&fs::read(&output).unwrap()).unwrap();
    assert_eq!(torrent.info.name, "abc.txt");
    assert_eq!(torrent.info.files.len(), 1);
    assert_eq!(torrent.info.total_length, 3);
    assert_eq!(
        torrent.info.pieces[0].to_hex(),
        "a9993e364706816aba3e25717850c26c9cd0d89d"
    );
    assert!(torrent.info.private);
    assert_eq!(torrent.info.source.as_deref(), Some("TRK"));
    assert_eq!(torrent.creation_date, Some(1_600_000_000));
}

#[tokio::test]
async fn test_empty_source_and_creator_are_omitted() {
    let temp = TempDir::new().unwrap();
    let input = pair(&temp);
    let output = temp.path().join("out.torrent");

    let request = CreationRequest::new(&input, &output)
        .piece_size(4)
        .source("")
        .created_by("");
    let creator = TorrentCreator::new();
    run_to_end(&creator, &request).await.0.unwrap();

    let bytes = fs::read(&output).unwrap();
    let torrent = Metainfo::from_bytes(&bytes).unwrap();
    assert!(torrent.info.source.is_none());
    assert!(torrent.created_by.is_none());
    assert!(!torrent.info.private);
    assert!(!bytes.windows(8).any(|w| w == b"6:source"));
    assert!(!bytes.windows(9).any(|w| w == b"7:private"));
}

#[tokio::test]
async fn test_progress_is_monotonic_and_complete() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("data.bin");
    fs::write(&input, vec![9u8; 1000]).unwrap();
    let output = temp.path().join("data.torrent");

    let request = CreationRequest::new(&input, &output).piece_size(16);
    let creator = TorrentCreator::new();
    let (result, seen) = run_to_end(&creator, &request).await;
    result.unwrap();

    assert_eq!(seen.first(), Some(&0));
    assert_eq!(seen.last(), Some(&100));
    assert!(seen.windows(2).all(|w| w[0] < w[1]));
    assert!(seen.contains(&99));
}

#[tokio::test]
async fn test_empty_input_is_rejected() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("hollow");
    write_tree(&input, &[("a", &b""[..]), (".b", &b"hidden"[..])]);
    let output = temp.path().join("hollow.torrent");

    let creator = TorrentCreator::new();
    let (result, _) = run_to_end(&creator, &CreationRequest::new(&input, &output)).await;

    let err = result.unwrap_err();
    assert!(matches!(err, CreateError::EmptyInput(_)));
    assert_eq!(err.kind(), ErrorKind::EmptyInput);
    assert!(!output.exists());
    assert_eq!(creator.state(), CreationState::Failed);
}

#[tokio::test]
async fn test_invalid_piece_size_is_rejected() {
    let temp = TempDir::new().unwrap();
    let input = pair(&temp);
    let output = temp.path().join("out.torrent");

    let creator = TorrentCreator::new();
    let request = CreationRequest::new(&input, &output).piece_size(0);
    let err = run_to_end(&creator, &request).await.0.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidConfig);
    assert!(!output.exists());
}

#[tokio::test]
async fn test_invalid_chunk_size_is_rejected() {
    let temp = TempDir::new().unwrap();
    let input = pair(&temp);
    let config = CreatorConfig {
        chunk_size: 0,
        ..CreatorConfig::default()
    };

    let creator = TorrentCreator::with_config(config);
    let request = CreationRequest::new(&input, temp.path().join("out.torrent"));
    let err = run_to_end(&creator, &request).await.0.unwrap_err();
    assert!(matches!(err, CreateError::InvalidConfig(_)));
}

#[tokio::test]
async fn test_missing_input_is_io_error() {
    let temp = TempDir::new().unwrap();
    let creator = TorrentCreator::new();
    let request = CreationRequest::new(temp.path().join("nope"), temp.path().join("x.torrent"));

    let err = run_to_end(&creator, &request).await.0.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
}

#[tokio::test]
async fn test_non_power_of_two_piece_size_is_accepted() {
    let temp = TempDir::new().unwrap();
    let input = pair(&temp);
    let output = temp.path().join("odd.torrent");

    let creator = TorrentCreator::new();
    let request = CreationRequest::new(&input, &output).piece_size(3);
    let status = run_to_end(&creator, &request).await.0.unwrap();

    match status {
        CreationStatus::Created(created) => assert_eq!(created.piece_count, 3),
        other => panic!("expected a torrent, got {other:?}"),
    }
}

#[tokio::test]
async fn test_cancel_between_pieces_leaves_no_output() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("big.bin");
    fs::write(&input, vec![5u8; 400]).unwrap();
    let output = temp.path().join("big.torrent");

    let creator = TorrentCreator::new();
    let request = CreationRequest::new(&input, &output).piece_size(4);
    let cancel = CancellationToken::new();

    // Cancel once about a third of the 100 pieces are hashed.
    let mut seen = Vec::new();
    let status = creator
        .run(&request, &cancel, |p| {
            seen.push(p);
            if p >= 33 {
                cancel.cancel();
            }
        })
        .await
        .unwrap();

    assert_eq!(status, CreationStatus::Cancelled);
    assert_eq!(creator.state(), CreationState::Cancelled);
    assert!(!output.exists());
    assert_eq!(seen.last(), Some(&33));
    assert!(!seen.contains(&100));
}

#[tokio::test]
async fn test_cancelled_before_start() {
    let temp = TempDir::new().unwrap();
    let input = pair(&temp);
    let output = temp.path().join("never.torrent");

    let creator = TorrentCreator::new();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let status = creator
        .run(&CreationRequest::new(&input, &output), &cancel, |_| {})
        .await
        .unwrap();
    assert_eq!(status, CreationStatus::Cancelled);
    assert!(!output.exists());
}

#[tokio::test]
async fn test_missing_output_directory_fails_cleanly() {
    let temp = TempDir::new().unwrap();
    let input = pair(&temp);
    let output = temp.path().join("no/such/dir/out.torrent");

    let creator = TorrentCreator::new();
    let mut handle = creator
        .create(CreationRequest::new(&input, &output).piece_size(4))
        .unwrap();
    let events = collect_events(&mut handle).await;
    let result = handle.join().await;

    assert!(matches!(result, Err(CreateError::Io(_))));
    assert!(matches!(
        events.last(),
        Some(CreatorEvent::Failed {
            kind: ErrorKind::Io,
            ..
        })
    ));
    assert!(!events.iter().any(|e| matches!(e, CreatorEvent::Created(_))));
    assert!(!output.exists());
    assert!(!temp.path().join("no").exists());
    assert_eq!(creator.state(), CreationState::Failed);
}

#[tokio::test]
async fn test_hidden_input_is_empty() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join(".cache");
    write_tree(&input, &[("blob", &[9u8; 64][..])]);
    let output = temp.path().join("cache.torrent");

    let creator = TorrentCreator::new();
    let (result, seen) = run_to_end(&creator, &CreationRequest::new(&input, &output)).await;

    assert!(matches!(result, Err(CreateError::EmptyInput(_))));
    assert!(seen.is_empty());
    assert!(!output.exists());
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn test_failed_write_removes_output() {
    let device = Path::new("/dev/full");
    if !device.exists() {
        return;
    }

    let temp = TempDir::new().unwrap();
    let input = pair(&temp);
    let output = temp.path().join("full.torrent");
    std::os::unix::fs::symlink(device, &output).unwrap();

    let creator = TorrentCreator::new();
    let mut handle = creator
        .create(CreationRequest::new(&input, &output).piece_size(4))
        .unwrap();
    let events = collect_events(&mut handle).await;
    let result = handle.join().await;

    assert!(matches!(result, Err(CreateError::Io(_))));
    assert!(matches!(
        events.last(),
        Some(CreatorEvent::Failed {
            kind: ErrorKind::Io,
            ..
        })
    ));
    assert!(!events.contains(&CreatorEvent::Progress(100)));
    assert!(fs::symlink_metadata(&output).is_err());
    assert!(device.exists());
    assert_eq!(creator.state(), CreationState::Failed);
}

#[tokio::test]
async fn test_existing_output_is_replaced() {
    let temp = TempDir::new().unwrap();
    let input = pair(&temp);
    let output = temp.path().join("stale.torrent");
    let fresh = temp.path().join("fresh.torrent");
    fs::write(&output, vec![b'x'; 64 * 1024]).unwrap();

    let creator = TorrentCreator::new();
    let (result, _) = run_to_end(&creator, &CreationRequest::new(&input, &output)).await;
    result.unwrap();
    let (result, _) = run_to_end(&creator, &CreationRequest::new(&input, &fresh)).await;
    result.unwrap();

    let written = fs::read(&output).unwrap();
    assert_eq!(written, fs::read(&fresh).unwrap());
    assert!(written.len() < 64 * 1024);
    assert!(Metainfo::from_bytes(&written).is_ok());
}

#[tokio::test]
async fn test_spawned_run_reports_events() {
    let temp = TempDir::new().unwrap();
    let input = pair(&temp);
    let output = temp.path().join("spawned.torrent");

    let creator = TorrentCreator::new();
    let mut handle = creator
        .create(CreationRequest::new(&input, &output).piece_size(4))
        .unwrap();
    let events = collect_events(&mut handle).await;
    let status = handle.join().await.unwrap();

    let created = match status {
        CreationStatus::Created(created) => created,
        other => panic!("expected a torrent, got {other:?}"),
    };
    assert_eq!(events.first(), Some(&CreatorEvent::Progress(0)));
    assert_eq!(events.last(), Some(&CreatorEvent::Created(created)));
    assert!(events.contains(&CreatorEvent::Progress(100)));
    assert!(output.exists());
}

#[tokio::test]
async fn test_cancelled_spawned_run_sends_no_outcome() {
    let temp = TempDir::new().unwrap();
    let input = pair(&temp);
    let output = temp.path().join("cancelled.torrent");

    let creator = TorrentCreator::new();
    let mut handle = creator
        .create(CreationRequest::new(&input, &output))
        .unwrap();
    handle.cancel();

    let events = collect_events(&mut handle).await;
    assert_eq!(handle.join().await.unwrap(), CreationStatus::Cancelled);
    assert!(events
        .iter()
        .all(|e| matches!(e, CreatorEvent::Progress(_))));
    assert!(!output.exists());
}

#[tokio::test]
async fn test_second_run_while_busy_is_refused() {
    let temp = TempDir::new().unwrap();
    let input = pair(&temp);

    let creator = TorrentCreator::new();
    let first = creator
        .create(CreationRequest::new(&input, temp.path().join("1.torrent")))
        .unwrap();

    let second = creator.create(CreationRequest::new(&input, temp.path().join("2.torrent")));
    assert!(matches!(second, Err(CreateError::AlreadyRunning)));

    let (direct, _) = run_to_end(
        &creator,
        &CreationRequest::new(&input, temp.path().join("3.torrent")),
    )
    .await;
    assert!(matches!(direct, Err(CreateError::AlreadyRunning)));

    first.join().await.unwrap();
    assert_eq!(creator.state(), CreationState::Done);

    let third = creator
        .create(CreationRequest::new(&input, temp.path().join("4.torrent")))
        .unwrap();
    third.join().await.unwrap();
    assert!(temp.path().join("4.torrent").exists());
    assert!(!temp.path().join("2.torrent").exists());
}

#[tokio::test]
async fn test_dropping_creator_cancels_run() {
    let temp = TempDir::new().unwrap();
    let input = pair(&temp);
    let output = temp.path().join("dropped.torrent");

    let creator = TorrentCreator::new();
    let handle = creator.create(CreationRequest::new(&input, &output)).unwrap();
    drop(creator);

    assert_eq!(handle.join().await.unwrap(), CreationStatus::Cancelled);
    assert!(!output.exists());
}

#[tokio::test]
async fn test_estimate_piece_count() {
    let temp = TempDir::new().unwrap();
    let input = pair(&temp);

    assert_eq!(estimate_piece_count(&input, 4).await.unwrap(), 2);
    assert_eq!(estimate_piece_count(&input, 3).await.unwrap(), 3);
    assert_eq!(estimate_piece_count(&input, 1 << 20).await.unwrap(), 1);
    assert_eq!(estimate_piece_count(Path::new(""), 4).await.unwrap(), 0);
    assert!(matches!(
        estimate_piece_count(&input, 0).await,
        Err(CreateError::InvalidConfig(_))
    ));
    assert_eq!(
        estimate_piece_count(&temp.path().join("missing"), 4)
            .await
            .unwrap_err()
            .kind(),
        ErrorKind::Io
    );
}

#[test]
fn test_request_validation() {
    assert!(CreationRequest::new("in", "out.torrent").validate().is_ok());
    assert!(CreationRequest::new("in", "out.torrent")
        .piece_size(1000)
        .validate()
        .is_ok());
    assert!(CreationRequest::new("", "out.torrent").validate().is_err());
    assert!(CreationRequest::new("in", "").validate().is_err());
    assert!(matches!(
        CreationRequest::new("in", "out.torrent").piece_size(0).validate(),
        Err(CreateError::InvalidConfig(_))
    ));
}

#[test]
fn test_state_classification() {
    assert!(!CreationState::Idle.is_active());
    assert!(CreationState::Hashing.is_active());
    assert!(CreationState::Writing.is_active());
    assert!(CreationState::Cancelled.is_terminal());
    assert!(!CreationState::Building.is_terminal());
}

#[test]
fn test_error_kinds() {
    assert_eq!(CreateError::AlreadyRunning.kind(), ErrorKind::Internal);
    assert_eq!(
        CreateError::from(std::io::Error::other("disk")).kind(),
        ErrorKind::Io
    );
    assert_eq!(
        CreateError::from(crate::piece::PlanError::InvalidPieceSize(0)).kind(),
        ErrorKind::InvalidConfig
    );
}
