//! Unit tests for chunk collection and recording artifacts
//!
//! These tests drive the mock recorder through its event stream the same
//! way a capture session does and check what ends up in the artifact.

use bytes::Bytes;
use camrec_core::Lease;
use camrec_core::ResourceTracker;
use camrec_media::*;
use rstest::*;

async fn record(host: &MockHost) -> (ChunkBuffer, Option<String>) {
    let stream = host
        .request_camera(&CaptureConstraints::default())
        .await
        .unwrap();
    let mut recorder = host
        .create_recorder(&stream, &RecorderOptions::default())
        .unwrap();

    recorder.start().unwrap();
    assert_eq!(recorder.state(), RecorderState::Recording);
    recorder.stop().unwrap();
    assert_eq!(recorder.state(), RecorderState::Inactive);

    let mut buffer = ChunkBuffer::new();
    while let Some(event) = recorder.next_event().await {
        match event {
            RecorderEvent::Data(chunk) => {
                buffer.push(chunk);
            }
            RecorderEvent::Error(reason) => panic!("unexpected recorder error: {}", reason),
            RecorderEvent::Stopped => break,
        }
    }

    (buffer, recorder.mime_type())
}

// ============================================================================
// CHUNK COLLECTION TESTS
// ============================================================================

#[rstest]
#[case(vec![vec![1u8; 10]])]
#[case(vec![vec![1u8; 3], vec![2u8; 5], vec![3u8; 7]])]
#[case(vec![vec![9u8; 1024]; 16])]
#[tokio::test]
async fn test_artifact_size_is_sum_of_fragments(#[case] fragments: Vec<Vec<u8>>) {
    let expected: usize = fragments.iter().map(Vec::len).sum();
    let host = MockHost::new().with_chunks(fragments.clone());

    let (buffer, mime) = record(&host).await;
    let artifact = RecordingArtifact::from_chunks(&buffer, mime.as_deref());

    assert_eq!(artifact.size(), expected);
    assert_eq!(artifact.chunk_count(), fragments.len());
    assert_eq!(artifact.data().as_ref(), fragments.concat().as_slice());
}

#[tokio::test]
async fn test_empty_fragments_are_not_collected() {
    let host = MockHost::new().with_chunks(vec![
        Bytes::from_static(b"head"),
        Bytes::new(),
        Bytes::from_static(b"tail"),
        Bytes::new(),
    ]);

    let (buffer, _) = record(&host).await;

    assert_eq!(buffer.len(), 2);
    assert_eq!(buffer.total_bytes(), 8);
    assert_eq!(buffer.concat(), Bytes::from_static(b"headtail"));
}

#[tokio::test]
async fn test_data_arrives_before_stop() {
    let host = MockHost::new().with_chunks(vec![b"a".to_vec(), b"b".to_vec()]);
    let stream = host
        .request_camera(&CaptureConstraints::default())
        .await
        .unwrap();
    let mut recorder = host
        .create_recorder(&stream, &RecorderOptions::default())
        .unwrap();

    recorder.start().unwrap();
    recorder.stop().unwrap();

    assert_eq!(
        recorder.next_event().await,
        Some(RecorderEvent::Data(Bytes::from_static(b"a")))
    );
    assert_eq!(
        recorder.next_event().await,
        Some(RecorderEvent::Data(Bytes::from_static(b"b")))
    );
    assert_eq!(recorder.next_event().await, Some(RecorderEvent::Stopped));
    assert_eq!(recorder.next_event().await, None);
}

#[tokio::test]
async fn test_recorder_reports_configured_mime() {
    let host = MockHost::new()
        .with_chunks(vec![b"x".to_vec()])
        .with_recorder_mime("video/mp4");

    let (buffer, mime) = record(&host).await;
    let artifact = RecordingArtifact::from_chunks(&buffer, mime.as_deref());

    assert_eq!(artifact.mime_type(), "video/mp4");
}

#[tokio::test]
async fn test_stop_without_start_fails() {
    let host = MockHost::new();
    let stream = host
        .request_camera(&CaptureConstraints::default())
        .await
        .unwrap();
    let mut recorder = host
        .create_recorder(&stream, &RecorderOptions::default())
        .unwrap();

    assert!(recorder.stop().is_err());
}

#[tokio::test]
async fn test_recorder_lease_counts_against_tracker() {
    let host = MockHost::new();
    let tracker = ResourceTracker::new();
    let stream = host
        .request_camera(&CaptureConstraints::default())
        .await
        .unwrap();
    let stream = Lease::new(stream, &tracker);
    let recorder = host
        .create_recorder(&stream, &RecorderOptions::default())
        .unwrap();
    let recorder = Lease::new(recorder, &tracker);

    assert_eq!(tracker.usage().capture_streams, 1);
    assert_eq!(tracker.usage().recorders, 1);

    drop(recorder);
    stream.release();

    assert_eq!(tracker.usage().total(), 0);
    assert!(host.live_streams().is_empty());
}
