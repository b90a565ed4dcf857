use super::*;

fn recording() -> CapturePipeline {
    CapturePipeline::start(MediaContainer::WebmVp8, Some("slideshow.webm".to_string()))
}

#[test]
fn chunks_concatenate_in_arrival_order() {
    let mut pipeline = recording();
    pipeline.push_chunk(vec![1, 2]).unwrap();
    pipeline.push_chunk(vec![3]).unwrap();
    pipeline.push_chunk(vec![4, 5, 6]).unwrap();
    pipeline.stop();

    let artifact = pipeline.take_artifact().unwrap();
    assert_eq!(artifact.bytes, vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(artifact.container, MediaContainer::WebmVp8);
    assert_eq!(artifact.filename.as_deref(), Some("slideshow.webm"));
}

#[test]
fn empty_chunks_are_dropped_silently() {
    let mut pipeline = recording();
    pipeline.push_chunk(vec![]).unwrap();
    pipeline.push_chunk(vec![7]).unwrap();
    assert_eq!(pipeline.chunk_count(), 1);
}

#[test]
fn stop_is_idempotent_and_the_artifact_is_taken_once() {
    let mut pipeline = recording();
    pipeline.push_chunk(vec![9, 9]).unwrap();

    // Both completion triggers may fire; only the first finalizes.
    pipeline.stop();
    pipeline.stop();

    let artifact = pipeline.take_artifact();
    assert_eq!(artifact.unwrap().bytes, vec![9, 9]);
    assert!(pipeline.take_artifact().is_none());
}

#[test]
fn chunks_after_stop_are_rejected() {
    let mut pipeline = recording();
    pipeline.stop();
    assert!(matches!(
        pipeline.push_chunk(vec![1]),
        Err(SlidecastError::Capture(_))
    ));
}

#[test]
fn failure_discards_the_partial_buffer() {
    let mut pipeline = recording();
    pipeline.push_chunk(vec![1, 2, 3]).unwrap();
    pipeline.fail();

    assert!(!pipeline.is_recording());
    pipeline.stop();
    assert!(pipeline.take_artifact().is_none());
}

#[test]
fn container_metadata_is_carried_through() {
    assert_eq!(MediaContainer::WebmVp8.extension(), "webm");
    assert_eq!(MediaContainer::WebmVp8.mime(), "video/webm;codecs=vp8");
    assert_eq!(MediaContainer::Mp4.extension(), "mp4");
    assert_eq!(MediaContainer::Mp4.mime(), "video/mp4");
}
