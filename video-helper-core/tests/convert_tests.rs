// video-helper-core/tests/convert_tests.rs

use std::fs;
use std::path::Path;

use tempfile::tempdir;
use video_helper_core::external::mocks::{MockFfmpegSpawner, MockFfprobeExecutor};
use video_helper_core::frames::Frame;
use video_helper_core::{CoreConfig, CoreError, TranscodeRequest, convert, dump_frames, try_dump_frames};

fn arg_after(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1).cloned())
}

fn partial_files_in(dir: &Path) -> std::io::Result<bool> {
    for entry in fs::read_dir(dir)? {
        if entry?.file_name().to_string_lossy().starts_with(".video_helper_partial") {
            return Ok(true);
        }
    }
    Ok(false)
}

fn config_in(dir: &Path) -> CoreConfig {
    CoreConfig::default().with_temp_dir(Some(dir.join("work")))
}

#[test]
fn test_pure_copy_short_circuits() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempdir()?;
    let input = tmp.path().join("movie.avi");
    fs::write(&input, b"input")?;
    let expected_output = tmp.path().join("movie-converted.avi");

    let executor = MockFfprobeExecutor::new();
    executor.expect_video(&input, 640, 480, 8.0, "25/1", true);
    executor.expect_any_video(640, 480, 8.0, "25/1", true);
    let spawner = MockFfmpegSpawner::always_succeeding();

    let output = convert(&executor, &spawner, &input, None, &TranscodeRequest::default(), &config_in(tmp.path()))?;

    assert_eq!(output, expected_output);
    assert!(output.exists());
    let calls = spawner.get_received_calls();
    assert_eq!(calls.len(), 1, "pure copy runs a single stream copy");
    let joined = calls[0].join(" ");
    assert!(joined.contains("-c:v copy -c:a copy"));
    assert!(joined.contains("-y"));
    assert!(!joined.contains("-vf"));

    // The input, then the partial copy before it was placed
    let probed = executor.probed_paths();
    assert_eq!(probed.len(), 2);
    assert_eq!(probed[0], input);
    assert_eq!(probed[1].parent(), expected_output.parent());
    assert_ne!(probed[1], expected_output);
    assert!(!probed[1].exists());
    Ok(())
}

#[test]
fn test_pure_copy_that_changes_streams_fails() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempdir()?;
    let input = tmp.path().join("movie.mkv");
    fs::write(&input, b"input")?;
    let output = tmp.path().join("copy.mkv");

    let executor = MockFfprobeExecutor::new();
    executor.expect_video(&input, 640, 480, 8.0, "25/1", true);
    // The copy lost its audio track
    executor.expect_any_video(640, 480, 8.0, "25/1", false);
    let spawner = MockFfmpegSpawner::always_succeeding();

    let err = convert(&executor, &spawner, &input, Some(&output), &TranscodeRequest::default(), &config_in(tmp.path()))
        .unwrap_err();
    match err {
        CoreError::ConversionVerification { path, property, .. } => {
            assert_eq!(path, output);
            assert_eq!(property, "audio");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!output.exists());
    assert!(!partial_files_in(tmp.path())?, "partial copy removed");
    Ok(())
}

#[test]
fn test_full_pipeline_stages_and_arguments() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempdir()?;
    let input = tmp.path().join("source.mkv");
    fs::write(&input, b"input")?;
    let output = tmp.path().join("out").join("target.webm");

    let executor = MockFfprobeExecutor::new();
    executor.expect_video(&input, 1920, 1080, 8.0, "30/1", true);
    executor.expect_any_video(640, 360, 8.0, "24/1", false);
    let spawner = MockFfmpegSpawner::always_succeeding();

    let request = TranscodeRequest::new(Some(24.0), Some(641), Some(360), true);
    let result = convert(&executor, &spawner, &input, Some(&output), &request, &config_in(tmp.path()))?;
    assert_eq!(result, output);
    assert!(output.exists());

    let calls = spawner.get_received_calls();
    assert_eq!(calls.len(), 3, "normalize, encode and restore: {calls:?}");

    // Normalize: stream copy of the mkv into the working mp4
    let normalize = &calls[0];
    assert_eq!(arg_after(normalize, "-i").as_deref(), input.to_str());
    assert_eq!(arg_after(normalize, "-c:v").as_deref(), Some("copy"));
    assert!(normalize.last().is_some_and(|p| p.ends_with(".mp4")));

    // Encode: frame rate, box scale/pad (width evened to 640), no audio
    let encode = &calls[1];
    assert_eq!(arg_after(encode, "-r").as_deref(), Some("24"));
    assert_eq!(
        arg_after(encode, "-vf").as_deref(),
        Some("scale='min(640,iw*360/ih)':'min(360,ih*640/iw)',pad=640:360:(ow-iw)/2:(oh-ih)/2:black")
    );
    assert!(encode.iter().any(|a| a == "-an"));

    // Restore: stream copy into a partial file next to the output
    let restore = &calls[2];
    assert_eq!(arg_after(restore, "-c:a").as_deref(), Some("copy"));
    let partial = restore.last().cloned().unwrap_or_default();
    assert!(Path::new(&partial).parent() == output.parent());
    assert!(partial.ends_with(".webm"));
    assert!(!Path::new(&partial).exists(), "partial file renamed into place");

    // Working files are gone
    let leftovers = fs::read_dir(tmp.path().join("work"))?.count();
    assert_eq!(leftovers, 0);
    Ok(())
}

#[test]
fn test_working_container_input_is_copied_not_remuxed() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempdir()?;
    let input = tmp.path().join("clip.mp4");
    fs::write(&input, b"input")?;
    let output = tmp.path().join("small.mp4");

    let executor = MockFfprobeExecutor::new();
    executor.expect_video(&input, 1280, 720, 4.0, "30/1", false);
    executor.expect_any_video(640, 360, 4.0, "30/1", false);
    let spawner = MockFfmpegSpawner::always_succeeding();

    let request = TranscodeRequest::default().with_width(640);
    convert(&executor, &spawner, &input, Some(&output), &request, &config_in(tmp.path()))?;

    let calls = spawner.get_received_calls();
    assert_eq!(calls.len(), 1, "only the encode runs ffmpeg: {calls:?}");
    assert_eq!(arg_after(&calls[0], "-vf").as_deref(), Some("scale=640:-2"));
    assert!(output.exists());
    Ok(())
}

#[test]
fn test_verification_mismatch_keeps_existing_output() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempdir()?;
    let input = tmp.path().join("clip.mp4");
    fs::write(&input, b"input")?;
    let output = tmp.path().join("slow.mp4");
    fs::write(&output, b"earlier result")?;

    let executor = MockFfprobeExecutor::new();
    executor.expect_video(&input, 320, 240, 4.0, "30/1", false);
    // The encoder silently kept the original rate
    executor.expect_any_video(320, 240, 4.0, "30/1", false);
    let spawner = MockFfmpegSpawner::always_succeeding();

    let request = TranscodeRequest::default().with_frame_rate(12.0);
    let err = convert(&executor, &spawner, &input, Some(&output), &request, &config_in(tmp.path())).unwrap_err();

    match err {
        CoreError::ConversionVerification { path, property, expected, .. } => {
            assert_eq!(path, output);
            assert_eq!(property, "frame rate");
            assert_eq!(expected, "12");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(fs::read(&output)?, b"earlier result");
    assert!(!partial_files_in(tmp.path())?, "partial output removed");
    Ok(())
}

#[test]
fn test_verification_mismatch_leaves_no_output() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempdir()?;
    let input = tmp.path().join("clip.mp4");
    fs::write(&input, b"input")?;
    let output = tmp.path().join("small.mp4");

    let executor = MockFfprobeExecutor::new();
    executor.expect_video(&input, 1280, 720, 4.0, "30/1", false);
    executor.expect_any_video(1280, 720, 4.0, "30/1", false);
    let spawner = MockFfmpegSpawner::always_succeeding();

    let request = TranscodeRequest::default().with_height(360);
    let err = convert(&executor, &spawner, &input, Some(&output), &request, &config_in(tmp.path())).unwrap_err();
    assert!(matches!(err, CoreError::ConversionVerification { .. }), "got {err:?}");
    assert!(!output.exists());
    Ok(())
}

#[test]
fn test_failed_encode_never_promotes_output() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempdir()?;
    let input = tmp.path().join("clip.mov");
    fs::write(&input, b"input")?;
    let output = tmp.path().join("clip.mp4");

    let executor = MockFfprobeExecutor::new();
    executor.expect_video(&input, 320, 240, 4.0, "30/1", true);
    let spawner = MockFfmpegSpawner::always_succeeding();
    spawner.add_exit_error_expectation("-an", vec!["Invalid argument".to_string()], 1);

    let request = TranscodeRequest::default().without_sound();
    let err = convert(&executor, &spawner, &input, Some(&output), &request, &config_in(tmp.path())).unwrap_err();

    assert!(matches!(err, CoreError::ExternalTool { .. }), "got {err:?}");
    assert!(err.to_string().contains("Invalid argument"));
    assert!(!output.exists());
    assert_eq!(spawner.get_received_calls().len(), 2);
    Ok(())
}

#[test]
fn test_timeout_is_reported() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempdir()?;
    let input = tmp.path().join("clip.mp4");
    fs::write(&input, b"input")?;

    let executor = MockFfprobeExecutor::new();
    executor.expect_video(&input, 320, 240, 4.0, "30/1", false);
    let spawner = MockFfmpegSpawner::new();
    spawner.add_timeout_expectation("-r");

    let config = config_in(tmp.path()).with_timeout(Some(std::time::Duration::from_secs(5)));
    let request = TranscodeRequest::default().with_frame_rate(60.0);
    let err = convert(&executor, &spawner, &input, None, &request, &config).unwrap_err();
    assert!(matches!(err, CoreError::Timeout { .. }), "got {err:?}");
    Ok(())
}

#[test]
fn test_invalid_input_stops_before_ffmpeg() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempdir()?;
    let executor = MockFfprobeExecutor::new();
    let spawner = MockFfmpegSpawner::new();

    let missing = tmp.path().join("missing.mp4");
    let err = convert(&executor, &spawner, &missing, None, &TranscodeRequest::default(), &CoreConfig::default())
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound(_)));

    let text = tmp.path().join("notes.mp4");
    fs::write(&text, b"hello")?;
    executor.expect_failure(&text, "Invalid data found when processing input");
    let err = convert(&executor, &spawner, &text, None, &TranscodeRequest::default(), &CoreConfig::default())
        .unwrap_err();
    assert!(matches!(err, CoreError::InvalidMedia { .. }));
    assert!(spawner.get_received_calls().is_empty());
    Ok(())
}

#[test]
fn test_dump_frames_assembles_at_requested_rate() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempdir()?;
    let output = tmp.path().join("dump.mkv");
    let spawner = MockFfmpegSpawner::always_succeeding();

    let frames = (0..3).map(|i| Frame::filled(8, 6, [i * 40, 0, 0]));
    let result = dump_frames(&spawner, frames, &output, 24, &config_in(tmp.path()))?;
    assert_eq!(result, output);
    assert!(output.exists());

    let calls = spawner.get_received_calls();
    assert_eq!(calls.len(), 2, "assemble then remux into mkv");
    let assemble = &calls[0];
    assert_eq!(arg_after(assemble, "-framerate").as_deref(), Some("24"));
    assert!(arg_after(assemble, "-i").is_some_and(|p| p.ends_with("frame_%09d.png")));
    assert_eq!(arg_after(assemble, "-c:v").as_deref(), Some("libx264"));
    assert_eq!(arg_after(assemble, "-pix_fmt").as_deref(), Some("yuv420p"));
    assert!(assemble.last().is_some_and(|p| p.ends_with("temp_movie.mp4")));
    assert_eq!(arg_after(&calls[1], "-c:v").as_deref(), Some("copy"));
    Ok(())
}

#[test]
fn test_dump_frames_with_odd_size_skips_yuv420p() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempdir()?;
    let output = tmp.path().join("odd.mp4");
    let spawner = MockFfmpegSpawner::always_succeeding();

    let frames = (0..2).map(|_| Frame::filled(5, 3, [9, 9, 9]));
    dump_frames(&spawner, frames, &output, 30, &config_in(tmp.path()))?;

    let calls = spawner.get_received_calls();
    assert_eq!(arg_after(&calls[0], "-c:v").as_deref(), Some("libx264"));
    assert!(!calls[0].iter().any(|a| a == "-pix_fmt"), "{:?}", calls[0]);
    assert!(output.exists());
    Ok(())
}

#[test]
fn test_dump_frames_rejects_empty_and_mixed_input() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempdir()?;
    let output = tmp.path().join("dump.mp4");
    let spawner = MockFfmpegSpawner::new();
    let config = config_in(tmp.path());

    let err = dump_frames(&spawner, Vec::<Frame>::new(), &output, 30, &config).unwrap_err();
    assert!(matches!(err, CoreError::EmptyInput));

    let frames = vec![
        Frame::filled(8, 6, [0, 0, 0]),
        Frame::filled(8, 6, [1, 1, 1]),
        Frame::filled(6, 8, [2, 2, 2]),
    ];
    let err = dump_frames(&spawner, frames, &output, 30, &config).unwrap_err();
    match err {
        CoreError::InconsistentFrameShape { index, expected, actual } => {
            assert_eq!(index, 2);
            assert_eq!(expected, (6, 8, 3));
            assert_eq!(actual, (8, 6, 3));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let failing = vec![Ok(Frame::filled(4, 4, [0, 0, 0])), Err(CoreError::EmptyInput)];
    assert!(try_dump_frames(&spawner, failing, &output, 30, &config).is_err());

    assert!(spawner.get_received_calls().is_empty());
    assert!(!output.exists());
    Ok(())
}
