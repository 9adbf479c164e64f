use transcriber_bridge::audio::pcm;

#[test]
fn test_validate_frame_accepts_aligned_stereo() {
    // 4 bytes per interleaved frame at 2 channels
    assert!(pcm::validate_frame(&[0u8; 640], 2).is_ok());
    assert!(pcm::validate_frame(&[], 2).is_ok());
}

#[test]
fn test_validate_frame_rejects_odd_length() {
    assert!(pcm::validate_frame(&[0u8; 3], 1).is_err());
    assert!(pcm::validate_frame(&[0u8; 641], 2).is_err());
}

#[test]
fn test_validate_frame_rejects_partial_interleave() {
    // Even byte count but half an interleaved stereo frame
    assert!(pcm::validate_frame(&[0u8; 2], 2).is_err());
}

#[test]
fn test_validate_frame_rejects_zero_channels() {
    assert!(pcm::validate_frame(&[0u8; 4], 0).is_err());
}

#[test]
fn test_samples_from_le_bytes() {
    let samples = vec![100i16, -200, 300, -400];
    let bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();

    assert_eq!(pcm::samples_from_le_bytes(&bytes), samples);
}

#[test]
fn test_duration_ms() {
    // 1 second of 16kHz stereo: 16000 frames * 2 channels * 2 bytes
    assert_eq!(pcm::duration_ms(64000, 16000, 2), 1000);

    // 100ms of 16kHz mono
    assert_eq!(pcm::duration_ms(3200, 16000, 1), 100);

    // Degenerate parameters never panic
    assert_eq!(pcm::duration_ms(64000, 0, 2), 0);
    assert_eq!(pcm::duration_ms(64000, 16000, 0), 0);
}
