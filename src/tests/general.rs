use std::prelude::v1::*;
use std::vec;

use super::{create_test_image, create_test_image_gray, parse_segments};
use crate::{
    encode, ColorType, Density, Encoder, EncodingError, FnSink, GrayImage, RgbImage,
    SamplingFactor, SinkClosed,
};

#[test]
fn test_encode_gray_no_density() {
    let (data, width, height) = create_test_image_gray(16, 16);
    let mut result: Vec<u8> = Vec::new();
    let mut encoder = Encoder::new(&mut result, 90);
    encoder.set_density(Density::None);

    encoder
        .encode(&data, width, height, ColorType::Luma)
        .unwrap();

    let segments = parse_segments(&result);
    assert_eq!(
        segments.find(0xE0).unwrap(),
        &[b'J', b'F', b'I', b'F', 0, 1, 1, 0, 0, 1, 0, 1, 0, 0]
    );
}

#[test]
fn test_encode_density() {
    let (data, width, height, color_type) = create_test_image(16, 16);
    let mut result: Vec<u8> = Vec::new();
    let mut encoder = Encoder::new(&mut result, 90);
    encoder.set_density(Density::Centimeter { x: 118, y: 118 });

    encoder.encode(&data, width, height, color_type).unwrap();

    let segments = parse_segments(&result);
    assert_eq!(&segments.find(0xE0).unwrap()[7..12], &[2, 0, 118, 0, 118]);
}

#[test]
fn test_marker_order_rgb() {
    let (data, width, height, color_type) = create_test_image(16, 16);
    let mut result: Vec<u8> = Vec::new();
    let encoder = Encoder::new(&mut result, 75);

    encoder.encode(&data, width, height, color_type).unwrap();

    let segments = parse_segments(&result);
    assert_eq!(
        segments.markers(),
        [0xE0, 0xDB, 0xDB, 0xC0, 0xC4, 0xC4, 0xC4, 0xC4, 0xDA]
    );

    let dht_classes: Vec<u8> = segments
        .headers
        .iter()
        .filter(|(marker, _)| *marker == 0xC4)
        .map(|(_, data)| data[0])
        .collect();
    assert_eq!(dht_classes, [0x00, 0x10, 0x01, 0x11]);

    let dqt_ids: Vec<u8> = segments
        .headers
        .iter()
        .filter(|(marker, _)| *marker == 0xDB)
        .map(|(_, data)| {
            assert_eq!(data.len(), 65);
            data[0]
        })
        .collect();
    assert_eq!(dqt_ids, [0, 1]);
}

#[test]
fn test_frame_header_420() {
    let (data, width, height, color_type) = create_test_image(33, 17);
    let mut result: Vec<u8> = Vec::new();
    let mut encoder = Encoder::new(&mut result, 95);
    encoder.set_sampling_factor(SamplingFactor::R_4_2_0);

    encoder.encode(&data, width, height, color_type).unwrap();

    let segments = parse_segments(&result);
    assert_eq!(
        segments.find(0xC0).unwrap(),
        &[8, 0, 17, 0, 33, 3, 1, 0x22, 0, 2, 0x11, 1, 3, 0x11, 1]
    );
    assert_eq!(
        segments.find(0xDA).unwrap(),
        &[3, 1, 0x00, 2, 0x11, 3, 0x11, 0, 63, 0]
    );
}

#[test]
fn test_frame_header_gray_ignores_subsampling() {
    let (data, width, height) = create_test_image_gray(20, 20);
    let mut result: Vec<u8> = Vec::new();
    let mut encoder = Encoder::new(&mut result, 50);
    encoder.set_sampling_factor(SamplingFactor::R_4_2_0);

    encoder
        .encode(&data, width, height, ColorType::Luma)
        .unwrap();

    let segments = parse_segments(&result);
    assert_eq!(segments.find(0xC0).unwrap(), &[8, 0, 20, 0, 20, 1, 1, 0x11, 0]);
    assert_eq!(segments.find(0xDA).unwrap(), &[1, 1, 0x00, 0, 63, 0]);

    // Both tables are written for grayscale as well
    assert_eq!(
        segments.markers(),
        [0xE0, 0xDB, 0xDB, 0xC0, 0xC4, 0xC4, 0xC4, 0xC4, 0xDA]
    );
}

#[test]
fn test_quantization_table_zigzag() {
    let (data, width, height) = create_test_image_gray(8, 8);
    let mut result: Vec<u8> = Vec::new();

    Encoder::new(&mut result, 50)
        .encode(&data, width, height, ColorType::Luma)
        .unwrap();

    let segments = parse_segments(&result);
    let dqt = segments.find(0xDB).unwrap();

    // Annex K luma table in zigzag order
    assert_eq!(&dqt[1..7], &[16, 11, 12, 14, 12, 10]);
    assert_eq!(dqt[64], 99);
}

#[test]
fn test_deterministic() {
    let (data, width, height, color_type) = create_test_image(40, 24);

    let mut first: Vec<u8> = Vec::new();
    Encoder::new(&mut first, 80)
        .encode(&data, width, height, color_type)
        .unwrap();

    let mut second: Vec<u8> = Vec::new();
    Encoder::new(&mut second, 80)
        .encode(&data, width, height, color_type)
        .unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_size_grows_with_quality() {
    let (data, width, height, color_type) = create_test_image(64, 48);

    let sizes: Vec<usize> = [10, 50, 90, 100]
        .iter()
        .map(|&quality| {
            let mut result: Vec<u8> = Vec::new();
            encode(
                &mut result,
                u32::from(width),
                u32::from(height),
                &data,
                color_type == ColorType::Rgb,
                quality,
                false,
                None,
            )
            .unwrap();
            result.len()
        })
        .collect();

    for pair in sizes.windows(2) {
        assert!(pair[0] < pair[1], "sizes not increasing: {:?}", sizes);
    }
}

#[test]
fn test_subsampling_is_smaller() {
    let (data, width, height, color_type) = create_test_image(64, 48);

    for quality in [30, 75, 95] {
        let mut full: Vec<u8> = Vec::new();
        let mut encoder = Encoder::new(&mut full, quality);
        encoder.set_sampling_factor(SamplingFactor::R_4_4_4);
        encoder.encode(&data, width, height, color_type).unwrap();

        let mut subsampled: Vec<u8> = Vec::new();
        let mut encoder = Encoder::new(&mut subsampled, quality);
        encoder.set_sampling_factor(SamplingFactor::R_4_2_0);
        encoder.encode(&data, width, height, color_type).unwrap();

        assert!(subsampled.len() <= full.len(), "quality {}", quality);
    }
}

#[test]
fn test_uniform_gray_scan_data() {
    let data = [128u8; 16 * 16];
    let mut result: Vec<u8> = Vec::new();

    encode(&mut result, 16, 16, &data, false, 100, false, None).unwrap();

    // Four blocks of DC category 0 "00" and EOB "1010"
    let segments = parse_segments(&result);
    assert_eq!(segments.scan, [0x28, 0xA2, 0x8A]);
}

#[test]
fn test_scan_bytes_are_stuffed() {
    let (data, width, height, color_type) = create_test_image(64, 64);
    let mut result: Vec<u8> = Vec::new();

    Encoder::new(&mut result, 100)
        .encode(&data, width, height, color_type)
        .unwrap();

    let scan = parse_segments(&result).scan;

    let mut iter = scan.iter();
    while let Some(&byte) = iter.next() {
        if byte == 0xFF {
            assert_eq!(iter.next(), Some(&0x00), "unstuffed 0xFF in scan data");
        }
    }
}

#[test]
fn test_tiny_images() {
    for &(width, height) in &[(1u16, 1u16), (5, 3), (3, 5), (17, 1)] {
        let (data, _, _, color_type) = create_test_image(width, height);

        for sampling in [SamplingFactor::R_4_4_4, SamplingFactor::R_4_2_0] {
            let mut result: Vec<u8> = Vec::new();
            let mut encoder = Encoder::new(&mut result, 75);
            encoder.set_sampling_factor(sampling);
            encoder.encode(&data, width, height, color_type).unwrap();

            let segments = parse_segments(&result);
            let sof = segments.find(0xC0).unwrap();
            assert_eq!(u16::from_be_bytes([sof[1], sof[2]]), height);
            assert_eq!(u16::from_be_bytes([sof[3], sof[4]]), width);
        }
    }
}

#[test]
fn test_add_app_segment() {
    let (data, width, height, color_type) = create_test_image(16, 16);
    let mut result: Vec<u8> = Vec::new();
    let mut encoder = Encoder::new(&mut result, 90);
    encoder.add_app_segment(15, b"HOHOHO\0").unwrap();
    encoder.set_comment("hello").unwrap();

    encoder.encode(&data, width, height, color_type).unwrap();

    let segments = parse_segments(&result);
    assert_eq!(&segments.markers()[..4], &[0xE0, 0xEF, 0xFE, 0xDB]);
    assert_eq!(segments.find(0xEF).unwrap(), b"HOHOHO\0");
    assert_eq!(segments.find(0xFE).unwrap(), b"hello");
}

#[test]
fn test_invalid_app_segment() {
    let mut encoder = Encoder::new(Vec::<u8>::new(), 90);

    assert!(matches!(
        encoder.add_app_segment(0, b"data"),
        Err(EncodingError::InvalidAppSegment(0))
    ));
    assert!(matches!(
        encoder.add_app_segment(16, b"data"),
        Err(EncodingError::InvalidAppSegment(16))
    ));
    assert!(matches!(
        encoder.add_app_segment(1, &vec![0; 65534]),
        Err(EncodingError::AppSegmentTooLarge(65534))
    ));
    assert!(encoder.add_app_segment(1, &vec![0; 65533]).is_ok());
}

#[test]
fn test_comment_without_ff() {
    let (data, width, height) = create_test_image_gray(8, 8);
    let mut result: Vec<u8> = Vec::new();
    let mut encoder = Encoder::new(&mut result, 90);
    encoder.set_comment(&[b'a', 0xFF, 0xFF, b'b'][..]).unwrap();

    encoder
        .encode(&data, width, height, ColorType::Luma)
        .unwrap();

    assert_eq!(parse_segments(&result).find(0xFE).unwrap(), b"ab");
}

#[test]
fn test_empty_comment_is_skipped() {
    let (data, width, height) = create_test_image_gray(8, 8);
    let mut result: Vec<u8> = Vec::new();

    encode(
        &mut result,
        u32::from(width),
        u32::from(height),
        &data,
        false,
        90,
        false,
        Some(""),
    )
    .unwrap();

    assert!(parse_segments(&result).find(0xFE).is_none());
}

#[test]
fn test_comment_too_large() {
    let data = [0u8; 64];
    let comment = "x".repeat(65534);
    let mut result: Vec<u8> = Vec::new();

    let err = encode(&mut result, 8, 8, &data, false, 90, false, Some(comment.as_str())).unwrap_err();

    assert!(matches!(err, EncodingError::CommentTooLarge(65534)));
    assert!(result.is_empty());

    let comment = "x".repeat(65533);
    encode(&mut result, 8, 8, &data, false, 90, false, Some(comment.as_str())).unwrap();
}

#[test]
fn test_invalid_dimensions() {
    let mut result: Vec<u8> = Vec::new();

    let err = Encoder::new(&mut result, 90)
        .encode(&[], 0, 8, ColorType::Luma)
        .unwrap_err();
    assert!(matches!(
        err,
        EncodingError::InvalidDimensions {
            width: 0,
            height: 8
        }
    ));

    let err = encode(&mut result, 70000, 1, &[0; 70000], false, 90, false, None).unwrap_err();
    assert!(matches!(
        err,
        EncodingError::InvalidDimensions {
            width: 70000,
            height: 1
        }
    ));

    let err = encode(&mut result, 4, 0, &[], true, 90, false, None).unwrap_err();
    assert!(matches!(err, EncodingError::InvalidDimensions { .. }));

    assert!(result.is_empty());
}

#[test]
fn test_buffer_size_mismatch() {
    let mut result: Vec<u8> = Vec::new();

    let err = Encoder::new(&mut result, 90)
        .encode(&[0; 8 * 8 * 3 - 1], 8, 8, ColorType::Rgb)
        .unwrap_err();
    assert!(matches!(
        err,
        EncodingError::BufferSizeMismatch {
            length: 191,
            required: 192
        }
    ));

    let err = Encoder::new(&mut result, 90)
        .encode(&[0; 65], 8, 8, ColorType::Luma)
        .unwrap_err();
    assert!(matches!(err, EncodingError::BufferSizeMismatch { .. }));

    assert!(result.is_empty());
}

#[test]
fn test_short_image_buffer() {
    let data = [0u8; 8 * 8 * 3];
    let mut result: Vec<u8> = Vec::new();

    let err = Encoder::new(&mut result, 90)
        .encode_image(RgbImage(&data[..100], 8, 8))
        .unwrap_err();
    assert!(matches!(err, EncodingError::BufferSizeMismatch { .. }));

    let err = Encoder::new(&mut result, 90)
        .encode_image(GrayImage(&data[..63], 8, 8))
        .unwrap_err();
    assert!(matches!(
        err,
        EncodingError::BufferSizeMismatch {
            length: 56,
            required: 64
        }
    ));

    assert!(result.is_empty());
}

#[test]
fn test_sink_failure() {
    let (data, width, height, color_type) = create_test_image(16, 16);

    let mut received = Vec::new();
    let sink = FnSink(|byte: u8| {
        if received.len() == 100 {
            return Err(SinkClosed);
        }
        received.push(byte);
        Ok(())
    });

    let err = Encoder::new(sink, 90)
        .encode(&data, width, height, color_type)
        .unwrap_err();

    assert!(matches!(err, EncodingError::SinkFailure));

    // Bytes handed over before the failure stay with the sink
    assert_eq!(received.len(), 100);
    assert_eq!(&received[..2], &[0xFF, 0xD8]);
}

#[test]
fn test_io_error() {
    struct FailingWriter;

    impl std::io::Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    let (data, width, height) = create_test_image_gray(8, 8);

    let err = Encoder::new(FailingWriter, 90)
        .encode(&data, width, height, ColorType::Luma)
        .unwrap_err();

    assert!(matches!(err, EncodingError::IoError(_)));
}

#[test]
fn test_flush_error() {
    struct FlushFailingWriter(Vec<u8>);

    impl std::io::Write for FlushFailingWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "flush failed"))
        }
    }

    let (data, width, height) = create_test_image_gray(8, 8);

    let mut writer = FlushFailingWriter(Vec::new());
    let err = Encoder::new(&mut writer, 90)
        .encode(&data, width, height, ColorType::Luma)
        .unwrap_err();

    assert!(matches!(err, EncodingError::IoError(_)));

    // Everything up to EOI was written before the flush
    assert_eq!(&writer.0[writer.0.len() - 2..], &[0xFF, 0xD9]);
}

#[test]
fn test_buffered_io_error() {
    struct FailingWriter;

    impl std::io::Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "no space left"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    // The whole stream fits into the buffer, the error only shows up on flush
    let (data, width, height, color_type) = create_test_image(16, 16);

    let err = Encoder::new(std::io::BufWriter::new(FailingWriter), 90)
        .encode(&data, width, height, color_type)
        .unwrap_err();

    assert!(matches!(err, EncodingError::IoError(_)));
}

#[test]
fn test_fn_sink_matches_vec() {
    let (data, width, height, color_type) = create_test_image(24, 24);

    let mut expected: Vec<u8> = Vec::new();
    Encoder::new(&mut expected, 60)
        .encode(&data, width, height, color_type)
        .unwrap();

    let mut received = Vec::new();
    let sink = FnSink(|byte: u8| {
        received.push(byte);
        Ok::<(), SinkClosed>(())
    });
    Encoder::new(sink, 60)
        .encode(&data, width, height, color_type)
        .unwrap();

    assert_eq!(received, expected);
}

#[test]
fn test_concurrent_encoding() {
    let (data, width, height, color_type) = create_test_image(48, 32);

    let mut expected: Vec<u8> = Vec::new();
    Encoder::new(&mut expected, 85)
        .encode(&data, width, height, color_type)
        .unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let data = data.clone();
            std::thread::spawn(move || {
                let mut result: Vec<u8> = Vec::new();
                Encoder::new(&mut result, 85)
                    .encode(&data, width, height, color_type)
                    .unwrap();
                result
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

#[test]
fn test_new_file() {
    let (data, width, height, color_type) = create_test_image(16, 16);

    let path = std::env::temp_dir().join(std::format!("jfif-encoder-{}.jpg", std::process::id()));

    Encoder::new_file(&path, 90)
        .unwrap()
        .encode(&data, width, height, color_type)
        .unwrap();

    let written = std::fs::read(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    let mut expected: Vec<u8> = Vec::new();
    Encoder::new(&mut expected, 90)
        .encode(&data, width, height, color_type)
        .unwrap();

    assert_eq!(written, expected);
}
