use std::prelude::v1::*;

use crate::ColorType;

mod general;

/// Smooth RGB gradient with a deterministic texture on top
pub(crate) fn create_test_image(width: u16, height: u16) -> (Vec<u8>, u16, u16, ColorType) {
    let mut data = Vec::with_capacity(usize::from(width) * usize::from(height) * 3);

    for y in 0..usize::from(height) {
        for x in 0..usize::from(width) {
            let noise = ((x * 7 + y * 13) % 11) as u8;

            data.push(((x * 255) / usize::from(width)) as u8 / 2 + noise);
            data.push(((y * 255) / usize::from(height)) as u8 / 2 + noise);
            data.push((((x + y) * 127) / (usize::from(width) + usize::from(height))) as u8 + 64);
        }
    }

    (data, width, height, ColorType::Rgb)
}

pub(crate) fn create_test_image_gray(width: u16, height: u16) -> (Vec<u8>, u16, u16) {
    let mut data = Vec::with_capacity(usize::from(width) * usize::from(height));

    for y in 0..usize::from(height) {
        for x in 0..usize::from(width) {
            let noise = ((x * 5 + y * 3) % 9) as u8;
            data.push((((x + y) * 200) / (usize::from(width) + usize::from(height))) as u8 + noise);
        }
    }

    (data, width, height)
}

/// Sharp vertical edge, left half black and right half white
pub(crate) fn create_edge_image(width: u16, height: u16) -> Vec<u8> {
    let mut data = Vec::with_capacity(usize::from(width) * usize::from(height) * 3);

    for _ in 0..height {
        for x in 0..width {
            if x < width / 2 {
                data.extend_from_slice(&[0, 0, 0]);
            } else {
                data.extend_from_slice(&[255, 255, 255]);
            }
        }
    }

    data
}

/// A JFIF stream split into its header segments and the entropy coded scan
pub(crate) struct Segments {
    /// Marker byte and segment data without the length field, SOI to SOS
    pub headers: Vec<(u8, Vec<u8>)>,
    pub scan: Vec<u8>,
}

impl Segments {
    pub fn markers(&self) -> Vec<u8> {
        self.headers.iter().map(|(marker, _)| *marker).collect()
    }

    pub fn find(&self, marker: u8) -> Option<&[u8]> {
        self.headers
            .iter()
            .find(|(m, _)| *m == marker)
            .map(|(_, data)| data.as_slice())
    }
}

pub(crate) fn parse_segments(data: &[u8]) -> Segments {
    assert_eq!(&data[..2], &[0xFF, 0xD8], "missing SOI");
    assert_eq!(&data[data.len() - 2..], &[0xFF, 0xD9], "missing EOI");

    let mut headers = Vec::new();
    let mut pos = 2;

    loop {
        assert_eq!(data[pos], 0xFF, "expected marker at {}", pos);

        let marker = data[pos + 1];
        let length = usize::from(u16::from_be_bytes([data[pos + 2], data[pos + 3]]));

        headers.push((marker, data[pos + 4..pos + 2 + length].to_vec()));
        pos += 2 + length;

        if marker == 0xDA {
            break;
        }
    }

    Segments {
        headers,
        scan: data[pos..data.len() - 2].to_vec(),
    }
}

pub(crate) fn psnr(reference: &[u8], decoded: &[u8]) -> f64 {
    assert_eq!(reference.len(), decoded.len());

    let mse: f64 = reference
        .iter()
        .zip(decoded.iter())
        .map(|(&a, &b)| (f64::from(a) - f64::from(b)).powi(2))
        .sum::<f64>()
        / reference.len() as f64;

    if mse == 0.0 {
        f64::INFINITY
    } else {
        10.0 * (255.0_f64.powi(2) / mse).log10()
    }
}
