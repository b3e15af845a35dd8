//! Rate/distortion sweep
//!
//! Encodes every PPM (P6) file given on the command line at quality 100 down to 5,
//! with and without 4:2:0 chroma subsampling, decodes the result again and
//! writes bits per pixel and PSNR to `rd_data.csv`.
//!
//! ```text
//! cargo run --release --example rate_distortion -- image1.ppm image2.ppm
//! ```

use std::error::Error;
use std::fmt::Write as _;
use std::fs;
use std::io::Cursor;
use std::path::Path;

use jfif_encoder::{encode, FnSink, SinkClosed};
use rayon::prelude::*;

struct Ppm {
    name: String,
    width: u32,
    height: u32,
    data: Vec<u8>,
}

struct RdPoint {
    name: String,
    quality: u8,
    subsampling: bool,
    bpp: f64,
    psnr: f64,
}

/// Reads a binary PPM with a maximum value of 255
fn read_ppm(path: &Path) -> Result<Ppm, Box<dyn Error>> {
    let bytes = fs::read(path)?;

    // Header: magic, width, height, maxval separated by whitespace, comments start with '#'
    let mut fields = Vec::with_capacity(4);
    let mut pos = 0;

    while fields.len() < 4 {
        while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        if pos < bytes.len() && bytes[pos] == b'#' {
            while pos < bytes.len() && bytes[pos] != b'\n' {
                pos += 1;
            }
            continue;
        }

        let start = pos;
        while pos < bytes.len() && !bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        if start == pos {
            return Err(format!("{}: truncated header", path.display()).into());
        }
        fields.push(std::str::from_utf8(&bytes[start..pos])?.to_owned());
    }

    // Exactly one whitespace byte separates the header from the samples
    pos += 1;

    if fields[0] != "P6" {
        return Err(format!("{}: not a binary PPM", path.display()).into());
    }

    let width: u32 = fields[1].parse()?;
    let height: u32 = fields[2].parse()?;
    let max_value: u32 = fields[3].parse()?;

    if max_value != 255 {
        return Err(format!("{}: unsupported maximum value {}", path.display(), max_value).into());
    }

    let len = width as usize * height as usize * 3;
    let data = bytes
        .get(pos..pos + len)
        .ok_or_else(|| format!("{}: truncated pixel data", path.display()))?
        .to_vec();

    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(Ppm {
        name,
        width,
        height,
        data,
    })
}

fn psnr(reference: &[u8], decoded: &[u8]) -> f64 {
    let mse = reference
        .iter()
        .zip(decoded)
        .map(|(&a, &b)| (f64::from(a) - f64::from(b)).powi(2))
        .sum::<f64>()
        / reference.len() as f64;

    if mse == 0.0 {
        f64::INFINITY
    } else {
        10.0 * (255.0 * 255.0 / mse).log10()
    }
}

fn compress(image: &Ppm, quality: u8, subsampling: bool) -> Result<RdPoint, String> {
    let mut jpeg = Vec::new();
    let sink = FnSink(|byte: u8| {
        jpeg.push(byte);
        Ok::<(), SinkClosed>(())
    });

    encode(
        sink,
        image.width,
        image.height,
        &image.data,
        true,
        quality,
        subsampling,
        None,
    )
    .map_err(|e| format!("{} q{}: {}", image.name, quality, e))?;

    let mut decoder = jpeg_decoder::Decoder::new(Cursor::new(&jpeg));
    let decoded = decoder
        .decode()
        .map_err(|e| format!("{} q{}: {}", image.name, quality, e))?;

    Ok(RdPoint {
        name: image.name.clone(),
        quality,
        subsampling,
        bpp: (jpeg.len() as f64 * 8.0) / (f64::from(image.width) * f64::from(image.height)),
        psnr: psnr(&image.data, &decoded),
    })
}

fn main() -> Result<(), Box<dyn Error>> {
    let images = std::env::args()
        .skip(1)
        .map(|arg| read_ppm(Path::new(&arg)))
        .collect::<Result<Vec<_>, _>>()?;

    if images.is_empty() {
        eprintln!("usage: rate_distortion <image.ppm>...");
        std::process::exit(2);
    }

    let tasks: Vec<(&Ppm, u8, bool)> = images
        .iter()
        .flat_map(|image| {
            (1..=20u8).flat_map(move |step| {
                let quality = step * 5;
                [(image, quality, true), (image, quality, false)]
            })
        })
        .collect();

    let mut points = tasks
        .par_iter()
        .map(|&(image, quality, subsampling)| compress(image, quality, subsampling))
        .collect::<Result<Vec<_>, _>>()?;

    points.sort_by(|a, b| {
        (&a.name, a.subsampling, a.quality).cmp(&(&b.name, b.subsampling, b.quality))
    });

    let mut csv = String::new();
    for point in &points {
        writeln!(
            csv,
            "{},{},{},{:.4},{:.4}",
            point.name,
            point.quality,
            u8::from(point.subsampling),
            point.bpp,
            point.psnr
        )?;
    }

    fs::write("rd_data.csv", csv)?;
    println!("wrote {} rows to rd_data.csv", points.len());

    Ok(())
}
