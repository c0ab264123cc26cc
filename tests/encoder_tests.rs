// Integration tests for the PCM-to-WAV encoder.
//
// These verify the little-endian byte pairing, the trailing-odd-byte rule,
// and that durations come out right for known buffer sizes.

use anyhow::Result;
use hound::WavReader;
use shortstory::audio::encoder::write_wav;
use std::path::Path;
use tempfile::TempDir;

fn read_back(path: &Path) -> Result<(hound::WavSpec, Vec<i16>)> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();
    let samples = reader.into_samples::<i16>().collect::<Result<Vec<_>, _>>()?;
    Ok((spec, samples))
}

#[test]
fn even_buffer_round_trips_le_samples() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("out.wav");

    let pcm = vec![0x01, 0x02, 0xFF, 0x7F, 0x00, 0x80];
    let written = write_wav(&path, &pcm)?;
    assert_eq!(written, 3);

    let (spec, samples) = read_back(&path)?;
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.sample_rate, 44100);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(samples, vec![0x0201, i16::MAX, i16::MIN]);

    Ok(())
}

#[test]
fn odd_trailing_byte_is_dropped() -> Result<()> {
    let dir = TempDir::new()?;
    let even_path = dir.path().join("even.wav");
    let odd_path = dir.path().join("odd.wav");

    let even = vec![0x01, 0x02, 0x03, 0x04];
    let mut odd = even.clone();
    odd.push(0x05);

    assert_eq!(write_wav(&even_path, &even)?, 2);
    assert_eq!(write_wav(&odd_path, &odd)?, 2);

    // The odd buffer encodes exactly as its even prefix.
    assert_eq!(read_back(&even_path)?.1, read_back(&odd_path)?.1);

    Ok(())
}

#[test]
fn one_second_of_pcm_is_44100_samples() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("second.wav");

    let pcm = vec![0u8; 88_200];
    assert_eq!(write_wav(&path, &pcm)?, 44_100);

    let (spec, samples) = read_back(&path)?;
    assert_eq!(samples.len(), 44_100);

    let duration = samples.len() as f64 / spec.sample_rate as f64;
    assert!((duration - 1.0).abs() < 1e-9);

    Ok(())
}

#[test]
fn empty_buffer_writes_a_headers_only_file() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("empty.wav");

    assert_eq!(write_wav(&path, &[])?, 0);
    let (_, samples) = read_back(&path)?;
    assert!(samples.is_empty());

    Ok(())
}
