#![allow(dead_code)]

use std::fs;
use std::path::Path;

/// A minimal 24-bit BMP whose header carries `width` x `height`.
pub fn bmp_bytes(width: u32, height: u32) -> Vec<u8> {
    let row_stride = (width * 3).div_ceil(4) * 4;
    let pixel_array_size = row_stride * height;
    let file_size = 54 + pixel_array_size;

    let mut bytes = Vec::with_capacity(file_size as usize);
    bytes.extend_from_slice(b"BM");
    bytes.extend_from_slice(&file_size.to_le_bytes());
    bytes.extend_from_slice(&[0, 0, 0, 0]);
    bytes.extend_from_slice(&54u32.to_le_bytes());

    bytes.extend_from_slice(&40u32.to_le_bytes());
    bytes.extend_from_slice(&(width as i32).to_le_bytes());
    bytes.extend_from_slice(&(height as i32).to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&24u16.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&pixel_array_size.to_le_bytes());
    bytes.extend_from_slice(&[0; 16]);

    bytes.resize(file_size as usize, 0);
    bytes
}

pub fn write_bmp(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, bmp_bytes(width, height)).expect("write bmp file");
}

/// Writes `count` placeholder images named `img_00.jpg`, `img_01.jpg`, ...
pub fn seed_images(dir: &Path, count: usize) -> Vec<String> {
    fs::create_dir_all(dir).expect("create images dir");
    (0..count)
        .map(|i| {
            let name = format!("img_{i:02}.jpg");
            fs::write(dir.join(&name), b"jpg").expect("write image");
            name
        })
        .collect()
}

/// Writes a one-line label file for every stem in `stems`.
pub fn seed_labels(dir: &Path, stems: &[&str]) {
    fs::create_dir_all(dir).expect("create labels dir");
    for stem in stems {
        fs::write(dir.join(format!("{stem}.txt")), "0 0.5 0.5 0.25 0.25\n")
            .expect("write label");
    }
}

pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("read dir")
        .map(|entry| {
            entry
                .expect("dir entry")
                .file_name()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    names.sort();
    names
}
