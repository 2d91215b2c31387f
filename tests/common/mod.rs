#![allow(dead_code)]

pub mod archive_server;

use flate2::{Compression, write::GzEncoder};
use sha2::{Digest, Sha256};
use templateflow_fetch::digest::Sha256Hex;

/// Build a .tar.gz holding `members` at their relative paths.
pub fn tar_gz(members: &[(&str, &[u8])]) -> Vec<u8> {
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
    for (path, data) in members {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        builder.append_data(&mut header, path, *data).unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap()
}

/// A small template-shaped archive for `label`.
pub fn template_archive(label: &str) -> Vec<u8> {
    let description = format!("{{\"Name\": \"{label}\"}}");
    let image = vec![label.len() as u8; 8 * 1024];
    let description_path = format!("tpl-{label}/template_description.json");
    let image_path = format!("tpl-{label}/tpl-{label}_res-01_T1w.nii.gz");
    tar_gz(&[
        (description_path.as_str(), description.as_bytes()),
        (image_path.as_str(), image.as_slice()),
    ])
}

pub fn digest_of(bytes: &[u8]) -> Sha256Hex {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    Sha256Hex::from_hasher(hasher)
}

/// Deterministic, poorly compressible filler.
pub fn noise(len: usize, mut seed: u64) -> Vec<u8> {
    (0..len)
        .map(|_| {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            seed as u8
        })
        .collect()
}
