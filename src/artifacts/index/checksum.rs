use crate::artifacts::index::CHECKSUM_SIZE;
use sha1::{Digest, Sha1};

/// Append the SHA-1 trailer to a serialized index
pub fn seal(mut content: Vec<u8>) -> Vec<u8> {
    let digest = Sha1::digest(&content);
    content.extend_from_slice(&digest);
    content
}

/// Split off and verify the SHA-1 trailer, returning the checked body
pub fn verify(content: &[u8]) -> anyhow::Result<&[u8]> {
    if content.len() < CHECKSUM_SIZE {
        anyhow::bail!("index file is too short to hold a checksum");
    }

    let (body, trailer) = content.split_at(content.len() - CHECKSUM_SIZE);
    if Sha1::digest(body).as_slice() != trailer {
        anyhow::bail!("checksum does not match value stored on disk");
    }

    Ok(body)
}
