use std::path::{Path, PathBuf};

use crossbeam_channel::{Receiver, Sender};

use super::LoadError;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(super) enum Kind {
    Bytes,
    Image,
}

pub(super) struct Request {
    pub ticket: u64,
    pub path: PathBuf,
    pub kind: Kind,
}

pub(super) struct Pixels {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

pub(super) enum Payload {
    Bytes(Vec<u8>),
    Image(Pixels),
}

pub(super) struct Decoded {
    pub ticket: u64,
    pub path: PathBuf,
    pub result: Result<Payload, LoadError>,
}

/// Serves requests until the request channel closes or the loader is gone.
pub(super) fn run(requests: Receiver<Request>, results: Sender<Decoded>) {
    for Request { ticket, path, kind } in requests {
        let result = load(&path, kind);
        if results.send(Decoded { ticket, path, result }).is_err() {
            break;
        }
    }
}

fn load(path: &Path, kind: Kind) -> Result<Payload, LoadError> {
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io { path: path.to_owned(), source })?;
    match kind {
        Kind::Bytes => Ok(Payload::Bytes(bytes)),
        Kind::Image => decode(path, &bytes).map(Payload::Image),
    }
}

fn decode(path: &Path, bytes: &[u8]) -> Result<Pixels, LoadError> {
    let image = image::load_from_memory(bytes)
        .map_err(|source| LoadError::Decode { path: path.to_owned(), source })?
        .to_rgba8();

    Ok(Pixels { width: image.width(), height: image.height(), rgba: image.into_raw() })
}
