//! Asynchronous file and image loading.
//!
//! Files are read, and images decoded, on a worker thread. The host calls
//! [`Loader::poll`] once per frame to deliver finished loads on the render
//! thread: raw reads run their completion, images become GPU images. Until
//! then, [`AsyncImage::id`] is the invalid id, which immediate drawing
//! replaces with its white fallback texture.

mod error;
mod worker;

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::rc::{Rc, Weak};
use std::thread::JoinHandle;

use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, Sender};

use crate::gfx::{make_image, GfxRef, Image, ImageDesc, ImageId};

pub use error::LoadError;
use worker::{Decoded, Kind, Payload, Pixels, Request};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LoadState {
    Pending,
    Ready,
    Failed,
}

#[derive(Default)]
struct Slot {
    image: Image,
    failed: bool,
}

/// Handle to an image being loaded.
///
/// Dropping every handle before the load completes discards the result.
#[derive(Clone)]
pub struct AsyncImage {
    slot: Rc<RefCell<Slot>>,
}

impl AsyncImage {
    /// Image id once ready; the invalid id while pending or after a failure.
    pub fn id(&self) -> ImageId {
        self.slot.borrow().image.id()
    }

    pub fn state(&self) -> LoadState {
        let slot = self.slot.borrow();
        if slot.image.is_valid() {
            LoadState::Ready
        } else if slot.failed {
            LoadState::Failed
        } else {
            LoadState::Pending
        }
    }

    pub fn is_valid(&self) -> bool {
        self.state() == LoadState::Ready
    }
}

/// Called on the render thread with the file contents, or why they could not
/// be read.
pub type Completion = Box<dyn FnOnce(Result<Vec<u8>, LoadError>)>;

type CompletionCell = RefCell<Option<Completion>>;

/// Handle to a raw file read.
///
/// The completion runs at most once, from [`Loader::poll`]. Dropping the
/// handle first cancels it.
#[must_use = "dropping the handle cancels the load"]
pub struct AsyncBuffer {
    completion: Rc<CompletionCell>,
}

impl AsyncBuffer {
    /// True until the completion has run.
    pub fn is_pending(&self) -> bool {
        self.completion.borrow().is_some()
    }
}

enum Pending {
    Image(Weak<RefCell<Slot>>),
    Bytes(Weak<CompletionCell>),
}

pub struct Loader {
    gfx: GfxRef,
    requests: Option<Sender<Request>>,
    results: Receiver<Decoded>,
    pending: HashMap<u64, Pending>,
    next_ticket: u64,
    worker: Option<JoinHandle<()>>,
}

impl Loader {
    pub fn new(gfx: GfxRef) -> Result<Self> {
        let (request_tx, request_rx) = crossbeam_channel::unbounded();
        let (result_tx, result_rx) = crossbeam_channel::unbounded();

        let worker = std::thread::Builder::new()
            .name("flip-loader".into())
            .spawn(move || worker::run(request_rx, result_tx))
            .context("failed to spawn loader thread")?;

        Ok(Self {
            gfx,
            requests: Some(request_tx),
            results: result_rx,
            pending: HashMap::new(),
            next_ticket: 0,
            worker: Some(worker),
        })
    }

    /// Queues `path` for loading as an RGBA8 image.
    pub fn load_image(&mut self, path: impl AsRef<Path>) -> AsyncImage {
        let slot = Rc::new(RefCell::new(Slot::default()));

        if let Err(err) = self.send(path.as_ref(), Kind::Image, Pending::Image(Rc::downgrade(&slot))) {
            log::warn!("loader: {err}");
            slot.borrow_mut().failed = true;
        }

        AsyncImage { slot }
    }

    /// Queues a raw read of `path`. `completion` runs from a later
    /// [`poll`](Self::poll) unless the returned handle is dropped first.
    pub fn load_bytes(
        &mut self,
        path: impl AsRef<Path>,
        completion: impl FnOnce(Result<Vec<u8>, LoadError>) + 'static,
    ) -> AsyncBuffer {
        let completion: Completion = Box::new(completion);
        let cell = Rc::new(RefCell::new(Some(completion)));

        if let Err(err) = self.send(path.as_ref(), Kind::Bytes, Pending::Bytes(Rc::downgrade(&cell))) {
            log::warn!("loader: {err}");
            let completion = cell.borrow_mut().take();
            if let Some(completion) = completion {
                completion(Err(err));
            }
        }

        AsyncBuffer { completion: cell }
    }

    /// Number of loads still in flight.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Delivers finished loads. Returns how many reached a live handle.
    pub fn poll(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(Decoded { ticket, path, result }) = self.results.try_recv() {
            let Some(pending) = self.pending.remove(&ticket) else {
                continue;
            };
            let delivered = match pending {
                Pending::Image(slot) => slot.upgrade().map(|slot| self.complete_image(&slot, &path, result)),
                Pending::Bytes(cell) => {
                    // Taken before running so the completion may query its handle.
                    let completion = cell.upgrade().and_then(|cell| cell.borrow_mut().take());
                    completion.map(|completion| complete_bytes(completion, &path, result))
                }
            };
            match delivered {
                Some(()) => applied += 1,
                None => log::debug!("loader: `{}` finished after its handle was dropped", path.display()),
            }
        }
        applied
    }

    fn send(&mut self, path: &Path, kind: Kind, pending: Pending) -> Result<(), LoadError> {
        self.next_ticket += 1;
        let ticket = self.next_ticket;

        let request = Request { ticket, path: path.to_owned(), kind };
        let sent = self.requests.as_ref().is_some_and(|tx| tx.send(request).is_ok());
        if !sent {
            return Err(LoadError::WorkerGone { path: path.to_owned() });
        }
        self.pending.insert(ticket, pending);
        Ok(())
    }

    fn complete_image(&self, slot: &RefCell<Slot>, path: &Path, result: Result<Payload, LoadError>) {
        let label = path.display().to_string();

        let image = result.and_then(|payload| match payload {
            Payload::Image(pixels) => self.upload(path, &label, &pixels),
            Payload::Bytes(_) => Err(LoadError::WrongPayload { path: path.to_owned() }),
        });

        let mut slot = slot.borrow_mut();
        match image {
            Ok(image) => {
                log::debug!("loader: `{label}` ready as {:?}", image.id());
                slot.image = image;
            }
            Err(err) => {
                log::warn!("loader: {err}");
                slot.failed = true;
            }
        }
    }

    fn upload(&self, path: &Path, label: &str, pixels: &Pixels) -> Result<Image, LoadError> {
        make_image(
            &self.gfx,
            &ImageDesc { width: pixels.width, height: pixels.height, pixels: &pixels.rgba, label },
        )
        .map_err(|source| LoadError::Gpu { path: path.to_owned(), source })
    }
}

fn complete_bytes(completion: Completion, path: &Path, result: Result<Payload, LoadError>) {
    let bytes = result.and_then(|payload| match payload {
        Payload::Bytes(bytes) => Ok(bytes),
        Payload::Image(_) => Err(LoadError::WrongPayload { path: path.to_owned() }),
    });
    if let Err(err) = &bytes {
        log::warn!("loader: {err}");
    }
    completion(bytes);
}

impl Drop for Loader {
    fn drop(&mut self) {
        // Closing the request channel ends the worker loop.
        self.requests = None;
        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            log::error!("loader: worker thread panicked");
        }
    }
}
