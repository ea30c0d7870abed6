use crate::events::AppEvent;
use crate::gui::wheel::{IMAGE_HEIGHT, IMAGE_WIDTH, ImageRequest};
use async_channel::{Receiver, Sender};
use gdk_pixbuf::Pixbuf;
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread;

/// Decodes card images on a worker thread. Requests from a card set that has
/// since been replaced are skipped without touching the disk.
pub struct ImageLoader {
    requests: Sender<ImageRequest>,
    latest: Arc<Mutex<u64>>,
}

impl ImageLoader {
    pub fn spawn(events: Sender<AppEvent>) -> std::io::Result<Self> {
        let (requests, rx) = async_channel::unbounded();
        let latest = Arc::new(Mutex::new(0));

        {
            let latest = latest.clone();
            thread::Builder::new()
                .name("marquee-images".into())
                .spawn(move || worker(rx, events, latest))?;
        }

        Ok(Self { requests, latest })
    }

    /// Queues a batch from one card set. Older batches still queued become
    /// stale.
    pub fn request(&self, batch: Vec<ImageRequest>) {
        let Some(generation) = batch.iter().map(|r| r.generation).max() else {
            return;
        };
        {
            let mut latest = self.latest.lock();
            *latest = (*latest).max(generation);
        }
        for request in batch {
            if self.requests.try_send(request).is_err() {
                log::error!("Image worker is gone");
                return;
            }
        }
    }
}

fn decode(request: &ImageRequest) -> Result<Pixbuf, String> {
    if !request.path.is_file() {
        return Err(format!("{} not found", request.path.display()));
    }
    Pixbuf::from_file_at_scale(&request.path, IMAGE_WIDTH, IMAGE_HEIGHT, true)
        .map_err(|e| format!("{}: {}", request.path.display(), e))
}

fn worker(rx: Receiver<ImageRequest>, events: Sender<AppEvent>, latest: Arc<Mutex<u64>>) {
    while let Ok(request) = rx.recv_blocking() {
        if request.generation < *latest.lock() {
            continue;
        }
        let result = decode(&request);
        let event = AppEvent::ImageLoaded {
            generation: request.generation,
            index: request.index,
            result,
        };
        if events.send_blocking(event).is_err() {
            break;
        }
    }
    log::debug!("Image worker stopped");
}
