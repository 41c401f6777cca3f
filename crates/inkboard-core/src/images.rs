//! Tracking of image sources the host has to fetch.
//!
//! The engine never performs I/O. It queues every new image source, the host
//! drains the queue, fetches, and reports back. Each source is requested
//! once per session no matter how many objects show it or how often history
//! brings those objects back.

use crate::shapes::{ImageRef, VectorObject};
use std::collections::HashMap;

/// Load progress of one image source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageLoadState {
    /// Seen but not yet handed to the host.
    Queued,
    /// Handed to the host, waiting for completion.
    Requested,
    Loaded,
    Failed,
}

/// Per-source load states.
#[derive(Debug, Clone, Default)]
pub struct ImageLoads {
    states: HashMap<ImageRef, ImageLoadState>,
    queue: Vec<ImageRef>,
}

impl ImageLoads {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a source unless it was seen before. Returns true if it was new.
    pub fn register(&mut self, image: &ImageRef) -> bool {
        if self.states.contains_key(image) {
            return false;
        }
        self.states.insert(image.clone(), ImageLoadState::Queued);
        self.queue.push(image.clone());
        true
    }

    /// Queue the image sources of the given objects.
    pub fn register_objects<'a>(&mut self, objects: impl IntoIterator<Item = &'a VectorObject>) {
        for object in objects {
            if let Some(image) = object.content.as_image() {
                self.register(image);
            }
        }
    }

    /// Hand queued sources to the host, in the order they were first seen.
    pub fn take_requests(&mut self) -> Vec<ImageRef> {
        let requests = std::mem::take(&mut self.queue);
        for image in &requests {
            self.states.insert(image.clone(), ImageLoadState::Requested);
        }
        requests
    }

    /// Record the outcome of a requested load. Returns the new state, or
    /// `None` when the source was not waiting for a result.
    pub fn complete(&mut self, image: &ImageRef, loaded: bool) -> Option<ImageLoadState> {
        let state = self.states.get_mut(image)?;
        if *state != ImageLoadState::Requested {
            return None;
        }
        *state = if loaded {
            ImageLoadState::Loaded
        } else {
            ImageLoadState::Failed
        };
        Some(*state)
    }

    pub fn state(&self, image: &ImageRef) -> Option<ImageLoadState> {
        self.states.get(image).copied()
    }

    /// Number of sources not yet handed to the host.
    pub fn queued(&self) -> usize {
        self.queue.len()
    }
}
