use serde::Serialize;

use crate::identity::domain::photo_signature::PhotoSignature;
use crate::shared::constants::EVENT_NAME_PREFIX;
use crate::shared::photo_record::PhotoRecord;

/// A terminal group of photos showing the same people in the same outfit.
///
/// The leading `reference_count` photos are the ones the event was built
/// from; their faces are the event's reference faces. Photos attached
/// afterwards by the extras pass follow them and never extend that set.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EventGroup {
    pub name: String,
    pub signature: PhotoSignature,
    pub photo_indices: Vec<usize>,
    pub urls: Vec<String>,
    pub filenames: Vec<String>,
    #[serde(skip)]
    reference_count: usize,
}

impl EventGroup {
    /// Creates an empty event named `Event_<number>`.
    pub fn new(number: usize, signature: PhotoSignature) -> Self {
        Self {
            name: format!("{EVENT_NAME_PREFIX}{number}"),
            signature,
            photo_indices: Vec::new(),
            urls: Vec::new(),
            filenames: Vec::new(),
            reference_count: 0,
        }
    }

    /// Adds a photo that defines the event.
    pub fn add_member(&mut self, photo_idx: usize, photo: &PhotoRecord) {
        debug_assert_eq!(
            self.reference_count,
            self.photo_indices.len(),
            "members must be added before any attached photo"
        );
        self.push(photo_idx, photo);
        self.reference_count += 1;
    }

    /// Adds a photo matched by the extras pass.
    pub fn attach(&mut self, photo_idx: usize, photo: &PhotoRecord) {
        self.push(photo_idx, photo);
    }

    fn push(&mut self, photo_idx: usize, photo: &PhotoRecord) {
        self.photo_indices.push(photo_idx);
        self.urls.push(photo.url.clone());
        self.filenames.push(photo.display_name().to_string());
    }

    pub fn reference_photos(&self) -> &[usize] {
        &self.photo_indices[..self.reference_count]
    }

    pub fn attached_photos(&self) -> &[usize] {
        &self.photo_indices[self.reference_count..]
    }

    pub fn len(&self) -> usize {
        self.photo_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photo_indices.is_empty()
    }
}

/// Diagnostic entry for a photo that landed in no event.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ExtraInfo {
    pub url: String,
    pub filename: String,
    pub face_count: usize,
}

/// Photos assigned to no event, in batch order.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ExtrasBucket {
    pub photo_indices: Vec<usize>,
    pub entries: Vec<ExtraInfo>,
}

impl ExtrasBucket {
    pub fn push(&mut self, photo_idx: usize, photo: &PhotoRecord) {
        self.photo_indices.push(photo_idx);
        self.entries.push(ExtraInfo {
            url: photo.url.clone(),
            filename: photo.display_name().to_string(),
            face_count: photo.face_count(),
        });
    }

    /// Every photo of the batch, for runs that short-circuit before grouping.
    pub fn from_all(photos: &[PhotoRecord]) -> Self {
        let mut bucket = Self::default();
        for (idx, photo) in photos.iter().enumerate() {
            bucket.push(idx, photo);
        }
        bucket
    }

    pub fn urls(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.url.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.photo_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photo_indices.is_empty()
    }
}
