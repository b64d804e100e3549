use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::grouping::domain::event_group::{EventGroup, ExtraInfo, ExtrasBucket};
use crate::identity::domain::identity_resolver::IdentityLabel;

/// Event name → photo URLs, kept in event creation order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EventClusters(Vec<(String, Vec<String>)>);

impl EventClusters {
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, urls)| urls.as_slice())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(n, urls)| (n.as_str(), urls.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for EventClusters {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, urls) in &self.0 {
            map.serialize_entry(name, urls)?;
        }
        map.end()
    }
}

/// The persisted and returned outcome of one clustering run.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ClusterResult {
    pub clusters: EventClusters,
    pub extras: Vec<String>,
    pub extras_info: Vec<ExtraInfo>,
}

/// Full outcome of a run, including diagnostics the result omits.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ClusterReport {
    pub events: Vec<EventGroup>,
    pub extras: ExtrasBucket,
    pub primary: Option<IdentityLabel>,
    pub identity_count: usize,
    pub noise_count: usize,
}

impl ClusterReport {
    pub fn to_result(&self) -> ClusterResult {
        ClusterResult {
            clusters: EventClusters(
                self.events
                    .iter()
                    .map(|e| (e.name.clone(), e.urls.clone()))
                    .collect(),
            ),
            extras: self.extras.urls(),
            extras_info: self.extras.entries.clone(),
        }
    }

    /// Human-readable listing of every event and the extras, one photo per line.
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for event in &self.events {
            lines.push(format!("{}: {} photos", event.name, event.len()));
            for filename in &event.filenames {
                lines.push(format!("  - {filename}"));
            }
        }
        if !self.extras.is_empty() {
            lines.push(format!("Extras: {} photos", self.extras.len()));
            for entry in &self.extras.entries {
                lines.push(format!("  - {} ({} faces)", entry.filename, entry.face_count));
            }
        }
        lines
    }
}
