use std::time::Instant;

use crate::grouping::domain::event_group::ExtrasBucket;
use crate::grouping::domain::event_grouper::EventGrouper;
use crate::grouping::domain::extras_resolver::ExtrasResolver;
use crate::identity::domain::identity_map::IdentityMap;
use crate::identity::domain::identity_resolver::IdentityResolver;
use crate::identity::domain::photo_signature::build_signatures;
use crate::identity::domain::primary_person::select_primary;
use crate::pipeline::cluster_config::{ClusterConfig, ConfigError};
use crate::pipeline::cluster_error::ClusterError;
use crate::pipeline::cluster_result::ClusterReport;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::shared::photo_record::PhotoRecord;

/// Clusters one batch of photos into events plus an extras bucket:
/// resolve identities → select primary person → build signatures →
/// group events → place leftovers.
///
/// Every stage consumes the previous stage's complete output. No state
/// survives between calls to [`execute`](Self::execute).
pub struct ClusterEventsUseCase {
    config: ClusterConfig,
    resolver: Box<dyn IdentityResolver>,
    grouper: EventGrouper,
    extras_resolver: ExtrasResolver,
    logger: Box<dyn PipelineLogger>,
}

impl ClusterEventsUseCase {
    pub fn new(config: ClusterConfig, logger: Box<dyn PipelineLogger>) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            resolver: config.build_resolver(),
            grouper: EventGrouper::new(config.outfit_threshold),
            extras_resolver: ExtrasResolver::new(
                config.extras_ratio,
                config.extras_matching,
                config.match_threshold,
            ),
            config,
            logger,
        })
    }

    /// Replaces the resolver chosen by the config.
    pub fn with_resolver(mut self, resolver: Box<dyn IdentityResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    pub fn execute(&mut self, photos: &[PhotoRecord]) -> Result<ClusterReport, ClusterError> {
        validate_batch(photos, self.config.max_batch_size)?;

        let face_count: usize = photos.iter().map(PhotoRecord::face_count).sum();
        self.logger.batch(photos.len(), face_count);
        if face_count == 0 {
            self.logger.info("No faces detected, all photos go to extras");
            return Ok(self.extras_only(photos, 0, 0));
        }

        let start = Instant::now();
        let identities = IdentityMap::resolve(photos, self.resolver.as_ref());
        self.logger.timing("identity", elapsed_ms(start));
        self.logger
            .metric("identities", identities.identity_count() as f64);
        self.logger.metric("noise_faces", identities.noise_count() as f64);
        log::debug!(
            "{} resolved {} faces into {} identities ({} noise)",
            self.resolver.name(),
            identities.face_count(),
            identities.identity_count(),
            identities.noise_count()
        );

        let start = Instant::now();
        let primary = select_primary(&identities);
        self.logger.timing("primary", elapsed_ms(start));
        let Some(primary) = primary else {
            self.logger
                .info("No identity survived clustering, all photos go to extras");
            return Ok(self.extras_only(
                photos,
                identities.identity_count(),
                identities.noise_count(),
            ));
        };
        self.logger.info(&format!(
            "Primary person (identity {primary}) found in {} photos",
            identities.distinct_photos(primary).len()
        ));

        let start = Instant::now();
        let signatures = build_signatures(&identities, photos.len());
        self.logger.timing("signature", elapsed_ms(start));

        let start = Instant::now();
        let mut events = self.grouper.group(photos, &signatures, primary);
        self.logger.timing("grouping", elapsed_ms(start));
        self.logger.info(&format!("Created {} events", events.len()));

        let start = Instant::now();
        let extras = self.extras_resolver.resolve(photos, &identities, &mut events);
        self.logger.timing("extras", elapsed_ms(start));

        let attached: usize = events.iter().map(|e| e.attached_photos().len()).sum();
        self.logger.metric("events", events.len() as f64);
        self.logger.metric("attached", attached as f64);
        self.logger.metric("extras", extras.len() as f64);

        Ok(ClusterReport {
            events,
            extras,
            primary: Some(primary),
            identity_count: identities.identity_count(),
            noise_count: identities.noise_count(),
        })
    }

    /// Emits the logger's end-of-run summary.
    pub fn summary(&self) {
        self.logger.summary();
    }

    fn extras_only(
        &mut self,
        photos: &[PhotoRecord],
        identity_count: usize,
        noise_count: usize,
    ) -> ClusterReport {
        self.logger.metric("extras", photos.len() as f64);
        ClusterReport {
            events: Vec::new(),
            extras: ExtrasBucket::from_all(photos),
            primary: None,
            identity_count,
            noise_count,
        }
    }
}

/// Rejects batches that break the input contract: oversized batches,
/// inconsistent vector dimensions, and non-finite values.
fn validate_batch(photos: &[PhotoRecord], max_batch_size: Option<usize>) -> Result<(), ClusterError> {
    if let Some(max) = max_batch_size {
        if photos.len() > max {
            return Err(ClusterError::BatchTooLarge {
                size: photos.len(),
                max,
            });
        }
    }

    let embedding_dim = photos
        .iter()
        .find_map(|p| p.faces.first())
        .map(|f| f.embedding.len());
    let color_dim = photos.first().map(|p| p.color.len());

    for (photo_idx, photo) in photos.iter().enumerate() {
        if let Some(expected) = color_dim {
            if photo.color.len() != expected {
                return Err(ClusterError::ColorDimensionMismatch {
                    photo: photo_idx,
                    expected,
                    actual: photo.color.len(),
                });
            }
        }
        if photo.color.iter().any(|v| !v.is_finite()) {
            return Err(ClusterError::NonFiniteValue { photo: photo_idx });
        }
        for (face_idx, face) in photo.faces.iter().enumerate() {
            if let Some(expected) = embedding_dim {
                if face.embedding.len() != expected {
                    return Err(ClusterError::DimensionMismatch {
                        photo: photo_idx,
                        face: face_idx,
                        expected,
                        actual: face.embedding.len(),
                    });
                }
            }
            if face.embedding.iter().any(|v| !v.is_finite()) {
                return Err(ClusterError::NonFiniteValue { photo: photo_idx });
            }
        }
    }
    Ok(())
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}
