//! Segment optimization: padding, merging, filtering and duration fit

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::model::{total_duration, Segment};
use crate::error::{HighlightError, HighlightResult};

/// Thresholds driving the optimizer passes, all in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptimizerSettings {
    /// Budget for the summed output duration
    pub max_duration: f64,
    /// Merged segments shorter than this are dropped
    pub min_segment_length: f64,
    /// Context added before and after every segment
    pub context_padding: f64,
    /// Gaps up to and including this are bridged
    pub merge_gap_threshold: f64,
    /// Length of the source media, used as the upper bound after padding
    pub source_duration: Option<f64>,
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        Self {
            max_duration: 600.0,
            min_segment_length: 30.0,
            context_padding: 5.0,
            merge_gap_threshold: 15.0,
            source_duration: None,
        }
    }
}

/// Turns validated segments into a non-overlapping, budget-bounded list
pub struct SegmentOptimizer {
    settings: OptimizerSettings,
}

impl SegmentOptimizer {
    pub fn new(settings: OptimizerSettings) -> Self {
        Self { settings }
    }

    /// Run every pass and fail when nothing survives
    pub fn optimize(&self, segments: Vec<Segment>) -> HighlightResult<Vec<Segment>> {
        let input_count = segments.len();
        let padded = self.apply_padding(segments);
        let optimized = self.refine(padded);

        if optimized.is_empty() {
            return Err(HighlightError::EmptyOptimizationResult {
                message: format!(
                    "all {} candidate segments were merged away or shorter than {:.1}s",
                    input_count, self.settings.min_segment_length
                ),
            });
        }

        info!(
            "Final selection: {} segments, {:.1}s ({:.1} min)",
            optimized.len(),
            total_duration(&optimized),
            total_duration(&optimized) / 60.0
        );

        Ok(optimized)
    }

    /// Merge, bound, filter and fit without padding.
    ///
    /// Applying this to its own output returns the same list.
    pub fn refine(&self, segments: Vec<Segment>) -> Vec<Segment> {
        let merged = self.merge(segments);
        let bounded = self.clamp_to_source(merged);
        let filtered = self.filter_short(bounded);
        self.fit_duration(filtered)
    }

    /// Widen every segment by the context padding, flooring the start at zero
    pub fn apply_padding(&self, segments: Vec<Segment>) -> Vec<Segment> {
        let padding = self.settings.context_padding;
        debug!("Extending segments with {:.1}s context padding", padding);

        segments
            .into_iter()
            .map(|mut segment| {
                segment.start = (segment.start - padding).max(0.0);
                segment.end += padding;
                segment
            })
            .collect()
    }

    /// Single left-to-right merge of segments separated by small gaps.
    ///
    /// The merged segment keeps the earlier segment's reason and the higher score.
    pub fn merge(&self, mut segments: Vec<Segment>) -> Vec<Segment> {
        segments.sort_by(|a, b| a.start.total_cmp(&b.start));

        let input_count = segments.len();
        let mut merged: Vec<Segment> = Vec::with_capacity(input_count);
        let mut iter = segments.into_iter();

        let mut current = match iter.next() {
            Some(first) => first,
            None => return merged,
        };

        for next in iter {
            let gap = next.start - current.end;
            if gap <= self.settings.merge_gap_threshold {
                // Larger end, not next.end: a nested segment must not shrink the
                // accumulated one. Empty text adds no separator.
                current.end = current.end.max(next.end);
                current.score = current.score.max(next.score);
                if !next.text.is_empty() {
                    if current.text.is_empty() {
                        current.text = next.text;
                    } else {
                        current.text.push(' ');
                        current.text.push_str(&next.text);
                    }
                }
                debug!(
                    "Merged segments (gap: {:.1}s): {} - {}",
                    gap,
                    current.start_formatted(),
                    current.end_formatted()
                );
            } else {
                merged.push(current);
                current = next;
            }
        }
        merged.push(current);

        info!(
            "After merging: {} segments (from {}), gap threshold {:.1}s",
            merged.len(),
            input_count,
            self.settings.merge_gap_threshold
        );

        merged
    }

    /// Pull padded ends back inside the source
    pub fn clamp_to_source(&self, segments: Vec<Segment>) -> Vec<Segment> {
        let Some(limit) = self.settings.source_duration else {
            return segments;
        };

        segments
            .into_iter()
            .filter_map(|mut segment| {
                segment.end = segment.end.min(limit);
                (segment.start < segment.end).then_some(segment)
            })
            .collect()
    }

    /// Drop segments shorter than the minimum length
    pub fn filter_short(&self, segments: Vec<Segment>) -> Vec<Segment> {
        let min = self.settings.min_segment_length;
        let input_count = segments.len();

        let filtered: Vec<Segment> = segments
            .into_iter()
            .filter(|segment| {
                let keep = segment.duration() >= min;
                if !keep {
                    debug!(
                        "Filtered out short segment ({:.1}s): {} - {}",
                        segment.duration(),
                        segment.start_formatted(),
                        segment.end_formatted()
                    );
                }
                keep
            })
            .collect();

        info!(
            "After filtering: {} of {} segments (min length {:.1}s)",
            filtered.len(),
            input_count,
            min
        );

        filtered
    }

    /// Greedy first-fit over score order, then back to chronological order.
    ///
    /// Ties in score keep the chronological order established by `merge`, since
    /// the sort is stable. A segment that overflows the budget is skipped even
    /// when a later, lower-scored one still fits.
    pub fn fit_duration(&self, segments: Vec<Segment>) -> Vec<Segment> {
        let max = self.settings.max_duration;
        let total = total_duration(&segments);

        if total <= max {
            info!("Total duration {:.1}s is within the {:.1}s budget", total, max);
            return segments;
        }

        info!("Total duration {:.1}s exceeds {:.1}s, trimming by score", total, max);

        let mut ranked = segments;
        ranked.sort_by(|a, b| b.score.cmp(&a.score));

        let mut running = 0.0;
        let mut selected = Vec::with_capacity(ranked.len());
        for segment in ranked {
            let duration = segment.duration();
            if running + duration <= max {
                running += duration;
                selected.push(segment);
            } else {
                debug!(
                    "Skipped segment (would exceed budget): {} - {} score {}",
                    segment.start_formatted(),
                    segment.end_formatted(),
                    segment.score
                );
            }
        }

        selected.sort_by(|a, b| a.start.total_cmp(&b.start));
        selected
    }
}
