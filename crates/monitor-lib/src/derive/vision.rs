//! Vision inspection result normalization

use crate::models::{AnalysisResult, DetectionResult};

/// Scale a 0–1 confidence fraction to percent; percent values pass through
pub fn confidence_percent(confidence: f64) -> f64 {
    if (0.0..=1.0).contains(&confidence) {
        confidence * 100.0
    } else {
        confidence
    }
}

fn normalize_detection(detection: &mut DetectionResult) {
    detection.confidence = confidence_percent(detection.confidence);

    let dims = &mut detection.dimensions;
    if dims.aspect_ratio == 0.0 && dims.height > 0.0 {
        dims.aspect_ratio = dims.width / dims.height;
    }
}

/// Bring an analysis into canonical form
///
/// Confidences are percentages, `all_detections` is always present and
/// holds at least the primary detection.
pub fn normalize_analysis(mut result: AnalysisResult) -> AnalysisResult {
    normalize_detection(&mut result.detection);

    let all = match result.all_detections.take() {
        Some(mut all) if !all.is_empty() => {
            all.iter_mut().for_each(normalize_detection);
            all
        }
        _ => vec![result.detection.clone()],
    };
    result.all_detections = Some(all);

    result
}

/// Number of defective detections in an analysis
pub fn defective_count(result: &AnalysisResult) -> usize {
    result
        .all_detections
        .as_deref()
        .unwrap_or(std::slice::from_ref(&result.detection))
        .iter()
        .filter(|d| d.quality == crate::models::DetectionGrade::Defective)
        .count()
}
