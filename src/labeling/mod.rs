use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::warn;

mod imagga;
pub use imagga::ImaggaClient;

pub const UNKNOWN_FOOD: &str = "unknown food";

/// Tags at or below this confidence (0-100 scale) are dropped.
const CONFIDENCE_THRESHOLD: f64 = 30.0;
const MAX_LABELS: usize = 3;

/// Filename keywords checked when the tagging service is unreachable.
const FILENAME_KEYWORDS: &[&str] = &["egg", "apple", "banana", "dosa", "rice", "bread"];

#[derive(Debug, Clone, PartialEq)]
pub struct FoodTag {
    pub name: String,
    pub confidence: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum TagError {
    /// The tagging service answered with a non-success status.
    #[error("{0}")]
    Service(String),
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

#[async_trait]
pub trait ImageTagger: Send + Sync {
    async fn tag(&self, image: Bytes, filename: &str) -> Result<Vec<FoodTag>, TagError>;
}

/// Labeling result: either candidate food labels (possibly empty) or a
/// service failure, which stops auto-logging and is reported to the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum LabelOutcome {
    Labels(Vec<String>),
    Failure(String),
}

/// Comma-joined label list, `"unknown food"` when empty.
pub fn display_labels(labels: &[String]) -> String {
    if labels.is_empty() {
        UNKNOWN_FOOD.to_string()
    } else {
        labels.join(", ")
    }
}

#[derive(Clone)]
pub struct Labeler {
    tagger: Arc<dyn ImageTagger>,
}

impl Labeler {
    pub fn new(tagger: Arc<dyn ImageTagger>) -> Self {
        Self { tagger }
    }

    pub async fn label(&self, image: Bytes, filename: &str) -> LabelOutcome {
        match self.tagger.tag(image, filename).await {
            Ok(tags) => LabelOutcome::Labels(select_labels(tags)),
            Err(TagError::Service(message)) => {
                warn!(%message, filename, "tagging service rejected image");
                LabelOutcome::Failure(message)
            }
            Err(TagError::Transport(e)) => {
                warn!(error = %e, filename, "tagging service unreachable, trying filename fallback");
                LabelOutcome::Labels(labels_from_filename(filename))
            }
        }
    }
}

/// Keep tags above the confidence threshold in service order, skipping the
/// literal "unknown" placeholder, at most three.
fn select_labels(tags: Vec<FoodTag>) -> Vec<String> {
    tags.into_iter()
        .filter(|t| t.confidence > CONFIDENCE_THRESHOLD && t.name != "unknown")
        .map(|t| t.name)
        .take(MAX_LABELS)
        .collect()
}

fn labels_from_filename(filename: &str) -> Vec<String> {
    let lower = filename.to_lowercase();
    FILENAME_KEYWORDS
        .iter()
        .copied()
        .find(|kw| lower.contains(kw))
        .map(|kw| vec![kw.to_string()])
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(name: &str, confidence: f64) -> FoodTag {
        FoodTag {
            name: name.to_string(),
            confidence,
        }
    }

    #[test]
    fn drops_low_confidence_and_placeholder_tags() {
        let labels = select_labels(vec![
            tag("banana", 61.4),
            tag("unknown", 95.0),
            tag("fruit", 30.0),
            tag("food", 30.1),
        ]);
        assert_eq!(labels, vec!["banana".to_string(), "food".to_string()]);
    }

    #[test]
    fn keeps_at_most_three_in_service_order() {
        let labels = select_labels(vec![
            tag("rice", 40.0),
            tag("curry", 90.0),
            tag("plate", 35.0),
            tag("lunch", 80.0),
        ]);
        assert_eq!(
            labels,
            vec!["rice".to_string(), "curry".to_string(), "plate".to_string()]
        );
    }

    #[test]
    fn display_joins_or_falls_back_to_unknown() {
        assert_eq!(display_labels(&[]), "unknown food");
        let labels = vec!["rice".to_string(), "curry".to_string()];
        assert_eq!(display_labels(&labels), "rice, curry");
    }

    #[test]
    fn filename_fallback_matches_known_foods() {
        assert_eq!(
            labels_from_filename("1699999999_My-Banana_Pic.JPG"),
            vec!["banana".to_string()]
        );
        assert_eq!(labels_from_filename("IMG_2024.jpeg"), Vec::<String>::new());
    }

    struct RejectingTagger;

    #[async_trait]
    impl ImageTagger for RejectingTagger {
        async fn tag(&self, _image: Bytes, _filename: &str) -> Result<Vec<FoodTag>, TagError> {
            Err(TagError::Service("monthly limit reached".into()))
        }
    }

    #[tokio::test]
    async fn service_rejection_becomes_failure() {
        let labeler = Labeler::new(Arc::new(RejectingTagger));
        let outcome = labeler.label(Bytes::from_static(b"img"), "egg.png").await;
        assert_eq!(
            outcome,
            LabelOutcome::Failure("monthly limit reached".to_string())
        );
    }
}
