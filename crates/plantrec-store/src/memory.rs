//! In-memory store with the exact `RecommendationStore` contract of the
//! LanceDB store, including sequential id assignment and the purge
//! semantics. Tests and offline runs use this.

use std::sync::Mutex;

use chrono::Utc;

use plantrec_core::error::{Error, Result};
use plantrec_core::traits::RecommendationStore;
use plantrec_core::types::{
    RecommendationId, RecommendationMetadata, RecommendationRecord, RecordedRecommendation,
    Submission, SubmissionHistory, SubmissionId,
};

#[derive(Default)]
struct State {
    submissions: Vec<Submission>,
    recommendations: Vec<(RecommendationId, RecommendationRecord)>,
    metadata: Vec<(RecommendationId, RecommendationMetadata)>,
    next_submission: SubmissionId,
    next_recommendation: RecommendationId,
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, State>> {
        self.state.lock().map_err(|_| Error::Store("memory store poisoned".to_string()))
    }
}

impl RecommendationStore for MemoryStore {
    fn create_submission(&self, free_text: Option<&str>) -> Result<SubmissionId> {
        let mut state = self.lock()?;
        state.next_submission += 1;
        let id = state.next_submission;
        state.submissions.push(Submission {
            id,
            free_text: free_text.map(str::to_string),
            created_at: Utc::now(),
            rating: None,
        });
        Ok(id)
    }

    fn create_recommendation(&self, record: &RecommendationRecord) -> Result<RecommendationId> {
        let mut state = self.lock()?;
        if !state.submissions.iter().any(|s| s.id == record.submission_id) {
            return Err(Error::NotFound(format!("submission id {}", record.submission_id)));
        }
        state.next_recommendation += 1;
        let id = state.next_recommendation;
        state.recommendations.push((id, record.clone()));
        Ok(id)
    }

    fn create_metadata(
        &self,
        recommendation_id: RecommendationId,
        metadata: &RecommendationMetadata,
    ) -> Result<()> {
        let mut state = self.lock()?;
        if !state.recommendations.iter().any(|(id, _)| *id == recommendation_id) {
            return Err(Error::NotFound(format!("recommendation id {recommendation_id}")));
        }
        state.metadata.push((recommendation_id, metadata.clone()));
        Ok(())
    }

    fn add_rating(&self, submission_id: SubmissionId, rating: u8) -> Result<()> {
        if !(1..=5).contains(&rating) {
            return Err(Error::Operation(format!("rating {rating} outside 1-5")));
        }
        let mut state = self.lock()?;
        let submission = state
            .submissions
            .iter_mut()
            .find(|s| s.id == submission_id)
            .ok_or_else(|| Error::NotFound(format!("submission id {submission_id}")))?;
        submission.rating = Some(rating);
        Ok(())
    }

    fn list_submissions(&self, include_unrated: bool) -> Result<Vec<SubmissionHistory>> {
        let state = self.lock()?;
        let mut histories = Vec::new();
        for submission in &state.submissions {
            if !include_unrated && submission.rating.is_none() {
                continue;
            }
            // A recommendation row without its metadata half is a
            // recorded partial write; the audit listing skips it.
            let recommendations = state
                .recommendations
                .iter()
                .filter(|(_, r)| r.submission_id == submission.id)
                .filter_map(|(id, record)| {
                    state
                        .metadata
                        .iter()
                        .find(|(mid, _)| mid == id)
                        .map(|(_, metadata)| RecordedRecommendation {
                            id: *id,
                            record: record.clone(),
                            metadata: metadata.clone(),
                        })
                })
                .collect();
            histories.push(SubmissionHistory { submission: submission.clone(), recommendations });
        }
        Ok(histories)
    }

    fn purge_all(&self) -> Result<()> {
        let mut state = self.lock()?;
        *state = State::default();
        Ok(())
    }
}
