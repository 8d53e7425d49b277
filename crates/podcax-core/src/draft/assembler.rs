use crate::{
    ClearPolicy, MediaError, MediaHandle, MediaStore, PostSubmission, UploadCapability,
};

use std::{fmt, panic::Location};

use error_location::ErrorLocation;
use tracing::{info, instrument, warn};

/// Longest accepted description, in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 1000;

/// Part of a post the user still has to provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    /// No audio selected.
    Audio,
    /// No cover image selected.
    Image,
    /// Empty description.
    Description,
}

impl DraftField {
    /// Wording used in the notice.
    pub fn label(self) -> &'static str {
        match self {
            DraftField::Audio => "audio file",
            DraftField::Image => "cover image",
            DraftField::Description => "description",
        }
    }
}

/// Validation result for a draft that cannot be submitted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncompleteDraft {
    /// Missing parts, in audio, image, description order.
    pub missing: Vec<DraftField>,
}

impl IncompleteDraft {
    /// Notice title.
    pub const TITLE: &'static str = "Missing Information";

    /// Notice body naming what is missing.
    pub fn message(&self) -> String {
        let missing: Vec<&str> = self.missing.iter().map(|f| f.label()).collect();
        format!(
            "Please select an audio file, a cover image, and enter a description to share. Missing: {}.",
            missing.join(", ")
        )
    }
}

impl fmt::Display for IncompleteDraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", Self::TITLE, self.message())
    }
}

/// The current combination of selected media and description.
#[derive(Debug, Clone, Copy)]
pub struct PostDraft<'a> {
    /// Selected audio.
    pub audio: Option<&'a MediaHandle>,
    /// Selected cover image.
    pub image: Option<&'a MediaHandle>,
    /// Raw description text.
    pub description: &'a str,
}

impl PostDraft<'_> {
    /// Parts still missing. The description is checked as typed, without
    /// trimming.
    pub fn missing(&self) -> Vec<DraftField> {
        let mut missing = Vec::new();
        if self.audio.is_none() {
            missing.push(DraftField::Audio);
        }
        if self.image.is_none() {
            missing.push(DraftField::Image);
        }
        if self.description.is_empty() {
            missing.push(DraftField::Description);
        }
        missing
    }

    /// Whether every part is present.
    pub fn is_submittable(&self) -> bool {
        self.missing().is_empty()
    }

    /// The post to hand to the uploader, or what is missing.
    pub fn to_submission(&self) -> Result<PostSubmission, IncompleteDraft> {
        match (self.audio, self.image) {
            (Some(audio), Some(image)) if !self.description.is_empty() => Ok(PostSubmission {
                audio_uri: audio.uri().clone(),
                image_uri: image.uri().clone(),
                description: self.description.to_string(),
            }),
            _ => Err(IncompleteDraft {
                missing: self.missing(),
            }),
        }
    }
}

/// What happened to a submit request.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// Nothing was sent; the draft is unchanged.
    Incomplete(IncompleteDraft),
    /// The uploader accepted the post and the draft was cleared.
    Submitted(PostSubmission),
    /// The uploader reported a failure.
    UploadFailed {
        /// The post that was handed off.
        post: PostSubmission,
        /// Failure reported by the uploader.
        error: MediaError,
        /// Whether the draft was cleared anyway (optimistic policy).
        cleared: bool,
    },
}

/// Holds the description and turns the store's selection into a post.
#[derive(Debug, Clone, Default)]
pub struct DraftAssembler {
    description: String,
    policy: ClearPolicy,
}

impl DraftAssembler {
    /// Empty draft using `policy`.
    pub fn new(policy: ClearPolicy) -> Self {
        Self {
            description: String::new(),
            policy,
        }
    }

    /// Clear policy in use.
    pub fn policy(&self) -> ClearPolicy {
        self.policy
    }

    /// Description typed so far.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Replace the description, keeping at most 1000 characters.
    pub fn set_description(&mut self, text: &str) {
        self.description = text.chars().take(MAX_DESCRIPTION_CHARS).collect();
    }

    /// Current draft read from `store`.
    pub fn draft<'a>(&'a self, store: &'a MediaStore) -> PostDraft<'a> {
        PostDraft {
            audio: store.audio_handle(),
            image: store.image_handle(),
            description: &self.description,
        }
    }

    /// Whether audio, image and a non-empty description are all present.
    pub fn can_submit(&self, store: &MediaStore) -> bool {
        self.draft(store).is_submittable()
    }

    /// Hand the post to `uploader` and clear the draft per the policy.
    ///
    /// Clearing unloads any preview playback and drops both handles.
    #[instrument(skip(self, store, uploader), fields(policy = ?self.policy))]
    pub async fn submit(
        &mut self,
        store: &mut MediaStore,
        uploader: &dyn UploadCapability,
    ) -> SubmitOutcome {
        let post = match self.draft(store).to_submission() {
            Ok(post) => post,
            Err(incomplete) => {
                info!(missing = ?incomplete.missing, "Draft incomplete");
                return SubmitOutcome::Incomplete(incomplete);
            }
        };

        let result = uploader.submit_post(&post).await;

        let cleared = match (&result, self.policy) {
            (Ok(()), _) | (Err(_), ClearPolicy::Optimistic) => {
                self.clear(store).await;
                true
            }
            (Err(_), ClearPolicy::OnConfirmed) => false,
        };

        match result {
            Ok(()) => {
                info!(audio = %post.audio_uri, image = %post.image_uri, "Post submitted");
                SubmitOutcome::Submitted(post)
            }
            Err(source) => {
                let error = MediaError::UploadFailed {
                    source,
                    location: ErrorLocation::from(Location::caller()),
                };
                warn!(error = %error, cleared, "Upload failed");
                SubmitOutcome::UploadFailed {
                    post,
                    error,
                    cleared,
                }
            }
        }
    }

    async fn clear(&mut self, store: &mut MediaStore) {
        store.clear_media().await;
        self.description.clear();
    }
}
