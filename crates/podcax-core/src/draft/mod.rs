mod assembler;
mod policy;

pub use {
    assembler::{
        DraftAssembler, DraftField, IncompleteDraft, MAX_DESCRIPTION_CHARS, PostDraft,
        SubmitOutcome,
    },
    policy::ClearPolicy,
};
