pub mod address;
pub mod candidates;
pub mod name;

pub use candidates::{
    find_candidate_sets, find_candidate_sets_with_filter, CandidateReport, CandidateSet,
    FinderOptions, FinderStats,
};
pub use name::IdentityKey;
