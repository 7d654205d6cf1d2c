use serde::Serialize;

use super::{LanguageStat, Repository, UserProfile};

/// The showcase view-model: a profile, its projects and their language breakdown.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Showcase {
    /// The user profile
    pub(crate) profile: UserProfile,

    /// Showcased repositories, most starred first
    pub(crate) repositories: Vec<Repository>,

    /// Top languages of the most starred repositories
    pub(crate) languages: Vec<LanguageStat>,
}

impl Showcase {
    /// Creates a new `Showcase` instance.
    pub fn new(
        profile: UserProfile,
        repositories: Vec<Repository>,
        languages: Vec<LanguageStat>,
    ) -> Self {
        Self {
            profile,
            repositories,
            languages,
        }
    }

    /// Retrieves the user profile.
    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    /// Retrieves the showcased repositories.
    pub fn repositories(&self) -> &[Repository] {
        &self.repositories
    }

    /// Retrieves the language statistics.
    pub fn languages(&self) -> &[LanguageStat] {
        &self.languages
    }
}
