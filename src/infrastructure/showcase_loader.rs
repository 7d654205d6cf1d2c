use log::info;

use crate::{FetcherError, Showcase, ShowcaseProvider, filter_by_language};

/// Loads the showcase of a user: the profile and repositories concurrently, then the languages
/// of the most starred repositories.
///
/// The language statistics cover every showcased repository, the optional `language` filter only
/// narrows the listed projects.
pub async fn load_showcase(
    provider: &dyn ShowcaseProvider,
    handle: &str,
    language: Option<&str>,
) -> Result<Showcase, FetcherError> {
    let (profile, repositories) = tokio::try_join!(
        provider.fetch_user(handle),
        provider.fetch_repositories(handle)
    )?;
    let languages = provider.fetch_languages(handle, &repositories).await?;
    let repositories = match language {
        Some(language) => filter_by_language(repositories, language),
        None => repositories,
    };
    info!(
        "Loaded showcase of {handle}: {} repositories, {} languages",
        repositories.len(),
        languages.len()
    );

    Ok(Showcase::new(profile, repositories, languages))
}

#[cfg(test)]
mod tests {
    use crate::{LanguageStat, MockShowcaseProvider, Repository, UserProfile};

    use super::*;

    #[tokio::test]
    async fn load_showcase_success() {
        let provider = {
            let mut provider = MockShowcaseProvider::new();
            provider
                .expect_fetch_user()
                .returning(|handle| Ok(UserProfile::dummy(handle)))
                .times(1);
            provider
                .expect_fetch_repositories()
                .returning(|_| {
                    Ok(vec![
                        Repository::new(1, "a", 10, false),
                        Repository::new(2, "b", 5, false),
                    ])
                })
                .times(1);
            provider
                .expect_fetch_languages()
                .withf(|handle, repositories| handle == "octocat" && repositories.len() == 2)
                .returning(|_, _| Ok(vec![LanguageStat::new("Rust", 10, 100)]))
                .times(1);

            provider
        };

        let showcase = load_showcase(&provider, "octocat", None).await.unwrap();

        assert_eq!(&UserProfile::dummy("octocat"), showcase.profile());
        assert_eq!(2, showcase.repositories().len());
        assert_eq!(&[LanguageStat::new("Rust", 10, 100)], showcase.languages());
    }

    #[tokio::test]
    async fn load_showcase_filters_projects_but_not_language_statistics() {
        let provider = {
            let mut provider = MockShowcaseProvider::new();
            provider
                .expect_fetch_user()
                .returning(|handle| Ok(UserProfile::dummy(handle)));
            provider.expect_fetch_repositories().returning(|_| {
                Ok(vec![
                    Repository {
                        language: Some("Rust".to_string()),
                        ..Repository::new(1, "a", 10, false)
                    },
                    Repository {
                        language: Some("Go".to_string()),
                        ..Repository::new(2, "b", 5, false)
                    },
                ])
            });
            provider
                .expect_fetch_languages()
                .withf(|_, repositories| repositories.len() == 2)
                .returning(|_, _| {
                    Ok(vec![
                        LanguageStat::new("Rust", 10, 50),
                        LanguageStat::new("Go", 10, 50),
                    ])
                })
                .times(1);

            provider
        };

        let showcase = load_showcase(&provider, "octocat", Some("rust"))
            .await
            .unwrap();

        assert_eq!(1, showcase.repositories().len());
        assert_eq!("a", showcase.repositories()[0].name.as_str());
        assert_eq!(2, showcase.languages().len());
    }

    #[tokio::test]
    async fn load_showcase_fails_when_repositories_fail() {
        let provider = {
            let mut provider = MockShowcaseProvider::new();
            provider
                .expect_fetch_user()
                .returning(|handle| Ok(UserProfile::dummy(handle)));
            provider
                .expect_fetch_repositories()
                .returning(|_| Err(FetcherError::Network("HTTP 500".to_string())))
                .times(1);
            provider.expect_fetch_languages().never();

            provider
        };

        let error = load_showcase(&provider, "octocat", None)
            .await
            .expect_err("Expected a network failure");

        assert!(error.is_network_failure());
    }
}
