//! Tools to build the fan-out from configuration.

use crate::{
    FanOut, GoogleSuggester, InstagramSuggester, ReqwestFetcher, TiktokSuggester,
    YoutubeSuggester,
};
use cadence::StatsdClient;
use keywords_settings::Settings;
use keywords_suggest_traits::{ProviderAdapter, SetupError};
use std::sync::Arc;

/// Build a [`FanOut`] over every provider, as described by `settings`.
///
/// # Errors
/// If any provider's endpoint or headers are invalid, or the HTTP client cannot
/// be created.
pub fn make_fan_out(
    settings: &Settings,
    metrics_client: Arc<StatsdClient>,
) -> Result<FanOut, SetupError> {
    let _setup_span = tracing::info_span!("provider_setup").entered();
    tracing::info!(r#type = "providers.configuring", "Setting up suggestion providers");

    let providers = &settings.providers;
    let adapters: Vec<Box<dyn ProviderAdapter>> = vec![
        GoogleSuggester::new_boxed(&providers.google)?,
        YoutubeSuggester::new_boxed(&providers.youtube)?,
        TiktokSuggester::new_boxed(&providers.tiktok, &providers.user_agent)?,
        InstagramSuggester::new_boxed(&providers.instagram, &providers.user_agent)?,
    ];
    let fetcher = ReqwestFetcher::new_boxed(&settings.upstream)?;

    Ok(FanOut::new(adapters, fetcher, metrics_client))
}

#[cfg(test)]
mod tests {
    use super::make_fan_out;
    use cadence::{NopMetricSink, StatsdClient};
    use keywords_settings::Settings;
    use keywords_suggest_traits::SetupError;
    use std::sync::Arc;

    fn metrics_client() -> Arc<StatsdClient> {
        Arc::new(StatsdClient::from_sink("keywords-test", NopMetricSink))
    }

    #[test]
    fn fan_out_from_test_settings() {
        let settings = Settings::load_for_tests();
        let fan_out = make_fan_out(&settings, metrics_client()).expect("should build");
        assert_eq!(fan_out.name(), "FanOut(google, youtube, tiktok, instagram)");
    }

    #[test]
    fn metrics_client_is_shared_with_the_fan_out() {
        let settings = Settings::load_for_tests();
        let metrics_client = metrics_client();
        let _fan_out = make_fan_out(&settings, Arc::clone(&metrics_client)).expect("should build");
        assert_eq!(Arc::strong_count(&metrics_client), 2);
    }

    #[test]
    fn missing_app_id_is_a_setup_error() {
        let mut settings = Settings::load_for_tests();
        settings.providers.instagram.app_id = None;
        assert!(matches!(
            make_fan_out(&settings, metrics_client()),
            Err(SetupError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn bad_user_agent_is_a_setup_error() {
        let mut settings = Settings::load_for_tests();
        settings.providers.user_agent = "bad\u{7f}agent".to_string();
        assert!(matches!(
            make_fan_out(&settings, metrics_client()),
            Err(SetupError::InvalidConfiguration(_))
        ));
    }
}
