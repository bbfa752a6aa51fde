//! Gathers suggestions from every provider at once.

use cadence::{CountedExt, Histogrammed, StatsdClient};
use futures::future::join_all;
use keywords_suggest_traits::{
    AggregatedResult, Fetcher, Keyword, ProviderAdapter, ProviderId, ProviderOutcome, Suggestion,
};
use std::sync::Arc;

/// Asks every provider for suggestions concurrently and combines the answers.
///
/// Every provider is always waited on. A provider that fails only empties its
/// own field of the result.
pub struct FanOut {
    /// The providers to ask, one adapter each.
    adapters: Vec<Box<dyn ProviderAdapter>>,

    /// Performs the upstream calls.
    fetcher: Box<dyn Fetcher>,

    /// Where to report per-provider metrics. Shared with the web layer.
    metrics_client: Arc<StatsdClient>,
}

impl FanOut {
    /// Create a `FanOut` that asks each of `adapters`, using `fetcher` for the calls.
    pub fn new(
        adapters: Vec<Box<dyn ProviderAdapter>>,
        fetcher: Box<dyn Fetcher>,
        metrics_client: Arc<StatsdClient>,
    ) -> Self {
        Self {
            adapters,
            fetcher,
            metrics_client,
        }
    }

    /// An operator-visible name listing the providers that are asked.
    pub fn name(&self) -> String {
        let provider_names = self
            .adapters
            .iter()
            .map(|adapter| adapter.id().as_str())
            .collect::<Vec<_>>()
            .join(", ");
        format!("FanOut({})", provider_names)
    }

    /// Gather suggestions for `keyword` from every provider.
    ///
    /// Resolves once every upstream call has settled and been parsed. Never
    /// fails; providers that could not be reached contribute nothing.
    pub async fn suggest(&self, keyword: Keyword) -> AggregatedResult {
        let answers = join_all(
            self.adapters
                .iter()
                .map(|adapter| self.suggest_from(adapter.as_ref(), &keyword)),
        )
        .await;

        // Fields are filled by provider, not by the order answers arrived in.
        let mut result = AggregatedResult::empty(keyword);
        for (provider, suggestions) in answers {
            result.field_mut(provider).extend(suggestions);
        }
        result
    }

    /// Ask a single provider, and normalize its answer.
    async fn suggest_from(
        &self,
        adapter: &dyn ProviderAdapter,
        keyword: &Keyword,
    ) -> (ProviderId, Vec<Suggestion>) {
        let provider = adapter.id();
        let outcome = self.fetcher.fetch(adapter.build_request(keyword)).await;

        if let ProviderOutcome::Failure(error) = &outcome {
            tracing::warn!(
                r#type = "provider.transport-error",
                %provider,
                %error,
                "Could not reach provider"
            );
            self.metrics_client
                .incr(&format!("provider.{}.transport-error", provider))
                .ok();
        }

        let suggestions = adapter.parse(&outcome);
        self.metrics_client
            .histogram(
                &format!("provider.{}.suggestions", provider),
                suggestions.len() as u64,
            )
            .ok();

        (provider, suggestions)
    }
}

#[cfg(test)]
mod tests {
    use super::FanOut;
    use crate::{GoogleSuggester, InstagramSuggester, TiktokSuggester, YoutubeSuggester};
    use async_trait::async_trait;
    use cadence::{NopMetricSink, SpyMetricSink, StatsdClient};
    use fake::{Fake, Faker};
    use keywords_settings::EndpointConfig;
    use keywords_suggest_traits::{
        FetchError, Fetcher, Hashtag, Keyword, ProviderAdapter, ProviderOutcome, Suggestion,
        UpstreamRequest,
    };
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::{
        collections::HashMap,
        sync::{Arc, Mutex},
        time::Duration,
    };
    use tokio::sync::{mpsc, oneshot::error::TryRecvError, Semaphore};

    /// Adapters for all four providers, each on its own fake host.
    fn adapters() -> Vec<Box<dyn ProviderAdapter>> {
        let with_headers = |template: &str| EndpointConfig {
            referer: Some("https://referer.test/".to_string()),
            app_id: Some("1234".to_string()),
            ..EndpointConfig::new(template)
        };
        vec![
            GoogleSuggester::new_boxed(&EndpointConfig::new("http://google.test/?q={keyword}"))
                .unwrap(),
            YoutubeSuggester::new_boxed(&EndpointConfig::new("http://youtube.test/?q={keyword}"))
                .unwrap(),
            TiktokSuggester::new_boxed(&with_headers("http://tiktok.test/?q={keyword}"), "ua")
                .unwrap(),
            InstagramSuggester::new_boxed(&with_headers("http://instagram.test/?q={keyword}"), "ua")
                .unwrap(),
        ]
    }

    fn metrics_client() -> Arc<StatsdClient> {
        Arc::new(StatsdClient::from_sink("keywords-test", NopMetricSink))
    }

    /// What a canned upstream does.
    #[derive(Clone)]
    enum Canned {
        Body(String, Duration),
        Fail,
    }

    /// A fetcher that answers from canned responses keyed by host, and counts calls.
    #[derive(Default)]
    struct CannedFetcher {
        responses: HashMap<&'static str, Canned>,
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl CannedFetcher {
        fn with(mut self, host: &'static str, canned: Canned) -> Self {
            self.responses.insert(host, canned);
            self
        }

        fn body(mut self, host: &'static str, body: &str) -> Self {
            self.responses
                .insert(host, Canned::Body(body.to_string(), Duration::ZERO));
            self
        }
    }

    #[async_trait]
    impl Fetcher for CannedFetcher {
        async fn fetch(&self, request: UpstreamRequest) -> ProviderOutcome {
            self.calls.lock().unwrap().push(request.url.clone());
            let canned = self
                .responses
                .iter()
                .find(|(host, _)| request.url.contains(*host))
                .map(|(_, canned)| canned.clone());
            match canned {
                Some(Canned::Body(body, delay)) => {
                    tokio::time::sleep(delay).await;
                    ProviderOutcome::ok(body)
                }
                Some(Canned::Fail) | None => ProviderOutcome::Failure(FetchError::Network(
                    anyhow::anyhow!("connection refused"),
                )),
            }
        }
    }

    fn all_healthy() -> CannedFetcher {
        CannedFetcher::default()
            .body("google.test", r#"["cats",["cat food","cat toys"]]"#)
            .body(
                "youtube.test",
                r#"window.google.ac.h(["cats",[["cat videos",0,[]]],{}])"#,
            )
            .body("tiktok.test", r#"{"sug_list":[{"word":"cat dance"}]}"#)
            .body(
                "instagram.test",
                r#"{"hashtags":[{"hashtag":{"name":"cats","media_count":7}}]}"#,
            )
    }

    fn keyword(raw: &str) -> Keyword {
        Keyword::parse(Some(raw)).unwrap()
    }

    #[tokio::test]
    async fn every_provider_contributes() {
        let fan_out = FanOut::new(adapters(), Box::new(all_healthy()), metrics_client());
        let result = fan_out.suggest(keyword("cats")).await;

        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "keyword": "cats",
                "google": ["cat food", "cat toys"],
                "youtube": ["cat videos"],
                "tiktok": ["cat dance"],
                "instagram": [{"name": "cats", "count": 7}],
            })
        );
    }

    #[tokio::test]
    async fn one_call_per_provider() {
        let fetcher = all_healthy();
        let calls = fetcher.calls.clone();
        let fan_out = FanOut::new(adapters(), Box::new(fetcher), metrics_client());

        fan_out.suggest(keyword("red cats")).await;

        let mut calls = calls.lock().unwrap().clone();
        calls.sort();
        assert_eq!(
            calls,
            vec![
                "http://google.test/?q=red%20cats",
                "http://instagram.test/?q=red%20cats",
                "http://tiktok.test/?q=red%20cats",
                "http://youtube.test/?q=red%20cats",
            ]
        );
    }

    #[tokio::test]
    async fn a_failing_provider_does_not_affect_the_others() {
        let fetcher = all_healthy().with("youtube.test", Canned::Fail);
        let fan_out = FanOut::new(adapters(), Box::new(fetcher), metrics_client());

        let result = fan_out.suggest(keyword("cats")).await;

        assert_eq!(result.youtube, vec![]);
        assert_eq!(result.google, vec![Suggestion::from("cat food"), Suggestion::from("cat toys")]);
        assert_eq!(result.tiktok, vec![Suggestion::from("cat dance")]);
        assert_eq!(
            result.instagram,
            vec![Suggestion::Hashtag(Hashtag {
                name: "cats".to_string(),
                count: Some(7)
            })]
        );
    }

    #[tokio::test]
    async fn every_provider_failing_still_gives_every_field() {
        let fan_out = FanOut::new(
            adapters(),
            Box::new(CannedFetcher::default()),
            metrics_client(),
        );
        let keyword: Keyword = Faker.fake();

        let result = fan_out.suggest(keyword.clone()).await;

        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "keyword": keyword.as_str(),
                "google": [],
                "youtube": [],
                "tiktok": [],
                "instagram": [],
            })
        );
    }

    #[tokio::test]
    async fn fields_do_not_depend_on_arrival_order() {
        let fetcher = all_healthy()
            .with(
                "google.test",
                Canned::Body(r#"["cats",["slow"]]"#.to_string(), Duration::from_millis(60)),
            )
            .with(
                "tiktok.test",
                Canned::Body(
                    r#"{"sug_list":[{"word":"medium"}]}"#.to_string(),
                    Duration::from_millis(30),
                ),
            );
        let fan_out = FanOut::new(adapters(), Box::new(fetcher), metrics_client());

        let result = fan_out.suggest(keyword("cats")).await;

        assert_eq!(result.google, vec![Suggestion::from("slow")]);
        assert_eq!(result.youtube, vec![Suggestion::from("cat videos")]);
        assert_eq!(result.tiktok, vec![Suggestion::from("medium")]);
    }

    #[tokio::test]
    async fn transport_errors_are_counted() {
        let (rx, sink) = SpyMetricSink::new();
        let fetcher = all_healthy().with("tiktok.test", Canned::Fail);
        let fan_out = FanOut::new(
            adapters(),
            Box::new(fetcher),
            Arc::new(StatsdClient::from_sink("keywords", sink)),
        );

        fan_out.suggest(keyword("cats")).await;

        let metrics: Vec<String> = rx
            .try_iter()
            .map(|bytes| String::from_utf8(bytes).unwrap())
            .collect();
        assert!(metrics.contains(&"keywords.provider.tiktok.transport-error:1|c".to_string()));
        assert!(metrics.contains(&"keywords.provider.google.suggestions:2|h".to_string()));
        assert!(!metrics.iter().any(|m| m.contains("google.transport-error")));
    }

    #[test]
    fn name_lists_providers() {
        let fan_out = FanOut::new(
            adapters(),
            Box::new(CannedFetcher::default()),
            metrics_client(),
        );
        assert_eq!(fan_out.name(), "FanOut(google, youtube, tiktok, instagram)");
    }

    /// A fetcher that can be externally paused mid-request.
    struct GatedFetcher {
        started: mpsc::Sender<String>,
        gate: Arc<Semaphore>,
    }

    #[async_trait]
    impl Fetcher for GatedFetcher {
        async fn fetch(&self, request: UpstreamRequest) -> ProviderOutcome {
            self.started.send(request.url).await.unwrap();
            self.gate.acquire().await.unwrap().forget();
            ProviderOutcome::ok("{}")
        }
    }

    #[tokio::test]
    async fn fan_out_is_concurrent() {
        let (started_tx, mut started_rx) = mpsc::channel::<String>(4);
        let gate = Arc::new(Semaphore::new(0));
        let (result_tx, mut result_rx) = tokio::sync::oneshot::channel();

        let fan_out = FanOut::new(
            adapters(),
            Box::new(GatedFetcher {
                started: started_tx,
                gate: gate.clone(),
            }),
            metrics_client(),
        );

        // Start a request that will use all four providers.
        let task_handle = tokio::spawn(async move {
            let result = fan_out.suggest(Faker.fake()).await;
            result_tx.send(result).unwrap();
        });

        // All four calls are in flight before any of them is allowed to
        // finish. This is the most important assertion.
        for _ in 0..4 {
            started_rx.recv().await.unwrap();
        }

        // Let three providers finish. The result still waits on the fourth.
        gate.add_permits(3);
        tokio::task::yield_now().await;
        assert!(matches!(result_rx.try_recv(), Err(TryRecvError::Empty)));

        // Let the last provider finish.
        gate.add_permits(1);
        let result = result_rx.await.unwrap();
        task_handle.await.unwrap();

        // `{}` is the wrong shape for every provider.
        assert_eq!(result.google, vec![]);
        assert_eq!(result.instagram, vec![]);
    }
}
