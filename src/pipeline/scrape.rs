// src/pipeline/scrape.rs

//! Scrape pipeline: every keyword against every board, in order.

use chrono::Utc;

use crate::error::Result;
use crate::models::{Config, FetchFailurePolicy, JobRecord, SearchTask};
use crate::services::{Fetcher, SourceRegistry, create_fetcher};
use crate::utils::log;

/// Summary of a scrape run.
#[derive(Debug, Default)]
pub struct RunOutcome {
    /// Records in task order, then parser order within a task
    pub records: Vec<JobRecord>,
    pub task_total: usize,
    pub task_failures: usize,
}

/// Drives fetch + parse over the keyword × board product.
pub struct Pipeline<'a> {
    registry: &'a SourceRegistry,
    policy: FetchFailurePolicy,
}

impl<'a> Pipeline<'a> {
    pub fn new(registry: &'a SourceRegistry, policy: FetchFailurePolicy) -> Self {
        Self { registry, policy }
    }

    /// Run every search task sequentially.
    ///
    /// A failed fetch either counts as a failed task with zero records or aborts
    /// the run, depending on the failure policy.
    pub async fn run(&self, fetcher: &dyn Fetcher, keywords: &[String]) -> Result<RunOutcome> {
        let tasks = SearchTask::cartesian(keywords, self.registry.boards());

        let mut outcome = RunOutcome {
            task_total: tasks.len(),
            ..RunOutcome::default()
        };

        for (index, task) in tasks.iter().enumerate() {
            let board = task.board;
            let url = board.search_url(task.keyword)?;
            ::log::debug!(
                "[{}/{}] {} '{}': {}",
                index + 1,
                outcome.task_total,
                board.id,
                task.keyword,
                url
            );

            match fetcher.fetch(&url).await {
                Ok(raw) => {
                    let records = board.parse(&raw, task.keyword);
                    ::log::info!(
                        "{} '{}': {} postings",
                        board.id,
                        task.keyword,
                        records.len()
                    );
                    outcome.records.extend(records);
                }
                Err(error) => match self.policy {
                    FetchFailurePolicy::Skip => {
                        outcome.task_failures += 1;
                        ::log::warn!(
                            "Failed to fetch {} '{}' ({}): {}",
                            board.id,
                            task.keyword,
                            url,
                            error
                        );
                    }
                    FetchFailurePolicy::Abort => return Err(error),
                },
            }
        }

        Ok(outcome)
    }
}

/// Run the pipeline, then close the fetcher whether or not the run succeeded.
pub async fn run_with_fetcher(
    pipeline: &Pipeline<'_>,
    fetcher: &mut dyn Fetcher,
    keywords: &[String],
) -> Result<RunOutcome> {
    let result = pipeline.run(&*fetcher, keywords).await;
    if let Err(e) = fetcher.close().await {
        ::log::warn!("Failed to release fetcher session: {}", e);
    }
    result
}

/// Run the scraper with the configured boards, keywords and fetch strategy.
pub async fn run_scrape(config: &Config) -> Result<RunOutcome> {
    let start_time = Utc::now();
    log::header("Job scraper starting");

    let registry = SourceRegistry::from_configs(&config.boards)?;
    log::sub_item(&format!(
        "{} keywords × {} boards",
        config.keywords.len(),
        registry.len()
    ));

    let mut fetcher = create_fetcher(&config.crawler).await?;
    let pipeline = Pipeline::new(&registry, config.crawler.on_fetch_error);
    let outcome = run_with_fetcher(&pipeline, &mut *fetcher, &config.keywords).await?;

    let elapsed = Utc::now() - start_time;
    log::summary(
        "Scrape",
        &[
            ("Tasks", outcome.task_total.to_string()),
            ("Failed", outcome.task_failures.to_string()),
            ("Records", outcome.records.len().to_string()),
            ("Elapsed", format!("{}s", elapsed.num_seconds())),
        ],
    );

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::error::AppError;
    use crate::models::{BoardConfig, BoardLayout, FieldSelectors, UNKNOWN};
    use crate::services::RawDocument;

    /// In-memory fetcher: serves canned pages, fails on unknown URLs.
    #[derive(Default)]
    struct FakeFetcher {
        pages: HashMap<String, String>,
        requested: Mutex<Vec<String>>,
        closed: usize,
    }

    impl FakeFetcher {
        fn page(mut self, url: &str, html: &str) -> Self {
            self.pages.insert(url.to_string(), html.to_string());
            self
        }
    }

    #[async_trait]
    impl Fetcher for FakeFetcher {
        async fn fetch(&self, url: &str) -> Result<RawDocument> {
            self.requested.lock().unwrap().push(url.to_string());
            self.pages
                .get(url)
                .map(|html| RawDocument::new(url, html.as_str()))
                .ok_or_else(|| AppError::fetch(url, "connection refused"))
        }

        async fn close(&mut self) -> Result<()> {
            self.closed += 1;
            Ok(())
        }
    }

    fn card_board(id: &str) -> BoardConfig {
        BoardConfig {
            id: id.to_string(),
            name: id.to_string(),
            url: format!("https://{id}.test/jobs?q={{keyword}}"),
            layout: BoardLayout::CardList {
                card: "div.card".to_string(),
            },
            fields: FieldSelectors::new("h2", "span.org", "div.loc"),
            location_default: UNKNOWN.to_string(),
        }
    }

    fn cards(titles: &[&str]) -> String {
        titles
            .iter()
            .map(|t| format!("<div class='card'><h2>{t}</h2></div>"))
            .collect()
    }

    fn keywords(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_editor_scenario() {
        let registry = SourceRegistry::from_configs(&[card_board("cards")]).unwrap();
        let fetcher = FakeFetcher::default().page(
            "https://cards.test/jobs?q=Editor",
            r#"<div class="card"><h2>Copy Editor</h2><span class="org">Tailspin</span>
                 <div class="loc">Denver, CO</div></div>
               <div class="card"><h2>Video Editor</h2><span class="org">Litware</span></div>"#,
        );

        let pipeline = Pipeline::new(&registry, FetchFailurePolicy::Skip);
        let outcome = pipeline.run(&fetcher, &keywords(&["Editor"])).await.unwrap();

        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.records[0].location, "Denver, CO");
        assert_eq!(outcome.records[1].location, UNKNOWN);
        for record in &outcome.records {
            assert_eq!(record.sector, "Editor");
            assert_eq!(record.job_type, UNKNOWN);
            assert_eq!(record.applied, "No");
        }
    }

    #[tokio::test]
    async fn test_records_follow_task_order() {
        let registry =
            SourceRegistry::from_configs(&[card_board("b1"), card_board("b2")]).unwrap();
        let fetcher = FakeFetcher::default()
            .page("https://b1.test/jobs?q=k1", &cards(&["t1-a", "t1-b", "t1-c"]))
            .page("https://b2.test/jobs?q=k1", &cards(&["t2-a"]))
            .page("https://b1.test/jobs?q=k2", &cards(&["t3-a", "t3-b"]))
            .page("https://b2.test/jobs?q=k2", "");

        let pipeline = Pipeline::new(&registry, FetchFailurePolicy::Skip);
        let outcome = pipeline.run(&fetcher, &keywords(&["k1", "k2"])).await.unwrap();

        let titles: Vec<_> = outcome.records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["t1-a", "t1-b", "t1-c", "t2-a", "t3-a", "t3-b"]);
        assert_eq!(outcome.task_total, 4);

        let requested = fetcher.requested.lock().unwrap().clone();
        assert_eq!(
            requested,
            vec![
                "https://b1.test/jobs?q=k1",
                "https://b2.test/jobs?q=k1",
                "https://b1.test/jobs?q=k2",
                "https://b2.test/jobs?q=k2",
            ]
        );
    }

    #[tokio::test]
    async fn test_fetch_failure_skips_task() {
        let registry =
            SourceRegistry::from_configs(&[card_board("up"), card_board("down")]).unwrap();
        let fetcher = FakeFetcher::default()
            .page("https://up.test/jobs?q=Producer", &cards(&["a", "b"]))
            .page("https://up.test/jobs?q=Editor", &cards(&["c"]));

        let pipeline = Pipeline::new(&registry, FetchFailurePolicy::Skip);
        let outcome = pipeline
            .run(&fetcher, &keywords(&["Producer", "Editor"]))
            .await
            .unwrap();

        assert_eq!(outcome.records.len(), 3);
        assert_eq!(outcome.task_total, 4);
        assert_eq!(outcome.task_failures, 2);
        assert!(outcome.records.iter().all(|r| r.source_board == "up"));
    }

    #[tokio::test]
    async fn test_fetch_failure_aborts_under_abort_policy() {
        let registry =
            SourceRegistry::from_configs(&[card_board("down"), card_board("up")]).unwrap();
        let fetcher = FakeFetcher::default().page("https://up.test/jobs?q=Editor", &cards(&["a"]));

        let pipeline = Pipeline::new(&registry, FetchFailurePolicy::Abort);
        let result = pipeline.run(&fetcher, &keywords(&["Editor"])).await;

        assert!(matches!(result, Err(AppError::Fetch { .. })));
        assert_eq!(fetcher.requested.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_fetcher_closed_once_on_success_and_failure() {
        let registry = SourceRegistry::from_configs(&[card_board("down")]).unwrap();

        let mut fetcher = FakeFetcher::default();
        let pipeline = Pipeline::new(&registry, FetchFailurePolicy::Skip);
        run_with_fetcher(&pipeline, &mut fetcher, &keywords(&["Editor"]))
            .await
            .unwrap();
        assert_eq!(fetcher.closed, 1);

        let mut fetcher = FakeFetcher::default();
        let pipeline = Pipeline::new(&registry, FetchFailurePolicy::Abort);
        let result = run_with_fetcher(&pipeline, &mut fetcher, &keywords(&["Editor"])).await;
        assert!(result.is_err());
        assert_eq!(fetcher.closed, 1);
    }

    #[tokio::test]
    async fn test_run_scrape_rejects_duplicate_board_ids() {
        let mut second = card_board("dup");
        second.url = "https://other.test/jobs?q={keyword}".to_string();

        let mut config = Config::default();
        config.keywords = keywords(&["Editor"]);
        config.boards = vec![card_board("dup"), second];

        assert!(matches!(
            run_scrape(&config).await,
            Err(AppError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_every_board_fetched_with_its_own_template() {
        let mut second = card_board("b2");
        second.url = "https://mirror.test/search/{keyword}".to_string();
        let registry = SourceRegistry::from_configs(&[card_board("b1"), second]).unwrap();
        let fetcher = FakeFetcher::default();

        let pipeline = Pipeline::new(&registry, FetchFailurePolicy::Skip);
        let outcome = pipeline.run(&fetcher, &keywords(&["Editor"])).await.unwrap();

        assert_eq!(outcome.task_total, 2);
        assert_eq!(outcome.task_failures, 2);
        assert_eq!(
            fetcher.requested.lock().unwrap().as_slice(),
            [
                "https://b1.test/jobs?q=Editor".to_string(),
                "https://mirror.test/search/Editor".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_keyword_is_escaped_in_url() {
        let registry = SourceRegistry::from_configs(&[card_board("b")]).unwrap();
        let fetcher = FakeFetcher::default();

        let pipeline = Pipeline::new(&registry, FetchFailurePolicy::Skip);
        pipeline
            .run(&fetcher, &keywords(&["Video Producer"]))
            .await
            .unwrap();

        assert_eq!(
            fetcher.requested.lock().unwrap().as_slice(),
            ["https://b.test/jobs?q=Video+Producer".to_string()]
        );
    }
}
