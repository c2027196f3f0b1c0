// src/pipeline/scrape.rs

//! Scrape job orchestration.
//!
//! Drives one end-to-end run: create the job record, discover programs,
//! process each program sequentially with pacing, and finalize the job.
//! A single program's failure is recorded in the job's error log and the
//! batch continues; only discovery failure aborts the run.

use crate::error::Result;
use crate::models::{JobStatus, ProgramRef, SourceProfile};
use crate::services::{ProgramDiscoverer, ReconcileOutcome, Reconciler, parser};
use crate::store::ScheduleStore;
use crate::utils::{PageFetcher, Pacer};

/// Final tally of one scrape run.
#[derive(Debug)]
pub struct ScrapeSummary {
    /// Id of the job row tracking this run
    pub job_id: i64,

    /// Programs found on the listing pages
    pub programs_discovered: usize,

    /// Lectures written across all programs
    pub records_processed: u64,

    /// Entries appended to the job's error log
    pub error_count: usize,
}

/// Run the scrape pipeline for one source.
///
/// Returns `Err` only for unrecoverable top-level failures (discovery,
/// job-record writes); in that case the job row is finalized as `failed`
/// before the error propagates.
pub async fn run_scraper(
    source: &SourceProfile,
    fetcher: &dyn PageFetcher,
    store: &dyn ScheduleStore,
    pacer: &dyn Pacer,
) -> Result<ScrapeSummary> {
    log::info!("Starting scrape for source {}", source.id);
    let job_id = store.create_job(&source.id).await?;

    let discoverer = ProgramDiscoverer::new(fetcher, source)?;
    let programs = match discoverer.discover().await {
        Ok(programs) => programs,
        Err(e) => {
            log::error!("Discovery failed: {e}");
            store
                .append_job_error(job_id, &format!("discovery failed: {e}"))
                .await?;
            store.finalize_job(job_id, JobStatus::Failed).await?;
            return Err(e);
        }
    };

    log::info!("Discovered {} programs", programs.len());

    let reconciler = Reconciler::new(store, source);
    let mut records_processed: u64 = 0;
    let mut error_count = 0;

    for (index, program) in programs.iter().enumerate() {
        log::info!("[{}/{}] {}", index + 1, programs.len(), program.name);

        match process_program(fetcher, &reconciler, program).await {
            Ok(outcome) => {
                store.add_job_records(job_id, outcome.lectures_written).await?;
                records_processed += u64::from(outcome.lectures_written);
                for failure in &outcome.failures {
                    log::warn!("Program {}: lecture skipped: {failure}", program.id);
                    store
                        .append_job_error(job_id, &format!("program {}: {failure}", program.id))
                        .await?;
                    error_count += 1;
                }
            }
            Err(e) => {
                log::warn!("Program {} failed: {e}", program.id);
                store
                    .append_job_error(job_id, &format!("program {}: {e}", program.id))
                    .await?;
                error_count += 1;
            }
        }

        if index + 1 < programs.len() {
            pacer.pause().await;
        }
    }

    store.finalize_job(job_id, JobStatus::Completed).await?;
    log::info!(
        "Scrape complete: {} programs, {} lectures written, {} errors",
        programs.len(),
        records_processed,
        error_count
    );

    Ok(ScrapeSummary {
        job_id,
        programs_discovered: programs.len(),
        records_processed,
        error_count,
    })
}

/// Fetch, parse and reconcile one program as a unit.
async fn process_program(
    fetcher: &dyn PageFetcher,
    reconciler: &Reconciler<'_>,
    program: &ProgramRef,
) -> Result<ReconcileOutcome> {
    let markup = fetcher.fetch(&program.detail_url).await?;
    let parsed = parser::parse_program(&markup, program);
    reconciler.reconcile(&parsed, program).await
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;

    use super::*;
    use crate::error::AppError;
    use crate::models::Config;
    use crate::store::MemoryStore;
    use crate::utils::NoopPacer;

    struct ScriptedFetcher {
        pages: HashMap<String, String>,
    }

    impl ScriptedFetcher {
        fn new(pages: &[(&str, String)]) -> Self {
            Self {
                pages: pages
                    .iter()
                    .map(|(url, body)| (url.to_string(), body.clone()))
                    .collect(),
            }
        }
    }

    #[async_trait]
    impl PageFetcher for ScriptedFetcher {
        async fn fetch(&self, url: &str) -> Result<String> {
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| AppError::network(url, "connection refused"))
        }
    }

    fn listing(anchors: &str) -> String {
        format!("<html><body>{anchors}</body></html>")
    }

    fn detail(rows: &str) -> String {
        format!("<html><body><table>{rows}</table></body></html>")
    }

    fn lecture_row(name: &str, day: &str, time: &str) -> String {
        format!("<tr><td>{name}</td><td>{day}</td><td>{time}</td><td>C1</td><td>Dr. X</td></tr>")
    }

    fn single_page_source() -> crate::models::SourceProfile {
        let mut source = Config::default().sources[0].clone();
        source.listing_pages = 1;
        source
    }

    #[tokio::test]
    async fn failed_program_is_recorded_and_batch_continues() {
        let source = single_page_source();
        // Three programs; program 2's detail page is unreachable.
        let fetcher = ScriptedFetcher::new(&[
            (
                "https://rozvrhy.ff.cuni.cz/",
                listing(
                    r#"<a href="/ft/detail/1">A</a>
                       <a href="/ft/detail/2">B</a>
                       <a href="/ft/detail/3">C</a>"#,
                ),
            ),
            (
                "https://rozvrhy.ff.cuni.cz/ft/detail/1",
                detail(&(lecture_row("Přednáška I", "Po", "9:00 - 10:30")
                    + &lecture_row("Seminář I", "Út", "11:00 - 12:30"))),
            ),
            (
                "https://rozvrhy.ff.cuni.cz/ft/detail/3",
                detail(&lecture_row("Přednáška II", "St", "14:00 - 15:30")),
            ),
        ]);
        let store = MemoryStore::new();

        let summary = run_scraper(&source, &fetcher, &store, &NoopPacer)
            .await
            .unwrap();

        assert_eq!(summary.programs_discovered, 3);
        assert_eq!(summary.records_processed, 3);
        assert_eq!(summary.error_count, 1);

        let job = store.load_job(summary.job_id).await.unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.records_processed, 3);
        assert_eq!(job.errors.len(), 1);
        assert!(job.errors[0].message.contains("program 2"));
        assert!(job.completed_at.is_some());

        // Programs 1 and 3 each produced a course; program 2 none.
        assert_eq!(store.courses().len(), 2);
        assert_eq!(store.lectures().len(), 3);
    }

    #[tokio::test]
    async fn discovery_failure_fails_the_job() {
        let source = single_page_source();
        let fetcher = ScriptedFetcher::new(&[]); // listing page unreachable
        let store = MemoryStore::new();

        let result = run_scraper(&source, &fetcher, &store, &NoopPacer).await;
        assert!(matches!(result, Err(AppError::Discovery(_))));

        let job = store.load_job(1).await.unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.records_processed, 0);
        assert!(!job.errors.is_empty());
        assert!(job.completed_at.is_some());
    }

    #[tokio::test]
    async fn empty_listing_completes_with_zero_records() {
        let source = single_page_source();
        let fetcher =
            ScriptedFetcher::new(&[("https://rozvrhy.ff.cuni.cz/", listing("<p>nic</p>"))]);
        let store = MemoryStore::new();

        let summary = run_scraper(&source, &fetcher, &store, &NoopPacer)
            .await
            .unwrap();
        assert_eq!(summary.programs_discovered, 0);
        assert_eq!(summary.records_processed, 0);
        assert_eq!(summary.error_count, 0);

        let job = store.load_job(summary.job_id).await.unwrap();
        assert_eq!(job.status, JobStatus::Completed);
    }

    #[tokio::test]
    async fn unparseable_rows_reduce_counts_without_errors() {
        let source = single_page_source();
        let fetcher = ScriptedFetcher::new(&[
            (
                "https://rozvrhy.ff.cuni.cz/",
                listing(r#"<a href="/ft/detail/7">G</a>"#),
            ),
            (
                "https://rozvrhy.ff.cuni.cz/ft/detail/7",
                detail(
                    &(lecture_row("Platný", "Po", "9:00 - 10:30")
                        + &lecture_row("Neplatný den", "Sobota", "9:00 - 10:30")
                        + &lecture_row("Neplatný čas", "Út", "dopoledne")),
                ),
            ),
        ]);
        let store = MemoryStore::new();

        let summary = run_scraper(&source, &fetcher, &store, &NoopPacer)
            .await
            .unwrap();
        // Parse skips are not errors.
        assert_eq!(summary.records_processed, 1);
        assert_eq!(summary.error_count, 0);
    }
}
