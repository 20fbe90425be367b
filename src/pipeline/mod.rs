pub mod aggregate;
pub mod compose;
pub mod normalize;
pub mod window;

use crate::config::Config;
use crate::error::Result;
use crate::feed::FeedPort;
use crate::pipeline::compose::Composer;
use crate::pipeline::window::ReportingWindow;
use crate::publish::PublisherPort;
use crate::types::{AggregateStats, ComposedArtifact, PublishReceipt};
use chrono::NaiveDate;
use tracing::{debug, info, instrument};

/// Runs the pipeline stages up to composition: fetch, normalize, window,
/// aggregate, compose. Pure function of the reference date, the config and
/// the feed's response; every intermediate is call-local and each stage
/// fails fast.
#[instrument(skip(config, feed))]
pub async fn compose_report(
    reference_date: NaiveDate,
    config: &Config,
    feed: &dyn FeedPort,
) -> Result<(ComposedArtifact, AggregateStats, ReportingWindow)> {
    info!(county = %config.feed.county, year = config.feed.start_year, "fetching crash records");
    let (geo, flat) = feed.fetch().await?;
    info!(raw = geo.len(), "fetched raw records");

    let records = normalize::normalize(&geo, &flat, &config.report.municipality)?;
    info!(
        kept = records.len(),
        municipality = %config.report.municipality,
        "normalized records"
    );

    let window = ReportingWindow::preceding(reference_date, config.report.week_start.weekday());
    let stats = AggregateStats::collect(&records, &window, reference_date);
    debug!(?stats, %window, "aggregated statistics");

    let composer = Composer::new(&config.render, config.report.text_limit);
    let artifact = composer.compose(&stats, &window)?;
    info!(text_len = artifact.text.chars().count(), "composed artifact");

    Ok((artifact, stats, window))
}

/// Full pipeline run: compose the weekly report and hand it to the
/// publisher boundary. No partial recovery anywhere; a failed stage
/// surfaces to the caller and nothing is published.
pub async fn run(
    reference_date: NaiveDate,
    config: &Config,
    feed: &dyn FeedPort,
    publisher: &dyn PublisherPort,
) -> Result<PublishReceipt> {
    let (artifact, stats, window) = compose_report(reference_date, config, feed).await?;
    let receipt = publisher.publish(&artifact).await?;
    info!(
        id = %receipt.id,
        weekly_crashes = stats.weekly_crashes,
        %window,
        "published weekly report"
    );
    Ok(receipt)
}
