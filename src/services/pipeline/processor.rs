use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep, timeout};

use crate::config::AppConfig;
use crate::services::ai::{searchable_text, AiServices, EnrichedRecord, Record};

use super::CancelFlag;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub batch_size: usize,
    pub item_delay: Duration,
    pub batch_delay: Duration,
    /// Outer bound on one record's processing; zero disables it.
    pub record_deadline: Duration,
}

impl From<&AppConfig> for PipelineConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            batch_size: config.batch_size,
            item_delay: Duration::from_millis(config.item_delay_ms),
            batch_delay: Duration::from_millis(config.batch_delay_ms),
            record_deadline: Duration::from_secs(config.record_deadline_secs),
        }
    }
}

pub struct BatchProcessor {
    ai: Arc<AiServices>,
    config: PipelineConfig,
}

impl BatchProcessor {
    pub fn new(ai: Arc<AiServices>, mut config: PipelineConfig) -> Self {
        config.batch_size = config.batch_size.max(1);
        Self { ai, config }
    }

    /// Runs every record through enrich -> searchable text -> embed.
    /// Returns exactly one enriched record per input, in input order;
    /// a cancelled run returns the prefix produced so far.
    pub async fn process(&self, records: &[Record], cancel: &CancelFlag) -> Vec<EnrichedRecord> {
        let total = records.len();
        tracing::info!(total, "starting enrichment run");

        let mut enriched = Vec::with_capacity(total);

        'run: for batch in records.chunks(self.config.batch_size) {
            for record in batch {
                if cancel.is_cancelled() {
                    tracing::info!(processed = enriched.len(), "enrichment run cancelled");
                    break 'run;
                }

                enriched.push(self.process_record(record).await);

                if enriched.len() < total && !self.config.item_delay.is_zero() {
                    sleep(self.config.item_delay).await;
                }
            }

            tracing::info!(processed = enriched.len(), total, "batch complete");

            if enriched.len() < total && !self.config.batch_delay.is_zero() {
                sleep(self.config.batch_delay).await;
            }
        }

        enriched
    }

    /// The services absorb capability failures themselves; the deadline is
    /// the last-resort guard so one stuck record cannot stall the run.
    async fn process_record(&self, record: &Record) -> EnrichedRecord {
        if self.config.record_deadline.is_zero() {
            return self.enrich_and_embed(record).await;
        }

        match timeout(self.config.record_deadline, self.enrich_and_embed(record)).await {
            Ok(enriched) => enriched,
            Err(_) => {
                tracing::error!(
                    company = record.display_name(),
                    "record processing deadline exceeded"
                );
                EnrichedRecord::degraded(record.clone(), self.ai.embedding.dimension())
            }
        }
    }

    async fn enrich_and_embed(&self, record: &Record) -> EnrichedRecord {
        let enrichment = self.ai.enrichment.enrich(record).await;
        let text = searchable_text(record, &enrichment);
        let embedding = self.ai.embedding.embed(&text).await;

        EnrichedRecord {
            record: record.clone(),
            enrichment: Some(enrichment),
            searchable_text: text,
            embedding,
        }
    }
}
