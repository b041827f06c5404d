use common::record::Record;
use dedupe::{Admission, DuplicateFilter, FilterStats, spawn_filter_worker};
use metrics::{Metrics, put_metric};
use tokio::{
    io::{AsyncRead, AsyncWrite, AsyncWriteExt},
    sync::mpsc,
};
use tracing::info;

use crate::{
    errors::DriverError,
    streams::{read_records, write_record},
};

const CHANNEL_CAPACITY: usize = 1024;

/// Runs `input` through `filter` and writes the accepted records to `output`.
///
/// The reader and the filter each get their own task; admission order is
/// input order. Unreadable lines end up in the returned stats as skipped.
pub async fn dedupe_stream<R, W>(
    input: R,
    output: &mut W,
    filter: DuplicateFilter,
    similarity_threshold: Option<f64>,
    emit_metrics: bool,
) -> Result<FilterStats, DriverError>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin,
{
    let (record_tx, record_rx) = mpsc::channel::<Record>(CHANNEL_CAPACITY);
    let (verdict_tx, mut verdict_rx) = mpsc::channel(CHANNEL_CAPACITY);

    let worker = spawn_filter_worker(filter, similarity_threshold, record_rx, verdict_tx);
    let reader = tokio::spawn(read_records(input, record_tx));

    while let Some(verdict) = verdict_rx.recv().await {
        match verdict.admission {
            Admission::Accepted => {
                write_record(output, &verdict.record).await?;

                if emit_metrics {
                    put_metric!(Metrics::RecordAccepted, 1);
                }
            }
            Admission::Rejected(reason) => {
                info!(
                    "Dropping {:?} ({:?}): {reason}",
                    verdict.record.id, verdict.record.title
                );

                if emit_metrics {
                    let reason: &'static str = reason.into();
                    put_metric!(Metrics::RecordRejected, 1, "reason" => reason);
                }
            }
        }
    }

    output.flush().await?;

    let unreadable = reader.await??;
    let mut stats = worker.await?;
    stats.record_skipped(unreadable);

    if emit_metrics && unreadable > 0 {
        put_metric!(Metrics::RecordUnreadable, unreadable);
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use dedupe::{EmptyKeyPolicy, RejectReason};
    use serde_json::{Value, json};

    use super::*;

    const CRAWL: &[u8] = b"{\"patent_num\": 1, \"patent_name\": \"A\", \"abstract\": \"qubit\"}\n\
        {\"patent_num\": 1, \"patent_name\": \"B\"}\n\
        not json\n\
        \n\
        {\"patent_num\": \"2\", \"patent_name\": \"A\"}\n\
        {\"patent_num\": \"2\", \"patent_name\": \"Quantum dot laser\"}\n\
        {\"patent_num\": \"3\", \"patent_name\": \"Quantum dot lasers\"}\n";

    fn written(output: Vec<u8>) -> Vec<Value> {
        output
            .split(|byte| *byte == b'\n')
            .filter(|line| !line.is_empty())
            .map(|line| serde_json::from_slice(line).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn forwards_accepted_records_in_order() {
        let mut output: Vec<u8> = Vec::new();

        let stats = dedupe_stream(CRAWL, &mut output, DuplicateFilter::new(), None, false)
            .await
            .unwrap();

        assert_eq!(
            written(output),
            vec![
                json!({"patent_num": 1, "patent_name": "A", "abstract": "qubit"}),
                json!({"patent_num": "2", "patent_name": "Quantum dot laser"}),
                json!({"patent_num": "3", "patent_name": "Quantum dot lasers"}),
            ]
        );
        assert_eq!(stats.accepted(), 3);
        assert_eq!(stats.rejected(RejectReason::DuplicateId), 1);
        assert_eq!(stats.rejected(RejectReason::DuplicateTitle), 1);
        assert_eq!(stats.skipped(), 1);
    }

    #[tokio::test]
    async fn threshold_drops_similar_titles() {
        let mut output: Vec<u8> = Vec::new();

        let stats = dedupe_stream(CRAWL, &mut output, DuplicateFilter::new(), Some(0.9), false)
            .await
            .unwrap();

        assert_eq!(written(output).len(), 2);
        assert_eq!(stats.rejected(RejectReason::SimilarTitle), 1);
    }

    #[tokio::test]
    async fn exempt_policy_reaches_the_worker() {
        let input: &[u8] = b"{\"patent_name\": \"A\"}\n{\"patent_name\": \"B\"}\n";
        let filter = DuplicateFilter::new().with_empty_key_policy(EmptyKeyPolicy::Exempt);
        let mut output: Vec<u8> = Vec::new();

        let stats = dedupe_stream(input, &mut output, filter, None, false)
            .await
            .unwrap();

        assert_eq!(stats.accepted(), 2);
        assert_eq!(
            written(output),
            vec![json!({"patent_name": "A"}), json!({"patent_name": "B"})]
        );
    }
}
