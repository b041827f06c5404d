use std::sync::Arc;

use common::record::Record;
use tokio::{
    sync::{Mutex, mpsc},
    task::JoinHandle,
};
use tracing::{debug, info, trace, warn};

use crate::{
    filter::{Admission, DuplicateFilter},
    stats::FilterStats,
};

/// Cloneable handle over one filter. Every admit holds the lock for the whole
/// check-then-insert so two producers cannot both admit the same key.
#[derive(Clone, Default)]
pub struct SharedDuplicateFilter {
    inner: Arc<Mutex<DuplicateFilter>>,
}

impl SharedDuplicateFilter {
    pub fn new(filter: DuplicateFilter) -> Self {
        Self {
            inner: Arc::new(Mutex::new(filter)),
        }
    }

    pub async fn admit(&self, record: &Record) -> Admission {
        self.inner.lock().await.admit(record)
    }

    pub async fn admit_unless_similar(&self, record: &Record, threshold: f64) -> Admission {
        self.inner.lock().await.admit_unless_similar(record, threshold)
    }

    pub async fn seen_ids_len(&self) -> usize {
        self.inner.lock().await.seen_ids_len()
    }
}

/// Outcome for one record leaving the worker, in the order it was received.
#[derive(Debug)]
pub struct Verdict {
    pub record: Record,
    pub admission: Admission,
}

/// Runs `filter` on a dedicated task. Records are judged strictly in receive
/// order and every verdict is forwarded to `verdicts`.
///
/// The task ends once `records` is closed and drained, returning the tally.
/// If the `verdicts` receiver is dropped the worker keeps filtering so the
/// tally stays complete, it only stops forwarding.
pub fn spawn_filter_worker(
    mut filter: DuplicateFilter,
    similarity_threshold: Option<f64>,
    mut records: mpsc::Receiver<Record>,
    verdicts: mpsc::Sender<Verdict>,
) -> JoinHandle<FilterStats> {
    tokio::spawn(async move {
        let mut stats = FilterStats::new();
        let mut forwarding = true;

        trace!("Starting filter worker (similarity threshold {similarity_threshold:?})");

        while let Some(record) = records.recv().await {
            let admission = match similarity_threshold {
                Some(threshold) => filter.admit_unless_similar(&record, threshold),
                None => filter.admit(&record),
            };

            stats.record(admission);

            if !forwarding {
                continue;
            }

            if verdicts.send(Verdict { record, admission }).await.is_err() {
                warn!("Verdict receiver closed, results are no longer forwarded");
                forwarding = false;
            }
        }

        debug!(
            "Filter worker drained: {} ids, {} titles remembered",
            filter.seen_ids_len(),
            filter.seen_titles_len()
        );
        info!("Filter worker finished: {stats}");

        stats
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::RejectReason;

    #[tokio::test]
    async fn concurrent_admits_accept_each_key_once() {
        let shared = SharedDuplicateFilter::new(DuplicateFilter::new());
        let mut handles = Vec::new();

        for task in 0..16 {
            let shared = shared.clone();

            handles.push(tokio::spawn(async move {
                let mut accepted = 0;

                for id in 0..50 {
                    let record = Record::new(id.to_string(), format!("title {id} from {task}"));

                    if shared.admit(&record).await.is_accepted() {
                        accepted += 1;
                    }
                }

                accepted
            }));
        }

        let mut total_accepted = 0;
        for handle in handles {
            total_accepted += handle.await.unwrap();
        }

        assert_eq!(total_accepted, 50);
        assert_eq!(shared.seen_ids_len().await, 50);
    }

    #[tokio::test]
    async fn worker_preserves_order_and_counts() {
        let (record_tx, record_rx) = mpsc::channel(4);
        let (verdict_tx, mut verdict_rx) = mpsc::channel(4);

        let worker = spawn_filter_worker(DuplicateFilter::new(), None, record_rx, verdict_tx);

        tokio::spawn(async move {
            for (id, title) in [("1", "A"), ("1", "B"), ("2", "A"), ("2", "C")] {
                record_tx.send(Record::new(id, title)).await.unwrap();
            }
        });

        let mut admissions = Vec::new();
        while let Some(verdict) = verdict_rx.recv().await {
            admissions.push(verdict.admission);
        }

        assert_eq!(
            admissions,
            vec![
                Admission::Accepted,
                Admission::Rejected(RejectReason::DuplicateId),
                Admission::Rejected(RejectReason::DuplicateTitle),
                Admission::Accepted,
            ]
        );

        let stats = worker.await.unwrap();
        assert_eq!(stats.accepted(), 2);
        assert_eq!(stats.total_rejected(), 2);
    }

    #[tokio::test]
    async fn worker_applies_similarity_threshold() {
        let (record_tx, record_rx) = mpsc::channel(4);
        let (verdict_tx, mut verdict_rx) = mpsc::channel(4);

        let worker = spawn_filter_worker(DuplicateFilter::new(), Some(0.9), record_rx, verdict_tx);

        record_tx
            .send(Record::new("1", "Entangled photon source"))
            .await
            .unwrap();
        record_tx
            .send(Record::new("2", "Entangled photon sources"))
            .await
            .unwrap();
        drop(record_tx);

        assert!(verdict_rx.recv().await.unwrap().admission.is_accepted());
        assert_eq!(
            verdict_rx.recv().await.unwrap().admission,
            Admission::Rejected(RejectReason::SimilarTitle)
        );

        let stats = worker.await.unwrap();
        assert_eq!(stats.rejected(RejectReason::SimilarTitle), 1);
    }

    #[tokio::test]
    async fn worker_keeps_counting_without_receiver() {
        let (record_tx, record_rx) = mpsc::channel(8);
        let (verdict_tx, verdict_rx) = mpsc::channel(1);
        drop(verdict_rx);

        let worker = spawn_filter_worker(DuplicateFilter::new(), None, record_rx, verdict_tx);

        for id in ["1", "1", "2"] {
            record_tx.send(Record::new(id, id)).await.unwrap();
        }
        drop(record_tx);

        let stats = worker.await.unwrap();
        assert_eq!(stats.accepted(), 2);
        assert_eq!(stats.rejected(RejectReason::DuplicateId), 1);
    }
}
