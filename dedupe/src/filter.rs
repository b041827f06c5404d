use std::collections::HashSet;

use common::record::Record;
use strum_macros::{Display, EnumIter, IntoStaticStr};
use tracing::{debug, trace};

use crate::similarity::similarity_ratio;

/// How the filter treats an empty `id` or `title`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum EmptyKeyPolicy {
    /// Empty strings are keys like any other: the first record missing an id
    /// wins and every later record missing an id is a duplicate of it.
    #[default]
    Deduplicate,
    /// Empty keys are unknown, they are neither looked up nor remembered.
    Exempt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr, EnumIter)]
pub enum RejectReason {
    #[strum(serialize = "DuplicateID")]
    DuplicateId,
    #[strum(serialize = "DuplicateTitle")]
    DuplicateTitle,
    /// Only produced by callers applying [`DuplicateFilter::find_similar_title`].
    #[strum(serialize = "SimilarTitle")]
    SimilarTitle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Accepted,
    Rejected(RejectReason),
}

impl Admission {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Admission::Accepted)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimilarTitle {
    pub title: String,
    pub ratio: f64,
}

/// Remembers the ids and titles admitted during one crawl run.
///
/// Admitting takes `&mut self`; producers running in parallel go through
/// the serialized handles in [`crate::shared`].
#[derive(Debug, Default)]
pub struct DuplicateFilter {
    seen_ids: HashSet<String>,
    seen_titles: HashSet<String>,
    empty_keys: EmptyKeyPolicy,
}

impl DuplicateFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_empty_key_policy(mut self, policy: EmptyKeyPolicy) -> Self {
        self.empty_keys = policy;
        self
    }

    pub fn empty_key_policy(&self) -> EmptyKeyPolicy {
        self.empty_keys
    }

    /// Accepts the record if neither its id nor its title was admitted before.
    ///
    /// The id is checked first, so a record matching on both keys is reported
    /// as [`RejectReason::DuplicateId`]. Rejections leave the filter untouched.
    pub fn admit(&mut self, record: &Record) -> Admission {
        if let Some(reason) = self.find_exact_duplicate(record) {
            return Admission::Rejected(reason);
        }

        self.remember(record);

        Admission::Accepted
    }

    /// Same as [`DuplicateFilter::admit`], with one extra gate between the
    /// title check and the insert: a title scoring `threshold` or more against
    /// an admitted title is rejected as [`RejectReason::SimilarTitle`].
    pub fn admit_unless_similar(&mut self, record: &Record, threshold: f64) -> Admission {
        if let Some(reason) = self.find_exact_duplicate(record) {
            return Admission::Rejected(reason);
        }

        if self.is_tracked(&record.title)
            && let Some(similar) = self.find_similar_title(&record.title, threshold)
        {
            debug!(
                "Title {:?} is {:.3} similar to {:?}",
                record.title, similar.ratio, similar.title
            );
            return Admission::Rejected(RejectReason::SimilarTitle);
        }

        self.remember(record);

        Admission::Accepted
    }

    fn find_exact_duplicate(&self, record: &Record) -> Option<RejectReason> {
        if self.is_tracked(&record.id) && self.seen_ids.contains(&record.id) {
            debug!("Duplicate patent number: {:?}", record.id);
            return Some(RejectReason::DuplicateId);
        }

        if self.is_tracked(&record.title) && self.seen_titles.contains(&record.title) {
            debug!("Duplicate title: {:?}", record.title);
            return Some(RejectReason::DuplicateTitle);
        }

        None
    }

    fn remember(&mut self, record: &Record) {
        if self.is_tracked(&record.id) {
            self.seen_ids.insert(record.id.clone());
        }

        if self.is_tracked(&record.title) {
            self.seen_titles.insert(record.title.clone());
        }

        trace!("Admitted {:?} / {:?}", record.id, record.title);
    }

    /// Best admitted title whose similarity to `title` reaches `threshold`.
    ///
    /// Advisory only, [`DuplicateFilter::admit`] never consults it. Equal
    /// scores resolve to the lexicographically smaller title so the answer
    /// does not depend on set iteration order. A NaN threshold matches nothing.
    pub fn find_similar_title(&self, title: &str, threshold: f64) -> Option<SimilarTitle> {
        if threshold.is_nan() {
            return None;
        }

        let mut best: Option<SimilarTitle> = None;

        for seen in &self.seen_titles {
            let ratio = similarity_ratio(title, seen);

            if ratio < threshold {
                continue;
            }

            let is_better = match &best {
                None => true,
                Some(current) => {
                    ratio > current.ratio || (ratio == current.ratio && *seen < current.title)
                }
            };

            if is_better {
                best = Some(SimilarTitle {
                    title: seen.clone(),
                    ratio,
                });
            }
        }

        best
    }

    pub fn has_seen_id(&self, id: &str) -> bool {
        self.seen_ids.contains(id)
    }

    pub fn has_seen_title(&self, title: &str) -> bool {
        self.seen_titles.contains(title)
    }

    pub fn seen_ids_len(&self) -> usize {
        self.seen_ids.len()
    }

    pub fn seen_titles_len(&self) -> usize {
        self.seen_titles.len()
    }

    fn is_tracked(&self, key: &str) -> bool {
        !(key.is_empty() && self.empty_keys == EmptyKeyPolicy::Exempt)
    }
}
