//! Longest-substring trigger matching.
//!
//! A record is a candidate when its trigger occurs anywhere in the inbound text
//! (plain, case-sensitive containment; no tokenizing). The longest candidate
//! wins, length counted in UTF-8 bytes. Equal lengths are decided by the
//! lexicographically smallest trigger, so the result never depends on the
//! order a backend scans in.
//!
//! Every record is checked against the text, which is fine for the small
//! trigger sets a chat bot keeps.

use std::cmp::Ordering;

use crate::types::TriggerRecord;

/// Whether `trigger` activates on `text`.
pub fn is_candidate(trigger: &str, text: &str) -> bool {
    !trigger.is_empty() && text.contains(trigger)
}

/// Find the record whose trigger is the longest substring of `text`.
pub fn find_longest_match<I>(records: I, text: &str) -> Option<TriggerRecord>
where
    I: IntoIterator<Item = TriggerRecord>,
{
    let mut best: Option<(usize, TriggerRecord)> = None;

    for record in records {
        if !is_candidate(&record.trigger, text) {
            continue;
        }

        let len = record.trigger.len();
        let better = match &best {
            None => true,
            Some((best_len, best_record)) => match len.cmp(best_len) {
                Ordering::Greater => true,
                Ordering::Equal => record.trigger < best_record.trigger,
                Ordering::Less => false,
            },
        };

        if better {
            best = Some((len, record));
        }
    }

    best.map(|(_, record)| record)
}
