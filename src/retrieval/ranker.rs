//! Lexical relevance ranking over the catalog.
//!
//! A record's score is the sum of keyword hits (5 for a title hit, 1 for a
//! hit elsewhere), a flat bonus when it belongs to the flagship region, and
//! its priority weight. Only records with at least one hit or the bonus are
//! candidates. Sorting is stable, so equal scores keep catalog order.

use crate::catalog::{Catalog, SPECIALTY_TERMS, TourRecord};

use super::Intent;

pub const MAX_RESULTS: usize = 3;
/// Results returned for a flagship query when nothing clears the floor
pub const SPECIALTY_FALLBACK_RESULTS: usize = 2;
pub const SPECIALTY_BONUS: i32 = 10;
pub const TITLE_HIT: i32 = 5;
pub const BODY_HIT: i32 = 1;
/// Minimum score for a flagship-query result
pub const SPECIALTY_SCORE_FLOOR: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredCandidate<'a> {
    pub score: i32,
    pub record: &'a TourRecord,
}

/// Score one record; `None` when it is not a candidate
#[must_use]
pub fn score_record<'a>(record: &'a TourRecord, keywords: &[String]) -> Option<ScoredCandidate<'a>> {
    let haystack = record.search_text();
    let title = record.title.to_lowercase();

    let bonus = if SPECIALTY_TERMS.iter().any(|term| haystack.contains(term)) {
        SPECIALTY_BONUS
    } else {
        0
    };

    let keyword_score: i32 = keywords
        .iter()
        .filter(|keyword| !keyword.is_empty() && haystack.contains(keyword.as_str()))
        .map(|keyword| {
            if title.contains(keyword.as_str()) {
                TITLE_HIT
            } else {
                BODY_HIT
            }
        })
        .sum();

    if keyword_score == 0 && bonus == 0 {
        return None;
    }

    Some(ScoredCandidate {
        score: keyword_score + bonus + record.priority_weight(),
        record,
    })
}

/// Every candidate in the catalog, best first
#[must_use]
pub fn score_catalog<'a>(catalog: &'a Catalog, keywords: &[String]) -> Vec<ScoredCandidate<'a>> {
    let mut scored: Vec<ScoredCandidate<'a>> = catalog
        .tours()
        .iter()
        .filter_map(|record| score_record(record, keywords))
        .collect();
    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored
}

/// Select the records to show the model for this intent
#[must_use]
pub fn rank_tours<'a>(catalog: &'a Catalog, keywords: &[String], intent: Intent) -> Vec<&'a TourRecord> {
    let scored = score_catalog(catalog, keywords);

    if intent == Intent::SpecialtyDestination {
        let strong: Vec<&TourRecord> = scored
            .iter()
            .filter(|candidate| candidate.score >= SPECIALTY_SCORE_FLOOR)
            .take(MAX_RESULTS)
            .map(|candidate| candidate.record)
            .collect();
        if !strong.is_empty() {
            return strong;
        }
        return scored
            .iter()
            .take(SPECIALTY_FALLBACK_RESULTS)
            .map(|candidate| candidate.record)
            .collect();
    }

    scored
        .iter()
        .take(MAX_RESULTS)
        .map(|candidate| candidate.record)
        .collect()
}
