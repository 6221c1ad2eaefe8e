//! Property tests over generated inputs: normalizers reach a fixed point,
//! citation confidence stays bounded, and merging a list with itself keeps
//! the same identities as deduplicating it.

use std::collections::BTreeSet;

use legalex_core::extract::{CitationScanner, BASE_CONFIDENCE};
use legalex_core::{Canonicalizer, Citation, ExtractionConfig, ExtractionMethod, Reconciler};
use proptest::prelude::*;

const INSTRUMENTS: &[&str] = &[
    "Federal Decree-Law",
    "Decree-Law",
    "Federal Law",
    "Cabinet Resolution",
    "Ministerial Resolution",
    "Ministerial Decision",
    "Federal Decree",
];

/// Text shaped like extracted layout: words, punctuation, quotes, hyphenated
/// line breaks and stray whitespace.
fn layout_text() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            "[A-Za-z]{1,8}",
            Just(" ".to_string()),
            Just("-\n".to_string()),
            Just("\n".to_string()),
            Just("\t".to_string()),
            "[:;,.\"'()—–−-]",
            Just("The ".to_string()),
            Just("“".to_string()),
        ],
        0..24,
    )
    .prop_map(|parts| parts.concat())
}

fn generated_citations() -> impl Strategy<Value = Vec<(usize, u32, u32, u32, f64)>> {
    prop::collection::vec(
        (0..INSTRUMENTS.len(), 1u32..40, 1990u32..2030, 1u32..6, 0.0f64..=1.0),
        0..12,
    )
}

fn canonical_ids(citations: &[Citation]) -> BTreeSet<String> {
    citations.iter().map(|c| c.canonical_id().to_string()).collect()
}

// ============================================================================
// Normalizer fixed points
// ============================================================================

#[test]
fn normalize_term_is_idempotent() {
    let canon = Canonicalizer::new().unwrap();
    proptest!(|(raw in prop_oneof![layout_text(), "\\PC{0,80}"])| {
        let once = canon.normalize_term(&raw);
        prop_assert_eq!(canon.normalize_term(&once), once.clone());
    });
}

#[test]
fn normalize_definition_is_idempotent() {
    let canon = Canonicalizer::new().unwrap();
    proptest!(|(raw in prop_oneof![layout_text(), "\\PC{0,80}"])| {
        let once = canon.normalize_definition(&raw);
        prop_assert_eq!(canon.normalize_definition(&once), once.clone());
    });
}

// ============================================================================
// Citation confidence
// ============================================================================

#[test]
fn confidence_stays_in_bounds() {
    let scanner = CitationScanner::new(&ExtractionConfig::default()).unwrap();
    proptest!(|(text in "\\PC{0,120}")| {
        let confidence = scanner.confidence(&text);
        prop_assert!((BASE_CONFIDENCE..=1.0).contains(&confidence), "{} -> {}", text, confidence);
    });
}

#[test]
fn confidence_never_drops_when_text_grows() {
    let scanner = CitationScanner::new(&ExtractionConfig::default()).unwrap();
    proptest!(|(text in "\\PC{0,60}", suffix in prop_oneof![
        Just("No. (5)".to_string()),
        Just("of 2020".to_string()),
        Just("Concerning Fees".to_string()),
        "[A-Za-z0-9() ]{0,20}",
    ])| {
        let grown = format!("{text} {suffix}");
        prop_assert!(scanner.confidence(&grown) >= scanner.confidence(&text));
    });
}

// ============================================================================
// Reconciliation
// ============================================================================

#[test]
fn self_merge_keeps_dedup_identities() {
    let canon = Canonicalizer::new().unwrap();
    let reconciler = Reconciler::default();
    proptest!(|(specs in generated_citations())| {
        let list: Vec<Citation> = specs
            .iter()
            .map(|&(kind, number, year, page, confidence)| {
                Citation::new(
                    &canon,
                    format!("{} No. ({number}) of {year}", INSTRUMENTS[kind]),
                    page,
                    confidence,
                    ExtractionMethod::Rule,
                )
            })
            .collect();

        let merged = reconciler.merge_citations(list.clone(), list.clone());
        let deduped = reconciler.dedup_citations(list.clone());
        prop_assert_eq!(canonical_ids(&merged), canonical_ids(&deduped));
        prop_assert_eq!(merged.len(), deduped.len());
        prop_assert_eq!(canonical_ids(&deduped), canonical_ids(&list));
    });
}
