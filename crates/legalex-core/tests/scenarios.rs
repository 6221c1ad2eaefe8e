use std::collections::BTreeSet;

use legalex_core::{
    Canonicalizer, Citation, DocumentEngine, DocumentInput, ExtractionConfig, ExtractionMethod, Page, RawCitation,
    Reconciler, StructuralValidator,
};

fn engine() -> DocumentEngine {
    DocumentEngine::new(ExtractionConfig::default()).unwrap()
}

fn canonical_ids(citations: &[Citation]) -> BTreeSet<String> {
    citations.iter().map(|c| c.canonical_id().to_string()).collect()
}

fn regulation() -> Vec<Page> {
    vec![
        Page::new(
            1,
            "Cabinet Resolution No. (85) of 2022\nOn the Executive Regulation of Corporate Tax\n\n\
             The Cabinet:\n\
             Having reviewed the Constitution;\n\
             Federal Law No. (1) of 1972 Concerning the Competencies of Ministries and the Powers of Ministers;\n\
             Federal Decree-Law No. (47) of 2022 on the Taxation of Corporations and Businesses; and\n\
             Cabinet Resolution No. (52) of 2017 on Fees;\n",
        ),
        Page::new(
            2,
            "Article (1) - Definitions\n\n\
             State: The United Arab Emirates.\n\n\
             Ministry: The Ministry of Finance.\n\n\
             Authority: The Federal Tax Authority.\n\n\
             Article (2) - Scope\n\
             The provisions of this Resolution apply to every Taxable Person.\n",
        ),
    ]
}

#[test]
fn citation_list_is_extracted_end_to_end() {
    let input = DocumentInput::new(
        "excise.pdf",
        vec![Page::new(
            1,
            "Federal Decree-Law No. (7) of 2017 on Excise Tax; Cabinet Resolution No. (52) of 2017; \
             Federal Law No. (1) of 1972 Concerning the Competencies of Ministries;",
        )],
    );
    let result = engine().process(&input).unwrap();

    assert!(result.citations.len() >= 3);
    let ids = canonical_ids(&result.citations);
    for expected in ["fed_decree_law_7_2017", "cabinet_resolution_52_2017", "federal_law_1_1972"] {
        assert!(ids.contains(expected), "missing {expected} in {ids:?}");
    }
}

#[test]
fn definitions_are_extracted_end_to_end() {
    let input = DocumentInput::new(
        "definitions.pdf",
        vec![Page::new(
            1,
            "Article (1) - Definitions\n\nMinistry: Ministry of Finance.\n\nAuthority: The Federal Tax Authority.",
        )],
    );
    let result = engine().process(&input).unwrap();

    let terms: Vec<_> = result.terms_definitions.iter().map(|d| d.term.as_str()).collect();
    assert!(terms.contains(&"Ministry"), "{terms:?}");
    assert!(terms.contains(&"Authority"), "{terms:?}");
    assert!(result
        .terms_definitions
        .iter()
        .all(|d| !d.definition.starts_with(char::is_lowercase)));
}

#[test]
fn regulation_yields_cited_instruments_and_terms() {
    let result = engine().process(&DocumentInput::new("Cabinet Resolution No. (85) of 2022.pdf", regulation())).unwrap();

    assert_eq!(result.doc_id, "cabinet_resolution_85_2022");
    assert_eq!(result.metadata.pages, 2);

    let ids = canonical_ids(&result.citations);
    assert!(ids.contains("federal_law_1_1972"), "{ids:?}");
    assert!(ids.contains("fed_decree_law_47_2022"), "{ids:?}");
    assert!(ids.contains("cabinet_resolution_52_2017"), "{ids:?}");
    assert!(!ids.contains("cabinet_resolution_85_2022"), "self reference kept: {ids:?}");

    let authority = result.terms_definitions.iter().find(|d| d.term == "Authority").unwrap();
    assert_eq!(authority.page, 2);
    assert!(result.terms_definitions.iter().all(|d| d.term != "The Cabinet"));
}

#[test]
fn confidences_stay_in_bounds_and_sorted() {
    let result = engine().process(&DocumentInput::new("regulation.pdf", regulation())).unwrap();

    let citation_scores: Vec<f64> = result.citations.iter().map(|c| c.confidence).collect();
    let definition_scores: Vec<f64> = result.terms_definitions.iter().map(|d| d.confidence).collect();
    for scores in [&citation_scores, &definition_scores] {
        assert!(scores.iter().all(|s| (0.0..=1.0).contains(s)), "{scores:?}");
        assert!(scores.windows(2).all(|w| w[0] >= w[1]), "not sorted: {scores:?}");
    }
    assert!(citation_scores.iter().all(|s| *s >= 0.85));
}

#[test]
fn plain_prose_yields_no_candidates() {
    let input = DocumentInput::new(
        "minutes.txt",
        vec![Page::new(
            1,
            "The committee met on Tuesday to discuss the annual budget. Members agreed that the \
             report should be published before the end of the year, and thanked the staff for their work.",
        )],
    );
    let result = engine().process(&input).unwrap();
    assert!(result.citations.is_empty());
}

#[test]
fn empty_pages_are_not_errors() {
    let input = DocumentInput::new("blank.pdf", vec![Page::new(1, ""), Page::new(2, "   \n  ")]);
    let result = engine().process(&input).unwrap();
    assert!(result.citations.is_empty());
    assert!(result.terms_definitions.is_empty());
}

#[test]
fn canonical_ids_follow_type_precedence() {
    let canon = Canonicalizer::new().unwrap();
    for text in [
        "Federal Decree-Law No. (47) of 2022 on Corporate Tax",
        "Federal Decree by Law No. (47) of 2022 on Corporate Tax",
        "Decree-Law No. 47 of 2022 on Corporate Tax",
    ] {
        assert_eq!(canon.canonicalize_citation(text), "fed_decree_law_47_2022", "{text}");
    }
    assert_eq!(
        canon.canonicalize_citation("Cabinet Resolution No. (37) of 2017"),
        "cabinet_resolution_37_2017"
    );
}

#[test]
fn normalization_is_idempotent() {
    let canon = Canonicalizer::new().unwrap();
    for raw in ["  “Tax  Period”: ", "(a) Taxable Person", "Ministry"] {
        let once = canon.normalize_term(raw);
        assert_eq!(canon.normalize_term(&once), once, "{raw:?}");
    }
    for raw in [
        "the   Federal Tax Authority;",
        "any natural or legal per-\nson resident in the State",
        "Ministry of Finance.",
    ] {
        let once = canon.normalize_definition(raw);
        assert_eq!(canon.normalize_definition(&once), once, "{raw:?}");
    }
}

#[test]
fn noun_phrase_checks() {
    let validator = StructuralValidator::new().unwrap();
    assert!(!validator.is_noun_phrase("Notifying the Authority"));
    assert!(validator.is_noun_phrase("Tax Period"));
    assert!(!validator.is_noun_phrase("Registration of the Recipient of such Goods by the Authority"));
}

#[test]
fn ai_candidate_with_higher_confidence_wins() {
    let input = DocumentInput::new(
        "fees.pdf",
        vec![Page::new(
            1,
            "The Cabinet:\nHaving reviewed Cabinet Resolution No. (37) of 2017;\nHas resolved:\n",
        )],
    )
    .with_ai_citations(vec![RawCitation {
        text: "Cabinet Resolution No. 37 of 2017 regarding Fees".into(),
        page: 1,
        confidence: 0.99,
        canonical_id: Some("ignored".into()),
    }]);
    let result = engine().process(&input).unwrap();

    let matching: Vec<_> = result
        .citations
        .iter()
        .filter(|c| c.canonical_id() == "cabinet_resolution_37_2017")
        .collect();
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0].extraction_method, ExtractionMethod::Ai);
}

#[test]
fn merging_a_list_with_itself_matches_dedup() {
    let canon = Canonicalizer::new().unwrap();
    let reconciler = Reconciler::default();
    let list = vec![
        Citation::new(&canon, "Federal Law No. (1) of 1972", 1, 0.90, ExtractionMethod::Rule),
        Citation::new(&canon, "Federal Law No. 1 of 1972 Concerning Ministries", 2, 0.95, ExtractionMethod::Rule),
        Citation::new(&canon, "Cabinet Resolution No. (52) of 2017", 3, 0.85, ExtractionMethod::Rule),
    ];

    let merged = reconciler.merge_citations(list.clone(), list.clone());
    let deduped = reconciler.dedup_citations(list);
    assert_eq!(canonical_ids(&merged), canonical_ids(&deduped));
}

#[test]
fn tie_break_keeps_higher_confidence_record() {
    let canon = Canonicalizer::new().unwrap();
    let reconciler = Reconciler::default();
    let rule = vec![Citation::new(&canon, "Cabinet Resolution No. (37) of 2017", 1, 0.80, ExtractionMethod::Rule)];
    let ai = vec![Citation::new(&canon, "Cabinet Resolution No. 37 of 2017", 1, 0.90, ExtractionMethod::Ai)];

    let merged = reconciler.merge_citations(rule, ai);
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].text, "Cabinet Resolution No. 37 of 2017");
    assert_eq!(merged[0].extraction_method, ExtractionMethod::Ai);
}
