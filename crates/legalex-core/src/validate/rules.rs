//! Rule tables for the structural validator.
//!
//! Each table is an ordered list of `{test, outcome}` rules; the first rule
//! whose test fires decides the rejection. Bump a table's `version` whenever
//! its rules change so fixtures recorded against an older table are easy to spot.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    TermTooShort,
    TermTooLong,
    DefinitionTooShort,
    DefinitionTooLong,
    SentenceConnective,
    PreambleLabel,
    VerbGerund,
    DeterminerPhrase,
    SentenceFragment,
    PrepositionChain,
    ModalVerb,
    ListFragment,
    SentenceEnding,
    DanglingWord,
    StructureReference,
    StructureWord,
    AbbreviationFragment,
    LowercaseFragment,
    NumericTerm,
    KnownArtifact,
    PreambleDefinition,
    ReferenceDefinition,
    CitationDefinition,
}

impl Rejection {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TermTooShort => "term too short",
            Self::TermTooLong => "term too long",
            Self::DefinitionTooShort => "definition too short",
            Self::DefinitionTooLong => "definition too long",
            Self::SentenceConnective => "starts with a sentence connective",
            Self::PreambleLabel => "preamble label",
            Self::VerbGerund => "starts with a verb gerund",
            Self::DeterminerPhrase => "bare determiner phrase",
            Self::SentenceFragment => "sentence fragment",
            Self::PrepositionChain => "preposition chain",
            Self::ModalVerb => "contains a modal verb",
            Self::ListFragment => "list item fragment",
            Self::SentenceEnding => "ends like a sentence",
            Self::DanglingWord => "ends with a dangling word",
            Self::StructureReference => "document structure reference",
            Self::StructureWord => "document structure word",
            Self::AbbreviationFragment => "abbreviation fragment",
            Self::LowercaseFragment => "all-lowercase fragment",
            Self::NumericTerm => "numeric term",
            Self::KnownArtifact => "known extraction artifact",
            Self::PreambleDefinition => "definition is preamble boilerplate",
            Self::ReferenceDefinition => "definition is an article reference",
            Self::CitationDefinition => "definition is a citation",
        }
    }
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a term rule looks at. Word tests compare lowercased words unless noted.
#[derive(Debug, Clone, Copy)]
pub enum TermTest {
    FirstWordIn(&'static [&'static str]),
    SoleWordIn(&'static [&'static str]),
    /// Exactly two words, first in the first list, second in the second.
    TwoWordPhrase(&'static [&'static str], &'static [&'static str]),
    /// At least `n` distinct phrases from the list occur in the term.
    ContainsAtLeast(&'static [&'static str], usize),
    /// A listed word occurs strictly between the first and last word.
    InteriorWordIn(&'static [&'static str]),
    ContainsAny(&'static [&'static str]),
    EndsWithAny(&'static [&'static str]),
    /// Multi-word term whose last word is listed.
    LastWordIn(&'static [&'static str]),
    /// Whole lowercased term equals a listed word.
    LowercaseIs(&'static [&'static str]),
    /// Whole term equals a listed string, case-sensitive.
    Is(&'static [&'static str]),
    /// Regex over the lowercased term.
    Matches(&'static str),
    AllLowercase,
    Numeric,
    /// "The person of the ..." style fragments.
    DeterminerNounFragment,
    /// "Fine Assessment Stockpiler": two terms merged across a layout boundary.
    AssessmentCompound,
}

#[derive(Debug, Clone, Copy)]
pub struct TermRule {
    pub test: TermTest,
    pub outcome: Rejection,
}

#[derive(Debug, Clone, Copy)]
pub struct DefinitionRule {
    pub pattern: &'static str,
    pub outcome: Rejection,
}

#[derive(Debug, Clone, Copy)]
pub struct RuleTable<R: 'static> {
    pub name: &'static str,
    pub version: u32,
    pub rules: &'static [R],
}

pub const SENTENCE_CONNECTIVES: &[&str] = &[
    "whereas", "therefore", "however", "moreover", "furthermore", "nevertheless",
    "accordingly", "consequently", "hence", "thus", "when", "where", "while",
    "although", "though", "unless", "if", "because", "since", "as", "after",
    "before", "until",
];

pub const VERB_GERUNDS: &[&str] = &[
    "notifying", "providing", "submitting", "issuing", "establishing", "creating",
    "receiving", "sending", "requesting", "requiring", "ensuring", "determining",
    "calculating", "processing", "reviewing", "approving", "forming",
];

/// Resolution preamble headings that end in a colon like a defined term.
pub const PREAMBLE_LABELS: &[&str] = &[
    "having reviewed", "having perused", "having considered", "has resolved", "have resolved",
    "has decided", "have decided", "hereby resolves", "resolved", "decided", "decrees", "we",
];

pub const DETERMINERS: &[&str] = &["the", "any", "all", "each", "every", "some"];

pub const DETERMINER_FOLLOWERS: &[&str] =
    &["other", "following", "such", "said", "aforementioned"];

pub const PREPOSITION_CHAINS: &[&str] =
    &["of the", "to the", "by the", "for the", "in the", "on the", "at the"];

pub const MODAL_VERBS: &[&str] = &["shall", "must", "may", "should", "would", "could", "will"];

pub const SENTENCE_ENDINGS: &[&str] =
    &["as follows", "otherwise", "the following", "shall be", "as amended"];

pub const DANGLING_WORDS: &[&str] = &[
    "the", "a", "an", "of", "to", "for", "in", "on", "at", "by", "with", "from", "and",
    "or", "this", "that", "these", "those",
];

pub const STRUCTURE_WORDS: &[&str] = &[
    "article", "chapter", "section", "part", "clause", "paragraph", "procedures",
    "regulations", "resolution", "decree", "law", "cabinet", "constitution",
];

pub const KNOWN_ARTIFACTS: &[&str] = &[
    "Fine Assessment Stockpiler",
    "Fine Assessment",
    "Number (TRN)",
    "Administrative",
];

/// Words that may legitimately follow "Assessment" inside a term.
pub const ASSESSMENT_CONTINUATIONS: &[&str] = &["Number", "Date", "Period", "Amount"];

pub const FRAGMENT_NOUNS: &[&str] = &["person", "persons", "authority", "authorities"];

pub static NOUN_PHRASE_RULES: RuleTable<TermRule> = RuleTable {
    name: "noun_phrase",
    version: 2,
    rules: &[
        TermRule { test: TermTest::FirstWordIn(SENTENCE_CONNECTIVES), outcome: Rejection::SentenceConnective },
        TermRule { test: TermTest::LowercaseIs(PREAMBLE_LABELS), outcome: Rejection::PreambleLabel },
        TermRule {
            test: TermTest::Matches(r"^(?:and\s+)?(?:upon|based\s+on|pursuant\s+to)\b"),
            outcome: Rejection::PreambleLabel,
        },
        TermRule { test: TermTest::FirstWordIn(VERB_GERUNDS), outcome: Rejection::VerbGerund },
        TermRule { test: TermTest::SoleWordIn(DETERMINERS), outcome: Rejection::DeterminerPhrase },
        TermRule {
            test: TermTest::TwoWordPhrase(DETERMINERS, DETERMINER_FOLLOWERS),
            outcome: Rejection::DeterminerPhrase,
        },
        TermRule { test: TermTest::DeterminerNounFragment, outcome: Rejection::SentenceFragment },
        TermRule { test: TermTest::ContainsAtLeast(PREPOSITION_CHAINS, 2), outcome: Rejection::PrepositionChain },
        TermRule { test: TermTest::InteriorWordIn(MODAL_VERBS), outcome: Rejection::ModalVerb },
        TermRule { test: TermTest::ContainsAny(&["; and", ";and"]), outcome: Rejection::ListFragment },
        TermRule { test: TermTest::EndsWithAny(SENTENCE_ENDINGS), outcome: Rejection::SentenceEnding },
        TermRule { test: TermTest::LastWordIn(DANGLING_WORDS), outcome: Rejection::DanglingWord },
        TermRule {
            test: TermTest::Matches(
                r"\b(?:article|chapter|section|part|clause|paragraph)\s*\(?(?:\d+|one|two|three|four|five)\b",
            ),
            outcome: Rejection::StructureReference,
        },
        TermRule {
            test: TermTest::Matches(r"\barticle\s+(?:shall|must|may|should|will)\b"),
            outcome: Rejection::StructureReference,
        },
        TermRule { test: TermTest::LowercaseIs(STRUCTURE_WORDS), outcome: Rejection::StructureWord },
        TermRule {
            test: TermTest::Matches(r"\b(?:moa|aoa)\s+of\s+the\b"),
            outcome: Rejection::AbbreviationFragment,
        },
        TermRule { test: TermTest::AllLowercase, outcome: Rejection::LowercaseFragment },
        TermRule { test: TermTest::Numeric, outcome: Rejection::NumericTerm },
        TermRule { test: TermTest::Is(KNOWN_ARTIFACTS), outcome: Rejection::KnownArtifact },
        TermRule { test: TermTest::AssessmentCompound, outcome: Rejection::KnownArtifact },
    ],
};

pub static DEFINITION_RULES: RuleTable<DefinitionRule> = RuleTable {
    name: "definition_plausibility",
    version: 1,
    rules: &[
        DefinitionRule {
            pattern: r"(?i)^(?:Having reviewed|And based on|Hereby resolves|The Cabinet|Upon the proposal)",
            outcome: Rejection::PreambleDefinition,
        },
        DefinitionRule {
            pattern: r"(?i)^(?:Article|Chapter|Section)\s+\(?\d+",
            outcome: Rejection::ReferenceDefinition,
        },
        DefinitionRule {
            pattern: r"(?i)^(?:Cabinet Resolution|Federal Decree|Federal Law)",
            outcome: Rejection::CitationDefinition,
        },
    ],
};

/// Precomputed views of a term shared by every rule.
pub(crate) struct TermView<'a> {
    pub raw: &'a str,
    pub lower: String,
    pub words: Vec<&'a str>,
    pub lower_words: Vec<String>,
}

impl<'a> TermView<'a> {
    pub fn new(raw: &'a str) -> Self {
        let words: Vec<&str> = raw.split_whitespace().collect();
        Self {
            raw,
            lower: raw.to_lowercase(),
            lower_words: words.iter().map(|w| w.to_lowercase()).collect(),
            words,
        }
    }

    fn first(&self) -> Option<&str> {
        self.lower_words.first().map(String::as_str)
    }
}

fn listed(list: &[&str], word: &str) -> bool {
    list.contains(&word)
}

impl TermTest {
    /// Evaluate every test except [`TermTest::Matches`], which needs a compiled regex.
    pub(crate) fn fires(&self, term: &TermView<'_>) -> bool {
        match *self {
            Self::FirstWordIn(list) => term.first().is_some_and(|w| listed(list, w)),
            Self::SoleWordIn(list) => term.lower_words.len() == 1 && term.first().is_some_and(|w| listed(list, w)),
            Self::TwoWordPhrase(first, second) => {
                term.lower_words.len() == 2
                    && listed(first, &term.lower_words[0])
                    && listed(second, &term.lower_words[1])
            }
            Self::ContainsAtLeast(list, n) => list.iter().filter(|p| term.lower.contains(*p)).count() >= n,
            Self::InteriorWordIn(list) => {
                let n = term.lower_words.len();
                n > 2 && term.lower_words[1..n - 1].iter().any(|w| listed(list, w))
            }
            Self::ContainsAny(list) => list.iter().any(|p| term.lower.contains(p)),
            Self::EndsWithAny(list) => list.iter().any(|p| term.lower.ends_with(p)),
            Self::LastWordIn(list) => {
                term.lower_words.len() > 1 && term.lower_words.last().is_some_and(|w| listed(list, w))
            }
            Self::LowercaseIs(list) => listed(list, term.lower.as_str()),
            Self::Is(list) => listed(list, term.raw),
            Self::Matches(_) => false,
            Self::AllLowercase => {
                term.raw.chars().any(char::is_lowercase) && !term.raw.chars().any(char::is_uppercase)
            }
            Self::Numeric => {
                let digits: String = term.raw.chars().filter(|c| !matches!(c, ' ' | '(' | ')')).collect();
                !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
            }
            Self::DeterminerNounFragment => {
                term.lower_words.len() > 3
                    && listed(DETERMINERS, &term.lower_words[0])
                    && listed(FRAGMENT_NOUNS, &term.lower_words[1])
                    && [" of ", " to ", " by "].iter().any(|p| term.lower.contains(p))
            }
            Self::AssessmentCompound => {
                term.words.len() > 2
                    && term.words.iter().position(|w| *w == "Assessment").is_some_and(|idx| {
                        term.words.get(idx + 1).is_some_and(|next| {
                            next.chars().next().is_some_and(char::is_uppercase)
                                && !ASSESSMENT_CONTINUATIONS.contains(next)
                        })
                    })
            }
        }
    }
}
