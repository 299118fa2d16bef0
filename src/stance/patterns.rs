//! Keyword-pair rules for contradiction/support detection, keyword
//! extraction for the fallback classifier, and text preprocessing.
//!
//! A *cue* is a directional assertion ("is effective", "increases", ...).
//! Contradiction rules pair opposite cues and fire in either direction
//! (claim → evidence or evidence → claim). Support rules require the same
//! cue on both sides. Each table yields the maximum score of the rules that
//! fire, 0.0 when none do. English and Japanese cues share the tables.
//!
//! Before the rules run, side-effect wording is masked ("side effects" says
//! nothing about efficacy) and negated harm ("not toxic") is rewritten as
//! "safe".

use once_cell::sync::Lazy;
use regex::Regex;

struct Cue {
    hit: Regex,
    unless: Option<Regex>,
}

impl Cue {
    fn new(pattern: &str) -> Self {
        Self {
            hit: Regex::new(pattern).expect("valid cue pattern"),
            unless: None,
        }
    }

    /// Positive cue that must not also read as its negated form.
    fn unless(pattern: &str, negated: &str) -> Self {
        Self {
            hit: Regex::new(pattern).expect("valid cue pattern"),
            unless: Some(Regex::new(negated).expect("valid cue pattern")),
        }
    }

    fn matches(&self, text: &str) -> bool {
        self.hit.is_match(text) && !self.unless.as_ref().is_some_and(|re| re.is_match(text))
    }
}

struct PairRule {
    left: Cue,
    right: Cue,
    score: f32,
}

const EFFECT_NEG: &str = r"(?i)\b(no|not|without|lacks?|lacking|fails?\s+to|failed\s+to)\b[^.]*\b(effects?|effective|benefits?|beneficial|efficacy)\b|\bineffective\b";
const EFFECT_POS: &str =
    r"(?i)\b(effective|beneficial|efficacious|benefits?|has\s+(an?\s+)?(\w+\s+)?effect)\b";
const UNSAFE: &str = r"(?i)\b(unsafe|dangerous|harmful|toxic)\b|\bnot\s+(\w+\s+)?safe\b";
const SAFE: &str = r"(?i)\b(safe|harmless|well[-\s]tolerated)\b";
const NO_RISK: &str =
    r"(?i)\b(no|without|zero)\s+(\w+\s+)?risks?\b|\bnot\s+(\w+\s+)?(a\s+)?risk\b|\brisk[-\s]free\b";
const RISK: &str = r"(?i)\b(increased|higher|elevated|greater)\s+risks?\b|\brisks?\s+of\b";
const INCREASE: &str =
    r"(?i)\b(increas(e|es|ed|ing)|rais(e|es|ed|ing)|ris(e|es|ing)|rose|elevat(e|es|ed|ing))\b";
const DECREASE: &str =
    r"(?i)\b(decreas(e|es|ed|ing)|reduc(e|es|ed|ing|tion)|lower(s|ed|ing)?|declin(e|es|ed|ing))\b";
const IMPROVE: &str = r"(?i)\bimprov(e|es|ed|ing|ement|ements)\b";
const WORSEN: &str =
    r"(?i)\b(worsen(s|ed|ing)?|deteriorat(e|es|ed|ing|ion)|aggravat(e|es|ed|ing))\b";
const ENHANCE: &str = r"(?i)\b(enhanc(e|es|ed|ing)|boost(s|ed|ing)?|strengthen(s|ed|ing)?)\b";

static CONTRADICTION_RULES: Lazy<Vec<PairRule>> = Lazy::new(|| {
    vec![
        pair(Cue::new(EFFECT_NEG), Cue::unless(EFFECT_POS, EFFECT_NEG), 0.9),
        pair(Cue::new(UNSAFE), Cue::unless(SAFE, UNSAFE), 0.9),
        pair(Cue::new(NO_RISK), Cue::unless(RISK, NO_RISK), 0.8),
        pair(Cue::new(INCREASE), Cue::new(DECREASE), 0.7),
        pair(Cue::new(ENHANCE), Cue::new(WORSEN), 0.7),
        pair(Cue::new(IMPROVE), Cue::new(WORSEN), 0.8),
        pair(Cue::new("効果.*ない"), Cue::new("効果.*ある"), 0.9),
        pair(Cue::new("安全.*でない"), Cue::new("安全.*である"), 0.9),
        pair(Cue::new("リスク.*ない"), Cue::new("リスク.*ある"), 0.8),
        pair(Cue::new("増加"), Cue::new("減少"), 0.7),
        pair(Cue::new("向上"), Cue::new("悪化"), 0.7),
        pair(Cue::new("改善"), Cue::new("悪化"), 0.8),
    ]
});

static SUPPORT_RULES: Lazy<Vec<PairRule>> = Lazy::new(|| {
    vec![
        same(|| Cue::unless(EFFECT_POS, EFFECT_NEG), 0.8),
        same(|| Cue::unless(SAFE, UNSAFE), 0.8),
        same(|| Cue::unless(RISK, NO_RISK), 0.7),
        same(|| Cue::new(IMPROVE), 0.7),
        same(|| Cue::new(ENHANCE), 0.7),
        same(|| Cue::new(INCREASE), 0.6),
        same(|| Cue::new(DECREASE), 0.6),
        same(|| Cue::new("効果.*ある"), 0.8),
        same(|| Cue::new("安全.*である"), 0.8),
        same(|| Cue::new("リスク.*ある"), 0.7),
        same(|| Cue::new("改善"), 0.7),
        same(|| Cue::new("向上"), 0.7),
        same(|| Cue::new("増加"), 0.6),
        same(|| Cue::new("減少"), 0.6),
    ]
});

fn pair(left: Cue, right: Cue, score: f32) -> PairRule {
    PairRule { left, right, score }
}

fn same(cue: impl Fn() -> Cue, score: f32) -> PairRule {
    PairRule {
        left: cue(),
        right: cue(),
        score,
    }
}

static SIDE_EFFECTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(side|adverse|unwanted)[-\s]+effects?\b")
        .expect("valid side-effect pattern")
});
static NEGATED_HARM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(not|no|non|never|without)[-\s]+(\w+\s+)?(unsafe|dangerous|harmful|toxic)\b")
        .expect("valid negated-harm pattern")
});

/// Text as the cue rules see it.
fn normalize_cues(text: &str) -> String {
    let text = NEGATED_HARM.replace_all(text, "safe");
    SIDE_EFFECTS.replace_all(&text, "adverse events").into_owned()
}

/// Strongest contradiction between claim and evidence, in [0, 1].
pub fn contradiction_score(claim: &str, evidence: &str) -> f32 {
    let (claim, evidence) = (normalize_cues(claim), normalize_cues(evidence));
    CONTRADICTION_RULES
        .iter()
        .filter(|r| {
            (r.left.matches(&claim) && r.right.matches(&evidence))
                || (r.right.matches(&claim) && r.left.matches(&evidence))
        })
        .map(|r| r.score)
        .fold(0.0, f32::max)
}

/// Strongest same-direction agreement between claim and evidence, in [0, 1].
pub fn support_score(claim: &str, evidence: &str) -> f32 {
    let (claim, evidence) = (normalize_cues(claim), normalize_cues(evidence));
    SUPPORT_RULES
        .iter()
        .filter(|r| r.left.matches(&claim) && r.right.matches(&evidence))
        .map(|r| r.score)
        .fold(0.0, f32::max)
}

static MEDICAL_TERMS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)\b(vitamin\s?[a-k]\d?|minerals?|supplements?|drugs?|medications?|treatments?|",
        r"therap(y|ies)|side\s+effects?|effects?|risks?|prevention|immun\w*|infections?|",
        r"virus(es)?|bacteria|cancers?|heart\s+disease|diabetes|hypertension|cholesterol|",
        r"blood\s+(sugar|glucose|pressure)|health|diagnos\w*|vaccin\w*)\b",
        r"|ビタミン[A-Z]?|ミネラル|サプリメント|薬|治療|効果|副作用|リスク|予防|免疫|感染|",
        r"ウイルス|細菌|がん|癌|心臓病|糖尿病|高血圧|コレステロール|血糖値|血圧|健康|医療|",
        r"医学|診断|検査|ワクチン|接種"
    ))
    .expect("valid medical term pattern")
});
static NUMBERS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+(\.\d+)?[%％倍]?").expect("valid number pattern"));
static WORDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\p{Hiragana}\p{Katakana}ー\p{Han}A-Za-z]+").expect("valid word pattern")
});

/// Words kept beyond medical terms and numbers.
const MAX_PLAIN_WORDS: usize = 10;

/// Keywords for the overlap fallback: medical terms, numbers, then the
/// first few words longer than two characters. Lower-cased.
pub fn extract_keywords(text: &str) -> Vec<String> {
    let terms = MEDICAL_TERMS.find_iter(text).map(|m| m.as_str());
    let numbers = NUMBERS.find_iter(text).map(|m| m.as_str());
    let words = WORDS
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|w| w.chars().count() > 2)
        .take(MAX_PLAIN_WORDS);

    terms
        .chain(numbers)
        .chain(words)
        .map(str::to_lowercase)
        .collect()
}

static TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("valid tag pattern"));
static SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid space pattern"));

/// Strip markup, decode entities, collapse whitespace.
pub fn preprocess(text: &str) -> String {
    let stripped = TAGS.replace_all(text, "");
    let decoded = html_escape::decode_html_entities(&stripped);
    SPACES.replace_all(&decoded, " ").trim().to_string()
}
