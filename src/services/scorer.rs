//! Heuristic scoring of candidate sibling links.
//!
//! A candidate is scored by its anchor text first (arrow glyphs and direction
//! keywords); only a candidate with some text evidence gets its URL compared
//! with the current page URL. Candidates whose combined score stays below 1
//! are rejected.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{Direction, ScoringConfig, TextWeights, UrlWeights};
use crate::utils::{UriView, unescape_url_chars};

const PREV_SIGN: &str = r"<|\x{2039}|\x{00AB}|\x{FF1C}|\x{226A}|\x{2190}";
const NEXT_SIGN: &str = r">|\x{203A}|\x{00BB}|\x{FF1E}|\x{226B}|\x{2192}";

const PREV_WORD_EN: &str = r"prev(?:ious)?|old(?:er)?|back(?:ward)?|less";
const PREV_WORD_JA: &str = r"前|古い";
const NEXT_WORD_EN: &str = r"next|new(?:er)?|forward|more";
const NEXT_WORD_JA: &str = r"次|新し";

/// Patterns of one direction and of its opposite.
struct DirectionPatterns {
    /// Glyphs at the start or end of the text
    sign: Regex,
    /// Any glyph of the opposite direction
    opposite_sign: Regex,
    /// A keyword near the start of the text
    word: Regex,
    /// Any keyword of the opposite direction
    opposite_word: Regex,
}

impl DirectionPatterns {
    fn build(direction: Direction) -> Self {
        let (sign, opposite_sign) = match direction {
            Direction::Prev => (PREV_SIGN, NEXT_SIGN),
            Direction::Next => (NEXT_SIGN, PREV_SIGN),
        };
        let ((en, ja), (opposite_en, opposite_ja)) = match direction {
            Direction::Prev => ((PREV_WORD_EN, PREV_WORD_JA), (NEXT_WORD_EN, NEXT_WORD_JA)),
            Direction::Next => ((NEXT_WORD_EN, NEXT_WORD_JA), (PREV_WORD_EN, PREV_WORD_JA)),
        };

        let compile = |pattern: String| Regex::new(&pattern).expect("valid scoring pattern");

        Self {
            sign: compile(format!("^(?:{sign})+|(?:{sign})+$")),
            opposite_sign: compile(opposite_sign.to_string()),
            word: compile(format!(
                r"(?i)(?:^|^[- 0-9A-Za-z_]{{0,10}}[-_ ])(?:{en})(?:$|[-_. ])|^(?:{ja})"
            )),
            opposite_word: compile(format!("(?i){opposite_en}|{opposite_ja}")),
        }
    }

    fn of(direction: Direction) -> &'static Self {
        static PREV: LazyLock<DirectionPatterns> =
            LazyLock::new(|| DirectionPatterns::build(Direction::Prev));
        static NEXT: LazyLock<DirectionPatterns> =
            LazyLock::new(|| DirectionPatterns::build(Direction::Next));

        match direction {
            Direction::Prev => &PREV,
            Direction::Next => &NEXT,
        }
    }
}

/// Remove the matched range and trim what is left.
fn cut(text: &str, start: usize, end: usize) -> String {
    format!("{}{}", &text[..start], &text[end..]).trim().to_string()
}

/// Scale weights so they sum to 1.
fn normalize<const N: usize>(weights: [f64; N]) -> [f64; N] {
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return [0.0; N];
    }
    weights.map(|w| w / total)
}

/// Scores anchor text for one direction.
pub struct TextScorer {
    direction: Direction,
    patterns: &'static DirectionPatterns,
    match_sign: f64,
    match_word: f64,
    no_opposite_word: f64,
    less_text: f64,
}

impl TextScorer {
    pub fn new(direction: Direction, weights: &TextWeights) -> Self {
        let [match_sign, match_word, no_opposite_word, less_text] = normalize([
            weights.match_sign,
            weights.match_word,
            weights.no_opposite_word,
            weights.less_text,
        ]);

        Self {
            direction,
            patterns: DirectionPatterns::of(direction),
            match_sign,
            match_word,
            no_opposite_word,
            less_text,
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Score in `[0, 1]`; 0 when the text shows no evidence of the direction.
    pub fn score(&self, text: &str) -> f64 {
        let patterns = self.patterns;
        let mut point = 0.0;
        let mut rest = text.trim().to_string();

        // Glyphs count only when none points the other way.
        if !patterns.opposite_sign.is_match(&rest) {
            if let Some(m) = patterns.sign.find(&rest) {
                point += self.match_sign;
                rest = cut(&rest, m.start(), m.end());
            }
        }

        if let Some(m) = patterns.word.find(&rest) {
            point += self.match_word;
            rest = cut(&rest, m.start(), m.end());

            if !patterns.opposite_word.is_match(&rest) {
                point += self.no_opposite_word;
            }
        }

        if point > 0.0 {
            let len = rest.chars().count();
            if len == 0 {
                point += self.less_text;
            } else if len < 10 {
                point += self.less_text * (1.0 - len as f64 / 10.0);
            }
        }

        point
    }
}

/// Scores how similar a candidate URL is to the current page URL.
pub struct UrlScorer {
    uri: UriView,
    path: String,
    tokens: Vec<String>,
    length_rate: f64,
    content_rate: f64,
}

impl UrlScorer {
    /// `uri` is the current page, usually parsed without its fragment.
    pub fn new(uri: &UriView, weights: &UrlWeights) -> Self {
        let [length_rate, content_rate] = normalize([weights.length_rate, weights.content_rate]);
        let path = unescape_url_chars(&uri.path);

        Self {
            uri: uri.clone(),
            tokens: tokenize(&path),
            path,
            length_rate,
            content_rate,
        }
    }

    /// Whether this scorer was built for the page `uri` points at.
    pub fn is_for(&self, uri: &UriView) -> bool {
        self.uri.is_same_page(&uri.spec)
    }

    /// Score in `[0, 1]`; 0 for other sites and for the same or root path.
    pub fn score(&self, url: &str) -> f64 {
        let url = unescape_url_chars(url);
        let Some(index) = url.find(&self.uri.pre_path) else {
            return 0.0;
        };

        let other = &url[index + self.uri.pre_path.len()..];
        if other.is_empty() || other == "/" || other == self.path {
            return 0.0;
        }

        let length = self.length_rate(other);
        let content = self.content_rate(other);

        length * self.length_rate + content * self.content_rate
    }

    fn length_rate(&self, other: &str) -> f64 {
        let a = self.path.chars().count() as f64;
        let b = other.chars().count() as f64;
        if a + b == 0.0 {
            return 0.0;
        }
        1.0 - (a - b).abs() / (a + b)
    }

    /// Share of the current path tokens found in `other`, each candidate
    /// token matching at most once.
    fn content_rate(&self, other: &str) -> f64 {
        if self.tokens.is_empty() {
            return 0.0;
        }

        let mut pool = tokenize(other);
        let mut matched = 0;
        for token in &self.tokens {
            if let Some(index) = pool.iter().position(|t| t == token) {
                pool.swap_remove(index);
                matched += 1;
            }
        }

        matched as f64 / self.tokens.len() as f64
    }
}

fn tokenize(path: &str) -> Vec<String> {
    path.split(['-', '_', '.', '/', '?', '#', '&', '='])
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Combined link scorer. Keeps one text scorer per direction and one URL
/// scorer per page, rebuilding them when either changes.
pub struct NaviLinkScorer {
    weights: ScoringConfig,
    text: Option<TextScorer>,
    url: Option<UrlScorer>,
}

impl NaviLinkScorer {
    pub fn new(weights: ScoringConfig) -> Self {
        Self {
            weights,
            text: None,
            url: None,
        }
    }

    /// Score of a link with anchor `text` pointing at `url`, seen from the
    /// page `uri`. Values below 1 are reported as 0.
    pub fn score(&mut self, uri: &UriView, direction: Direction, text: &str, url: &str) -> f64 {
        let text_scorer = match self.text.take() {
            Some(scorer) if scorer.direction() == direction => scorer,
            _ => TextScorer::new(direction, &self.weights.text),
        };
        let url_scorer = match self.url.take() {
            Some(scorer) if scorer.is_for(uri) => scorer,
            _ => UrlScorer::new(uri, &self.weights.url),
        };

        let mut point = text_scorer.score(text);
        if point > 0.0 {
            point += url_scorer.score(url);
        }

        self.text = Some(text_scorer);
        self.url = Some(url_scorer);

        if point < 1.0 { 0.0 } else { point }
    }
}
