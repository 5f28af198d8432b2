//! Rule-based title analysis.
//!
//! Runs on every preview keystroke, so it has to be instant and total: any
//! string, including whitespace, produces a renderable [`Analysis`].

use super::TitleClassifier;
use crate::{
    brand::BrandConfig,
    error::Result,
    models::{Analysis, Template},
};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

const WRAP_THRESHOLD: usize = 18;
const MAX_HEADLINE_CHARS: usize = 48;

const SPEED_WORDS: &[&str] = &[
    "fast", "faster", "fastest", "speed", "quick", "quicker", "quickly", "instant", "instantly",
    "seconds", "minutes", "hours", "slow", "wait", "waiting", "time", "rapid", "automate",
    "automation",
];
const CONVERSION_WORDS: &[&str] = &[
    "convert", "conversion", "conversions", "close", "closing", "win", "winning", "sales",
    "revenue", "lead", "leads", "deal", "deals", "lose", "losing", "lost", "miss", "missed",
    "roi", "grow", "growth", "retention", "sell", "book",
];
const TRUST_WORDS: &[&str] = &[
    "secure", "security", "trust", "trusted", "compliance", "compliant", "reliable", "safe",
    "safety", "privacy", "protect", "protected", "guarantee", "audit", "encrypted", "soc",
];
const FEATURE_WORDS: &[&str] = &[
    "feature", "features", "new", "introducing", "how", "guide", "integration", "integrations",
    "tool", "tools", "update", "launch", "meet", "workflow", "tips",
];
const LABEL_STOPWORDS: &[&str] = &[
    "a", "an", "the", "of", "to", "in", "on", "for", "and", "or", "with", "by", "at", "is",
];

static PERCENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*%").unwrap());
static DURATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(\d+(?:\.\d+)?)\s*(seconds?|secs?|minutes?|mins?|hours?|hrs?|days?|weeks?)\b")
        .unwrap()
});
static MULTIPLIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d+(?:\.\d+)?)\s*x\b").unwrap());
static MONEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\$\s?(\d[\d,]*(?:\.\d+)?)\s*([kmb])?\b").unwrap());
static VERSUS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s+(?:vs\.?|versus|compared\s+to)\s+").unwrap()
});
static ALTERNATIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\balternatives?\s+to\s+").unwrap());
static FOLLOWING_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*([A-Za-z]+)").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MetricKind {
    Percent,
    Duration,
    Multiplier,
    Money,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct DetectedMetric {
    kind: MetricKind,
    text: String,
    /// Byte offset just past the match, used to find the caption word.
    end: usize,
    start: usize,
}

fn duration_unit(raw: &str, singular: bool) -> &'static str {
    let unit = raw.to_ascii_lowercase();
    match unit.chars().next() {
        Some('s') => "SEC",
        Some('m') => "MIN",
        Some('h') if singular => "HR",
        Some('h') => "HRS",
        Some('d') if singular => "DAY",
        Some('d') => "DAYS",
        _ if singular => "WK",
        _ => "WKS",
    }
}

/// Earliest numeric claim in the title, normalized for display.
fn detect_metric(title: &str) -> Option<DetectedMetric> {
    let mut found = Vec::new();

    if let Some(caps) = PERCENT.captures(title) {
        let whole = caps.get(0)?;
        found.push(DetectedMetric {
            kind: MetricKind::Percent,
            text: format!("{}%", &caps[1]),
            start: whole.start(),
            end: whole.end(),
        });
    }
    if let Some(caps) = DURATION.captures(title) {
        let whole = caps.get(0)?;
        let value = &caps[1];
        found.push(DetectedMetric {
            kind: MetricKind::Duration,
            text: format!("{} {}", value, duration_unit(&caps[2], value == "1")),
            start: whole.start(),
            end: whole.end(),
        });
    }
    if let Some(caps) = MULTIPLIER.captures(title) {
        let whole = caps.get(0)?;
        found.push(DetectedMetric {
            kind: MetricKind::Multiplier,
            text: format!("{}X", &caps[1]),
            start: whole.start(),
            end: whole.end(),
        });
    }
    if let Some(caps) = MONEY.captures(title) {
        let whole = caps.get(0)?;
        let suffix = caps
            .get(2)
            .map(|m| m.as_str().to_ascii_uppercase())
            .unwrap_or_default();
        found.push(DetectedMetric {
            kind: MetricKind::Money,
            text: format!("${}{}", &caps[1], suffix),
            start: whole.start(),
            end: whole.end(),
        });
    }

    found.into_iter().min_by_key(|metric| metric.start)
}

/// The word right after the metric ("60% faster" → "FASTER"), unless it is filler.
fn caption_after(title: &str, metric: &DetectedMetric) -> Option<String> {
    let rest = title.get(metric.end..)?;
    let word = FOLLOWING_WORD.captures(rest)?.get(1)?.as_str();
    if LABEL_STOPWORDS.contains(&word.to_ascii_lowercase().as_str()) {
        return None;
    }
    Some(word.to_uppercase())
}

fn words(title: &str) -> Vec<String> {
    title
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn score(words: &[String], list: &[&str]) -> u32 {
    words.iter().filter(|w| list.contains(&w.as_str())).count() as u32
}

fn pick_template(title: &str, metric: Option<&DetectedMetric>) -> Template {
    let words = words(title);
    let mut speed = score(&words, SPEED_WORDS);
    let mut conversion = score(&words, CONVERSION_WORDS);
    let trust = score(&words, TRUST_WORDS);
    let feature = score(&words, FEATURE_WORDS);

    match metric.map(|m| m.kind) {
        Some(MetricKind::Duration) => speed += 2,
        Some(MetricKind::Money) => conversion += 2,
        Some(MetricKind::Percent) | Some(MetricKind::Multiplier) => {
            if conversion > speed {
                conversion += 1;
            } else {
                speed += 1;
            }
        }
        None => {}
    }

    // Ties resolve in this order.
    let ranked = [
        (Template::Speed, speed),
        (Template::Conversion, conversion),
        (Template::Trust, trust),
        (Template::Feature, feature),
    ];
    let best = ranked.iter().map(|(_, s)| *s).max().unwrap_or(0);
    if best == 0 {
        return Template::Feature;
    }
    ranked
        .iter()
        .find(|(_, s)| *s == best)
        .map(|(t, _)| *t)
        .unwrap_or(Template::Feature)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate_words(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out = String::new();
    for word in text.split(' ') {
        let next_len = out.chars().count() + word.chars().count() + 1;
        if next_len > max_chars.saturating_sub(3) {
            break;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    if out.is_empty() {
        out = text.chars().take(max_chars.saturating_sub(3)).collect();
    }
    out.push_str("...");
    out
}

/// Breaks long headlines at the space closest to the middle.
fn wrap_headline(text: &str) -> String {
    let text = truncate_words(text, MAX_HEADLINE_CHARS);
    if text.chars().count() <= WRAP_THRESHOLD {
        return text;
    }
    let middle = text.len() / 2;
    let split = text
        .match_indices(' ')
        .map(|(i, _)| i)
        .min_by_key(|i| i.abs_diff(middle));
    match split {
        Some(i) => format!("{}\n{}", &text[..i], &text[i + 1..]),
        None => text,
    }
}

fn comparison_sides(title: &str, brand_name: &str) -> Option<(String, String)> {
    if let Some(m) = VERSUS.find(title) {
        let left = collapse_whitespace(&title[..m.start()]);
        let right = collapse_whitespace(&title[m.end()..]);
        // The brand always takes the left panel.
        if right.eq_ignore_ascii_case(brand_name) {
            return Some((right, left));
        }
        return Some((left, right));
    }
    if let Some(m) = ALTERNATIVE.find(title) {
        let right = collapse_whitespace(&title[m.end()..]);
        return Some((brand_name.to_string(), right));
    }
    None
}

fn subtext_for(template: Template) -> &'static str {
    match template {
        Template::Speed => "Quote in seconds, not hours",
        Template::Conversion => "Stop losing deals to slow quotes",
        Template::Comparison => "See the difference side by side",
        Template::Feature => "Built for independent agencies",
        Template::Trust => "Secure, compliant and carrier-ready",
    }
}

fn default_label_for(template: Template) -> &'static str {
    match template {
        Template::Speed => "FASTER",
        Template::Conversion => "MORE DEALS",
        Template::Comparison => "",
        Template::Feature => "NEW",
        Template::Trust => "",
    }
}

fn image_prompt_for(template: Template, topic: &str) -> String {
    let scene = match template {
        Template::Speed => "Abstract motion blur light streaks racing across a dark emerald background, cinematic lighting, shallow depth of field",
        Template::Conversion => "Modern insurance agency office at night, a glowing green upward trending chart on a large monitor, dramatic lighting",
        Template::Comparison => "Split composition, left side a bright clean workspace in emerald tones, right side a dim cluttered office with paper stacks",
        Template::Feature => "Sleek laptop showing a clean dashboard interface on a dark desk, soft emerald rim light, product photography",
        Template::Trust => "Glowing emerald shield made of light over a dark abstract network background, calm and secure mood",
    };
    if topic.is_empty() {
        format!("{}. No text, no logos.", scene)
    } else {
        format!("{}. Theme: {}. No text, no logos.", scene, topic)
    }
}

/// Heuristic analysis using the default brand name.
pub fn heuristic_analysis(title: &str) -> Analysis {
    analyze(title, &BrandConfig::default().brand_name)
}

fn analyze(title: &str, brand_name: &str) -> Analysis {
    let topic = collapse_whitespace(title);
    let metric = detect_metric(&topic);

    let (template, headline) = match comparison_sides(&topic, brand_name) {
        Some((left, right)) => {
            let left = if left.is_empty() { brand_name.to_string() } else { left };
            let right = if right.is_empty() {
                "THE OLD WAY".to_string()
            } else {
                right
            };
            let headline = format!(
                "{} VS\n{}",
                truncate_words(&left.to_uppercase(), MAX_HEADLINE_CHARS / 2),
                truncate_words(&right.to_uppercase(), MAX_HEADLINE_CHARS / 2)
            );
            (Template::Comparison, headline)
        }
        None => {
            let template = pick_template(&topic, metric.as_ref());
            let headline = if topic.is_empty() {
                brand_name.to_uppercase()
            } else {
                wrap_headline(&topic.to_uppercase())
            };
            (template, headline)
        }
    };

    let (metric_text, metric_label) = match (&metric, template.shows_metric()) {
        (Some(found), true) => {
            let label = caption_after(&topic, found)
                .unwrap_or_else(|| default_label_for(template).to_string());
            (found.text.clone(), label)
        }
        _ => (String::new(), String::new()),
    };

    Analysis {
        template,
        headline,
        subtext: subtext_for(template).to_string(),
        metric: metric_text,
        metric_label,
        image_prompt: image_prompt_for(template, &topic),
        reasoning: None,
    }
}

/// [`TitleClassifier`] over the rule set. Never fails.
#[derive(Debug, Clone)]
pub struct HeuristicClassifier {
    brand_name: String,
}

impl HeuristicClassifier {
    pub fn new(brand_name: impl Into<String>) -> Self {
        Self {
            brand_name: brand_name.into(),
        }
    }

    pub fn analyze(&self, title: &str) -> Analysis {
        analyze(title, &self.brand_name)
    }
}

impl Default for HeuristicClassifier {
    fn default() -> Self {
        Self::new(BrandConfig::default().brand_name)
    }
}

#[async_trait]
impl TitleClassifier for HeuristicClassifier {
    fn name(&self) -> &str {
        "heuristic"
    }

    async fn classify(&self, title: &str) -> Result<Analysis> {
        Ok(self.analyze(title))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_with_speed_word_picks_speed() {
        let analysis = heuristic_analysis("60% faster quoting");
        assert_eq!(analysis.template, Template::Speed);
        assert_eq!(analysis.metric, "60%");
        assert_eq!(analysis.metric_label, "FASTER");
        assert_eq!(analysis.headline, "60% FASTER QUOTING");
        assert!(analysis.reasoning.is_none());
    }

    #[test]
    fn versus_picks_comparison() {
        let analysis = heuristic_analysis("Quotely vs Applied Systems");
        assert_eq!(analysis.template, Template::Comparison);
        assert_eq!(analysis.headline, "QUOTELY VS\nAPPLIED SYSTEMS");
    }

    #[test]
    fn brand_named_second_moves_left() {
        let analysis = heuristic_analysis("Applied Systems vs Quotely");
        assert_eq!(analysis.template, Template::Comparison);
        assert_eq!(analysis.headline, "QUOTELY VS\nAPPLIED SYSTEMS");
    }

    #[test]
    fn alternative_to_puts_brand_on_the_left() {
        let analysis = heuristic_analysis("The best alternative to EZLynx");
        assert_eq!(analysis.template, Template::Comparison);
        assert_eq!(analysis.headline, "QUOTELY VS\nEZLYNX");
    }

    #[test]
    fn duration_is_normalized() {
        let analysis = heuristic_analysis("Quote home insurance in 24 seconds");
        assert_eq!(analysis.template, Template::Speed);
        assert_eq!(analysis.metric, "24 SEC");

        let one = heuristic_analysis("Bind a policy in 1 hour");
        assert_eq!(one.metric, "1 HR");
    }

    #[test]
    fn money_and_sales_pick_conversion() {
        let analysis = heuristic_analysis("How agencies add $50k in revenue by closing more leads");
        assert_eq!(analysis.template, Template::Conversion);
        assert_eq!(analysis.metric, "$50K");
        // "in" is filler, so the template default is used.
        assert_eq!(analysis.metric_label, "MORE DEALS");
    }

    #[test]
    fn security_picks_trust_without_metric() {
        let analysis = heuristic_analysis("Is your quoting tool secure and compliant? 99% of agents never ask");
        assert_eq!(analysis.template, Template::Trust);
        assert!(analysis.metric.is_empty());
        assert!(analysis.metric_label.is_empty());
    }

    #[test]
    fn no_signal_defaults_to_feature() {
        let analysis = heuristic_analysis("Our spring release");
        assert_eq!(analysis.template, Template::Feature);
        assert!(analysis.metric.is_empty());
    }

    #[test]
    fn long_titles_wrap_to_two_lines() {
        let analysis = heuristic_analysis("Why independent agents are switching their quoting software this year");
        let lines: Vec<&str> = analysis.headline.split('\n').collect();
        assert_eq!(lines.len(), 2);
        assert!(analysis.headline.chars().count() <= MAX_HEADLINE_CHARS + 1);
    }

    #[test]
    fn any_input_yields_a_renderable_analysis() {
        let inputs = [
            " ",
            "?",
            "vs",
            " vs ",
            "%%%",
            "$",
            "1x",
            "ñandú 🚀 über",
            "a".repeat(500).as_str(),
            "100% 2 minutes 3x $4m versus",
        ]
        .map(|s| s.to_string());
        for input in inputs {
            let analysis = heuristic_analysis(&input);
            assert!(Template::ALL.contains(&analysis.template), "input {:?}", input);
            assert!(!analysis.headline.trim().is_empty(), "input {:?}", input);
            assert!(!analysis.image_prompt.is_empty());
        }
    }

    #[test]
    fn deterministic() {
        let title = "Cut quote time by 80% with automation";
        assert_eq!(heuristic_analysis(title), heuristic_analysis(title));
    }

    #[tokio::test]
    async fn classifier_trait_never_fails() {
        let classifier = HeuristicClassifier::new("Acme");
        let analysis = classifier.classify("").await.unwrap();
        assert_eq!(analysis.headline, "ACME");
        assert_eq!(classifier.name(), "heuristic");
    }
}
