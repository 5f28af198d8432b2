use crate::error::{Result, ThumbnailError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The five layout families. Closed on purpose: the renderer matches on it exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Template {
    Speed,
    Conversion,
    Comparison,
    Feature,
    Trust,
}

impl Template {
    pub const ALL: [Template; 5] = [
        Template::Speed,
        Template::Conversion,
        Template::Comparison,
        Template::Feature,
        Template::Trust,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Template::Speed => "speed",
            Template::Conversion => "conversion",
            Template::Comparison => "comparison",
            Template::Feature => "feature",
            Template::Trust => "trust",
        }
    }

    /// Whether the layout has a slot for `metric`. Trust draws a shield instead.
    pub fn shows_metric(&self) -> bool {
        !matches!(self, Template::Trust)
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Template {
    type Err = ThumbnailError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "speed" => Ok(Template::Speed),
            "conversion" => Ok(Template::Conversion),
            "comparison" => Ok(Template::Comparison),
            "feature" => Ok(Template::Feature),
            "trust" => Ok(Template::Trust),
            other => Err(ThumbnailError::RenderError(format!(
                "unknown template '{}'",
                other
            ))),
        }
    }
}

/// Fully resolved description of one thumbnail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThumbnailConfig {
    pub template: Template,
    /// `\n` splits the headline into two rendered lines.
    pub headline: String,
    #[serde(default)]
    pub subtext: String,
    #[serde(default)]
    pub metric: String,
    #[serde(default)]
    pub metric_label: String,
}

impl ThumbnailConfig {
    pub fn new(template: Template, headline: impl Into<String>) -> Self {
        Self {
            template,
            headline: headline.into(),
            subtext: String::new(),
            metric: String::new(),
            metric_label: String::new(),
        }
    }

    pub fn with_subtext(mut self, subtext: impl Into<String>) -> Self {
        self.subtext = subtext.into();
        self
    }

    pub fn with_metric(mut self, metric: impl Into<String>, label: impl Into<String>) -> Self {
        self.metric = metric.into();
        self.metric_label = label.into();
        self
    }

    pub fn has_metric(&self) -> bool {
        !self.metric.trim().is_empty()
    }

    /// At most two lines. Anything after a second break marker is folded into line two.
    pub fn headline_lines(&self) -> Vec<String> {
        let mut parts = self
            .headline
            .split('\n')
            .map(str::trim)
            .filter(|line| !line.is_empty());
        let first = match parts.next() {
            Some(line) => line.to_string(),
            None => return Vec::new(),
        };
        let rest: Vec<&str> = parts.collect();
        if rest.is_empty() {
            vec![first]
        } else {
            vec![first, rest.join(" ")]
        }
    }
}

/// Output of a title classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub template: Template,
    pub headline: String,
    #[serde(default)]
    pub subtext: String,
    #[serde(default)]
    pub metric: String,
    #[serde(default)]
    pub metric_label: String,
    #[serde(default)]
    pub image_prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

impl Analysis {
    pub fn to_config(&self) -> ThumbnailConfig {
        ThumbnailConfig {
            template: self.template,
            headline: self.headline.clone(),
            subtext: self.subtext.clone(),
            metric: self.metric.clone(),
            metric_label: self.metric_label.clone(),
        }
    }
}

/// Caller-supplied partial config for full generation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThumbnailOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<Template>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtext: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric_label: Option<String>,
}

impl ThumbnailOverrides {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Field-by-field merge: a present override wins, an absent one falls through to the analysis.
    pub fn apply(&self, analysis: &Analysis) -> ThumbnailConfig {
        ThumbnailConfig {
            template: self.template.unwrap_or(analysis.template),
            headline: self
                .headline
                .clone()
                .unwrap_or_else(|| analysis.headline.clone()),
            subtext: self
                .subtext
                .clone()
                .unwrap_or_else(|| analysis.subtext.clone()),
            metric: self
                .metric
                .clone()
                .unwrap_or_else(|| analysis.metric.clone()),
            metric_label: self
                .metric_label
                .clone()
                .unwrap_or_else(|| analysis.metric_label.clone()),
        }
    }
}
