//! Derives the competitor number shown on the right half of the comparison layout.
//!
//! The left panel always carries the product's metric; the right panel gets a
//! number that reads as worse in the same unit.

/// How the two metrics should be read against each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Durations: smaller is better.
    LowerIsBetter,
    /// Percentages, multipliers, money: larger is better.
    HigherIsBetter,
    /// Not numeric; the captions carry the meaning.
    Qualitative,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricComparison {
    pub ours: String,
    pub theirs: String,
    pub direction: Direction,
    ours_value: Option<f64>,
    theirs_value: Option<f64>,
}

const DURATION_FACTOR: f64 = 10.0;
const SHARE_DIVISOR: f64 = 4.0;

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.1}", value)
    }
}

fn plural_unit(unit: &str) -> Option<&'static str> {
    match unit {
        "S" | "SEC" | "SECS" | "SECOND" | "SECONDS" => Some("SEC"),
        "M" | "MIN" | "MINS" | "MINUTE" | "MINUTES" => Some("MIN"),
        "H" | "HR" | "HRS" | "HOUR" | "HOURS" => Some("HRS"),
        "D" | "DAY" | "DAYS" => Some("DAYS"),
        "WK" | "WKS" | "WEEK" | "WEEKS" => Some("WKS"),
        _ => None,
    }
}

/// Splits "2.5 MIN" into (2.5, "MIN"); the number must lead.
fn split_number(text: &str) -> Option<(f64, &str)> {
    let end = text
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == ','))
        .unwrap_or(text.len());
    if end == 0 {
        return None;
    }
    let value: f64 = text[..end].replace(',', "").parse().ok()?;
    Some((value, text[end..].trim()))
}

impl MetricComparison {
    pub fn from_metric(metric: &str) -> Self {
        let ours = metric.trim().to_uppercase();
        Self::numeric(&ours).unwrap_or_else(|| Self::qualitative(ours))
    }

    fn numeric(ours: &str) -> Option<Self> {
        if let Some(rest) = ours.strip_prefix('$') {
            let (value, suffix) = split_number(rest)?;
            let theirs = (value / SHARE_DIVISOR).round();
            return Some(Self::higher(ours, format!("${}{}", format_number(theirs), suffix), value, theirs));
        }

        let (value, unit) = split_number(ours)?;
        if unit == "%" {
            let theirs = (value / SHARE_DIVISOR).round();
            return Some(Self::higher(ours, format!("{}%", format_number(theirs)), value, theirs));
        }
        if unit == "X" && value > 1.0 {
            return Some(Self::higher(ours, "1X".to_string(), value, 1.0));
        }
        let unit = plural_unit(unit)?;
        let theirs = value * DURATION_FACTOR;
        Some(MetricComparison {
            ours: format!("{} {}", format_number(value), unit),
            theirs: format!("{} {}", format_number(theirs), unit),
            direction: Direction::LowerIsBetter,
            ours_value: Some(value),
            theirs_value: Some(theirs),
        })
    }

    fn higher(ours: &str, theirs: String, ours_value: f64, theirs_value: f64) -> Self {
        MetricComparison {
            ours: ours.to_string(),
            theirs,
            direction: Direction::HigherIsBetter,
            ours_value: Some(ours_value),
            theirs_value: Some(theirs_value),
        }
    }

    fn qualitative(ours: String) -> Self {
        let ours = if ours.is_empty() { "FAST".to_string() } else { ours };
        MetricComparison {
            ours,
            theirs: "SLOW".to_string(),
            direction: Direction::Qualitative,
            ours_value: None,
            theirs_value: None,
        }
    }

    /// Whether the left (product) metric reads as the better number.
    pub fn ours_is_better(&self) -> bool {
        match (self.direction, self.ours_value, self.theirs_value) {
            (Direction::LowerIsBetter, Some(ours), Some(theirs)) => ours < theirs,
            (Direction::HigherIsBetter, Some(ours), Some(theirs)) => ours > theirs,
            (Direction::Qualitative, _, _) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations_grow_on_the_right() {
        let cmp = MetricComparison::from_metric("2 MIN");
        assert_eq!(cmp.ours, "2 MIN");
        assert_eq!(cmp.theirs, "20 MIN");
        assert_eq!(cmp.direction, Direction::LowerIsBetter);
        assert!(cmp.ours_is_better());

        let singular = MetricComparison::from_metric("1 hr");
        assert_eq!(singular.theirs, "10 HRS");
    }

    #[test]
    fn percentages_shrink_on_the_right() {
        let cmp = MetricComparison::from_metric("60%");
        assert_eq!(cmp.theirs, "15%");
        assert!(cmp.ours_is_better());
    }

    #[test]
    fn multipliers_and_money() {
        let cmp = MetricComparison::from_metric("3X");
        assert_eq!(cmp.theirs, "1X");
        assert!(cmp.ours_is_better());

        let money = MetricComparison::from_metric("$50K");
        assert_eq!(money.theirs, "$13K");
        assert!(money.ours_is_better());
    }

    #[test]
    fn unparseable_or_empty_is_qualitative() {
        let empty = MetricComparison::from_metric("");
        assert_eq!((empty.ours.as_str(), empty.theirs.as_str()), ("FAST", "SLOW"));
        assert!(empty.ours_is_better());

        let word = MetricComparison::from_metric("instant");
        assert_eq!(word.ours, "INSTANT");
        assert_eq!(word.direction, Direction::Qualitative);

        let odd_unit = MetricComparison::from_metric("5 CARRIERS");
        assert_eq!(odd_unit.direction, Direction::Qualitative);
    }
}
