//! Metric records attached to a playbook

use serde::{Deserialize, Serialize};

/// Maximum number of metrics a playbook can carry.
pub const MAX_METRICS: usize = 4;

/// Kind of target a metric measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricType {
    /// Target is a number of milliseconds, displayed as `dd:hh:mm`
    Duration,
    /// Target is a whole number of dollars
    Currency,
    /// Target is a plain count
    Integer,
}

impl MetricType {
    /// Order in which the add menu offers the types.
    pub const ALL: [MetricType; 3] = [MetricType::Duration, MetricType::Currency, MetricType::Integer];

    pub fn title(&self) -> &'static str {
        match self {
            MetricType::Duration => "Duration (in dd:hh:mm)",
            MetricType::Currency => "Dollars",
            MetricType::Integer => "Integer",
        }
    }

    pub fn example(&self) -> &'static str {
        match self {
            MetricType::Duration => "e.g., Time to acknowledge, Time to resolve",
            MetricType::Currency => "e.g., Cost, Purchases",
            MetricType::Integer => "e.g., Resource count, Customers affected",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            MetricType::Duration => "⏱",
            MetricType::Currency => "$",
            MetricType::Integer => "#",
        }
    }

    /// Short lowercase name used by the command line and exports
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricType::Duration => "duration",
            MetricType::Currency => "currency",
            MetricType::Integer => "integer",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "duration" | "dur" | "time" => Some(MetricType::Duration),
            "currency" | "dollars" | "cost" | "$" => Some(MetricType::Currency),
            "integer" | "int" | "count" | "#" => Some(MetricType::Integer),
            _ => None,
        }
    }
}

/// A named, typed target value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metric {
    /// Empty until the enclosing application persists the metric
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub metric_type: MetricType,
    /// Milliseconds for durations, a count otherwise
    #[serde(default)]
    pub target: i64,
}

impl Metric {
    /// Blank, unsaved metric of the given type
    pub fn new(metric_type: MetricType) -> Self {
        Self {
            id: String::new(),
            title: String::new(),
            description: String::new(),
            metric_type,
            target: 0,
        }
    }

    pub fn is_persisted(&self) -> bool {
        !self.id.is_empty()
    }
}

/// The enclosing record that owns an ordered list of metrics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playbook {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub metrics: Vec<Metric>,
}

impl Playbook {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            title: title.into(),
            metrics: Vec::new(),
        }
    }

    /// Give every never-persisted metric an id. Returns how many were set.
    pub fn assign_missing_ids(&mut self, mut next_id: impl FnMut() -> String) -> usize {
        let mut assigned = 0;
        for metric in self.metrics.iter_mut().filter(|m| !m.is_persisted()) {
            metric.id = next_id();
            assigned += 1;
        }
        assigned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_metric_is_blank_draft() {
        let metric = Metric::new(MetricType::Duration);
        assert!(metric.id.is_empty());
        assert!(metric.title.is_empty());
        assert_eq!(metric.target, 0);
        assert!(!metric.is_persisted());
    }

    #[test]
    fn test_parse_metric_type_aliases() {
        assert_eq!(MetricType::parse("Duration"), Some(MetricType::Duration));
        assert_eq!(MetricType::parse("dollars"), Some(MetricType::Currency));
        assert_eq!(MetricType::parse(" int "), Some(MetricType::Integer));
        assert_eq!(MetricType::parse("percent"), None);
    }

    #[test]
    fn test_assign_missing_ids() {
        let mut playbook = Playbook::new("Outage");
        playbook.metrics.push(Metric {
            id: "kept".to_string(),
            ..Metric::new(MetricType::Integer)
        });
        playbook.metrics.push(Metric::new(MetricType::Currency));
        playbook.metrics.push(Metric::new(MetricType::Duration));

        let mut counter = 0;
        let assigned = playbook.assign_missing_ids(|| {
            counter += 1;
            format!("id-{counter}")
        });
        assert_eq!(assigned, 2);
        assert_eq!(playbook.metrics[0].id, "kept");
        assert_eq!(playbook.metrics[2].id, "id-2");
        assert_eq!(playbook.assign_missing_ids(|| "unused".to_string()), 0);
    }

    #[test]
    fn test_metric_json_shape() {
        let metric = Metric {
            id: "m1".to_string(),
            title: "Time to resolve".to_string(),
            description: String::new(),
            metric_type: MetricType::Duration,
            target: 60_000,
        };
        let json = serde_json::to_value(&metric).unwrap();
        assert_eq!(json["type"], "duration");
        assert_eq!(json["target"], 60_000);

        let back: Metric = serde_json::from_str(r#"{"title":"Cost","type":"currency"}"#).unwrap();
        assert_eq!(back.metric_type, MetricType::Currency);
        assert!(back.id.is_empty());
        assert_eq!(back.target, 0);
    }
}
