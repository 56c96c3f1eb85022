//! Rule-based decomposition of catalog titles into canonical part names.
//!
//! Every pattern is anchored at the start of the title. Rules for a category
//! are tried in order, so the more specific model grammars must come first.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::PartCategory;
use crate::utils::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Classification {
    Matched { name: String, brand: String },
    Unmatched,
}

/// A named pattern whose first capture group is the canonical name.
struct NameRule {
    label: &'static str,
    pattern: Regex,
}

impl NameRule {
    fn new(label: &'static str, pattern: &str) -> Result<Self> {
        Ok(Self {
            label,
            pattern: Regex::new(pattern)?,
        })
    }

    fn capture<'t>(&self, title: &'t str) -> Option<&'t str> {
        self.pattern.captures(title)?.get(1).map(|m| m.as_str())
    }
}

pub struct TitleClassifier {
    cpu_rules: Vec<NameRule>,
    cpu_brand: Regex,
    leading_brand: Regex,
}

impl TitleClassifier {
    pub fn new() -> Result<Self> {
        let cpu_rules = vec![
            NameRule::new("threadripper", r"^(AMD Ryzen Threadripper(?: PRO)? \w+)")?,
            NameRule::new("core-ultra", r"^(Intel Core Ultra \d+ \w+)")?,
            NameRule::new("core-i", r"^(Intel Core i\d+-\d+\w*)")?,
            NameRule::new("ryzen", r"^(AMD Ryzen \d(?: PRO)? \w+)")?,
            NameRule::new("pentium", r"^(Intel Pentium \w+)")?,
            NameRule::new("celeron", r"^(Intel Celeron \w+)")?,
            NameRule::new("athlon", r"^(AMD Athlon \w+)")?,
        ];

        Ok(Self {
            cpu_rules,
            cpu_brand: Regex::new(r"^(AMD|Intel)\b")?,
            leading_brand: Regex::new(r"(?i)^(?:(?:Refurbished|Open Box)\s+)?(\w+)")?,
        })
    }

    pub fn classify(&self, category: PartCategory, raw_title: &str) -> Classification {
        let title = raw_title.trim();
        if title.is_empty() {
            return Classification::Unmatched;
        }

        match category {
            PartCategory::Cpu => self.classify_cpu(title),
            PartCategory::Gpu | PartCategory::Motherboard => self.classify_by_leading_brand(title),
        }
    }

    fn classify_cpu(&self, title: &str) -> Classification {
        let Some((rule, name)) = self
            .cpu_rules
            .iter()
            .find_map(|rule| rule.capture(title).map(|name| (rule, name)))
        else {
            return Classification::Unmatched;
        };

        let Some(brand) = self.cpu_brand.captures(title).and_then(|c| c.get(1)) else {
            return Classification::Unmatched;
        };

        tracing::trace!(rule = rule.label, name, "CPU title matched");
        Classification::Matched {
            name: name.to_string(),
            brand: brand.as_str().to_string(),
        }
    }

    // The full title stands in as the name until these categories get model grammars.
    fn classify_by_leading_brand(&self, title: &str) -> Classification {
        match self.leading_brand.captures(title).and_then(|c| c.get(1)) {
            Some(brand) => Classification::Matched {
                name: title.to_string(),
                brand: brand.as_str().to_string(),
            },
            None => Classification::Unmatched,
        }
    }
}
