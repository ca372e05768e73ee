//! Search scenarios: the `[SEARCH]` section of a database INI file, one
//! group of `Item*N` keys per search prefix.

use crate::ini::{IniFile, IniSection};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchScenario {
    pub name: String,
    pub prefix: String,
    /// Dictionary type (0 plain, 1 with thesaurus, ...).
    pub dictionary_type: i32,
    /// Menu offered for the prefix.
    pub menu: Option<String>,
    pub correction: Option<String>,
    /// Right truncation allowed.
    pub truncation: bool,
    pub hint: Option<String>,
    pub mod_by_dic_auto: Option<String>,
    /// Allowed logical operators.
    pub logic: i32,
    pub advance: Option<String>,
    /// Format for the term list.
    pub format: Option<String>,
}

impl SearchScenario {
    /// Reads every scenario declared by `ItemNumb`; an INI file without a
    /// `[SEARCH]` section yields none.
    pub fn parse(ini: &IniFile) -> Vec<Self> {
        let Some(section) = ini.section(Some("SEARCH")) else {
            return Vec::new();
        };
        let count = int_value(section, "ItemNumb").max(0);
        (0..count).map(|i| Self::parse_item(section, i)).collect()
    }

    fn parse_item(section: &IniSection, index: i32) -> Self {
        let text = |key: &str| section.get(&format!("{key}{index}")).map(str::to_string);
        Self {
            name: text("ItemName").unwrap_or_default(),
            prefix: text("ItemPref").unwrap_or_default(),
            dictionary_type: int_value(section, &format!("ItemDictionType{index}")),
            menu: text("ItemMenu"),
            correction: text("ItemModByDic"),
            truncation: int_value(section, &format!("ItemTranc{index}")) != 0,
            hint: text("ItemHint"),
            mod_by_dic_auto: text("ItemModByDicAuto"),
            logic: int_value(section, &format!("ItemLogic{index}")),
            advance: text("ItemAdv"),
            format: text("ItemPft"),
        }
    }
}

/// Missing or non-numeric values read as 0.
fn int_value(section: &IniSection, key: &str) -> i32 {
    section
        .get(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(0)
}

impl fmt::Display for SearchScenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.prefix.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{} {}", self.name, self.prefix)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let ini = IniFile::parse(&[
            "[Main]",
            "Key=Value",
            "[SEARCH]",
            "ItemNumb=2",
            "ItemName0=Ключевые слова",
            "ItemPref0=K=",
            "ItemDictionType0=0",
            "ItemTranc0=1",
            "ItemLogic0=6",
            "ItemName1=Автор",
            "ItemPref1=A=",
            "ItemMenu1=author.mnu",
            "ItemPft1=@author",
        ]);
        let scenarios = SearchScenario::parse(&ini);
        assert_eq!(scenarios.len(), 2);
        assert_eq!(scenarios[0].prefix, "K=");
        assert!(scenarios[0].truncation);
        assert_eq!(scenarios[0].logic, 6);
        assert_eq!(scenarios[0].menu, None);
        assert!(!scenarios[1].truncation);
        assert_eq!(scenarios[1].menu.as_deref(), Some("author.mnu"));
        assert_eq!(scenarios[1].format.as_deref(), Some("@author"));
        assert_eq!(scenarios[1].to_string(), "Автор A=");
    }

    #[test]
    fn test_missing_section() {
        let ini = IniFile::parse(&["[Main]", "ItemNumb=3"]);
        assert!(SearchScenario::parse(&ini).is_empty());

        let ini = IniFile::parse(&["[SEARCH]", "ItemNumb=garbage"]);
        assert!(SearchScenario::parse(&ini).is_empty());
    }
}
