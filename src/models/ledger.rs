use super::amount;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 资金流向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Credit,
    Debit,
}

/// 账本条目 (一次资金进出)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    #[serde(default)]
    pub id: String,
    #[serde(deserialize_with = "amount::date")]
    pub date: DateTime<Utc>,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    #[serde(default, deserialize_with = "amount::lenient")]
    pub amount: BigDecimal,
    /// 仅当资金可归属到具体往来方时存在
    #[serde(default, deserialize_with = "amount::opaque_text")]
    pub party_name: Option<String>,
}

impl LedgerEntry {
    /// 往来方名称非空 (去除首尾空白后)
    pub fn has_party(&self) -> bool {
        self.party_name
            .as_deref()
            .map(|name| !name.trim().is_empty())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_entry_and_party() {
        let entry: LedgerEntry = serde_json::from_value(json!({
            "id": "l-1",
            "date": "2024-05-10",
            "type": "credit",
            "amount": "500",
            "partyName": "  "
        }))
        .unwrap();

        assert_eq!(entry.entry_type, EntryType::Credit);
        assert_eq!(entry.amount, BigDecimal::from(500));
        assert!(!entry.has_party());
    }

    #[test]
    fn rejects_unknown_type() {
        let result = serde_json::from_value::<LedgerEntry>(json!({
            "date": "2024-05-10",
            "type": "transfer",
            "amount": 10
        }));
        assert!(result.is_err());
    }
}
