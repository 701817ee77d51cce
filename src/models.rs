use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String, // document id, or sha256 of local|startDate|title
    pub title: String,
    pub day: String,
    pub local: String,
    pub start_date: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<i64>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_order: Option<i64>,
}

/// Raw search document as stored in the hosted collection.
#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct EventDocument {
    #[serde(default)]
    pub id: Option<String>,
    pub title: String,
    pub day: String,
    pub local: String,
    pub start_date: i64,
    #[serde(default)]
    pub end_date: Option<i64>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub local_order: Option<i64>,
}

impl From<EventDocument> for Event {
    fn from(doc: EventDocument) -> Self {
        let id = match doc.id {
            Some(id) if !id.trim().is_empty() => id,
            _ => derive_id(&doc.local, doc.start_date, &doc.title),
        };
        Event {
            id,
            title: doc.title,
            day: doc.day,
            local: doc.local,
            start_date: doc.start_date,
            end_date: doc.end_date,
            kind: doc.kind,
            local_order: doc.local_order,
        }
    }
}

fn derive_id(local: &str, start_date: i64, title: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(local.as_bytes());
    hasher.update(b"|");
    hasher.update(start_date.to_string().as_bytes());
    hasher.update(b"|");
    hasher.update(title.as_bytes());
    format!("{:x}", hasher.finalize())
}
