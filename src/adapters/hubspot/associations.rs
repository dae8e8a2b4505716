//! Associations API (v4) for records fetched by id

use super::connector::HubspotConnector;
use crate::connector::Association;
use crate::error::Result;
use crate::jsonquery::JsonQuery;
use crate::read::RowAssociations;
use crate::types::{scalar_to_string, JsonValue, Record};
use serde_json::json;
use std::collections::HashMap;
use tracing::debug;

/// `{"toObjectId": 9, "associationTypes": [{"typeId": 1, "label": null}]}`
fn association(item: &Record) -> Option<Association> {
    let object_id = item.get("toObjectId").and_then(scalar_to_string)?;
    let association_type = item
        .get("associationTypes")
        .and_then(JsonValue::as_array)
        .and_then(|types| types.first())
        .and_then(|first| {
            first
                .get("label")
                .and_then(scalar_to_string)
                .or_else(|| first.get("typeId").and_then(scalar_to_string))
        });
    Some(Association {
        object_id,
        association_type,
        raw: Some(item.clone()),
    })
}

impl HubspotConnector {
    /// Associated records of `ids`, keyed by the id they belong to
    pub(super) async fn fetch_associations(
        &self,
        object: &str,
        ids: &[String],
        associated: &[String],
    ) -> Result<HashMap<String, RowAssociations>> {
        let inputs: Vec<JsonValue> = ids.iter().map(|id| json!({ "id": id })).collect();
        let mut by_id: HashMap<String, RowAssociations> = HashMap::new();

        for to in associated {
            let url = self
                .base()
                .root_url(&["crm", "v4", "associations", object, to, "batch", "read"])?
                .to_string();
            let response = self
                .base()
                .json()
                .post(&url, &json!({ "inputs": inputs }))
                .await?;
            let Some(body) = response.body()? else {
                continue;
            };

            let results = JsonQuery::new(body).records_at("results")?;
            debug!(object, to = %to, results = results.len(), "HubSpot associations");
            for result in results {
                let Some(from) = result
                    .get("from")
                    .and_then(|from| from.get("id"))
                    .and_then(scalar_to_string)
                else {
                    continue;
                };
                let associations = result
                    .get("to")
                    .and_then(JsonValue::as_array)
                    .map(|items| {
                        items
                            .iter()
                            .filter_map(JsonValue::as_object)
                            .filter_map(association)
                            .collect()
                    })
                    .unwrap_or_default();
                by_id.entry(from).or_default().insert(to.clone(), associations);
            }
        }
        Ok(by_id)
    }
}
