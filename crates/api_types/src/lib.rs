//! Wire types shared by the server and the synchronizing client.
//!
//! The JSON casing (camelCase) and the cost `type` field match the HTTP
//! surface the existing web client already speaks; do not rename fields
//! without versioning the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Generic acknowledgement for mutation endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct Ack {
    pub ok: bool,
}

pub mod ride {
    use super::*;
    use uuid::Uuid;

    /// Participant list as transmitted on the wire.
    ///
    /// The backing column stores a serialized list and older backends
    /// returned it as a JSON-encoded string rather than a native array.
    /// Deserialization accepts a native list, an encoded string, or `null`,
    /// always yielding a plain list.
    #[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
    #[serde(transparent)]
    pub struct ParticipantIds(pub Vec<String>);

    impl From<Vec<String>> for ParticipantIds {
        fn from(ids: Vec<String>) -> Self {
            Self(ids)
        }
    }

    impl<'de> Deserialize<'de> for ParticipantIds {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: Deserializer<'de>,
        {
            #[derive(Deserialize)]
            #[serde(untagged)]
            enum Raw {
                List(Vec<String>),
                Encoded(String),
                Other(serde_json::Value),
            }

            Ok(match Raw::deserialize(deserializer)? {
                Raw::List(ids) => Self(ids),
                Raw::Encoded(text) => {
                    Self(serde_json::from_str::<Vec<String>>(&text).unwrap_or_default())
                }
                // null or any other malformed shape: default to empty.
                Raw::Other(_) => Self::default(),
            })
        }
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RideView {
        pub id: Uuid,
        pub user_id: String,
        #[serde(default)]
        pub participant_ids: ParticipantIds,
        pub start_km: f64,
        pub end_km: Option<f64>,
        pub started_at: DateTime<Utc>,
        pub ended_at: Option<DateTime<Utc>>,
        #[serde(default)]
        pub end_lat: Option<f64>,
        #[serde(default)]
        pub end_lng: Option<f64>,
    }

    /// Request body for `POST /api/rides` (opens a ride).
    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RideNew {
        pub id: Uuid,
        pub user_id: String,
        #[serde(default)]
        pub participant_ids: ParticipantIds,
        pub start_km: f64,
        pub started_at: DateTime<Utc>,
    }

    /// Request body for `PUT /api/rides/{id}`.
    ///
    /// All fields optional; used both to close an open ride and to backfill
    /// the end location. Lifecycle fields (initiator, participants, start
    /// time) are fixed at creation and ignored if re-sent.
    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RideUpdate {
        #[serde(default)]
        pub user_id: Option<String>,
        #[serde(default)]
        pub participant_ids: Option<ParticipantIds>,
        #[serde(default)]
        pub start_km: Option<f64>,
        #[serde(default)]
        pub end_km: Option<f64>,
        #[serde(default)]
        pub started_at: Option<DateTime<Utc>>,
        #[serde(default)]
        pub ended_at: Option<DateTime<Utc>>,
        #[serde(default)]
        pub end_lat: Option<f64>,
        #[serde(default)]
        pub end_lng: Option<f64>,
    }
}

pub mod cost {
    use super::*;
    use uuid::Uuid;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "UPPERCASE")]
    pub enum CostKind {
        Fuel,
        Insurance,
        Other,
    }

    /// Request body for `POST /api/costs`.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CostNew {
        pub id: Uuid,
        pub user_id: String,
        pub amount: f64,
        #[serde(rename = "type")]
        pub kind: CostKind,
        #[serde(default)]
        pub description: Option<String>,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CostView {
        pub id: Uuid,
        pub user_id: String,
        pub amount: f64,
        #[serde(rename = "type")]
        pub kind: CostKind,
        #[serde(default)]
        pub description: Option<String>,
        pub created_at: DateTime<Utc>,
    }
}

pub mod wear {
    use super::*;
    use uuid::Uuid;

    /// Request body for `POST /api/wear-payments`.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct WearPaymentNew {
        pub id: Uuid,
        pub user_id: String,
        pub amount: f64,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct WearPaymentView {
        pub id: Uuid,
        pub user_id: String,
        pub amount: f64,
        pub created_at: DateTime<Utc>,
    }
}

pub mod state {
    use super::*;
    use crate::{cost::CostView, ride::RideView, wear::WearPaymentView};

    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ConfigView {
        pub wear_rate_per_km: f64,
    }

    /// Response body of `GET /api/state`: the full snapshot.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct StateView {
        #[serde(default)]
        pub rides: Vec<RideView>,
        #[serde(default)]
        pub costs: Vec<CostView>,
        #[serde(default)]
        pub wear_payments: Vec<WearPaymentView>,
        pub config: ConfigView,
    }
}

pub mod ocr {
    use super::*;

    /// Request body for `POST /api/odometer-ocr`.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct OcrRequest {
        /// JPEG bytes, base64-encoded without a `data:` prefix.
        pub image_data: String,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct OcrResponse {
        /// The odometer reading, or `null` when no digits were recognized
        /// (which is a successful result, not a failure).
        pub value: Option<f64>,
        pub raw_text: String,
        pub digits_only: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub message: Option<String>,
    }
}

#[cfg(test)]
mod tests {
    use super::ride::{ParticipantIds, RideNew};

    #[test]
    fn participant_ids_accept_native_list() {
        let ids: ParticipantIds = serde_json::from_str(r#"["jeroen","stijn"]"#).unwrap();
        assert_eq!(ids.0, ["jeroen", "stijn"]);
    }

    #[test]
    fn participant_ids_accept_encoded_string() {
        let ids: ParticipantIds = serde_json::from_str(r#""[\"silke\"]""#).unwrap();
        assert_eq!(ids.0, ["silke"]);
    }

    #[test]
    fn participant_ids_accept_null_and_garbage_strings() {
        let ids: ParticipantIds = serde_json::from_str("null").unwrap();
        assert!(ids.0.is_empty());
        let ids: ParticipantIds = serde_json::from_str(r#""not json""#).unwrap();
        assert!(ids.0.is_empty());
    }

    #[test]
    fn ride_new_defaults_participants_when_missing() {
        let ride: RideNew = serde_json::from_str(
            r#"{"id":"8b5c0c43-35a2-4f5e-9a5c-0e6f0a3c1de2","userId":"jeroen","startKm":12345,"startedAt":"2026-08-07T10:00:00Z"}"#,
        )
        .unwrap();
        assert!(ride.participant_ids.0.is_empty());
        assert_eq!(ride.start_km, 12345.0);
    }

    #[test]
    fn cost_kind_uses_the_wire_field_name() {
        let json = r#"{"id":"8b5c0c43-35a2-4f5e-9a5c-0e6f0a3c1de2","userId":"jeroen","amount":60.0,"type":"FUEL","createdAt":"2026-08-07T10:00:00Z"}"#;
        let cost: super::cost::CostNew = serde_json::from_str(json).unwrap();
        assert_eq!(cost.kind, super::cost::CostKind::Fuel);
        let back = serde_json::to_string(&cost).unwrap();
        assert!(back.contains(r#""type":"FUEL""#));
    }

    #[test]
    fn config_serializes_camel_case() {
        let config = super::state::ConfigView {
            wear_rate_per_km: 0.2,
        };
        assert_eq!(
            serde_json::to_string(&config).unwrap(),
            r#"{"wearRatePerKm":0.2}"#
        );
    }
}
