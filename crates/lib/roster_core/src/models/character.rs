//! Characters and their time-limited status flags.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

use crate::ParseError;
use crate::normalize::snake_case_keys;

/// Shared accessors for the per-kind status flag records.
pub trait StatusFlag {
    fn new(active: bool, expires_at: Option<DateTime<Utc>>) -> Self;
    fn active(&self) -> bool;
    fn expires_at(&self) -> Option<DateTime<Utc>>;

    /// Active and not yet expired at `now`.
    fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.active() && self.expires_at().is_none_or(|at| at > now)
    }
}

// Each flag carries its activation boolean under its own wire name
// (`has_apartment`, `has_pet`, ...), so every kind gets its own record type.
// Flags read either casing and always serialize as camelCase.
macro_rules! status_flag {
    ($(#[$doc:meta])* $name:ident, $wire:literal, $camel:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
        pub struct $name {
            #[serde(rename(serialize = $camel, deserialize = $wire), alias = $camel)]
            pub active: bool,
            #[serde(
                rename(serialize = "expiresAt"),
                alias = "expiresAt",
                default,
                skip_serializing_if = "Option::is_none"
            )]
            pub expires_at: Option<DateTime<Utc>>,
        }

        impl StatusFlag for $name {
            fn new(active: bool, expires_at: Option<DateTime<Utc>>) -> Self {
                Self { active, expires_at }
            }

            fn active(&self) -> bool {
                self.active
            }

            fn expires_at(&self) -> Option<DateTime<Utc>> {
                self.expires_at
            }
        }
    };
}

status_flag!(ApartmentStatus, "has_apartment", "hasApartment");
status_flag!(HouseStatus, "has_house", "hasHouse");
status_flag!(PetStatus, "has_pet", "hasPet");
status_flag!(LaboratoryStatus, "has_laboratory", "hasLaboratory");
status_flag!(MedicalCardStatus, "has_medical_card", "hasMedicalCard");
status_flag!(
    /// VIP entitlement; usually time-limited.
    VipStatus,
    "has_vip_status",
    "hasVipStatus"
);

/// The kinds of status flag a character can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusKind {
    Apartment,
    House,
    Pet,
    Laboratory,
    MedicalCard,
    VipStatus,
}

impl StatusKind {
    pub const ALL: [StatusKind; 6] = [
        StatusKind::Apartment,
        StatusKind::House,
        StatusKind::Pet,
        StatusKind::Laboratory,
        StatusKind::MedicalCard,
        StatusKind::VipStatus,
    ];

    /// Field name on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusKind::Apartment => "apartment",
            StatusKind::House => "house",
            StatusKind::Pet => "pet",
            StatusKind::Laboratory => "laboratory",
            StatusKind::MedicalCard => "medical_card",
            StatusKind::VipStatus => "vip_status",
        }
    }
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        StatusKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| ParseError::UnknownStatusKind(s.to_string()))
    }
}

/// The optional status flags of a character.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct StatusFlags {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apartment: Option<ApartmentStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub house: Option<HouseStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pet: Option<PetStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub laboratory: Option<LaboratoryStatus>,
    #[serde(alias = "medicalCard", default, skip_serializing_if = "Option::is_none")]
    pub medical_card: Option<MedicalCardStatus>,
    #[serde(alias = "vipStatus", default, skip_serializing_if = "Option::is_none")]
    pub vip_status: Option<VipStatus>,
}

impl StatusFlags {
    /// `(active, expires_at)` for `kind`, if the flag is present.
    pub fn get(&self, kind: StatusKind) -> Option<(bool, Option<DateTime<Utc>>)> {
        fn parts<F: StatusFlag>(flag: &Option<F>) -> Option<(bool, Option<DateTime<Utc>>)> {
            flag.as_ref().map(|f| (f.active(), f.expires_at()))
        }

        match kind {
            StatusKind::Apartment => parts(&self.apartment),
            StatusKind::House => parts(&self.house),
            StatusKind::Pet => parts(&self.pet),
            StatusKind::Laboratory => parts(&self.laboratory),
            StatusKind::MedicalCard => parts(&self.medical_card),
            StatusKind::VipStatus => parts(&self.vip_status),
        }
    }

    pub fn set(&mut self, kind: StatusKind, active: bool, expires_at: Option<DateTime<Utc>>) {
        match kind {
            StatusKind::Apartment => self.apartment = Some(StatusFlag::new(active, expires_at)),
            StatusKind::House => self.house = Some(StatusFlag::new(active, expires_at)),
            StatusKind::Pet => self.pet = Some(StatusFlag::new(active, expires_at)),
            StatusKind::Laboratory => self.laboratory = Some(StatusFlag::new(active, expires_at)),
            StatusKind::MedicalCard => {
                self.medical_card = Some(StatusFlag::new(active, expires_at))
            }
            StatusKind::VipStatus => self.vip_status = Some(StatusFlag::new(active, expires_at)),
        }
    }

    /// Kinds that are active and unexpired at `now`.
    pub fn active_at(&self, now: DateTime<Utc>) -> Vec<StatusKind> {
        StatusKind::ALL
            .into_iter()
            .filter(|kind| match self.get(*kind) {
                Some((active, expires_at)) => active && expires_at.is_none_or(|at| at > now),
                None => false,
            })
            .collect()
    }
}

/// A character as returned by the API, after key normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    #[serde(deserialize_with = "super::string_or_number")]
    pub id: String,
    pub name: String,
    pub level: i32,
    pub cash: i64,
    pub bank: i64,
    pub server_id: i32,
    pub user_id: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub status: StatusFlags,
}

/// Editable character fields, serialized with the backend's wire names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CharacterForm {
    pub name: String,
    pub level: i32,
    pub cash: i64,
    pub bank: i64,
    #[serde(flatten)]
    pub status: StatusFlags,
}

impl Serialize for CharacterForm {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Body<'a> {
            name: &'a str,
            level: i32,
            cash: i64,
            bank: i64,
            #[serde(flatten)]
            status: &'a StatusFlags,
        }

        let body = Body {
            name: &self.name,
            level: self.level,
            cash: self.cash,
            bank: self.bank,
            status: &self.status,
        };
        let value = serde_json::to_value(body).map_err(serde::ser::Error::custom)?;
        snake_case_keys(value).serialize(serializer)
    }
}

impl From<&Character> for CharacterForm {
    fn from(character: &Character) -> Self {
        Self {
            name: character.name.clone(),
            level: character.level,
            cash: character.cash,
            bank: character.bank,
            status: character.status.clone(),
        }
    }
}

/// Creation payload: the form plus the server the character belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewCharacter {
    #[serde(flatten)]
    pub form: CharacterForm,
    pub server_id: i32,
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;
    use crate::normalize::camel_case_keys;

    fn backend_payload() -> serde_json::Value {
        json!({
            "id": "c-1",
            "name": "Nadia Voss",
            "level": 12,
            "cash": 1500,
            "bank": 98000,
            "server_id": 2,
            "user_id": 42,
            "created_at": "2024-03-01T12:00:00Z",
            "updated_at": "2024-03-02T12:00:00.123456Z",
            "pet": {"has_pet": true},
            "vip_status": {"has_vip_status": true, "expires_at": "2030-01-01T00:00:00Z"}
        })
    }

    #[test]
    fn deserializes_normalized_response() {
        let character: Character = serde_json::from_value(camel_case_keys(backend_payload())).unwrap();

        assert_eq!(character.server_id, 2);
        assert_eq!(character.user_id, 42);
        assert_eq!(character.status.pet, Some(PetStatus { active: true, expires_at: None }));
        let vip = character.status.vip_status.unwrap();
        assert!(vip.active);
        assert_eq!(vip.expires_at, Some(Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap()));
        assert!(character.status.apartment.is_none());
    }

    #[test]
    fn form_serializes_wire_names() {
        let mut form = CharacterForm {
            name: "Nadia".into(),
            level: 3,
            cash: 10,
            bank: 20,
            ..Default::default()
        };
        form.status.set(StatusKind::MedicalCard, true, None);

        let payload = serde_json::to_value(NewCharacter { form, server_id: 5 }).unwrap();
        assert_eq!(
            payload,
            json!({
                "name": "Nadia",
                "level": 3,
                "cash": 10,
                "bank": 20,
                "medical_card": {"has_medical_card": true},
                "server_id": 5
            })
        );
    }

    #[test]
    fn expired_flag_is_not_active() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let mut flags = StatusFlags::default();
        flags.set(StatusKind::House, true, Some(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()));
        flags.set(StatusKind::Pet, true, None);
        flags.set(StatusKind::Laboratory, false, None);

        assert_eq!(flags.active_at(now), vec![StatusKind::Pet]);
        assert!(!flags.house.unwrap().is_active_at(now));
    }

    #[test]
    fn status_kind_parses_wire_and_kebab_names() {
        assert_eq!("vip_status".parse::<StatusKind>().unwrap(), StatusKind::VipStatus);
        assert_eq!("medical-card".parse::<StatusKind>().unwrap(), StatusKind::MedicalCard);
        assert!("garage".parse::<StatusKind>().is_err());
    }

    #[test]
    fn character_serializes_camel_case_throughout() {
        let character: Character = serde_json::from_value(camel_case_keys(backend_payload())).unwrap();
        let value = serde_json::to_value(&character).unwrap();

        assert_eq!(value["serverId"], json!(2));
        assert_eq!(value["pet"], json!({"hasPet": true}));
        assert_eq!(
            value["vipStatus"],
            json!({"hasVipStatus": true, "expiresAt": "2030-01-01T00:00:00Z"})
        );
        assert!(value.get("vip_status").is_none());
        assert_eq!(camel_case_keys(value.clone()), value);
    }

    #[test]
    fn cached_character_survives_reserialization() {
        let character: Character = serde_json::from_value(camel_case_keys(backend_payload())).unwrap();
        let again: Character = serde_json::from_value(serde_json::to_value(&character).unwrap()).unwrap();
        assert_eq!(again, character);
    }
}
