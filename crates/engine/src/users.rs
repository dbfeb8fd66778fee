//! Static user roster.
//!
//! The group sharing the car is fixed, so users are compiled in and looked up
//! by id everywhere. There is no user table and no signup flow.

use serde::{Deserialize, Serialize};

/// A member of the group sharing the car.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
}

const ROSTER: [(&str, &str); 5] = [
    ("jeroen", "Jeroen"),
    ("stijn", "Stijn"),
    ("silke", "Silke"),
    ("hanne", "Hanne"),
    ("hella", "Hella"),
];

/// Returns the full roster, in display order.
pub fn roster() -> Vec<User> {
    ROSTER
        .iter()
        .map(|(id, name)| User {
            id: (*id).to_string(),
            name: (*name).to_string(),
        })
        .collect()
}

/// Returns the roster ids, in display order.
pub fn roster_ids() -> Vec<String> {
    ROSTER.iter().map(|(id, _)| (*id).to_string()).collect()
}

/// Looks up a user by id.
pub fn find(id: &str) -> Option<User> {
    ROSTER
        .iter()
        .find(|(user_id, _)| *user_id == id)
        .map(|(user_id, name)| User {
            id: (*user_id).to_string(),
            name: (*name).to_string(),
        })
}

pub fn is_known(id: &str) -> bool {
    ROSTER.iter().any(|(user_id, _)| *user_id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_finds_roster_members() {
        assert_eq!(find("jeroen").map(|u| u.name), Some("Jeroen".to_string()));
        assert!(find("nobody").is_none());
        assert!(is_known("hella"));
        assert!(!is_known(""));
    }

    #[test]
    fn roster_order_is_stable() {
        let ids = roster_ids();
        assert_eq!(ids, ["jeroen", "stijn", "silke", "hanne", "hella"]);
        assert_eq!(roster().len(), ids.len());
    }
}
