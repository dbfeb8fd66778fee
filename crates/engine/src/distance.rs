//! Distance attribution.
//!
//! Converts the ride log into a km-by-user map. The split is equal among a
//! ride's participants, never weighted.

use std::collections::HashMap;

use crate::rides::Ride;

/// Builds a full km-by-user map from rides, split equally among
/// participants.
///
/// Every id in `user_ids` is initialized to 0 so lookups are always defined;
/// participant ids outside the roster still accumulate (old data can contain
/// them). Pure: same rides in, same map out.
pub fn attribute_distance(rides: &[Ride], user_ids: &[String]) -> HashMap<String, f64> {
    let mut totals: HashMap<String, f64> =
        user_ids.iter().map(|id| (id.clone(), 0.0)).collect();
    for ride in rides {
        add_ride_shares(&mut totals, ride);
    }
    totals
}

/// Adds one ride's km shares to the totals map.
fn add_ride_shares(totals: &mut HashMap<String, f64>, ride: &Ride) {
    let Some(distance) = ride.tracked_distance() else {
        return;
    };
    let participants = ride.participants();
    let share = distance / participants.len() as f64;
    for id in participants {
        *totals.entry(id).or_insert(0.0) += share;
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;

    fn ride(user: &str, participants: &[&str], start_km: f64, end_km: Option<f64>) -> Ride {
        Ride {
            id: Uuid::new_v4(),
            user_id: user.to_string(),
            participant_ids: participants.iter().map(|id| (*id).to_string()).collect(),
            start_km,
            end_km,
            started_at: Utc::now(),
            ended_at: None,
            end_lat: None,
            end_lng: None,
        }
    }

    fn ids(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|id| (*id).to_string()).collect()
    }

    #[test]
    fn every_known_user_has_an_entry() {
        let totals = attribute_distance(&[], &ids(&["a", "b"]));
        assert_eq!(totals.get("a"), Some(&0.0));
        assert_eq!(totals.get("b"), Some(&0.0));
    }

    #[test]
    fn invalid_deltas_contribute_nothing() {
        let rides = [
            ride("a", &[], 100.0, None),
            ride("a", &[], 100.0, Some(100.0)),
            ride("a", &[], 100.0, Some(50.0)),
            ride("a", &[], 100.0, Some(f64::NAN)),
        ];
        let totals = attribute_distance(&rides, &ids(&["a"]));
        assert_eq!(totals.get("a"), Some(&0.0));
    }

    #[test]
    fn equal_split_sums_to_the_delta() {
        let rides = [ride("a", &["a", "b", "c"], 0.0, Some(90.0))];
        let totals = attribute_distance(&rides, &ids(&["a", "b", "c"]));
        assert_eq!(totals.get("a"), Some(&30.0));
        assert_eq!(totals.get("b"), Some(&30.0));
        assert_eq!(totals.get("c"), Some(&30.0));
        let sum: f64 = totals.values().sum();
        assert!((sum - 90.0).abs() < 1e-9);
    }

    #[test]
    fn missing_participants_attribute_to_the_initiator() {
        let rides = [ride("a", &[], 10.0, Some(35.0))];
        let totals = attribute_distance(&rides, &ids(&["a", "b"]));
        assert_eq!(totals.get("a"), Some(&25.0));
        assert_eq!(totals.get("b"), Some(&0.0));
    }

    #[test]
    fn unknown_participants_still_accumulate() {
        let rides = [ride("a", &["a", "ghost"], 0.0, Some(10.0))];
        let totals = attribute_distance(&rides, &ids(&["a"]));
        assert_eq!(totals.get("a"), Some(&5.0));
        assert_eq!(totals.get("ghost"), Some(&5.0));
    }

    #[test]
    fn totals_accumulate_across_rides() {
        let rides = [
            ride("a", &["a"], 0.0, Some(100.0)),
            ride("b", &["b"], 100.0, Some(150.0)),
            ride("a", &["a", "b"], 150.0, Some(160.0)),
        ];
        let totals = attribute_distance(&rides, &ids(&["a", "b"]));
        assert_eq!(totals.get("a"), Some(&105.0));
        assert_eq!(totals.get("b"), Some(&55.0));
    }
}
