use uuid::Uuid;

use crate::dispatch::availability::ChairCandidate;
use crate::dispatch::cost::{estimate, TravelTime};
use crate::entities::ride;
use crate::utils::geo::Coordinate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitingRide {
    pub ride_id: Uuid,
    pub pickup: Coordinate,
}

impl From<&ride::Model> for WaitingRide {
    fn from(r: &ride::Model) -> Self {
        Self {
            ride_id: r.id,
            pickup: r.pickup(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    pub ride_id: Uuid,
    pub chair_id: Uuid,
    pub travel_time: TravelTime,
}

/// Sequential greedy matching.
///
/// `rides` must be ordered oldest first. Each ride in turn takes the
/// remaining chair with the shortest travel time to its pickup (lowest
/// chair id on ties), so the oldest ride is never passed over in favour of
/// a cheaper pairing elsewhere. This does not minimise total travel time.
/// Rides left without a chair are simply absent from the result.
pub fn assign_fifo(rides: &[WaitingRide], chairs: &[ChairCandidate]) -> Vec<Assignment> {
    let mut pool: Vec<&ChairCandidate> = chairs.iter().collect();
    let mut assignments = Vec::with_capacity(rides.len().min(chairs.len()));

    for r in rides {
        let best = pool
            .iter()
            .enumerate()
            .map(|(idx, c)| (idx, c.chair_id, estimate(c.anchor, r.pickup, c.speed)))
            .min_by(|a, b| a.2.cmp(&b.2).then(a.1.cmp(&b.1)));

        let Some((idx, chair_id, travel_time)) = best else {
            break;
        };
        pool.swap_remove(idx);
        assignments.push(Assignment {
            ride_id: r.ride_id,
            chair_id,
            travel_time,
        });
    }

    assignments
}
