use crate::domain::model::{MaterialHistory, ReplenishmentEvent};
use std::collections::BTreeMap;

/// Largest gap between consecutive usage years, used as the lifetime of a
/// piece of equipment. `None` with fewer than two distinct years.
pub fn equipment_lifetime(usage_years: &[i32]) -> Option<i32> {
    let mut years = usage_years.to_vec();
    years.sort_unstable();
    years.dedup();

    years.windows(2).map(|pair| pair[1] - pair[0]).max()
}

/// Every replenishment year up to and including `target_year`, stepping by the
/// equipment lifetime from the last usage year.
pub fn predict_replenishment_events(usage_years: &[i32], target_year: i32) -> Vec<i32> {
    let Some(lifetime) = equipment_lifetime(usage_years) else {
        return Vec::new();
    };
    let Some(&last_usage) = usage_years.iter().max() else {
        return Vec::new();
    };

    let mut events = Vec::new();
    let mut next = last_usage + lifetime;
    while next <= target_year {
        events.push(next);
        next += lifetime;
    }
    events
}

pub fn replenishment_schedule(
    histories: &[MaterialHistory],
    target_year: i32,
) -> Vec<ReplenishmentEvent> {
    let mut schedule = Vec::new();

    for history in histories {
        let years = history.historical_years();
        if years.len() < 2 {
            continue;
        }
        let (Some(lifetime), Some(last_usage)) = (equipment_lifetime(&years), history.last_year())
        else {
            continue;
        };

        for event_year in predict_replenishment_events(&years, target_year) {
            schedule.push(ReplenishmentEvent {
                material: history.material.clone(),
                last_usage,
                replenishment_year: event_year,
                lifetime,
                years_from_last_usage: event_year - last_usage,
            });
        }
    }

    // sort_by_key 為穩定排序，同年事件保留原始順序
    schedule.sort_by_key(|event| event.replenishment_year);
    schedule
}

pub fn events_per_year(events: &[ReplenishmentEvent]) -> BTreeMap<i32, usize> {
    let mut counts = BTreeMap::new();
    for event in events {
        *counts.entry(event.replenishment_year).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::YearUsage;

    fn history(material: &str, years: &[i32]) -> MaterialHistory {
        MaterialHistory {
            material: material.to_string(),
            unit_price: 100.0,
            usage: years
                .iter()
                .map(|&year| YearUsage {
                    year,
                    units: 2.0,
                    total: 200.0,
                })
                .collect(),
        }
    }

    #[test]
    fn test_lifetime_is_max_gap() {
        assert_eq!(equipment_lifetime(&[2021, 2022, 2025]), Some(3));
        assert_eq!(equipment_lifetime(&[2025, 2021, 2022]), Some(3));
    }

    #[test]
    fn test_lifetime_needs_two_distinct_years() {
        assert_eq!(equipment_lifetime(&[]), None);
        assert_eq!(equipment_lifetime(&[2022]), None);
        assert_eq!(equipment_lifetime(&[2022, 2022]), None);
    }

    #[test]
    fn test_predict_events_until_target() {
        assert_eq!(
            predict_replenishment_events(&[2021, 2023], 2030),
            vec![2025, 2027, 2029]
        );
        assert_eq!(predict_replenishment_events(&[2021, 2023], 2025), vec![2025]);
        assert!(predict_replenishment_events(&[2021, 2023], 2024).is_empty());
        assert!(predict_replenishment_events(&[2023], 2040).is_empty());
    }

    #[test]
    fn test_schedule_sorted_by_year_and_stable() {
        let histories = vec![
            history("Filter", &[2021, 2024]),
            history("Pump", &[2022, 2023, 2024]),
            history("Valve", &[2024]),
        ];
        let schedule = replenishment_schedule(&histories, 2028);

        let rows: Vec<(&str, i32)> = schedule
            .iter()
            .map(|e| (e.material.as_str(), e.replenishment_year))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("Pump", 2025),
                ("Pump", 2026),
                ("Filter", 2027),
                ("Pump", 2027),
                ("Pump", 2028),
            ]
        );

        let filter = &schedule[2];
        assert_eq!(filter.lifetime, 3);
        assert_eq!(filter.last_usage, 2024);
        assert_eq!(filter.years_from_last_usage, 3);
    }

    #[test]
    fn test_events_per_year() {
        let histories = vec![history("Filter", &[2021, 2024]), history("Pump", &[2023, 2024])];
        let schedule = replenishment_schedule(&histories, 2027);
        let counts = events_per_year(&schedule);
        assert_eq!(counts.get(&2025), Some(&1));
        assert_eq!(counts.get(&2026), Some(&1));
        assert_eq!(counts.get(&2027), Some(&2));
        assert_eq!(counts.len(), 3);
    }
}
