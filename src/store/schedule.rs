use chrono::{DateTime, Duration, Utc};

/// Review delay as a step function of how many times a question has been
/// missed: repeat offenders wait a week, second misses a day, fresh misses
/// come back within minutes.
pub fn review_interval(mistake_count: u32) -> Duration {
  match mistake_count {
    n if n >= 3 => Duration::days(7),
    2 => Duration::days(1),
    _ => Duration::minutes(3),
  }
}

/// Whether a wrong question is eligible for review at `now`
pub fn is_due(last_attempted_at: DateTime<Utc>, mistake_count: u32, now: DateTime<Utc>) -> bool {
  now - last_attempted_at >= review_interval(mistake_count)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_interval_steps() {
    assert_eq!(review_interval(1), Duration::minutes(3));
    assert_eq!(review_interval(2), Duration::days(1));
    assert_eq!(review_interval(3), Duration::days(7));
    assert_eq!(review_interval(9), Duration::days(7));
  }

  #[test]
  fn test_single_mistake_not_due_after_one_minute() {
    let now = Utc::now();
    assert!(!is_due(now - Duration::minutes(1), 1, now));
  }

  #[test]
  fn test_single_mistake_due_after_four_minutes() {
    let now = Utc::now();
    assert!(is_due(now - Duration::minutes(4), 1, now));
  }

  #[test]
  fn test_exact_threshold_is_due() {
    let now = Utc::now();
    assert!(is_due(now - Duration::minutes(3), 1, now));
  }

  #[test]
  fn test_second_mistake_waits_a_day() {
    let now = Utc::now();
    assert!(!is_due(now - Duration::hours(23), 2, now));
    assert!(is_due(now - Duration::hours(25), 2, now));
  }

  #[test]
  fn test_third_mistake_waits_a_week() {
    let now = Utc::now();
    assert!(!is_due(now - Duration::days(6), 3, now));
    assert!(is_due(now - Duration::days(7), 3, now));
  }
}
