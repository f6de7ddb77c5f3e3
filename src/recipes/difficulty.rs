use serde::Serialize;

/// Recipe difficulty, derived on every read from the cooking time and the
/// number of linked ingredients. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Intermediate,
    Hard,
}

/// Classification grid: under 30 minutes is the quick side, five or fewer
/// ingredients the simple side.
///
/// |             | <= 5 ingredients | > 5 ingredients |
/// |-------------|------------------|-----------------|
/// | < 30 min    | Easy             | Medium          |
/// | >= 30 min   | Intermediate     | Hard            |
pub fn classify(cooking_time: i32, ingredient_count: i64) -> Difficulty {
    match (cooking_time < 30, ingredient_count <= 5) {
        (true, true) => Difficulty::Easy,
        (true, false) => Difficulty::Medium,
        (false, true) => Difficulty::Intermediate,
        (false, false) => Difficulty::Hard,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_grid() {
        let cases = [
            (0, 0, Difficulty::Easy),
            (0, 5, Difficulty::Easy),
            (0, 6, Difficulty::Medium),
            (0, 20, Difficulty::Medium),
            (29, 0, Difficulty::Easy),
            (29, 5, Difficulty::Easy),
            (29, 6, Difficulty::Medium),
            (29, 20, Difficulty::Medium),
            (30, 0, Difficulty::Intermediate),
            (30, 5, Difficulty::Intermediate),
            (30, 6, Difficulty::Hard),
            (30, 20, Difficulty::Hard),
            (100, 0, Difficulty::Intermediate),
            (100, 5, Difficulty::Intermediate),
            (100, 6, Difficulty::Hard),
            (100, 20, Difficulty::Hard),
        ];
        for (minutes, count, expected) in cases {
            assert_eq!(
                classify(minutes, count),
                expected,
                "time={minutes} count={count}"
            );
        }
    }

    #[test]
    fn one_case_per_quadrant() {
        assert_eq!(classify(10, 3), Difficulty::Easy);
        assert_eq!(classify(10, 7), Difficulty::Medium);
        assert_eq!(classify(45, 5), Difficulty::Intermediate);
        assert_eq!(classify(45, 8), Difficulty::Hard);
    }

    #[test]
    fn thirty_minutes_is_not_quick() {
        assert_eq!(classify(29, 5), Difficulty::Easy);
        assert_eq!(classify(30, 5), Difficulty::Intermediate);
    }

    #[test]
    fn sixth_ingredient_tips_the_scale() {
        assert_eq!(classify(10, 5), Difficulty::Easy);
        assert_eq!(classify(10, 6), Difficulty::Medium);
    }

    #[test]
    fn serializes_as_plain_labels() {
        assert_eq!(
            serde_json::to_string(&Difficulty::Easy).unwrap(),
            r#""Easy""#
        );
        assert_eq!(
            serde_json::to_string(&Difficulty::Intermediate).unwrap(),
            r#""Intermediate""#
        );
    }
}
