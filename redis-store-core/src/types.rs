//! Domain types shared across the operation set

use std::fmt;

/// A sorted-set member paired with its score.
///
/// Members with equal scores are ordered by member string, which is the
/// store's own tie-break rule, not one this client imposes.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredMember {
    /// Member string, unique within its sorted set
    pub member: String,
    /// Signed score the member is ranked by
    pub score: f64,
}

impl ScoredMember {
    /// Create a new scored member.
    pub fn new(member: impl Into<String>, score: f64) -> Self {
        Self {
            member: member.into(),
            score,
        }
    }
}

/// One endpoint of a score range, either a literal score or an open-ended
/// sentinel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScoreBound {
    /// Below every score (`-inf`)
    NegInf,
    /// A literal score
    Score(f64),
    /// Above every score (`+inf`)
    PosInf,
}

impl ScoreBound {
    /// Whether `self..=other` describes a non-empty-by-construction range,
    /// i.e. `self <= other`. Score-range queries require their `min` bound
    /// to satisfy this against their `max` bound.
    pub fn le(&self, other: &ScoreBound) -> bool {
        match (self, other) {
            (ScoreBound::NegInf, _) | (_, ScoreBound::PosInf) => true,
            (ScoreBound::Score(min), ScoreBound::Score(max)) => min <= max,
            (ScoreBound::PosInf, _) | (_, ScoreBound::NegInf) => false,
        }
    }
}

impl fmt::Display for ScoreBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreBound::NegInf => f.write_str("-inf"),
            ScoreBound::PosInf => f.write_str("+inf"),
            ScoreBound::Score(v) => write!(f, "{v}"),
        }
    }
}

impl From<f64> for ScoreBound {
    fn from(v: f64) -> Self {
        ScoreBound::Score(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_bound_ordering() {
        assert!(ScoreBound::NegInf.le(&ScoreBound::PosInf));
        assert!(ScoreBound::NegInf.le(&ScoreBound::Score(-100.0)));
        assert!(ScoreBound::Score(60.0).le(&ScoreBound::Score(60.0)));
        assert!(ScoreBound::Score(60.0).le(&ScoreBound::Score(75.0)));
        assert!(ScoreBound::Score(60.0).le(&ScoreBound::PosInf));

        assert!(!ScoreBound::Score(80.0).le(&ScoreBound::Score(60.0)));
        assert!(!ScoreBound::PosInf.le(&ScoreBound::Score(1e9)));
        assert!(!ScoreBound::Score(0.0).le(&ScoreBound::NegInf));
    }

    #[test]
    fn test_score_bound_display() {
        assert_eq!(ScoreBound::NegInf.to_string(), "-inf");
        assert_eq!(ScoreBound::PosInf.to_string(), "+inf");
        assert_eq!(ScoreBound::Score(60.0).to_string(), "60");
        assert_eq!(ScoreBound::Score(62.5).to_string(), "62.5");
    }

    #[test]
    fn test_scored_member_new() {
        let m = ScoredMember::new("Tim", 60.0);
        assert_eq!(m.member, "Tim");
        assert_eq!(m.score, 60.0);
    }
}
