use anyhow::{anyhow, Result};
use ndarray::Array2;
use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};
use serde_json::{from_value, Map, Value};
use std::collections::HashSet;

/// Score increment added for each structural defect found in a week's
/// grouping. Large enough to dominate any redundancy total so that
/// malformed schedules always rank below well-formed ones.
pub const STRUCTURAL_PENALTY: f64 = 1e6;

#[derive(Serialize, Deserialize, Debug, Copy, Clone)]
pub struct Params {
    pub nb_groups: usize,
    pub group_size: usize,
    pub nb_weeks: usize,
}

impl Params {
    pub fn nb_golfers(&self) -> usize {
        self.nb_groups * self.group_size
    }
}

impl From<Vec<i32>> for Params {
    fn from(arr: Vec<i32>) -> Self {
        Self {
            nb_groups: arr[0] as usize,
            group_size: arr[1] as usize,
            nb_weeks: arr[2] as usize,
        }
    }
}

impl Into<Vec<i32>> for Params {
    fn into(self) -> Vec<i32> {
        vec![
            self.nb_groups as i32,
            self.group_size as i32,
            self.nb_weeks as i32,
        ]
    }
}

/// A candidate schedule. `schedule[w][g]` lists the golfers in group `g`
/// during week `w`. Any shape is accepted; structural defects are scored
/// by `evaluate_solution`, never rejected here.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Solution {
    pub schedule: Vec<Vec<Vec<usize>>>,
}

impl TryFrom<Map<String, Value>> for Solution {
    type Error = serde_json::Error;

    fn try_from(v: Map<String, Value>) -> Result<Self, Self::Error> {
        from_value(Value::Object(v))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Challenge {
    pub params: Params,
}

impl Challenge {
    pub fn new(params: Params) -> Result<Self> {
        if params.nb_groups == 0 || params.group_size == 0 || params.nb_weeks == 0 {
            return Err(anyhow!(
                "Instance dimensions must be positive (nb_groups: {}, group_size: {}, nb_weeks: {})",
                params.nb_groups,
                params.group_size,
                params.nb_weeks
            ));
        }
        Ok(Self { params })
    }

    /// Parses an instance definition: at least three whitespace separated
    /// integers read positionally as nb_groups, group_size, nb_weeks.
    /// Extra tokens are ignored; fewer than three is an error.
    pub fn from_instance_str(s: &str) -> Result<Self> {
        let tokens = s.split_whitespace().collect::<Vec<&str>>();
        if tokens.len() < 3 {
            return Err(anyhow!(
                "Instance definition must contain at least 3 integers, found {}",
                tokens.len()
            ));
        }
        let values = tokens[..3]
            .iter()
            .map(|t| {
                t.parse::<i32>()
                    .map_err(|_| anyhow!("Invalid integer token '{}'", t))
            })
            .collect::<Result<Vec<i32>>>()?;
        if values.iter().any(|&v| v <= 0) {
            return Err(anyhow!(
                "Instance dimensions must be positive, got {:?}",
                values
            ));
        }
        Self::new(Params::from(values))
    }

    /// Scores a candidate schedule. Lower is better; 0 means a well-formed
    /// schedule in which no pair of golfers shares a group more than once.
    ///
    /// Each structural defect adds `STRUCTURAL_PENALTY` to the score
    /// instead of failing the call, so imperfect candidates remain
    /// comparable during search. The checks within a week are independent
    /// and additive: a single week can accumulate several increments.
    pub fn evaluate_solution(&self, solution: &Solution) -> f64 {
        let nb_golfers = self.params.nb_golfers();
        let all_golfers = (0..nb_golfers).collect::<HashSet<usize>>();

        let mut penalty = 0.0;
        for week in &solution.schedule {
            // A week with the wrong number of groups gets a single penalty
            // and no further checks; its shape is too far off to grade.
            if week.len() != self.params.nb_groups {
                penalty += STRUCTURAL_PENALTY;
                continue;
            }
            let week_golfers = week.iter().flatten().cloned().collect::<Vec<usize>>();
            if week_golfers.len() != nb_golfers {
                penalty += STRUCTURAL_PENALTY;
            }
            if week_golfers.iter().cloned().collect::<HashSet<usize>>() != all_golfers {
                penalty += STRUCTURAL_PENALTY;
            }
            for group in week {
                if group.len() != self.params.group_size {
                    penalty += STRUCTURAL_PENALTY;
                }
            }
        }

        // Meeting counts for unordered pairs, kept in the upper triangle.
        // Identifiers outside [0, nb_golfers) are skipped before indexing;
        // the set check above already penalises them.
        let mut meeting_count = Array2::<u32>::zeros((nb_golfers, nb_golfers));
        for week in &solution.schedule {
            for group in week {
                for i in 0..group.len() {
                    for j in (i + 1)..group.len() {
                        let gf0 = group[i].min(group[j]);
                        let gf1 = group[i].max(group[j]);
                        if gf1 < nb_golfers {
                            meeting_count[[gf0, gf1]] += 1;
                        }
                    }
                }
            }
        }

        let mut redundant = 0u32;
        for gf0 in 0..nb_golfers {
            for gf1 in (gf0 + 1)..nb_golfers {
                let count = meeting_count[[gf0, gf1]];
                if count > 1 {
                    redundant += count - 1;
                }
            }
        }

        redundant as f64 + penalty
    }

    /// Generates a structurally valid candidate: each week is an
    /// independent random permutation of all golfers sliced into
    /// `nb_groups` contiguous groups of `group_size`. No attempt is made
    /// to avoid repeat pairings; this is a baseline to seed search.
    pub fn random_solution<R: Rng>(&self, rng: &mut R) -> Solution {
        let mut golfers = (0..self.params.nb_golfers()).collect::<Vec<usize>>();
        let mut schedule = Vec::with_capacity(self.params.nb_weeks);
        for _ in 0..self.params.nb_weeks {
            golfers.shuffle(rng);
            let week = golfers
                .chunks_exact(self.params.group_size)
                .map(|group| group.to_vec())
                .collect::<Vec<Vec<usize>>>();
            schedule.push(week);
        }
        Solution { schedule }
    }

    /// Strict structural check, reporting the first defect found. A
    /// schedule that passes would be assessed zero structural penalty by
    /// `evaluate_solution` (this check additionally requires the full
    /// `nb_weeks` weeks to be present).
    pub fn verify_solution(&self, solution: &Solution) -> Result<()> {
        let nb_golfers = self.params.nb_golfers();
        let all_golfers = (0..nb_golfers).collect::<HashSet<usize>>();

        if solution.schedule.len() != self.params.nb_weeks {
            return Err(anyhow!(
                "Invalid number of weeks. Expected: {}, Actual: {}",
                self.params.nb_weeks,
                solution.schedule.len()
            ));
        }
        for (w, week) in solution.schedule.iter().enumerate() {
            if week.len() != self.params.nb_groups {
                return Err(anyhow!(
                    "Week {}: expected {} groups, found {}",
                    w,
                    self.params.nb_groups,
                    week.len()
                ));
            }
            if let Some((g, group)) = week
                .iter()
                .enumerate()
                .find(|(_, group)| group.len() != self.params.group_size)
            {
                return Err(anyhow!(
                    "Week {}, group {}: expected {} golfers, found {}",
                    w,
                    g,
                    self.params.group_size,
                    group.len()
                ));
            }
            let week_golfers = week.iter().flatten().cloned().collect::<HashSet<usize>>();
            if week_golfers != all_golfers {
                return Err(anyhow!(
                    "Week {}: groups are not a partition of golfers 0..{}",
                    w,
                    nb_golfers
                ));
            }
        }
        Ok(())
    }
}
