use super::util;
use super::{SchedError, SolveOptions};
use crate::model::{Assignment, Placement, Slot, WorkerId};
use good_lp::constraint::{eq, geq, leq};
use good_lp::{
    highs, variable, variables, Expression, ResolutionError, Solution, SolutionStatus,
    SolverModel, Variable, WithTimeLimit,
};
use std::collections::BTreeSet;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Modèle réduit : conflits et jours en indices de slot.
struct Model {
    conflicts: Vec<BTreeSet<usize>>,
    days: Vec<Vec<usize>>,
    workers: usize,
}

impl Model {
    fn from_slots(slots: &[Slot], workers: usize) -> Self {
        let conflicts = slots
            .iter()
            .map(|s| s.conflicts.iter().map(|c| c.index()).collect())
            .collect();
        let days = util::slots_by_date(slots)
            .into_values()
            .map(|ids| ids.into_iter().map(|id| id.index()).collect())
            .collect();
        Self {
            conflicts,
            days,
            workers,
        }
    }

    /// Résout le PLNE ; retourne l'indice du worker de chaque slot.
    ///
    /// Le budget couvre la construction du modèle : HiGHS reçoit le reste.
    fn solve(&self, limit: Option<Duration>) -> Result<Vec<usize>, SchedError> {
        let started = Instant::now();
        let n_slots = self.conflicts.len();
        let n_workers = self.workers;
        let mean = n_slots as f64 / n_workers as f64;

        let mut vars = variables!();
        let x: Vec<Vec<Variable>> = (0..n_slots)
            .map(|_| (0..n_workers).map(|_| vars.add(variable().binary())).collect())
            .collect();
        let dev: Vec<Variable> = (0..n_workers)
            .map(|_| vars.add(variable().min(0.0)))
            .collect();

        // somme des écarts absolus à la moyenne
        let objective: Expression = dev.iter().copied().sum();
        // stdout appartient au CLI ; le suivi passe par tracing
        let mut problem = vars
            .minimise(objective)
            .using(highs)
            .set_option("output_flag", false);
        let mut rows = 0usize;

        for row in &x {
            problem.add_constraint(eq(row.iter().copied().sum::<Expression>(), 1.0));
            rows += 1;
        }

        for (s, conflicts) in self.conflicts.iter().enumerate() {
            for &c in conflicts.iter().filter(|&&c| c > s) {
                for w in 0..n_workers {
                    problem.add_constraint(leq(Expression::from(x[s][w]) + x[c][w], 1.0));
                    rows += 1;
                }
            }
        }

        // coupe de clique : au plus un slot par jour et par worker
        for day in self.days.iter().filter(|d| d.len() > 2) {
            for w in 0..n_workers {
                let load: Expression = day.iter().map(|&s| x[s][w]).sum();
                problem.add_constraint(leq(load, 1.0));
                rows += 1;
            }
        }

        // workers interchangeables : les slots du premier jour sont épinglés
        if let Some(first) = self.days.first() {
            for (w, &s) in first.iter().take(n_workers).enumerate() {
                problem.add_constraint(eq(Expression::from(x[s][w]), 1.0));
                rows += 1;
            }
        }

        // corde entre floor(mean) et floor(mean) + 1 : |c - mean| pour c entier
        // est au-dessus, et la relaxation atteint l'optimum équilibré
        let floor = mean.floor();
        let frac = mean - floor;
        for (w, d) in dev.iter().enumerate() {
            let count: Expression = x.iter().map(|row| row[w]).sum();
            let d = Expression::from(*d);
            problem.add_constraint(geq(d.clone() - count.clone(), -mean));
            problem.add_constraint(geq(d.clone() + count.clone(), mean));
            rows += 2;
            if frac > 0.0 {
                let slope = 1.0 - 2.0 * frac;
                problem.add_constraint(geq(d - count * slope, frac - slope * floor));
                rows += 1;
            }
        }

        debug!(
            variables = n_slots * n_workers + n_workers,
            constraints = rows,
            "model built"
        );

        if let Some(limit) = limit {
            let remaining = limit.saturating_sub(started.elapsed());
            problem = problem.with_time_limit(remaining.as_secs_f64());
        }

        let solution = match problem.solve() {
            Ok(solution) => solution,
            Err(ResolutionError::Infeasible) => return Err(SchedError::Infeasible),
            // budget épuisé avant la première solution entière
            Err(ResolutionError::Other("NoSolutionFound")) => {
                return Err(match limit {
                    Some(limit) => SchedError::Timeout(limit),
                    None => SchedError::Solver("no integer solution found".into()),
                })
            }
            Err(other) => return Err(SchedError::Solver(other.to_string())),
        };
        if let (Some(limit), SolutionStatus::TimeLimit) = (limit, solution.status()) {
            debug!(elapsed = ?started.elapsed(), "incumbent not proven optimal");
            return Err(SchedError::Timeout(limit));
        }

        x.iter()
            .enumerate()
            .map(|(s, row)| {
                row.iter()
                    .position(|v| solution.value(*v) > 0.5)
                    .ok_or_else(|| SchedError::Solver(format!("slot #{s} left unassigned")))
            })
            .collect()
    }
}

/// Formule et résout l'assignation slots → workers.
pub(super) fn solve(
    slots: &[Slot],
    workers: &[WorkerId],
    opts: SolveOptions,
) -> Result<Assignment, SchedError> {
    if workers.is_empty() {
        return Err(SchedError::Config("worker roster cannot be empty".into()));
    }
    info!(slots = slots.len(), workers = workers.len(), "solving assignment");
    if slots.is_empty() {
        return Ok(Assignment::default());
    }

    let picks = Model::from_slots(slots, workers.len()).solve(opts.time_limit);
    let picks = picks.inspect_err(|err| warn!(%err, "solve failed"))?;
    let placements = picks
        .into_iter()
        .zip(slots)
        .map(|(w, slot)| Placement {
            slot: slot.id,
            worker: workers[w].clone(),
        })
        .collect();
    Ok(Assignment::from_placements(placements))
}
