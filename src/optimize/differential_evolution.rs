//! Differential evolution (best/1/bin) global optimizer.
//!
//! A population of `popsize * n` candidate vectors is initialised by Latin
//! hypercube sampling inside the bounds. Each generation builds one trial per
//! member:
//!
//! ```text
//! mutant = best + F * (x_r1 - x_r2)        (F dithered in [F_lo, F_hi))
//! trial_j = mutant_j  if U < CR or j == j_rand,  else  x_i,j
//! ```
//!
//! Trial vectors are drawn sequentially from one seeded RNG and then scored in
//! parallel; replacement happens after the whole generation has been scored,
//! so a fixed seed always gives the same result regardless of thread count.

use log::{debug, info};
use rand::prelude::*;
use rand::rngs::StdRng;
use rayon::prelude::*;

use super::lbfgs::{LbfgsOptions, lbfgs_bounded};
use super::{OptimizeError, OptimizeResult};

/// Smallest population regardless of `popsize`.
const MIN_POPULATION: usize = 5;

/// Options for [`differential_evolution`].
#[derive(Debug, Clone)]
pub struct DeOptions {
    /// Population multiplier: population = `max(5, popsize * n)`.
    pub popsize: usize,
    /// Maximum number of generations.
    pub max_iter: usize,
    /// Relative convergence tolerance on the population energies.
    pub tol: f64,
    /// Absolute convergence tolerance on the population energies.
    pub atol: f64,
    /// Mutation factor range; a fresh factor is drawn each generation.
    pub mutation: (f64, f64),
    /// Crossover probability.
    pub recombination: f64,
    /// Random seed (None for entropy).
    pub seed: Option<u64>,
    /// Refine the best member with box-constrained L-BFGS at the end.
    pub polish: bool,
}

impl Default for DeOptions {
    fn default() -> Self {
        Self {
            popsize: 15,
            max_iter: 1000,
            tol: 0.01,
            atol: 0.0,
            mutation: (0.5, 1.0),
            recombination: 0.7,
            seed: None,
            polish: true,
        }
    }
}

/// Result from a global optimization.
#[derive(Debug, Clone)]
pub struct GlobalResult {
    pub x: Vec<f64>,
    pub fun: f64,
    /// Generations run.
    pub iterations: usize,
    pub nfev: usize,
    pub converged: bool,
}

/// Minimize `f` inside `bounds` (`[(lo, hi), ...]`, one pair per coordinate).
pub fn differential_evolution<F>(
    f: F,
    bounds: &[(f64, f64)],
    options: &DeOptions,
) -> OptimizeResult<GlobalResult>
where
    F: Fn(&[f64]) -> f64 + Sync,
{
    validate(bounds, options)?;

    let n = bounds.len();
    let pop_size = (options.popsize * n).max(MIN_POPULATION);
    let mut rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut population = latin_hypercube(&mut rng, bounds, pop_size);
    let mut energies = evaluate_all(&f, &population);
    let mut nfev = pop_size;
    let mut best_idx = argmin(&energies);

    debug!("differential_evolution: population={pop_size}, dimension={n}");

    let mut generations = 0;
    let mut converged = false;

    for generation in 1..=options.max_iter {
        generations = generation;
        let scale = draw_mutation(&mut rng, options.mutation);
        let best = population[best_idx].clone();

        let trials: Vec<Vec<f64>> = (0..pop_size)
            .map(|i| {
                let (r1, r2) = pick_two_others(&mut rng, pop_size, i);
                let j_rand = rng.gen_range(0..n);
                (0..n)
                    .map(|j| {
                        if j == j_rand || rng.r#gen::<f64>() < options.recombination {
                            let v = best[j] + scale * (population[r1][j] - population[r2][j]);
                            let (lo, hi) = bounds[j];
                            if (lo..=hi).contains(&v) {
                                v
                            } else {
                                rng.gen_range(lo..hi)
                            }
                        } else {
                            population[i][j]
                        }
                    })
                    .collect()
            })
            .collect();

        let trial_energies = evaluate_all(&f, &trials);
        nfev += pop_size;

        for (i, (trial, energy)) in trials.into_iter().zip(trial_energies).enumerate() {
            if energy <= energies[i] {
                population[i] = trial;
                energies[i] = energy;
            }
        }
        best_idx = argmin(&energies);

        info!(
            "differential_evolution step {generation}: f(x)= {:.6e}",
            energies[best_idx]
        );

        if population_converged(&energies, options.tol, options.atol) {
            converged = true;
            break;
        }
    }

    let mut x = population.swap_remove(best_idx);
    let mut fun = energies[best_idx];

    if options.polish {
        let polished = lbfgs_bounded(&f, &x, bounds, &LbfgsOptions::default())?;
        nfev += polished.nfev;
        if polished.fun < fun {
            debug!("differential_evolution: polish improved {fun:.6e} -> {:.6e}", polished.fun);
            x = polished.x;
            fun = polished.fun;
        }
    }

    Ok(GlobalResult {
        x,
        fun,
        iterations: generations,
        nfev,
        converged,
    })
}

fn validate(bounds: &[(f64, f64)], options: &DeOptions) -> OptimizeResult<()> {
    if bounds.is_empty() {
        return Err(OptimizeError::InvalidInput {
            context: "differential_evolution: empty bounds".to_string(),
        });
    }
    for (index, &(lo, hi)) in bounds.iter().enumerate() {
        if !(lo.is_finite() && hi.is_finite() && lo < hi) {
            return Err(OptimizeError::InvalidBounds { index, lo, hi });
        }
    }
    if options.popsize == 0 {
        return Err(OptimizeError::InvalidInput {
            context: "differential_evolution: popsize must be > 0".to_string(),
        });
    }
    let (m_lo, m_hi) = options.mutation;
    if !(m_lo.is_finite() && m_hi.is_finite() && 0.0 <= m_lo && m_lo <= m_hi && m_hi < 2.0) {
        return Err(OptimizeError::InvalidInput {
            context: format!("differential_evolution: mutation range ({m_lo}, {m_hi}) must lie in [0, 2)"),
        });
    }
    if !(0.0..=1.0).contains(&options.recombination) {
        return Err(OptimizeError::InvalidInput {
            context: format!(
                "differential_evolution: recombination {} must lie in [0, 1]",
                options.recombination
            ),
        });
    }
    Ok(())
}

/// Stratified initial population: every coordinate's range is cut into
/// `pop_size` equal segments and each segment receives exactly one member.
fn latin_hypercube(rng: &mut StdRng, bounds: &[(f64, f64)], pop_size: usize) -> Vec<Vec<f64>> {
    let segment = 1.0 / pop_size as f64;
    let mut population = vec![Vec::with_capacity(bounds.len()); pop_size];

    for &(lo, hi) in bounds {
        let mut strata: Vec<usize> = (0..pop_size).collect();
        strata.shuffle(rng);
        for (member, stratum) in population.iter_mut().zip(strata) {
            let u = (stratum as f64 + rng.r#gen::<f64>()) * segment;
            member.push(lo + u * (hi - lo));
        }
    }
    population
}

fn evaluate_all<F>(f: &F, population: &[Vec<f64>]) -> Vec<f64>
where
    F: Fn(&[f64]) -> f64 + Sync,
{
    population
        .par_iter()
        .map(|x| {
            let e = f(x);
            if e.is_nan() { f64::INFINITY } else { e }
        })
        .collect()
}

fn argmin(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if v < values[best] {
            best = i;
        }
    }
    best
}

fn draw_mutation(rng: &mut StdRng, (lo, hi): (f64, f64)) -> f64 {
    if hi > lo { rng.gen_range(lo..hi) } else { lo }
}

/// Two distinct indices, both different from `exclude`.
fn pick_two_others(rng: &mut StdRng, pop_size: usize, exclude: usize) -> (usize, usize) {
    let r1 = loop {
        let r = rng.gen_range(0..pop_size);
        if r != exclude {
            break r;
        }
    };
    let r2 = loop {
        let r = rng.gen_range(0..pop_size);
        if r != exclude && r != r1 {
            break r;
        }
    };
    (r1, r2)
}

/// `std(E) <= atol + tol * |mean(E)|`; never true while any energy is infinite.
fn population_converged(energies: &[f64], tol: f64, atol: f64) -> bool {
    if energies.iter().any(|e| !e.is_finite()) {
        return false;
    }
    let n = energies.len() as f64;
    let mean = energies.iter().sum::<f64>() / n;
    let var = energies.iter().map(|e| (e - mean).powi(2)).sum::<f64>() / n;
    var.sqrt() <= atol + tol * mean.abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sphere(x: &[f64]) -> f64 {
        x.iter().map(|v| v * v).sum()
    }

    fn seeded(seed: u64) -> DeOptions {
        DeOptions {
            popsize: 15,
            max_iter: 300,
            seed: Some(seed),
            ..Default::default()
        }
    }

    #[test]
    fn finds_sphere_minimum() {
        let bounds = vec![(-5.0, 5.0); 3];
        let res = differential_evolution(sphere, &bounds, &seeded(42)).unwrap();
        assert!(res.fun < 1e-6, "fun={}", res.fun);
    }

    #[test]
    fn finds_shifted_minimum_without_polish() {
        let f = |x: &[f64]| (x[0] - 2.0).powi(2) + (x[1] + 1.0).powi(2) + 0.5;
        let opts = DeOptions {
            polish: false,
            tol: 1e-8,
            ..seeded(7)
        };
        let res = differential_evolution(f, &[(-5.0, 5.0), (-5.0, 5.0)], &opts).unwrap();
        assert!((res.x[0] - 2.0).abs() < 1e-2);
        assert!((res.x[1] + 1.0).abs() < 1e-2);
        assert!(res.fun >= 0.5);
    }

    #[test]
    fn same_seed_same_answer() {
        let bounds = vec![(-3.0, 3.0); 4];
        let opts = DeOptions {
            max_iter: 20,
            ..seeded(11)
        };
        let a = differential_evolution(sphere, &bounds, &opts).unwrap();
        let b = differential_evolution(sphere, &bounds, &opts).unwrap();
        assert_eq!(a.x, b.x);
        assert_eq!(a.fun, b.fun);
        assert_eq!(a.nfev, b.nfev);
    }

    #[test]
    fn result_stays_inside_bounds() {
        let f = |x: &[f64]| -(x[0] + x[1]);
        let bounds = [(0.0, 1.0), (-2.0, 0.5)];
        let res = differential_evolution(f, &bounds, &seeded(3)).unwrap();
        for (v, &(lo, hi)) in res.x.iter().zip(&bounds) {
            assert!(*v >= lo && *v <= hi);
        }
    }

    #[test]
    fn polish_reaches_a_minimum_on_the_boundary() {
        // Unconstrained minimum at (3, 3) lies outside the box.
        let f = |x: &[f64]| (x[0] - 3.0).powi(2) + (x[1] - 3.0).powi(2);
        let bounds = [(-1.0, 1.0), (-1.0, 1.0)];
        let rough = DeOptions {
            max_iter: 5,
            polish: false,
            ..seeded(5)
        };
        let polished = DeOptions {
            polish: true,
            ..rough.clone()
        };

        let a = differential_evolution(f, &bounds, &rough).unwrap();
        let b = differential_evolution(f, &bounds, &polished).unwrap();
        assert!(b.fun < a.fun);
        assert!((b.fun - 8.0).abs() < 1e-9, "fun={}", b.fun);
        for (v, &(lo, hi)) in b.x.iter().zip(&bounds) {
            assert!(*v >= lo && *v <= hi);
        }
    }

    #[test]
    fn latin_hypercube_fills_every_stratum() {
        let mut rng = StdRng::seed_from_u64(1);
        let pop = latin_hypercube(&mut rng, &[(0.0, 10.0)], 10);
        let mut strata: Vec<usize> = pop.iter().map(|m| m[0].floor() as usize).collect();
        strata.sort_unstable();
        assert_eq!(strata, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn rejects_invalid_bounds_and_options() {
        assert!(differential_evolution(sphere, &[], &DeOptions::default()).is_err());
        assert!(matches!(
            differential_evolution(sphere, &[(1.0, 1.0)], &DeOptions::default()),
            Err(OptimizeError::InvalidBounds { index: 0, .. })
        ));
        let opts = DeOptions {
            popsize: 0,
            ..Default::default()
        };
        assert!(differential_evolution(sphere, &[(0.0, 1.0)], &opts).is_err());
    }
}
