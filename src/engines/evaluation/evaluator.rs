use std::f64::consts::PI;
use std::sync::Arc;

use super::interpreter::Interpreter;
use crate::data::{Dataset, Example};
use crate::engines::generation::individual::Individual;
use crate::functions::registry::SymbolSet;
use crate::types::{Fitness, Value};

/// Examples skipped between two evaluated ones by the `fast` variants.
const FAST_STEP: usize = 5;

/// Tolerance for comparing numeric outputs.
const EPSILON: f64 = 1e-10;

/// Fitness function. Greater fitness is better.
///
/// Evaluators must be shareable between threads: a population is evaluated
/// in parallel.
pub trait Evaluator: Sync {
    fn evaluate(&self, prg: &Individual, sset: &SymbolSet) -> Fitness;

    /// Cheaper approximation of `evaluate` (e.g. on a subset of the data).
    fn fast(&self, prg: &Individual, sset: &SymbolSet) -> Fitness {
        self.evaluate(prg, sset)
    }

    /// Fraction of the examples correctly handled, when meaningful.
    fn accuracy(&self, _prg: &Individual, _sset: &SymbolSet) -> Option<f64> {
        None
    }
}

fn run(prg: &Individual, sset: &SymbolSet, e: &Example) -> Option<Value> {
    Interpreter::new(prg, sset).with_example(Some(&e.input)).run()
}

fn numeric(prg: &Individual, sset: &SymbolSet, e: &Example) -> Option<f64> {
    run(prg, sset, e).and_then(|v| v.as_f64())
}

// --- AbsErrorEvaluator ---
/// Negated sum of absolute errors. The `k`-th example for which the program
/// produces no value costs `100^k`.
pub struct AbsErrorEvaluator {
    data: Arc<Dataset>,
}

impl AbsErrorEvaluator {
    pub fn new(data: Arc<Dataset>) -> Self {
        Self { data }
    }

    fn error<'a>(
        &self,
        prg: &Individual,
        sset: &SymbolSet,
        examples: impl Iterator<Item = &'a Example>,
    ) -> f64 {
        let mut err = 0.0;
        let mut illegals = 0;

        for e in examples {
            match (numeric(prg, sset, e), e.output.as_f64()) {
                (Some(v), Some(target)) => err += (v - target).abs(),
                _ => {
                    illegals += 1;
                    err += 100f64.powi(illegals);
                }
            }
        }
        err
    }
}

impl Evaluator for AbsErrorEvaluator {
    fn evaluate(&self, prg: &Individual, sset: &SymbolSet) -> Fitness {
        Fitness::from(-self.error(prg, sset, self.data.iter()))
    }

    fn fast(&self, prg: &Individual, sset: &SymbolSet) -> Fitness {
        Fitness::from(-self.error(prg, sset, self.data.iter().step_by(FAST_STEP)))
    }

    fn accuracy(&self, prg: &Individual, sset: &SymbolSet) -> Option<f64> {
        if self.data.is_empty() {
            return None;
        }

        let ok = self
            .data
            .iter()
            .filter(|e| match (numeric(prg, sset, e), e.output.as_f64()) {
                (Some(v), Some(t)) => (v - t).abs() <= 0.01 * t.abs().max(1.0),
                _ => false,
            })
            .count();
        Some(ok as f64 / self.data.len() as f64)
    }
}

// --- CountEvaluator ---
/// Negated number of examples whose output isn't reproduced exactly.
pub struct CountEvaluator {
    data: Arc<Dataset>,
}

impl CountEvaluator {
    pub fn new(data: Arc<Dataset>) -> Self {
        Self { data }
    }

    fn matches(prg: &Individual, sset: &SymbolSet, e: &Example) -> bool {
        match run(prg, sset, e) {
            Some(v) => match (v.as_f64(), e.output.as_f64()) {
                (Some(a), Some(b)) => (a - b).abs() < EPSILON,
                _ => v == e.output,
            },
            None => false,
        }
    }
}

impl Evaluator for CountEvaluator {
    fn evaluate(&self, prg: &Individual, sset: &SymbolSet) -> Fitness {
        let misses = self
            .data
            .iter()
            .filter(|e| !Self::matches(prg, sset, e))
            .count();
        Fitness::from(-(misses as f64))
    }

    fn accuracy(&self, prg: &Individual, sset: &SymbolSet) -> Option<f64> {
        if self.data.is_empty() {
            return None;
        }
        let hits = self.data.iter().filter(|e| Self::matches(prg, sset, e)).count();
        Some(hits as f64 / self.data.len() as f64)
    }
}

// --- DynSlotEvaluator ---
/// Classification through dynamic class slots.
///
/// The output of the program is squashed into `[0, 1)` and split into
/// `classes * slots_per_class` slots. Each slot is assigned the class most
/// frequent among the training examples falling into it; the fitness is the
/// negated number of examples whose class differs from their slot's class.
pub struct DynSlotEvaluator {
    data: Arc<Dataset>,
    slots_per_class: usize,
}

impl DynSlotEvaluator {
    pub fn new(data: Arc<Dataset>, slots_per_class: usize) -> Self {
        Self {
            data,
            slots_per_class: slots_per_class.max(1),
        }
    }

    fn n_slots(&self) -> usize {
        (self.data.classes() * self.slots_per_class).max(1)
    }

    /// Slot of example `e`. Programs without a value land in the last slot.
    fn slot(&self, prg: &Individual, sset: &SymbolSet, e: &Example) -> usize {
        let n = self.n_slots();
        match numeric(prg, sset, e) {
            Some(v) => {
                let norm = v.atan() / PI + 0.5;
                ((norm * n as f64) as usize).min(n - 1)
            }
            None => n - 1,
        }
    }

    /// Class assigned to every slot (majority vote, ties to the lowest
    /// class, empty slots to class 0).
    pub fn slot_classes(&self, prg: &Individual, sset: &SymbolSet) -> Vec<usize> {
        let classes = self.data.classes().max(1);
        let mut counts = vec![vec![0usize; classes]; self.n_slots()];

        for e in self.data.iter() {
            if let Some(label) = e.label {
                counts[self.slot(prg, sset, e)][label.min(classes - 1)] += 1;
            }
        }

        counts
            .iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .fold((0, 0), |best, (c, &n)| if n > best.1 { (c, n) } else { best })
                    .0
            })
            .collect()
    }

    /// Predicted class of `e`.
    pub fn class_of(&self, prg: &Individual, sset: &SymbolSet, e: &Example) -> usize {
        let classes = self.slot_classes(prg, sset);
        classes[self.slot(prg, sset, e)]
    }

    fn errors(&self, prg: &Individual, sset: &SymbolSet) -> usize {
        let classes = self.slot_classes(prg, sset);
        self.data
            .iter()
            .filter(|e| e.label != Some(classes[self.slot(prg, sset, e)]))
            .count()
    }
}

impl Evaluator for DynSlotEvaluator {
    fn evaluate(&self, prg: &Individual, sset: &SymbolSet) -> Fitness {
        Fitness::from(-(self.errors(prg, sset) as f64))
    }

    fn accuracy(&self, prg: &Individual, sset: &SymbolSet) -> Option<f64> {
        if self.data.is_empty() {
            return None;
        }
        let ok = self.data.len() - self.errors(prg, sset);
        Some(ok as f64 / self.data.len() as f64)
    }
}

// --- GaussianEvaluator ---
/// Running mean and variance of the program outputs for one class.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClassDistribution {
    pub count: usize,
    pub mean: f64,
    m2: f64,
}

impl ClassDistribution {
    fn add(&mut self, v: f64) {
        self.count += 1;
        let delta = v - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (v - self.mean);
    }

    pub fn variance(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.m2 / self.count as f64
        }
    }

    pub fn standard_deviation(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Unnormalized likelihood of `x` (1 at the mean).
    fn likelihood(&self, x: f64) -> f64 {
        let distance = (x - self.mean).abs();
        let variance = self.variance();
        if variance == 0.0 {
            if distance == 0.0 {
                1.0
            } else {
                0.0
            }
        } else {
            (-0.5 * distance * distance / variance).exp()
        }
    }
}

/// Classification modelling the output of the program on every class as a
/// Gaussian distribution.
///
/// Fitness rewards well separated class means and penalizes wide
/// distributions: `sum over class pairs of 200 ln|mean_i - mean_j| -
/// (stddev_i + stddev_j)`. An example is assigned to the class under whose
/// distribution its output is most likely.
pub struct GaussianEvaluator {
    data: Arc<Dataset>,
}

impl GaussianEvaluator {
    /// Outputs are clamped to `[-CUT, CUT]`; an empty output counts as 0.
    const CUT: f64 = 1000.0;

    pub fn new(data: Arc<Dataset>) -> Self {
        Self { data }
    }

    fn output(prg: &Individual, sset: &SymbolSet, e: &Example) -> f64 {
        numeric(prg, sset, e)
            .filter(|v| !v.is_nan())
            .unwrap_or(0.0)
            .clamp(-Self::CUT, Self::CUT)
    }

    /// Distribution of the outputs on the labelled examples, one per class.
    pub fn distributions(&self, prg: &Individual, sset: &SymbolSet) -> Vec<ClassDistribution> {
        let mut gauss = vec![ClassDistribution::default(); self.data.classes()];
        for e in self.data.iter() {
            let Some(label) = e.label else { continue };
            if let Some(d) = gauss.get_mut(label) {
                d.add(Self::output(prg, sset, e));
            }
        }
        gauss
    }

    fn most_likely(gauss: &[ClassDistribution], x: f64) -> usize {
        gauss
            .iter()
            .enumerate()
            .fold((0, 0.0), |best, (c, d)| {
                let p = d.likelihood(x);
                if p > best.1 {
                    (c, p)
                } else {
                    best
                }
            })
            .0
    }

    /// Predicted class of `e`.
    pub fn class_of(&self, prg: &Individual, sset: &SymbolSet, e: &Example) -> usize {
        let gauss = self.distributions(prg, sset);
        Self::most_likely(&gauss, Self::output(prg, sset, e))
    }
}

impl Evaluator for GaussianEvaluator {
    fn evaluate(&self, prg: &Individual, sset: &SymbolSet) -> Fitness {
        let gauss = self.distributions(prg, sset);

        let mut d = 0.0;
        for (i, gi) in gauss.iter().enumerate() {
            for gj in &gauss[i + 1..] {
                let delta = (gj.mean - gi.mean).abs();
                let radius = gi.standard_deviation() + gj.standard_deviation();
                d += 200.0 * delta.ln() - radius;
            }
        }
        Fitness::from(d)
    }

    fn accuracy(&self, prg: &Individual, sset: &SymbolSet) -> Option<f64> {
        if self.data.is_empty() {
            return None;
        }
        let gauss = self.distributions(prg, sset);
        let ok = self
            .data
            .iter()
            .filter(|e| e.label == Some(Self::most_likely(&gauss, Self::output(prg, sset, e))))
            .count();
        Some(ok as f64 / self.data.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::generation::gene::{Gene, Locus};
    use crate::functions::primitives::{Add, Div};
    use crate::functions::terminals::{Number, Variable};

    fn set() -> SymbolSet {
        let mut sset = SymbolSet::new();
        sset.insert(Box::new(Add::new(0)), 1.0).unwrap();
        sset.insert(Box::new(Div::new(0)), 1.0).unwrap();
        sset.insert(Box::new(Variable::new("X", 0, 0)), 1.0).unwrap();
        sset.insert(Box::new(Number::new(0, 0.0, 1.0)), 1.0).unwrap();
        sset
    }

    fn x_plus(sset: &SymbolSet, k: f64) -> Individual {
        let add = sset.decode_name("FADD").unwrap();
        let x = sset.decode_name("X").unwrap();
        let num = sset.decode_name("REAL").unwrap();
        Individual::from_genes(
            sset,
            vec![
                Gene::function(add, &[Locus::new(1, 0), Locus::new(2, 0)]),
                Gene::terminal(x),
                Gene::parametric(num, k),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_abs_error_of_exact_program_is_zero() {
        let sset = set();
        let data = Arc::new(Dataset::from_fn(&[0.0, 1.0, 2.0, 3.0], |x| x + 1.0));
        let eva = AbsErrorEvaluator::new(data);

        assert_eq!(eva.evaluate(&x_plus(&sset, 1.0), &sset), Fitness::from(0.0));
        assert_eq!(eva.evaluate(&x_plus(&sset, 2.0), &sset), Fitness::from(-4.0));
        assert_eq!(eva.accuracy(&x_plus(&sset, 1.0), &sset), Some(1.0));
    }

    #[test]
    fn test_abs_error_penalizes_empty_outputs() {
        let sset = set();
        let div = sset.decode_name("FDIV").unwrap();
        let x = sset.decode_name("X").unwrap();
        let num = sset.decode_name("REAL").unwrap();

        // 1 / X is empty for X = 0.
        let prg = Individual::from_genes(
            &sset,
            vec![
                Gene::function(div, &[Locus::new(1, 0), Locus::new(2, 0)]),
                Gene::parametric(num, 1.0),
                Gene::terminal(x),
            ],
        )
        .unwrap();

        let data = Arc::new(Dataset::from_fn(&[0.0, 1.0], |x| x));
        let eva = AbsErrorEvaluator::new(data);
        // 100^1 for the illegal case, |1 - 1| for the other one.
        assert_eq!(eva.evaluate(&prg, &sset), Fitness::from(-100.0));
    }

    #[test]
    fn test_count_evaluator() {
        let sset = set();
        let data = Arc::new(Dataset::from_fn(&[0.0, 1.0, 2.0], |x| if x < 2.0 { x + 1.0 } else { 0.0 }));
        let eva = CountEvaluator::new(data);
        assert_eq!(eva.evaluate(&x_plus(&sset, 1.0), &sset), Fitness::from(-1.0));
    }

    /// Two classes: negative and positive inputs.
    fn sign_data() -> (Dataset, usize, usize) {
        let mut data = Dataset::new();
        let neg = data.encode("negative");
        let pos = data.encode("positive");
        for v in [-30.0, -20.0, -10.0] {
            data.push(Example::labelled(vec![Value::Float(v)], neg));
        }
        for v in [10.0, 20.0, 30.0] {
            data.push(Example::labelled(vec![Value::Float(v)], pos));
        }
        (data, neg, pos)
    }

    #[test]
    fn test_dyn_slot_separates_classes() {
        let sset = set();
        let (data, _, pos) = sign_data();

        let eva = DynSlotEvaluator::new(Arc::new(data), 10);
        let prg = x_plus(&sset, 0.0);
        assert_eq!(eva.evaluate(&prg, &sset), Fitness::from(0.0));
        assert_eq!(eva.accuracy(&prg, &sset), Some(1.0));

        let sample = Example::labelled(vec![Value::Float(25.0)], pos);
        assert_eq!(eva.class_of(&prg, &sset, &sample), pos);
    }

    #[test]
    fn test_gaussian_separates_classes() {
        let sset = set();
        let (data, neg, pos) = sign_data();
        let eva = GaussianEvaluator::new(Arc::new(data));

        let prg = x_plus(&sset, 0.0);
        let gauss = eva.distributions(&prg, &sset);
        assert_eq!(gauss.len(), 2);
        assert_eq!(gauss[neg].count, 3);
        assert!((gauss[neg].mean + 20.0).abs() < 1e-9);
        assert!((gauss[pos].mean - 20.0).abs() < 1e-9);
        assert!((gauss[pos].variance() - 200.0 / 3.0).abs() < 1e-9);

        let f = eva.evaluate(&prg, &sset).main();
        let expected = 200.0 * 40.0_f64.ln() - 2.0 * (200.0_f64 / 3.0).sqrt();
        assert!((f - expected).abs() < 1e-9);
        assert_eq!(eva.accuracy(&prg, &sset), Some(1.0));

        let near_pos = Example::labelled(vec![Value::Float(25.0)], pos);
        let near_neg = Example::labelled(vec![Value::Float(-4.0)], neg);
        assert_eq!(eva.class_of(&prg, &sset, &near_pos), pos);
        assert_eq!(eva.class_of(&prg, &sset, &near_neg), neg);
    }

    #[test]
    fn test_gaussian_constant_program_is_worst() {
        let sset = set();
        let (data, _, _) = sign_data();
        let eva = GaussianEvaluator::new(Arc::new(data));

        let num = sset.decode_name("REAL").unwrap();
        let constant = Individual::from_genes(&sset, vec![Gene::parametric(num, 3.0)]).unwrap();
        let f = eva.evaluate(&constant, &sset);
        assert!(!f.is_finite());
        assert!(f < eva.evaluate(&x_plus(&sset, 0.0), &sset));
    }
}
