//! Labels for parameterised benchmark runs.

use std::fmt;

/// Parameters for a topology benchmark run.
#[derive(Clone, Copy, Debug)]
pub struct TopologyBenchParams {
    /// Unit cells per side.
    pub degree: usize,
    /// Broken qubits per thousand.
    pub broken_per_mille: u32,
}

impl fmt::Display for TopologyBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "d={},broken={}‰", self.degree, self.broken_per_mille)
    }
}

/// Parameters for a generator benchmark run.
#[derive(Clone, Copy, Debug)]
pub struct GeneratorBenchParams {
    /// Short generator name.
    pub generator: &'static str,
    /// Unit cells per side of the view.
    pub degree: usize,
}

impl fmt::Display for GeneratorBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},d={}", self.generator, self.degree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_compact() {
        let topology = TopologyBenchParams {
            degree: 16,
            broken_per_mille: 25,
        };
        assert_eq!(topology.to_string(), "d=16,broken=25‰");
        let generator = GeneratorBenchParams {
            generator: "fl",
            degree: 8,
        };
        assert_eq!(generator.to_string(), "fl,d=8");
    }
}
