// ---------------------------------------------------------------------------
// ProgramCache: reward memoization by generated-program text
// ---------------------------------------------------------------------------

/// Memoizes (full program text → reward) so a generation prefix that is
/// already covered by an evaluated program never triggers a second
/// completion + test run.
///
/// Entries are kept in insertion order and are never overwritten. When
/// several cached programs share a prefix, `lookup_prefix` returns the
/// first-inserted match; the tie-break is fixed so repeated runs agree.
pub struct ProgramCache {
    entries: Vec<(String, f64)>,
}

impl ProgramCache {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Record a freshly evaluated program. Called exactly once per distinct
    /// program text, immediately after external evaluation.
    pub fn insert(&mut self, program: impl Into<String>, reward: f64) {
        let program = program.into();
        debug_assert!(
            (0.0..=1.0).contains(&reward),
            "insert: reward {reward} outside [0, 1]"
        );
        debug_assert!(
            !self.entries.iter().any(|(p, _)| *p == program),
            "insert: program already cached"
        );
        self.entries.push((program, reward));
    }

    /// Reward of the first-inserted cached program that starts with
    /// `prefix`, or `None` when no evaluated program covers this prefix.
    pub fn lookup_prefix(&self, prefix: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(program, _)| program.starts_with(prefix))
            .map(|&(_, reward)| reward)
    }

    /// The cached program with the maximum reward. Strictly-greater
    /// comparison over insertion order, so among equal rewards the
    /// first-inserted program wins. `None` only when nothing was ever
    /// evaluated.
    pub fn best(&self) -> Option<(&str, f64)> {
        let mut best: Option<(&str, f64)> = None;
        for (program, reward) in &self.entries {
            match best {
                Some((_, best_reward)) if *reward <= best_reward => {}
                _ => best = Some((program.as_str(), *reward)),
            }
        }
        best
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order, for diagnostics and persistence.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|&(ref p, r)| (p.as_str(), r))
    }
}

impl Default for ProgramCache {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
