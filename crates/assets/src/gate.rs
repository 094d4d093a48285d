/// Countdown gate over resolved asset loads.
///
/// Order among loads is irrelevant; only the count matters. The gate fires
/// exactly once.
#[derive(Debug, Clone)]
pub struct LoadGate {
    required: usize,
    resolved: usize,
    fired: bool,
}

impl LoadGate {
    pub fn new(required: usize) -> Self {
        Self {
            required,
            resolved: 0,
            fired: false,
        }
    }

    /// Record one resolved load (success or failure). Returns `true` on the
    /// call that opens the gate, `false` on every other call.
    pub fn resolve(&mut self) -> bool {
        self.resolved += 1;
        self.try_fire()
    }

    /// Fire if the threshold is already met. Covers a gate with nothing
    /// to wait for.
    pub fn try_fire(&mut self) -> bool {
        if !self.fired && self.resolved >= self.required {
            self.fired = true;
            return true;
        }
        false
    }

    pub fn is_open(&self) -> bool {
        self.fired
    }

    pub fn resolved(&self) -> usize {
        self.resolved
    }

    pub fn required(&self) -> usize {
        self.required
    }

    pub fn remaining(&self) -> usize {
        self.required.saturating_sub(self.resolved)
    }
}
