/// Running statistics over actual inter-tick intervals. Mean and jitter
/// come from running sums; no samples are stored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickStats {
    pub samples: u64,
    pub min_ns: u64,
    pub max_ns: u64,
    sum_ns: u128,
    sum_sq_ns: u128,
    /// Ticks that fired a whole period or more past their due time.
    pub overruns: u64,
}

impl TickStats {
    pub fn record(&mut self, interval_ns: u64) {
        if self.samples == 0 || interval_ns < self.min_ns {
            self.min_ns = interval_ns;
        }
        if interval_ns > self.max_ns {
            self.max_ns = interval_ns;
        }
        self.samples += 1;
        self.sum_ns += interval_ns as u128;
        self.sum_sq_ns += (interval_ns as u128) * (interval_ns as u128);
    }

    pub fn record_overrun(&mut self) {
        self.overruns += 1;
    }

    pub fn average_ns(&self) -> f64 {
        if self.samples == 0 {
            0.0
        } else {
            self.sum_ns as f64 / self.samples as f64
        }
    }

    /// Standard deviation of the intervals.
    pub fn jitter_ns(&self) -> f64 {
        if self.samples == 0 {
            return 0.0;
        }
        let n = self.samples as f64;
        let mean = self.sum_ns as f64 / n;
        let variance = (self.sum_sq_ns as f64 / n - mean * mean).max(0.0);
        variance.sqrt()
    }

    pub fn effective_hz(&self) -> f64 {
        let avg = self.average_ns();
        if avg > 0.0 { 1e9 / avg } else { 0.0 }
    }
}
