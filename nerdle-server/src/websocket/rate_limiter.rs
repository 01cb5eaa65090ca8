use std::time::{Duration, Instant};

/// Token bucket guarding one socket's inbound messages.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    tokens: u32,
    max_tokens: u32,
    refill_every: Duration,
    last_refill: Instant,
}

impl RateLimiter {
    /// 30 messages of burst, one token back every 500ms. Typing a word sends
    /// one message per keystroke.
    pub fn new() -> Self {
        Self::new_with_limits(30, Duration::from_millis(500))
    }

    pub fn new_with_limits(max_tokens: u32, refill_every: Duration) -> Self {
        Self {
            tokens: max_tokens,
            max_tokens,
            refill_every,
            last_refill: Instant::now(),
        }
    }

    pub fn check_rate_limit(&mut self) -> bool {
        self.refill_tokens();

        if self.tokens > 0 {
            self.tokens -= 1;
            true
        } else {
            false
        }
    }

    fn refill_tokens(&mut self) {
        let elapsed = self.last_refill.elapsed();
        let step = self.refill_every.as_millis().max(1);
        let earned = elapsed.as_millis() / step;

        if earned > 0 {
            let earned = u32::try_from(earned).unwrap_or(u32::MAX);
            self.tokens = self.tokens.saturating_add(earned).min(self.max_tokens);

            if self.tokens == self.max_tokens {
                self.last_refill = Instant::now();
            } else {
                // Keep the partial interval toward the next token
                self.last_refill += self.refill_every.saturating_mul(earned);
            }
        }
    }

    pub fn remaining_tokens(&mut self) -> u32 {
        self.refill_tokens();
        self.tokens
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
