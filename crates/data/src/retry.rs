//! Bounded retry around provider calls.

use std::{thread, time::Duration};

use serde::{Deserialize, Serialize};
use tailwatch_primitives::{Date, DateSeries, EsgRecord, FirmMeta, FundamentalsRecord, Ticker};
use tailwatch_traits::{FetchResult, MarketDataProvider, ProviderError};
use tracing::warn;

/// How often and how patiently a transient failure is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first.
    pub attempts: usize,
    /// Pause between two attempts.
    pub backoff: Duration,
}

impl RetryPolicy {
    /// Create a policy.
    #[must_use]
    pub const fn new(attempts: usize, backoff: Duration) -> Self {
        Self { attempts, backoff }
    }

    /// Call `f` until it succeeds, fails permanently, or the attempts run out.
    ///
    /// Only transport failures are retried. Running out of attempts yields
    /// `ProviderError::Exhausted`.
    ///
    /// # Errors
    /// Returns the first non-transient error, or `Exhausted`.
    pub fn run<T>(&self, what: &str, mut f: impl FnMut() -> FetchResult<T>) -> FetchResult<T> {
        let attempts = self.attempts.max(1);
        let mut last = String::new();

        for attempt in 1..=attempts {
            match f() {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() => {
                    warn!(what, attempt, attempts, error = %err, "provider call failed");
                    last = err.to_string();
                    if attempt < attempts && !self.backoff.is_zero() {
                        thread::sleep(self.backoff);
                    }
                }
                Err(err) => return Err(err),
            }
        }

        Err(ProviderError::Exhausted { attempts, last })
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { attempts: 5, backoff: Duration::from_millis(500) }
    }
}

/// A provider whose calls are wrapped in a [`RetryPolicy`].
#[derive(Debug, Clone)]
pub struct RetryingProvider<P> {
    inner: P,
    policy: RetryPolicy,
}

impl<P: MarketDataProvider> RetryingProvider<P> {
    /// Wrap `inner` with `policy`.
    #[must_use]
    pub const fn new(inner: P, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    /// The wrapped provider.
    #[must_use]
    pub const fn inner(&self) -> &P {
        &self.inner
    }

    /// The retry policy.
    #[must_use]
    pub const fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

impl<P: MarketDataProvider> MarketDataProvider for RetryingProvider<P> {
    fn total_return(&self, ticker: &Ticker, start: Date, end: Date) -> FetchResult<DateSeries> {
        self.policy.run(ticker.as_str(), || self.inner.total_return(ticker, start, end))
    }

    fn overnight_rate(&self, ticker: &Ticker, start: Date, end: Date) -> FetchResult<DateSeries> {
        self.policy.run(ticker.as_str(), || self.inner.overnight_rate(ticker, start, end))
    }

    fn index_returns(&self, ticker: &Ticker, start: Date, end: Date) -> FetchResult<DateSeries> {
        self.policy.run(ticker.as_str(), || self.inner.index_returns(ticker, start, end))
    }

    fn fundamentals(&self, ticker: &Ticker) -> FetchResult<Vec<FundamentalsRecord>> {
        self.policy.run(ticker.as_str(), || self.inner.fundamentals(ticker))
    }

    fn esg(&self, ticker: &Ticker) -> FetchResult<Vec<EsgRecord>> {
        self.policy.run(ticker.as_str(), || self.inner.esg(ticker))
    }

    fn extended_metadata(&self, codes: &[String]) -> FetchResult<Vec<FirmMeta>> {
        self.policy.run("metadata", || self.inner.extended_metadata(codes))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use tailwatch_traits::DataKind;

    use super::*;

    /// Fails with a transport error a fixed number of times, then answers.
    struct Flaky {
        failures: usize,
        calls: Cell<usize>,
    }

    impl Flaky {
        const fn new(failures: usize) -> Self {
            Self { failures, calls: Cell::new(0) }
        }

        fn answer<T>(&self, value: T) -> FetchResult<T> {
            let n = self.calls.get() + 1;
            self.calls.set(n);
            if n <= self.failures { Err(ProviderError::Transport(format!("timeout #{n}"))) } else { Ok(value) }
        }
    }

    impl MarketDataProvider for Flaky {
        fn total_return(&self, _: &Ticker, _: Date, _: Date) -> FetchResult<DateSeries> {
            self.answer(DateSeries::new())
        }

        fn overnight_rate(&self, _: &Ticker, _: Date, _: Date) -> FetchResult<DateSeries> {
            self.answer(DateSeries::new())
        }

        fn index_returns(&self, _: &Ticker, _: Date, _: Date) -> FetchResult<DateSeries> {
            self.answer(DateSeries::new())
        }

        fn fundamentals(&self, ticker: &Ticker) -> FetchResult<Vec<FundamentalsRecord>> {
            self.calls.set(self.calls.get() + 1);
            Err(ProviderError::unavailable(ticker.as_str(), DataKind::Fundamentals))
        }

        fn esg(&self, _: &Ticker) -> FetchResult<Vec<EsgRecord>> {
            self.answer(Vec::new())
        }

        fn extended_metadata(&self, _: &[String]) -> FetchResult<Vec<FirmMeta>> {
            self.answer(Vec::new())
        }
    }

    const FAST: RetryPolicy = RetryPolicy::new(5, Duration::ZERO);

    fn day() -> Date {
        Date::from_ymd_opt(2020, 1, 2).unwrap()
    }

    #[test]
    fn default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.attempts, 5);
        assert_eq!(policy.backoff, Duration::from_millis(500));
    }

    #[test]
    fn recovers_from_transient_failures() {
        let provider = RetryingProvider::new(Flaky::new(4), FAST);
        assert!(provider.total_return(&Ticker::new("A"), day(), day()).is_ok());
        assert_eq!(provider.inner().calls.get(), 5);
    }

    #[test]
    fn gives_up_after_the_last_attempt() {
        let provider = RetryingProvider::new(Flaky::new(10), FAST);
        let err = provider.esg(&Ticker::new("A")).unwrap_err();

        match err {
            ProviderError::Exhausted { attempts, last } => {
                assert_eq!(attempts, 5);
                assert_eq!(last, "transport error: timeout #5");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(provider.inner().calls.get(), 5);
    }

    #[test]
    fn unavailable_is_not_retried() {
        let provider = RetryingProvider::new(Flaky::new(0), FAST);
        let err = provider.fundamentals(&Ticker::new("A")).unwrap_err();
        assert!(err.is_unavailable());
        assert_eq!(provider.inner().calls.get(), 1);
    }

    #[test]
    fn zero_attempts_still_calls_once() {
        let provider = RetryingProvider::new(Flaky::new(0), RetryPolicy::new(0, Duration::ZERO));
        assert!(provider.extended_metadata(&[]).is_ok());
        assert_eq!(provider.inner().calls.get(), 1);
    }
}
