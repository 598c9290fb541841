pub mod circuit_breaker;
pub mod clock;
pub mod id_generator;
pub mod retry;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerError};
pub use clock::{Clock, SystemClock};
pub use id_generator::{IdGenerator, UuidV7Generator};
pub use retry::{retry_on_transient, IsTransient, RetryConfig};
