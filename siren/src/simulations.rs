//! Various prebuilt simulation setups for testing, benchmarking, and examples.

mod handshake_pair;
pub use handshake_pair::handshake_pair;

mod hidden_terminal;
pub use hidden_terminal::hidden_terminal;

mod saturation;
pub use saturation::saturation;

mod multihop_burst;
pub use multihop_burst::multihop_burst;

mod retry_exhaustion;
pub use retry_exhaustion::retry_exhaustion;
