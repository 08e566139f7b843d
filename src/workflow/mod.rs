pub mod comparison_flow;
pub mod pair_ctx;

pub use comparison_flow::ComparisonFlow;
pub use pair_ctx::PairCtx;
